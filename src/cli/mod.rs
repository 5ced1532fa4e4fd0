pub mod commands;

use crate::ingest::request::{TopologyFilters, DEFAULT_EDGE_LIMIT, DEFAULT_MIN_COST_USD};
use crate::TopologyError;
use clap::{Args, Parser, Subcommand};
use netcost_common::Lookback;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "netcost")]
#[command(author = "Ignoramuss")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cost-aware network topology for Kubernetes clusters", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file (YAML)")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Dashboard API base URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Build a topology graph from captured edges")]
    Build {
        #[arg(short, long, help = "Edge JSON file, or - for stdin")]
        input: Option<PathBuf>,

        #[arg(short, long, help = "Output file path")]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "json", help = "Output format (json, yaml)")]
        format: OutputFormat,
    },
    #[command(about = "Fetch edges from the dashboard API and build a topology graph")]
    Fetch {
        #[command(flatten)]
        filters: FilterArgs,

        #[arg(short, long, help = "Output file path")]
        output: Option<PathBuf>,

        #[arg(short, long, default_value = "json", help = "Output format (json, yaml)")]
        format: OutputFormat,
    },
    #[command(about = "List aggregated edges, costliest first")]
    Edges {
        #[arg(short, long, help = "Edge JSON file instead of the API, or - for stdin")]
        input: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,

        #[arg(long, default_value = "20", help = "Costliest edges to print")]
        top: usize,
    },
    #[command(about = "List namespaces known to the dashboard API")]
    Namespaces,
    #[command(about = "Print build statistics in Prometheus text format")]
    Stats {
        #[arg(short, long, help = "Edge JSON file instead of the API, or - for stdin")]
        input: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

#[derive(Args, Clone, Debug)]
pub struct FilterArgs {
    #[arg(short, long, default_value = "1h", help = "Lookback window (15m, 1h, 6h, 24h)")]
    pub lookback: Lookback,

    #[arg(short, long, help = "Namespace filter, repeatable or comma-separated")]
    pub namespace: Vec<String>,

    #[arg(
        long,
        default_value_t = DEFAULT_EDGE_LIMIT,
        allow_hyphen_values = true,
        help = "Maximum edges to request"
    )]
    pub limit: i64,

    #[arg(
        long,
        default_value_t = DEFAULT_MIN_COST_USD,
        allow_hyphen_values = true,
        help = "Minimum egress cost in USD"
    )]
    pub min_cost: f64,

    #[arg(
        long,
        default_value_t = 0.0,
        allow_hyphen_values = true,
        help = "Minimum traffic in MB"
    )]
    pub min_mb: f64,

    #[arg(
        long,
        default_value_t = 0,
        allow_hyphen_values = true,
        help = "Minimum connection count"
    )]
    pub min_connections: i64,
}

impl From<FilterArgs> for TopologyFilters {
    fn from(args: FilterArgs) -> Self {
        Self {
            lookback: args.lookback,
            namespaces: args.namespace,
            limit: args.limit,
            min_cost_usd: args.min_cost,
            min_bytes_mb: args.min_mb,
            min_connections: args.min_connections,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            other => Err(TopologyError::UnsupportedFormat(other.to_string())),
        }
    }
}
