use crate::cli::{Commands, FilterArgs, OutputFormat};
use crate::config::Config;
use crate::ingest::{
    parse_payload, EdgeSource, FileSource, RefreshOutcome, TopologyClient, TopologyFilters,
    TopologyRefresher,
};
use crate::metrics::{MetricsCollector, PrometheusExporter};
use crate::topology::{style, Topology, TopologyBuilder, TopologyGraph};
use anyhow::{bail, Context, Result};
use netcost_common::{TopologyRequest, TopologyResponse};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::info;

pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Build {
            input,
            output,
            format,
        } => handle_build(config, input, output, format).await,
        Commands::Fetch {
            filters,
            output,
            format,
        } => handle_fetch(config, filters, output, format).await,
        Commands::Edges {
            input,
            filters,
            top,
        } => handle_edges(config, input, filters, top).await,
        Commands::Namespaces => handle_namespaces(config).await,
        Commands::Stats { input, filters } => handle_stats(config, input, filters).await,
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

async fn read_stdin() -> Result<TopologyResponse> {
    let mut contents = String::new();
    tokio::io::stdin()
        .read_to_string(&mut contents)
        .await
        .context("Failed to read edges from stdin")?;
    Ok(parse_payload(&contents)?)
}

/// Edges from a file, stdin or the dashboard API
async fn load_edges(
    config: &Config,
    input: Option<PathBuf>,
    request: &TopologyRequest,
) -> Result<TopologyResponse> {
    match input {
        Some(path) if is_stdin(&path) => read_stdin().await,
        Some(path) => {
            let source = FileSource::new(path);
            source
                .fetch(request)
                .await
                .with_context(|| format!("Failed to load edges from {}", source.describe()))
        }
        None => {
            let client = TopologyClient::new(&config.api)?;
            client
                .fetch(request)
                .await
                .with_context(|| format!("Failed to fetch edges from {}", client.describe()))
        }
    }
}

fn render<T: serde::Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
    })
}

async fn write_graph(
    graph: &TopologyGraph,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let rendered = render(graph, format)?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, rendered)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                "Wrote {} nodes and {} edges to {}",
                graph.nodes.len(),
                graph.edges.len(),
                path.display()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

async fn handle_build(
    config: &Config,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let input = input.unwrap_or_else(|| PathBuf::from("-"));
    let response = load_edges(config, Some(input), &TopologyRequest::default()).await?;

    let topology = TopologyBuilder::new(config).build(&response.edges);
    info!(
        "Built topology: {} entities, {} aggregated edges, {} total",
        topology.stats.entities,
        topology.stats.aggregated_edges,
        style::format_cost(topology.stats.total_cost_usd)
    );

    write_graph(&topology.graph, output, format).await
}

async fn handle_fetch(
    config: &Config,
    filters: FilterArgs,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let request = TopologyFilters::from(filters).to_request();
    let client = TopologyClient::new(&config.api)?;
    let refresher = TopologyRefresher::new(client, TopologyBuilder::new(config));

    let snapshot = match refresher.refresh(&request).await? {
        RefreshOutcome::Updated(snapshot) => snapshot,
        RefreshOutcome::Superseded { generation, latest } => {
            bail!("Refresh {} was superseded by {}", generation, latest)
        }
    };

    info!(
        "Cluster {}: showing {} of {} edges (limit {})",
        snapshot.cluster_id,
        snapshot.topology.stats.raw_edges,
        snapshot.total_edges,
        snapshot.requested_limit
    );

    write_graph(&snapshot.topology.graph, output, format).await
}

async fn build_from(
    config: &Config,
    input: Option<PathBuf>,
    filters: FilterArgs,
) -> Result<Topology> {
    let request = TopologyFilters::from(filters).to_request();
    let response = load_edges(config, input, &request).await?;
    Ok(TopologyBuilder::new(config).build(&response.edges))
}

async fn handle_edges(
    config: &Config,
    input: Option<PathBuf>,
    filters: FilterArgs,
    top: usize,
) -> Result<()> {
    let topology = build_from(config, input, filters).await?;

    if topology.edges.is_empty() {
        println!("No edges found.");
        return Ok(());
    }

    let mut edges: Vec<_> = topology.edges.iter().collect();
    edges.sort_by(|a, b| b.egress_cost_usd.total_cmp(&a.egress_cost_usd));

    println!(
        "{:<40} {:<40} {:<8} {:>9} {:>6} {:>9}",
        "SOURCE", "DESTINATION", "DIR", "BYTES", "CONNS", "COST"
    );
    println!("{}", "-".repeat(117));

    for edge in edges.iter().take(top) {
        println!(
            "{:<40} {:<40} {:<8} {:>9} {:>6} {:>9}",
            truncate(&edge.source_id, 40),
            truncate(&edge.destination_id, 40),
            edge.direction.as_str(),
            format_bytes(edge.total_bytes()),
            edge.connection_count,
            style::edge_label(edge)
        );
    }

    println!("{}", "-".repeat(117));
    println!(
        "{} aggregated edges from {} raw edges, estimated egress {}",
        topology.stats.aggregated_edges,
        topology.stats.raw_edges,
        style::format_cost(topology.stats.total_cost_usd)
    );

    Ok(())
}

async fn handle_namespaces(config: &Config) -> Result<()> {
    let client = TopologyClient::new(&config.api)?;
    let namespaces = client
        .list_namespaces()
        .await
        .with_context(|| format!("Failed to list namespaces from {}", client.describe()))?;

    if namespaces.is_empty() {
        println!("No namespaces found.");
    }
    for namespace in namespaces {
        println!("{}", namespace);
    }

    Ok(())
}

async fn handle_stats(config: &Config, input: Option<PathBuf>, filters: FilterArgs) -> Result<()> {
    let topology = build_from(config, input, filters).await?;

    let collector = MetricsCollector::new();
    collector.record_build(&topology.stats).await;

    let text = PrometheusExporter::new(collector)
        .format_current_metrics()
        .await?;
    print!("{}", text);

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1}GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
