pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod k8s;
pub mod metrics;
pub mod topology;

pub use config::Config;
pub use error::{Result, TopologyError};
pub use topology::{build_topology, TopologyBuilder, TopologyGraph};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
