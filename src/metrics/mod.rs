pub mod collector;
pub mod exporter;

pub use collector::{BuildStats, Metrics, MetricsCollector};
pub use exporter::PrometheusExporter;
