//! Fetching raw edges from the cost dashboard or from disk

pub mod client;
pub mod refresh;
pub mod request;
pub mod source;

pub use client::TopologyClient;
pub use refresh::{RefreshOutcome, TopologyRefresher, TopologySnapshot};
pub use request::{parse_namespace_list, query_pairs, TopologyFilters};
pub use source::{parse_payload, EdgeSource, FileSource};
