pub mod namespace;
pub mod types;
pub mod workload;

pub use namespace::is_system_namespace;
pub use types::ResourceKind;
pub use workload::{parse_workload_from_pod, WorkloadRef};
