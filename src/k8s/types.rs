use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kind an edge endpoint resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Service,
    Deployment,
    StatefulSet,
    DaemonSet,
    Pod,
    Node,
    Ip,
    External,
    Unknown,
}

impl ResourceKind {
    /// Lowercase name, also used as the identity segment and the layout sort key
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Service => "service",
            ResourceKind::Deployment => "deployment",
            ResourceKind::StatefulSet => "statefulset",
            ResourceKind::DaemonSet => "daemonset",
            ResourceKind::Pod => "pod",
            ResourceKind::Node => "node",
            ResourceKind::Ip => "ip",
            ResourceKind::External => "external",
            ResourceKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_name_matches_as_str() {
        for kind in [
            ResourceKind::Service,
            ResourceKind::StatefulSet,
            ResourceKind::DaemonSet,
            ResourceKind::Ip,
            ResourceKind::Unknown,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
