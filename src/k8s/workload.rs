//! Owning-workload inference from generated pod names
//!
//! Controllers append predictable suffixes to the pods they create:
//! - StatefulSet: `<name>-<ordinal>`
//! - Deployment (via ReplicaSet): `<name>-<pod-template-hash>-<5 chars>`
//! - DaemonSet: `<name>-<5 chars>`
//!
//! Anything else is treated as a bare pod.

use super::types::ResourceKind;

/// Workload a pod is attributed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub name: String,
    pub kind: ResourceKind,
}

fn is_lower_alnum(token: &str) -> bool {
    token
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

fn is_random_suffix(token: &str) -> bool {
    token.len() == 5 && is_lower_alnum(token)
}

fn is_template_hash(token: &str) -> bool {
    (9..=10).contains(&token.len()) && is_lower_alnum(token)
}

fn is_ordinal(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Derive the owning workload of a pod from its name
pub fn parse_workload_from_pod(pod_name: &str) -> WorkloadRef {
    let parts: Vec<&str> = pod_name.split('-').collect();
    let last = parts[parts.len() - 1];
    let second_last = if parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        ""
    };

    if parts.len() >= 2 && is_ordinal(last) {
        return WorkloadRef {
            name: parts[..parts.len() - 1].join("-"),
            kind: ResourceKind::StatefulSet,
        };
    }

    if parts.len() >= 3 && is_random_suffix(last) && is_template_hash(second_last) {
        return WorkloadRef {
            name: parts[..parts.len() - 2].join("-"),
            kind: ResourceKind::Deployment,
        };
    }

    if parts.len() >= 2 && is_random_suffix(last) {
        return WorkloadRef {
            name: parts[..parts.len() - 1].join("-"),
            kind: ResourceKind::DaemonSet,
        };
    }

    WorkloadRef {
        name: pod_name.to_string(),
        kind: ResourceKind::Pod,
    }
}
