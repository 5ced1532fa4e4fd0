/// Namespaces that hold cluster plumbing rather than application workloads
pub const DEFAULT_SYSTEM_NAMESPACES: [&str; 9] = [
    "kube-system",
    "kube-public",
    "kube-node-lease",
    "elastic-system",
    "istio-system",
    "monitoring",
    "ingress-nginx",
    "cert-manager",
    "infrastructure",
];

/// Case-insensitive exact match against a system namespace list
pub fn is_system_namespace<S: AsRef<str>>(namespace: &str, system: &[S]) -> bool {
    if namespace.is_empty() {
        return false;
    }
    system
        .iter()
        .any(|candidate| candidate.as_ref().eq_ignore_ascii_case(namespace))
}
