//! Visual encoding of aggregated edges

use super::aggregate::{AggregatedEdge, Direction};

/// Costs below this are treated as free traffic
pub const COST_EPSILON_USD: f64 = 0.01;

pub const WARNING_COLOR: &str = "#f97316";
pub const INFO_COLOR: &str = "#2563eb";
pub const ALERT_COLOR: &str = "#ef4444";
pub const MUTED_COLOR: &str = "rgba(148,163,184,0.45)";
pub const DEFAULT_COLOR: &str = "#0ea5a4";

pub const MIN_STROKE_WIDTH: f64 = 1.5;
pub const MAX_STROKE_WIDTH: f64 = 8.0;
pub const FREE_STROKE_WIDTH: f64 = 1.0;

fn is_free_internal(edge: &AggregatedEdge) -> bool {
    edge.direction == Direction::Internal && edge.egress_cost_usd <= COST_EPSILON_USD
}

pub fn edge_color(edge: &AggregatedEdge) -> &'static str {
    if edge.direction == Direction::Egress && edge.egress_cost_usd > COST_EPSILON_USD {
        WARNING_COLOR
    } else if edge.is_external && edge.direction == Direction::Ingress {
        INFO_COLOR
    } else if edge.is_external {
        ALERT_COLOR
    } else if edge.egress_cost_usd < COST_EPSILON_USD {
        MUTED_COLOR
    } else if edge.is_cross_az {
        WARNING_COLOR
    } else {
        DEFAULT_COLOR
    }
}

/// Stroke width grows logarithmically with cost
pub fn edge_width(edge: &AggregatedEdge) -> f64 {
    if is_free_internal(edge) {
        return FREE_STROKE_WIDTH;
    }
    let cost_weight = (edge.egress_cost_usd + 1.0).log10() * 2.0;
    (2.0 + cost_weight).clamp(MIN_STROKE_WIDTH, MAX_STROKE_WIDTH)
}

pub fn edge_label(edge: &AggregatedEdge) -> String {
    format_cost(edge.egress_cost_usd)
}

/// Dollar amount with two decimals; zero and non-finite costs read `$0.00`
pub fn format_cost(cost_usd: f64) -> String {
    if cost_usd == 0.0 || !cost_usd.is_finite() {
        return "$0.00".to_string();
    }
    format!("${:.2}", cost_usd)
}

pub fn is_dashed(edge: &AggregatedEdge) -> bool {
    edge.direction == Direction::Internal && edge.egress_cost_usd < COST_EPSILON_USD
}

/// External egress is drawn animated
pub fn is_animated(edge: &AggregatedEdge) -> bool {
    edge.is_external && edge.direction == Direction::Egress
}
