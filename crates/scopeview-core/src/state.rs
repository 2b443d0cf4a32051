//! The view state held by the [`Store`](crate::Store).
//!
//! Plain data only. Every mutation goes through [`reduce`](crate::reduce);
//! derived values live in [`selectors`](crate::selectors).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use scopeview_api::{NodeDetails, NodeSummary, Topology, TopologyOptions};

/// Metric id carrying the throughput rate shown in the monitor overlay.
pub const THROUGHPUT_RATE_METRIC: &str = "throughput_rate";
/// Metric id carrying the response time shown in the monitor overlay.
pub const RESPONSE_TIME_METRIC: &str = "response_time";

/// How the primary nodes view lays out the current topology.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum TopologyViewMode {
    #[default]
    #[serde(rename = "topo")]
    #[strum(serialize = "topo")]
    Graph,
    #[serde(rename = "table")]
    #[strum(serialize = "table")]
    Table,
    #[serde(rename = "resource")]
    #[strum(serialize = "resource")]
    Resource,
}

/// Last measured size of the root surface, in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportDimensions {
    pub width: u16,
    pub height: u16,
}

/// Live metrics for the monitor overlay. Either field may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonitorMetrics {
    pub throughput_rate: Option<f64>,
    pub response_time: Option<f64>,
}

impl MonitorMetrics {
    /// Pull the overlay metrics out of a node's metric list.
    ///
    /// Returns `None` when the node reports no metrics at all, so the
    /// overlay only appears for nodes that are actually being monitored.
    pub fn from_node(node: &NodeSummary) -> Option<Self> {
        if node.metrics.is_empty() {
            return None;
        }
        Some(Self {
            throughput_rate: node.metric(THROUGHPUT_RATE_METRIC).map(|m| m.value),
            response_time: node.metric(RESPONSE_TIME_METRIC).map(|m| m.value),
        })
    }
}

/// Transient monitor data anchored at a screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorData {
    /// Column the overlay is anchored to.
    pub left: u16,
    /// Row the overlay is anchored to. The overlay is drawn above it.
    pub top: u16,
    pub data: Option<MonitorMetrics>,
}

/// A visible details panel.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDetailsEntry {
    pub id: String,
    pub label: String,
    pub topology_id: String,
    /// Populated once the details request returns.
    pub details: Option<NodeDetails>,
}

/// An active terminal pipe attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPipe {
    pub id: String,
    pub node_id: String,
    #[serde(default)]
    pub raw_tty: bool,
}

/// The whole view state.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    // ── Topology ────────────────────────────────────────────────────
    /// Topologies as listed by the server, sub-topologies nested.
    pub topologies: Vec<Topology>,
    pub topologies_loaded: bool,
    pub topologies_loading: bool,
    /// Topology to show once the listing arrives, if none is current.
    pub preferred_topology_id: Option<String>,
    pub current_topology_id: Option<String>,
    pub topology_options: TopologyOptions,
    pub topology_view_mode: TopologyViewMode,

    // ── Nodes ───────────────────────────────────────────────────────
    pub nodes: IndexMap<String, NodeSummary>,
    pub highlighted_node_id: Option<String>,
    pub selected_node_id: Option<String>,
    pub node_details: IndexMap<String, NodeDetailsEntry>,
    pub pinned_metric_type: Option<String>,

    // ── Search ──────────────────────────────────────────────────────
    pub search_focused: bool,
    pub search_query: String,
    pub pinned_searches: Vec<String>,

    // ── Overlays ────────────────────────────────────────────────────
    pub showing_help: bool,
    pub control_pipes: IndexMap<String, ControlPipe>,
    pub monitor_data: Option<MonitorData>,

    // ── Shell ───────────────────────────────────────────────────────
    pub viewport: Option<ViewportDimensions>,
    pub route_set: bool,
    pub last_error: Option<String>,
    pub shutdown: bool,
}

impl ViewState {
    /// Fresh state that will open `topology_id` once topologies load.
    pub fn with_preferred_topology(topology_id: impl Into<String>) -> Self {
        Self {
            preferred_topology_id: Some(topology_id.into()),
            ..Self::default()
        }
    }
}
