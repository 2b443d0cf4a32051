//! All view-state actions. Actions are the sole mechanism for state mutation.

use indexmap::IndexMap;

use scopeview_api::{NodeDetails, NodeSummary, Topology};

use crate::route::UrlState;

/// Every transition the view state supports, plus the two shell-level
/// signals (`Render`, `Quit`) that ride the same channel but leave the
/// state untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // ── Shell ────────────────────────────────────────────────────────
    /// Redraw the frame.
    Render,
    /// Leave the event loop.
    Quit,
    /// Root surface was measured.
    SetViewportDimensions { width: u16, height: u16 },
    /// The shell is going away; release pipes and transient overlays.
    Shutdown,

    // ── Keyboard ─────────────────────────────────────────────────────
    HitEsc,
    HitBackspace,
    PinNextMetric,
    PinPreviousMetric,
    UnpinMetric,
    SetGraphView,
    SetTableView,
    SetResourceView,
    ToggleHelp,

    // ── Search ───────────────────────────────────────────────────────
    FocusSearch,
    DoSearch(String),
    PinSearch,

    // ── Topology ─────────────────────────────────────────────────────
    ChangeTopology(String),
    TopologiesRequested,
    ReceiveTopologies(Vec<Topology>),
    ReceiveNodes {
        topology_id: String,
        nodes: IndexMap<String, NodeSummary>,
    },
    ReceiveError(String),

    // ── Nodes ────────────────────────────────────────────────────────
    /// Pointer (cursor) rests on a node at the given screen cell.
    HighlightNode { id: String, left: u16, top: u16 },
    ClickNode {
        id: String,
        label: String,
        topology_id: String,
    },
    ReceiveNodeDetails(Box<NodeDetails>),

    // ── Routing ──────────────────────────────────────────────────────
    Route(Box<UrlState>),
}

impl Action {
    /// Shell-level actions the reducer ignores.
    pub fn is_shell_only(&self) -> bool {
        matches!(self, Self::Render | Self::Quit)
    }
}
