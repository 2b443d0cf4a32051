//! View-state layer between `scopeview-api` and the terminal UI.
//!
//! - **[`Store`]**: owns the single [`ViewState`]; mutated only by
//!   dispatching an [`Action`] through [`reduce`].
//! - **[`selectors`]**: derived views (current topology, view mode,
//!   filtered nodes, routable state).
//! - **[`Router`]**: maps view state to and from a [`Location`].
//! - **[`Debouncer`]**: trailing-edge coalescing for bursty input such as
//!   terminal resizes.
//! - **[`Tracker`]**: usage analytics sink.

pub mod action;
pub mod debounce;
pub mod error;
pub mod reducer;
pub mod route;
pub mod selectors;
pub mod state;
pub mod store;
pub mod tracking;

// ── Primary re-exports ──────────────────────────────────────────────
pub use action::Action;
pub use debounce::Debouncer;
pub use error::CoreError;
pub use reducer::reduce;
pub use route::{Location, NodeDetailsRef, Router, RouterOptions, UrlState};
pub use state::{
    ControlPipe, MonitorData, MonitorMetrics, NodeDetailsEntry, TopologyViewMode,
    ViewState, ViewportDimensions,
};
pub use store::Store;
pub use tracking::{LogTracker, RecordingTracker, Tracker, TrackingProps};
