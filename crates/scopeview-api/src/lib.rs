// scopeview-api: Async Rust client for the Weave Scope topology API

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ScopeClient;
pub use error::Error;
pub use models::{
    MetadataRow, Metric, NodeControl, NodeDetails, NodeSummary, Topology, TopologyOption,
    TopologyOptionValue, TopologyOptions, TopologyStats,
};
pub use transport::{TlsMode, TransportConfig};
