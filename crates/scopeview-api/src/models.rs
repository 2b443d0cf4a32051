// Wire types for the Scope topology API.
//
// Field names follow the JSON the app server emits: topology listings are
// snake_case, node payloads are camelCase. Everything optional on the wire
// is optional (or defaulted) here so partial probes don't fail decoding.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Active topology options, e.g. `{"unconnected": "hide"}`.
///
/// A `BTreeMap` so the query string is stable across requests.
pub type TopologyOptions = BTreeMap<String, String>;

/// One entry of `GET /api/topology`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub name: String,
    /// API path of the topology, e.g. `/api/topology/processes`.
    pub url: String,
    #[serde(default)]
    pub rank: i64,
    #[serde(default)]
    pub hide_if_empty: bool,
    #[serde(default)]
    pub options: Vec<TopologyOption>,
    #[serde(default)]
    pub stats: Option<TopologyStats>,
    #[serde(default)]
    pub sub_topologies: Vec<Topology>,
}

impl Topology {
    /// Topology identifier: the last path segment of its URL.
    pub fn id(&self) -> &str {
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.url)
    }

    /// Default value for every option this topology declares.
    pub fn default_options(&self) -> TopologyOptions {
        self.options
            .iter()
            .map(|o| (o.id.clone(), o.default_value.clone()))
            .collect()
    }
}

/// A selectable option on a topology (e.g. show/hide unconnected nodes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyOption {
    pub id: String,
    #[serde(rename = "defaultValue", default)]
    pub default_value: String,
    #[serde(default)]
    pub options: Vec<TopologyOptionValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyOptionValue {
    pub value: String,
    #[serde(default)]
    pub label: String,
}

/// Node and edge counts reported alongside a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyStats {
    #[serde(default)]
    pub node_count: u64,
    #[serde(default)]
    pub nonpseudo_node_count: u64,
    #[serde(default)]
    pub edge_count: u64,
    #[serde(default)]
    pub filtered_nodes: u64,
}

/// A single metric sample attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}

/// Node as listed by `GET /api/topology/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub label_minor: Option<String>,
    #[serde(default)]
    pub rank: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub pseudo: bool,
    #[serde(default)]
    pub adjacency: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl NodeSummary {
    /// Look up a metric value by id.
    pub fn metric(&self, id: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.id == id)
    }
}

/// `{"nodes": {...}}` envelope of the topology endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct NodesResponse {
    #[serde(default)]
    pub nodes: IndexMap<String, NodeSummary>,
}

/// A metadata row shown in the details panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRow {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

/// A control a probe exposes on a node (attach, exec, restart, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeControl {
    pub id: String,
    #[serde(default)]
    pub human: String,
    #[serde(default)]
    pub probe_id: String,
    #[serde(default)]
    pub node_id: String,
}

/// Full node payload of `GET /api/topology/{id}/{node}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetails {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub label_minor: Option<String>,
    #[serde(default)]
    pub pseudo: bool,
    #[serde(default)]
    pub metadata: Vec<MetadataRow>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub controls: Vec<NodeControl>,
}

/// `{"node": {...}}` envelope of the node details endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct NodeDetailsResponse {
    pub node: NodeDetails,
}
