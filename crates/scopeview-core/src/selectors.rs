//! Derived views over [`ViewState`]. Pure functions, no caching.

use std::collections::BTreeSet;

use scopeview_api::{NodeSummary, Topology, TopologyOptions};

use crate::route::{NodeDetailsRef, UrlState};
use crate::state::{TopologyViewMode, ViewState};

/// Topologies (and their sub-topologies) that support the resource view.
const RESOURCE_VIEW_TOPOLOGIES: &[&str] = &["hosts", "containers", "processes"];

/// The current topology together with the id of its parent, if it is a
/// sub-topology.
#[derive(Debug, Clone, Copy)]
pub struct CurrentTopology<'a> {
    pub topology: &'a Topology,
    pub parent_id: Option<&'a str>,
}

impl<'a> CurrentTopology<'a> {
    pub fn id(&self) -> &'a str {
        self.topology.id()
    }
}

/// Find a topology by id anywhere in the (nested) listing.
pub fn find_topology<'a>(topologies: &'a [Topology], id: &str) -> Option<CurrentTopology<'a>> {
    for topology in topologies {
        if topology.id() == id {
            return Some(CurrentTopology {
                topology,
                parent_id: None,
            });
        }
        if let Some(sub) = topology.sub_topologies.iter().find(|s| s.id() == id) {
            return Some(CurrentTopology {
                topology: sub,
                parent_id: Some(topology.id()),
            });
        }
    }
    None
}

pub fn current_topology(state: &ViewState) -> Option<CurrentTopology<'_>> {
    let id = state.current_topology_id.as_deref()?;
    find_topology(&state.topologies, id)
}

pub fn is_graph_view_mode(state: &ViewState) -> bool {
    state.topology_view_mode == TopologyViewMode::Graph
}

pub fn is_table_view_mode(state: &ViewState) -> bool {
    state.topology_view_mode == TopologyViewMode::Table
}

pub fn is_resource_view_mode(state: &ViewState) -> bool {
    state.topology_view_mode == TopologyViewMode::Resource
}

/// Whether the resource view makes sense for the current topology.
pub fn resource_view_available(state: &ViewState) -> bool {
    let Some(id) = state.current_topology_id.as_deref() else {
        return false;
    };
    let root = current_topology(state)
        .and_then(|c| c.parent_id)
        .unwrap_or(id);
    RESOURCE_VIEW_TOPOLOGIES.contains(&root)
}

pub fn showing_details(state: &ViewState) -> bool {
    !state.node_details.is_empty()
}

pub fn showing_terminal(state: &ViewState) -> bool {
    !state.control_pipes.is_empty()
}

pub fn active_topology_options(state: &ViewState) -> TopologyOptions {
    state.topology_options.clone()
}

/// Metric ids reported by any node of the current topology, sorted.
pub fn available_metric_types(state: &ViewState) -> Vec<String> {
    state
        .nodes
        .values()
        .flat_map(|n| n.metrics.iter().map(|m| m.id.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn node_matches(node: &NodeSummary, term: &str) -> bool {
    let term = term.to_lowercase();
    node.label.to_lowercase().contains(&term)
        || node
            .label_minor
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains(&term))
        || node.id.to_lowercase().contains(&term)
}

/// Nodes matching every pinned search and the live query.
pub fn filtered_nodes(state: &ViewState) -> Vec<&NodeSummary> {
    let query = state.search_query.trim();
    state
        .nodes
        .values()
        .filter(|n| state.pinned_searches.iter().all(|p| node_matches(n, p)))
        .filter(|n| query.is_empty() || node_matches(n, query))
        .collect()
}

/// Snapshot of the routable parts of the state.
pub fn url_state(state: &ViewState) -> UrlState {
    UrlState {
        topology_id: state.current_topology_id.clone(),
        topology_view_mode: state.topology_view_mode,
        topology_options: state.topology_options.clone(),
        pinned_metric_type: state.pinned_metric_type.clone(),
        pinned_searches: state.pinned_searches.clone(),
        search_query: state.search_query.clone(),
        selected_node_id: state.selected_node_id.clone(),
        node_details: state
            .node_details
            .values()
            .map(|d| NodeDetailsRef {
                id: d.id.clone(),
                label: d.label.clone(),
                topology_id: d.topology_id.clone(),
            })
            .collect(),
        control_pipe: state.control_pipes.values().last().cloned(),
    }
}
