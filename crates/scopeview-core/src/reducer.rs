//! The reducer: the only code allowed to mutate [`ViewState`].

use tracing::debug;

use crate::action::Action;
use crate::route::UrlState;
use crate::selectors::{self, available_metric_types, find_topology, resource_view_available};
use crate::state::{MonitorData, MonitorMetrics, NodeDetailsEntry, TopologyViewMode, ViewState};

/// Apply one action to the state.
pub fn reduce(state: &mut ViewState, action: &Action) {
    match action {
        Action::Render | Action::Quit => {}

        Action::SetViewportDimensions { width, height } => {
            state.viewport = Some(crate::state::ViewportDimensions {
                width: *width,
                height: *height,
            });
        }

        Action::Shutdown => {
            state.control_pipes.clear();
            state.monitor_data = None;
            state.highlighted_node_id = None;
            state.search_focused = false;
            state.topologies_loading = false;
            state.shutdown = true;
        }

        Action::HitEsc => hit_esc(state),

        // Backspace edits the live query; once it is empty, it eats pinned
        // searches from the end.
        Action::HitBackspace => {
            if state.search_focused && state.search_query.pop().is_none() {
                if let Some(query) = state.pinned_searches.pop() {
                    debug!(%query, "unpinned search");
                }
            }
        }

        Action::PinNextMetric => cycle_metric(state, true),
        Action::PinPreviousMetric => cycle_metric(state, false),
        Action::UnpinMetric => state.pinned_metric_type = None,

        Action::SetGraphView => state.topology_view_mode = TopologyViewMode::Graph,
        Action::SetTableView => state.topology_view_mode = TopologyViewMode::Table,
        Action::SetResourceView => {
            if resource_view_available(state) {
                state.topology_view_mode = TopologyViewMode::Resource;
            }
        }

        Action::ToggleHelp => state.showing_help = !state.showing_help,

        Action::FocusSearch => state.search_focused = true,
        Action::DoSearch(query) => state.search_query.clone_from(query),
        Action::PinSearch => {
            let query = state.search_query.trim().to_owned();
            if !query.is_empty() && !state.pinned_searches.contains(&query) {
                state.pinned_searches.push(query);
            }
            state.search_query.clear();
        }

        Action::ChangeTopology(id) => change_topology(state, id),
        Action::TopologiesRequested => state.topologies_loading = true,
        Action::ReceiveTopologies(topologies) => {
            state.topologies.clone_from(topologies);
            state.topologies_loaded = true;
            state.topologies_loading = false;
            state.last_error = None;
            resolve_current_topology(state);
        }
        Action::ReceiveNodes { topology_id, nodes } => {
            if state.current_topology_id.as_deref() != Some(topology_id.as_str()) {
                debug!(%topology_id, "dropping nodes for a topology no longer shown");
                return;
            }
            state.nodes.clone_from(nodes);
            refresh_highlight(state);
        }
        Action::ReceiveError(message) => {
            state.last_error = Some(message.clone());
            state.topologies_loading = false;
        }

        Action::HighlightNode { id, left, top } => {
            let data = state.nodes.get(id).and_then(MonitorMetrics::from_node);
            state.highlighted_node_id = Some(id.clone());
            state.monitor_data = data.map(|d| MonitorData {
                left: *left,
                top: *top,
                data: Some(d),
            });
        }
        Action::ClickNode {
            id,
            label,
            topology_id,
        } => {
            if state.selected_node_id.as_deref() == Some(id.as_str()) {
                deselect(state);
            } else {
                state.selected_node_id = Some(id.clone());
                state.node_details.clear();
                state.node_details.insert(
                    id.clone(),
                    NodeDetailsEntry {
                        id: id.clone(),
                        label: label.clone(),
                        topology_id: topology_id.clone(),
                        details: None,
                    },
                );
            }
        }
        Action::ReceiveNodeDetails(details) => {
            if let Some(entry) = state.node_details.get_mut(&details.id) {
                if entry.label.is_empty() {
                    entry.label.clone_from(&details.label);
                }
                entry.details = Some((**details).clone());
            }
        }

        Action::Route(url_state) => apply_route(state, url_state),
    }
}

/// Escape unwinds one layer of UI: terminal, then search, then help,
/// then the details panel.
fn hit_esc(state: &mut ViewState) {
    if let Some(id) = state.control_pipes.keys().last().cloned() {
        state.control_pipes.shift_remove(&id);
    } else if state.search_focused {
        if state.search_query.is_empty() {
            state.search_focused = false;
        } else {
            state.search_query.clear();
        }
    } else if state.showing_help {
        state.showing_help = false;
    } else if selectors::showing_details(state) {
        deselect(state);
    }
}

fn deselect(state: &mut ViewState) {
    state.selected_node_id = None;
    state.node_details.clear();
}

/// Move the pinned metric one step through the available metric types,
/// wrapping at both ends. With nothing pinned, forward starts at the first
/// type and backward at the last.
fn cycle_metric(state: &mut ViewState, forward: bool) {
    let types = available_metric_types(state);
    if types.is_empty() {
        return;
    }
    let len = types.len();
    let current = state
        .pinned_metric_type
        .as_ref()
        .and_then(|p| types.iter().position(|t| t == p));
    let next = match (current, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    state.pinned_metric_type = types.into_iter().nth(next);
}

fn change_topology(state: &mut ViewState, id: &str) {
    if state.current_topology_id.as_deref() == Some(id) {
        return;
    }
    state.current_topology_id = Some(id.to_owned());
    state.nodes.clear();
    state.highlighted_node_id = None;
    state.monitor_data = None;
    state.topology_options = find_topology(&state.topologies, id)
        .map(|c| c.topology.default_options())
        .unwrap_or_default();
    if state.topology_view_mode == TopologyViewMode::Resource && !resource_view_available(state) {
        state.topology_view_mode = TopologyViewMode::Graph;
    }
}

/// Make sure the current topology names something in the listing. Falls
/// back to the preferred topology, then the first one listed.
fn resolve_current_topology(state: &mut ViewState) {
    let known = state
        .current_topology_id
        .as_deref()
        .is_some_and(|id| find_topology(&state.topologies, id).is_some());
    if known {
        if state.topology_options.is_empty() {
            state.topology_options = selectors::current_topology(state)
                .map(|c| c.topology.default_options())
                .unwrap_or_default();
        }
        return;
    }

    let fallback = state
        .preferred_topology_id
        .as_deref()
        .filter(|id| find_topology(&state.topologies, id).is_some())
        .map(str::to_owned)
        .or_else(|| state.topologies.first().map(|t| t.id().to_owned()));

    if let Some(id) = fallback {
        state.current_topology_id = None;
        change_topology(state, &id);
    }
}

/// Keep the highlight and overlay in step with fresh node data.
fn refresh_highlight(state: &mut ViewState) {
    let Some(id) = state.highlighted_node_id.clone() else {
        return;
    };
    match state.nodes.get(&id) {
        Some(node) => {
            let data = MonitorMetrics::from_node(node);
            state.monitor_data = match (state.monitor_data, data) {
                (Some(prev), Some(d)) => Some(MonitorData {
                    data: Some(d),
                    ..prev
                }),
                _ => None,
            };
        }
        None => {
            state.highlighted_node_id = None;
            state.monitor_data = None;
        }
    }
}

fn apply_route(state: &mut ViewState, url: &UrlState) {
    if let Some(id) = &url.topology_id {
        state.current_topology_id = Some(id.clone());
        state.nodes.clear();
    }
    state.topology_view_mode = url.topology_view_mode;
    state.topology_options.clone_from(&url.topology_options);
    state.pinned_metric_type.clone_from(&url.pinned_metric_type);
    state.pinned_searches.clone_from(&url.pinned_searches);
    state.search_query.clone_from(&url.search_query);
    state.selected_node_id.clone_from(&url.selected_node_id);
    state.node_details = url
        .node_details
        .iter()
        .map(|d| {
            (
                d.id.clone(),
                NodeDetailsEntry {
                    id: d.id.clone(),
                    label: d.label.clone(),
                    topology_id: d.topology_id.clone(),
                    details: None,
                },
            )
        })
        .collect();
    state.control_pipes = url
        .control_pipe
        .iter()
        .map(|p| (p.id.clone(), p.clone()))
        .collect();
    state.route_set = true;
}
