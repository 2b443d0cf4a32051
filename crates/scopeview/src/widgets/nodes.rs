//! The primary nodes view: graph listing, table, or resource bars,
//! depending on the view mode.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Row, Table},
};

use scopeview_api::NodeSummary;
use scopeview_core::{TopologyViewMode, ViewState, selectors};

use crate::layout::{node_rows, scroll_offset};
use crate::theme;
use crate::widgets::fmt::{fmt_metric, fmt_pct_bar, metric_pct};

const RESOURCE_LABEL_WIDTH: usize = 24;

/// Whether the current view mode draws a header row.
pub fn has_header(mode: TopologyViewMode) -> bool {
    mode == TopologyViewMode::Table
}

/// Index of the highlighted node among the visible ones.
pub fn highlighted_index(state: &ViewState, visible: &[&NodeSummary]) -> Option<usize> {
    let id = state.highlighted_node_id.as_deref()?;
    visible.iter().position(|n| n.id == id)
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let topology = selectors::current_topology(state)
        .map_or("no topology", |c| c.topology.name.as_str());
    let block = Block::default()
        .title(format!(" {topology} · {} ", state.topology_view_mode))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if state.search_focused {
            theme::border_default()
        } else {
            theme::border_focused()
        });
    frame.render_widget(block, area);

    let visible = selectors::filtered_nodes(state);
    let rows = node_rows(area, has_header(state.topology_view_mode));
    if visible.is_empty() {
        frame.render_widget(Paragraph::new(placeholder(state)).style(theme::key_hint()), rows);
        return;
    }

    let selected = highlighted_index(state, &visible);
    let offset = scroll_offset(selected, rows.height);
    match state.topology_view_mode {
        TopologyViewMode::Graph => render_graph(frame, rows, state, &visible, offset, selected),
        TopologyViewMode::Table => render_table(frame, area, state, &visible, offset, selected),
        TopologyViewMode::Resource => {
            render_resource(frame, rows, state, &visible, offset, selected);
        }
    }
}

fn placeholder(state: &ViewState) -> &'static str {
    if state.topologies_loading && !state.topologies_loaded {
        "Loading topologies…"
    } else if state.nodes.is_empty() {
        "Nothing to show. This topology has no nodes."
    } else {
        "No nodes match the current search."
    }
}

fn row_style(state: &ViewState, node: &NodeSummary, highlighted: bool) -> Style {
    if highlighted {
        theme::row_highlighted()
    } else if state.selected_node_id.as_deref() == Some(node.id.as_str()) {
        theme::node_selected()
    } else if node.pseudo {
        theme::node_pseudo()
    } else {
        theme::table_row()
    }
}

fn pinned_value(state: &ViewState, node: &NodeSummary) -> Option<String> {
    let metric = node.metric(state.pinned_metric_type.as_deref()?)?;
    Some(fmt_metric(metric))
}

fn label_of<'a>(state: &'a ViewState, id: &'a str) -> &'a str {
    state
        .nodes
        .get(id)
        .map_or(id, |n| if n.label.is_empty() { id } else { n.label.as_str() })
}

/// One line per node with its outgoing edges.
fn render_graph(
    frame: &mut Frame,
    rows: Rect,
    state: &ViewState,
    visible: &[&NodeSummary],
    offset: usize,
    selected: Option<usize>,
) {
    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(usize::from(rows.height))
        .map(|(i, node)| {
            let style = row_style(state, node, selected == Some(i));
            let marker = if node.pseudo { "○" } else { "●" };
            let mut spans = vec![Span::styled(format!(" {marker} {}", node.label), style)];
            if let Some(minor) = &node.label_minor {
                spans.push(Span::styled(format!("  {minor}"), theme::key_hint()));
            }
            if let Some(value) = pinned_value(state, node) {
                spans.push(Span::styled(format!("  [{value}]"), theme::metric_value()));
            }
            if !node.adjacency.is_empty() {
                let targets: Vec<&str> =
                    node.adjacency.iter().map(|a| label_of(state, a)).collect();
                spans.push(Span::styled(
                    format!("  → {}", targets.join(", ")),
                    theme::key_hint(),
                ));
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows);
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    state: &ViewState,
    visible: &[&NodeSummary],
    offset: usize,
    selected: Option<usize>,
) {
    let inner = node_rows(area, false);
    let metric_header = state.pinned_metric_type.as_deref().unwrap_or("metric");
    let header = Row::new(vec!["Node", "Detail", metric_header, "Edges"]).style(theme::table_header());

    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(usize::from(inner.height.saturating_sub(1)))
        .map(|(i, node)| {
            Row::new(vec![
                node.label.clone(),
                node.label_minor.clone().unwrap_or_default(),
                pinned_value(state, node).unwrap_or_else(|| "-".into()),
                node.adjacency.len().to_string(),
            ])
            .style(row_style(state, node, selected == Some(i)))
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Length(12),
            Constraint::Length(6),
        ],
    )
    .header(header);
    frame.render_widget(table, inner);
}

/// Horizontal bars of the pinned metric, falling back to the first metric
/// the node reports.
fn render_resource(
    frame: &mut Frame,
    rows: Rect,
    state: &ViewState,
    visible: &[&NodeSummary],
    offset: usize,
    selected: Option<usize>,
) {
    let bar_width = rows
        .width
        .saturating_sub(u16::try_from(RESOURCE_LABEL_WIDTH).unwrap_or(u16::MAX) + 14);
    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(offset)
        .take(usize::from(rows.height))
        .map(|(i, node)| {
            let style = row_style(state, node, selected == Some(i));
            let label: String = node.label.chars().take(RESOURCE_LABEL_WIDTH - 1).collect();
            let mut spans = vec![Span::styled(
                format!(" {label:<width$}", width = RESOURCE_LABEL_WIDTH - 1),
                style,
            )];
            let metric = state
                .pinned_metric_type
                .as_deref()
                .and_then(|m| node.metric(m))
                .or_else(|| node.metrics.first());
            match metric {
                Some(metric) => {
                    let (filled, empty) = fmt_pct_bar(metric_pct(metric), bar_width);
                    spans.push(Span::styled(filled, theme::metric_bar()));
                    spans.push(Span::styled(empty, theme::metric_bar_empty()));
                    spans.push(Span::styled(
                        format!(" {:>10}", fmt_metric(metric)),
                        theme::metric_value(),
                    ));
                }
                None => spans.push(Span::styled(" -", theme::key_hint())),
            }
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), rows);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use indexmap::IndexMap;
    use ratatui::{Terminal, backend::TestBackend};

    use scopeview_core::{Action, reduce};

    use super::*;

    fn state_with_nodes(mode: TopologyViewMode) -> ViewState {
        let mut state = ViewState::with_preferred_topology("containers");
        reduce(
            &mut state,
            &Action::ReceiveTopologies(
                serde_json::from_value(serde_json::json!([
                    {"name": "Containers", "url": "/api/topology/containers"}
                ]))
                .unwrap(),
            ),
        );
        let list: Vec<NodeSummary> = serde_json::from_value(serde_json::json!([
            {"id": "a", "label": "nginx", "adjacency": ["b"],
             "metrics": [{"id": "cpu", "format": "percent", "value": 40.0, "max": 100.0}]},
            {"id": "b", "label": "postgres", "pseudo": true}
        ]))
        .unwrap();
        let nodes: IndexMap<String, NodeSummary> =
            list.into_iter().map(|n| (n.id.clone(), n)).collect();
        reduce(
            &mut state,
            &Action::ReceiveNodes {
                topology_id: "containers".into(),
                nodes,
            },
        );
        state.topology_view_mode = mode;
        state
    }

    fn draw(state: &ViewState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal
            .draw(|f| render(f, f.area(), state))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn graph_view_lists_nodes_with_edges() {
        let text = draw(&state_with_nodes(TopologyViewMode::Graph));
        assert!(text.contains("Containers · topo"));
        assert!(text.contains("nginx"));
        assert!(text.contains("→ postgres"));
    }

    #[test]
    fn table_view_shows_pinned_metric_column() {
        let mut state = state_with_nodes(TopologyViewMode::Table);
        state.pinned_metric_type = Some("cpu".into());
        let text = draw(&state);
        assert!(text.contains("Detail"));
        assert!(text.contains("40.0%"));
    }

    #[test]
    fn resource_view_draws_bars() {
        let text = draw(&state_with_nodes(TopologyViewMode::Resource));
        assert!(text.contains('█'));
        assert!(text.contains("40.0%"));
    }

    #[test]
    fn empty_search_result_gets_a_placeholder() {
        let mut state = state_with_nodes(TopologyViewMode::Graph);
        state.search_query = "zzz".into();
        assert!(draw(&state).contains("No nodes match"));
    }
}
