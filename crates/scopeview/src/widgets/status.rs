//! Top status line (topologies, location, errors) and the search bar.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use scopeview_core::{ViewState, selectors};

use crate::theme;

pub fn render_status(frame: &mut Frame, area: Rect, state: &ViewState, location: &str) {
    let current = selectors::current_topology(state);
    let current_root = current.map(|c| c.parent_id.unwrap_or(c.id()));

    let mut spans = vec![Span::raw(" ")];
    for topology in &state.topologies {
        let style = if current_root == Some(topology.id()) {
            theme::node_selected()
        } else {
            theme::status_bar()
        };
        spans.push(Span::styled(format!("{} ", topology.name), style));
    }
    if let Some(sub) = current.filter(|c| c.parent_id.is_some()) {
        spans.push(Span::styled(format!("› {} ", sub.topology.name), theme::node_selected()));
    }

    if state.topologies_loading && !state.topologies_loaded {
        spans.push(Span::styled("◐ loading ", Style::default().fg(theme::AMBER)));
    }
    if let Some(error) = &state.last_error {
        spans.push(Span::styled(format!("✗ {error} "), theme::error()));
    }
    spans.push(Span::styled(format!("│ {location}"), theme::key_hint()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn render_search(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(" / ", theme::key_hint_key())];
    for pinned in &state.pinned_searches {
        spans.push(Span::styled(
            format!("[{pinned}]"),
            Style::default().fg(theme::BG_DARK).bg(theme::SCOPE_BLUE),
        ));
        spans.push(Span::raw(" "));
    }

    if state.search_focused {
        spans.push(Span::styled(state.search_query.clone(), theme::table_row()));
        spans.push(Span::styled("▏", Style::default().fg(theme::WEAVE_ORANGE)));
    } else if state.search_query.is_empty() && state.pinned_searches.is_empty() {
        spans.push(Span::styled("search", theme::key_hint()));
    } else {
        spans.push(Span::styled(state.search_query.clone(), theme::key_hint()));
    }

    if let Some(metric) = &state.pinned_metric_type {
        spans.push(Span::styled(format!("   metric: {metric}"), theme::metric_value()));
    }
    spans.push(Span::raw("  "));
    for (name, active) in [
        ("graph", selectors::is_graph_view_mode(state)),
        ("table", selectors::is_table_view_mode(state)),
        ("resource", selectors::is_resource_view_mode(state)),
    ] {
        let style = if active { theme::key_hint_key() } else { theme::key_hint() };
        spans.push(Span::styled(format!(" {name}"), style));
    }
    spans.push(Span::styled("   ? help", theme::key_hint()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
