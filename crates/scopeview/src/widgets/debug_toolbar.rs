use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use scopeview_core::ViewState;

use crate::theme;

/// Store internals for whoever is debugging the shell.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, store_version: u64) {
    let viewport = state
        .viewport
        .map_or_else(|| "unmeasured".to_owned(), |v| format!("{}x{}", v.width, v.height));
    let block = Block::default()
        .title(" debug ")
        .title_style(theme::title_style())
        .borders(Borders::TOP)
        .border_style(theme::border_default());

    let line = Line::from(vec![
        Span::styled(format!(" v{store_version} "), theme::metric_value()),
        Span::styled(
            format!(
                "viewport {viewport} · nodes {} · topologies {} · pipes {} · route {}",
                state.nodes.len(),
                state.topologies.len(),
                state.control_pipes.len(),
                if state.route_set { "set" } else { "unset" },
            ),
            theme::status_bar(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).block(block), area);
}
