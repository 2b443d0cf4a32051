//! Panel for an attached control pipe. The pipe itself is not driven
//! from here; the panel only reports which pipe is open.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use scopeview_core::ControlPipe;

use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, pipe: &ControlPipe) {
    let block = Block::default()
        .title(format!(" Terminal · {} ", pipe.node_id))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(theme::overlay_background());

    let mode = if pipe.raw_tty { "raw tty" } else { "line mode" };
    let lines = vec![
        Line::from(Span::styled(format!(" pipe {} ({mode})", pipe.id), theme::status_bar())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Esc ", theme::key_hint_key()),
            Span::styled("close the terminal", theme::key_hint()),
        ]),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
