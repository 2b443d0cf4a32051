//! Keyboard shortcut overlay.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::theme;

const SHORTCUTS: &[(&str, &str)] = &[
    ("/", "Search nodes"),
    ("?", "Toggle this help"),
    ("Esc", "Close terminal, search, help, details"),
    ("<  >", "Pin previous / next metric"),
    ("q", "Unpin metric"),
    ("g t r", "Graph / table / resource view"),
    ("↑ ↓", "Move the cursor"),
    ("Enter", "Show details (pin search while searching)"),
    ("Tab", "Next topology"),
    ("Ctrl+d", "Debug toolbar"),
    ("Ctrl+c", "Quit"),
];

fn key_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<8}"), theme::key_hint_key()),
        Span::styled(description.to_owned(), theme::key_hint()),
    ])
}

pub fn render(frame: &mut Frame, area: Rect) {
    let help_width = 56u16.min(area.width.saturating_sub(4));
    let help_height = u16::try_from(SHORTCUTS.len() + 5)
        .unwrap_or(u16::MAX)
        .min(area.height.saturating_sub(2));

    let x = area.width.saturating_sub(help_width) / 2;
    let y = area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(theme::overlay_background());

    let mut lines = vec![Line::from("")];
    lines.extend(SHORTCUTS.iter().map(|(k, d)| key_line(k, d)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "                   Esc or ? to close",
        Style::default().fg(theme::BORDER_GRAY),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), help_area);
}
