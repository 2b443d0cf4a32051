//! Floating overlay with the highlighted node's live metrics.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use scopeview_core::{MonitorData, MonitorMetrics};

use crate::theme;
use crate::widgets::fmt::fmt_optional;

const WIDTH: u16 = 26;
const HEIGHT: u16 = 4;

/// Where the overlay goes: just above the anchor, kept inside `bounds`.
pub fn overlay_area(monitor: &MonitorData, bounds: Rect) -> Rect {
    let width = WIDTH.min(bounds.width);
    let height = HEIGHT.min(bounds.height);
    let max_x = bounds.right().saturating_sub(width);
    let max_y = bounds.bottom().saturating_sub(height);
    let x = monitor
        .left
        .saturating_add(2)
        .clamp(bounds.x, max_x.max(bounds.x));
    let y = monitor
        .top
        .saturating_sub(height)
        .clamp(bounds.y, max_y.max(bounds.y));
    Rect::new(x, y, width, height)
}

/// Fields without a value render as `-`.
pub fn render(frame: &mut Frame, bounds: Rect, monitor: &MonitorData) {
    let metrics = monitor.data.unwrap_or_default();
    let area = overlay_area(monitor, bounds);
    let MonitorMetrics {
        throughput_rate,
        response_time,
    } = metrics;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(theme::overlay_background());
    let lines = vec![
        Line::from(vec![
            Span::styled(" Throughput ", theme::key_hint()),
            Span::styled(fmt_optional(throughput_rate, " req/s"), theme::metric_value()),
        ]),
        Line::from(vec![
            Span::styled(" Latency    ", theme::key_hint()),
            Span::styled(fmt_optional(response_time, " ms"), theme::metric_value()),
        ]),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
