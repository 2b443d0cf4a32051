//! Node details panel.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};

use scopeview_core::NodeDetailsEntry;

use crate::theme;
use crate::widgets::fmt::fmt_metric;

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {title}"),
        Style::default().fg(theme::SCOPE_BLUE),
    ))
}

pub fn render(frame: &mut Frame, area: Rect, entry: &NodeDetailsEntry) {
    let title = if entry.label.is_empty() {
        entry.id.as_str()
    } else {
        entry.label.as_str()
    };
    let block = Block::default()
        .title(format!(" {title} "))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());

    let mut lines = vec![Line::from(Span::styled(
        format!(" {} · {}", entry.topology_id, entry.id),
        theme::key_hint(),
    ))];

    match &entry.details {
        None => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                " Loading details…",
                theme::key_hint(),
            )));
        }
        Some(details) => {
            if let Some(minor) = &details.label_minor {
                lines.push(Line::from(Span::styled(format!(" {minor}"), theme::status_bar())));
            }
            if !details.metrics.is_empty() {
                lines.push(Line::from(""));
                lines.push(section("Metrics"));
                for metric in &details.metrics {
                    let name = if metric.label.is_empty() { &metric.id } else { &metric.label };
                    lines.push(Line::from(vec![
                        Span::styled(format!("  {name:<18}"), theme::table_row()),
                        Span::styled(fmt_metric(metric), theme::metric_value()),
                    ]));
                }
            }
            if !details.metadata.is_empty() {
                lines.push(Line::from(""));
                lines.push(section("Info"));
                for row in &details.metadata {
                    lines.push(Line::from(vec![
                        Span::styled(format!("  {:<18}", row.label), theme::key_hint()),
                        Span::styled(row.value.clone(), theme::table_row()),
                    ]));
                }
            }
            if !details.controls.is_empty() {
                lines.push(Line::from(""));
                lines.push(section("Controls"));
                for control in &details.controls {
                    lines.push(Line::from(Span::styled(
                        format!("  ▸ {}", control.human),
                        theme::table_row(),
                    )));
                }
            }
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;

    fn draw(entry: &NodeDetailsEntry) -> String {
        let mut terminal = Terminal::new(TestBackend::new(50, 16)).unwrap();
        terminal.draw(|f| render(f, f.area(), entry)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    #[test]
    fn pending_details_show_a_placeholder() {
        let entry = NodeDetailsEntry {
            id: "c1".into(),
            label: String::new(),
            topology_id: "containers".into(),
            details: None,
        };
        let text = draw(&entry);
        assert!(text.contains(" c1 "));
        assert!(text.contains("Loading details"));
    }

    #[test]
    fn loaded_details_list_metadata_and_controls() {
        let entry = NodeDetailsEntry {
            id: "c1".into(),
            label: "nginx".into(),
            topology_id: "containers".into(),
            details: Some(
                serde_json::from_value(serde_json::json!({
                    "id": "c1",
                    "metadata": [{"id": "image", "label": "Image", "value": "nginx:1.27"}],
                    "controls": [{"id": "docker_restart", "human": "Restart"}]
                }))
                .unwrap(),
            ),
        };
        let text = draw(&entry);
        assert!(text.contains("nginx:1.27"));
        assert!(text.contains("▸ Restart"));
    }
}
