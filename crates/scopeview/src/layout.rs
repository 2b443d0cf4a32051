//! Screen regions of the shell.
//!
//! The same layout drives rendering and the shell's cursor bookkeeping, so
//! the monitor overlay lands next to the row that is actually highlighted.

use ratatui::layout::{Constraint, Layout, Rect};

use scopeview_core::{ViewState, selectors};

pub const DEBUG_TOOLBAR_HEIGHT: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    pub status: Rect,
    pub search: Rect,
    pub nodes: Rect,
    pub details: Option<Rect>,
    pub terminal: Option<Rect>,
    pub debug: Option<Rect>,
}

impl ShellLayout {
    pub fn new(area: Rect, state: &ViewState, debug_toolbar: bool) -> Self {
        let [status, search, body, debug] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(if debug_toolbar { DEBUG_TOOLBAR_HEIGHT } else { 0 }),
        ])
        .areas(area);

        let (body, terminal) = if selectors::showing_terminal(state) {
            let [top, bottom] =
                Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                    .areas(body);
            (top, Some(bottom))
        } else {
            (body, None)
        };

        let (nodes, details) = if selectors::showing_details(state) {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .areas(body);
            (left, Some(right))
        } else {
            (body, None)
        };

        Self {
            status,
            search,
            nodes,
            details,
            terminal,
            debug: debug_toolbar.then_some(debug),
        }
    }
}

/// Rows of the nodes panel that hold nodes, after the border and header.
pub fn node_rows(nodes: Rect, header: bool) -> Rect {
    let inner = Rect {
        x: nodes.x.saturating_add(1),
        y: nodes.y.saturating_add(1),
        width: nodes.width.saturating_sub(2),
        height: nodes.height.saturating_sub(2),
    };
    if header {
        Rect {
            y: inner.y.saturating_add(1),
            height: inner.height.saturating_sub(1),
            ..inner
        }
    } else {
        inner
    }
}

/// First visible node index so that `selected` stays on screen.
pub fn scroll_offset(selected: Option<usize>, visible: u16) -> usize {
    let visible = usize::from(visible.max(1));
    selected.map_or(0, |i| i.saturating_sub(visible - 1))
}

/// Screen cell of node `index` in the nodes panel.
pub fn row_anchor(rows: Rect, index: usize) -> (u16, u16) {
    let offset = scroll_offset(Some(index), rows.height);
    let line = u16::try_from(index - offset).unwrap_or(u16::MAX);
    (rows.x.saturating_add(2), rows.y.saturating_add(line))
}
