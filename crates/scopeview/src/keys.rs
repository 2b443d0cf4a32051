//! Character shortcuts and the analytics event each one reports.

use scopeview_core::Action;

/// Which tracking event a shortcut reports, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracked {
    /// Reported after dispatch, with the metric that ended up pinned.
    PinMetric(&'static str),
    /// Reported before dispatch, with the metric about to be unpinned.
    UnpinMetric(&'static str),
    /// Reported after dispatch; the layout is already in the context.
    Layout(&'static str),
}

pub const PIN_PREVIOUS_EVENT: &str = "scope.metric.selector.pin.previous.keypress";
pub const PIN_NEXT_EVENT: &str = "scope.metric.selector.pin.next.keypress";
pub const UNPIN_EVENT: &str = "scope.metric.selector.unpin.keypress";
pub const LAYOUT_EVENT: &str = "scope.layout.selector.keypress";

#[derive(Debug, Clone, PartialEq)]
pub struct Shortcut {
    pub action: Action,
    pub tracked: Option<Tracked>,
    /// Swallow the key so it is not typed anywhere else.
    pub prevent_default: bool,
}

impl Shortcut {
    fn plain(action: Action) -> Self {
        Self {
            action,
            tracked: None,
            prevent_default: false,
        }
    }

    fn tracked(action: Action, tracked: Tracked) -> Self {
        Self {
            action,
            tracked: Some(tracked),
            prevent_default: false,
        }
    }
}

/// Every character with a global shortcut.
#[cfg(test)]
pub const SHORTCUT_CHARS: [char; 8] = ['<', '>', 'g', 't', 'r', 'q', '/', '?'];

pub fn char_shortcut(c: char) -> Option<Shortcut> {
    let shortcut = match c {
        '<' => Shortcut::tracked(
            Action::PinPreviousMetric,
            Tracked::PinMetric(PIN_PREVIOUS_EVENT),
        ),
        '>' => Shortcut::tracked(Action::PinNextMetric, Tracked::PinMetric(PIN_NEXT_EVENT)),
        'g' => Shortcut::tracked(Action::SetGraphView, Tracked::Layout(LAYOUT_EVENT)),
        't' => Shortcut::tracked(Action::SetTableView, Tracked::Layout(LAYOUT_EVENT)),
        'r' => Shortcut::tracked(Action::SetResourceView, Tracked::Layout(LAYOUT_EVENT)),
        'q' => Shortcut::tracked(Action::UnpinMetric, Tracked::UnpinMetric(UNPIN_EVENT)),
        '/' => Shortcut {
            prevent_default: true,
            ..Shortcut::plain(Action::FocusSearch)
        },
        '?' => Shortcut::plain(Action::ToggleHelp),
        _ => return None,
    };
    Some(shortcut)
}
