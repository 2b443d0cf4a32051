//! Palette and semantic styles for the terminal UI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SCOPE_BLUE: Color = Color::Rgb(0, 210, 255); // #00d2ff
pub const WEAVE_ORANGE: Color = Color::Rgb(255, 120, 60); // #ff783c
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const AMBER: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(SCOPE_BLUE).add_modifier(Modifier::BOLD)
}

/// Border for the panel that owns the cursor.
pub fn border_focused() -> Style {
    Style::default().fg(WEAVE_ORANGE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(SCOPE_BLUE)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Row under the cursor.
pub fn row_highlighted() -> Style {
    Style::default()
        .fg(WEAVE_ORANGE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Pseudo nodes (the internet, uncontained processes) are drawn muted.
pub fn node_pseudo() -> Style {
    Style::default()
        .fg(BORDER_GRAY)
        .add_modifier(Modifier::ITALIC)
}

pub fn node_selected() -> Style {
    Style::default().fg(CORAL).add_modifier(Modifier::BOLD)
}

pub fn metric_value() -> Style {
    Style::default().fg(AMBER)
}

pub fn metric_bar() -> Style {
    Style::default().fg(SUCCESS_GREEN)
}

pub fn metric_bar_empty() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn error() -> Style {
    Style::default().fg(ERROR_RED)
}

pub fn status_bar() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "? help  / search").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(SCOPE_BLUE).add_modifier(Modifier::BOLD)
}

pub fn overlay_background() -> Style {
    Style::default().bg(BG_DARK)
}
