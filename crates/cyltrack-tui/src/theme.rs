//! Palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Core Palette ──────────────────────────────────────────────────────

pub const SKY: Color = Color::Rgb(56, 189, 248); // #38bdf8
pub const TEAL: Color = Color::Rgb(45, 212, 191); // #2dd4bf
pub const AMBER: Color = Color::Rgb(251, 191, 36); // #fbbf24
pub const SUCCESS_GREEN: Color = Color::Rgb(74, 222, 128); // #4ade80
pub const ERROR_RED: Color = Color::Rgb(248, 113, 113); // #f87171

// ── Extended Palette ──────────────────────────────────────────────────

pub const TEXT: Color = Color::Rgb(226, 232, 240); // #e2e8f0
pub const MUTED: Color = Color::Rgb(148, 163, 184); // #94a3b8
pub const BORDER_GRAY: Color = Color::Rgb(71, 85, 105); // #475569
pub const BG_HIGHLIGHT: Color = Color::Rgb(51, 65, 85); // #334155
pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0f172a

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(SKY)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Type section heading.
pub fn section_header() -> Style {
    Style::default().fg(TEAL).add_modifier(Modifier::BOLD)
}

/// Normal cylinder row text.
pub fn row() -> Style {
    Style::default().fg(TEXT)
}

/// Selected cylinder or section row.
pub fn row_selected() -> Style {
    Style::default()
        .fg(SKY)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Secondary detail text (tare, net, placeholders).
pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

/// The `LOW` stock badge.
pub fn low_badge() -> Style {
    Style::default()
        .fg(BG_DARK)
        .bg(AMBER)
        .add_modifier(Modifier::BOLD)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(MUTED)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::BOLD)
}

/// Hyperlink-ish text such as the QR image URL.
pub fn link() -> Style {
    Style::default().fg(SKY).add_modifier(Modifier::UNDERLINED)
}
