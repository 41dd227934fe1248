//! Shared UI theme constants.

use ratatui::style::Color;

use crate::alerts::Severity;

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);

// Traffic series
pub const SENT: Color = Color::Blue;
pub const RECEIVED: Color = Color::Green;

pub const HEADER_FG: Color = Color::Cyan;

// Palette cycled across alert types in the distribution chart
pub const BAR_PALETTE: [Color; 6] = [
    Color::Red,
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Blue,
    Color::Green,
];

pub fn severity_color(s: &Severity) -> Color {
    match s {
        Severity::Critical => Color::Red,
        Severity::High => Color::LightRed,
        Severity::Medium | Severity::Warning => Color::Yellow,
        Severity::Low => Color::Green,
        Severity::Info => Color::Blue,
        Severity::Other(_) => Color::Gray,
    }
}
