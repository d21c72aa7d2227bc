//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};
use taskboard_proto::{Category, Priority, Status};

use crate::board::notify::Level;

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Foreground for columns a held card cannot enter.
pub const FG_DISABLED: Color = Color::DarkGray;

/// Highlight color for focused elements.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Success notification color.
pub const SUCCESS: Color = Color::Green;

/// Info notification color.
pub const INFO: Color = Color::Blue;

/// Error notification color.
pub const ERROR: Color = Color::Red;

/// Status column colors.
pub const IN_PROGRESS: Color = Color::Rgb(0x9d, 0x9b, 0xfe);
pub const IN_REVIEW: Color = Color::Rgb(0xec, 0xa7, 0xfe);
pub const ON_HOLD: Color = Color::Rgb(0xf6, 0xbc, 0x54);
pub const COMPLETED: Color = Color::Rgb(0x5d, 0xd6, 0x6a);

#[must_use]
pub const fn status_color(status: Status) -> Color {
    match status {
        Status::InProgress => IN_PROGRESS,
        Status::InReview => IN_REVIEW,
        Status::OnHold => ON_HOLD,
        Status::Completed => COMPLETED,
    }
}

#[must_use]
pub const fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::LightRed,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Gray,
    }
}

#[must_use]
pub const fn category_color(category: Category) -> Color {
    match category {
        Category::Development => Color::LightBlue,
        Category::Testing => Color::LightMagenta,
        Category::Bugs => Color::LightRed,
    }
}

#[must_use]
pub const fn level_color(level: Level) -> Color {
    match level {
        Level::Success => SUCCESS,
        Level::Info => INFO,
        Level::Error => ERROR,
    }
}

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (ids, dates, help).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Illegal drop target.
#[must_use]
pub fn disabled() -> Style {
    Style::default()
        .fg(FG_DISABLED)
        .add_modifier(Modifier::DIM)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (focused column borders, active tab).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Selected item style (in lists).
#[must_use]
pub fn selected() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// The card being dragged.
#[must_use]
pub fn grabbed() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

/// Cards whose change awaits the server.
#[must_use]
pub fn pending() -> Style {
    Style::default()
        .fg(FG_SECONDARY)
        .add_modifier(Modifier::ITALIC)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for panel titles with a given color (bold).
#[must_use]
pub fn panel_title(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
