//! Terminal UI rendering.

pub mod board;
pub mod dashboard;
pub mod status_bar;
pub mod theme;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::Tabs,
};

use crate::app::{App, Tab};

/// Rows taken by everything except the card lists: tab bar, status bar
/// and the column borders.
const CHROME_ROWS: u16 = 1 + status_bar::HEIGHT + 2;

/// Cards that fit in one column for a terminal `height` rows tall.
#[must_use]
pub fn column_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS))
}

/// Main draw function for the entire UI.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(status_bar::HEIGHT),
        ])
        .split(frame.area());

    render_tabs(frame, chunks[0], app);
    match app.tab {
        Tab::Board => board::render(frame, chunks[1], app),
        Tab::Dashboard => dashboard::render(frame, chunks[1], app),
    }
    status_bar::render(frame, chunks[2], app);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let selected = match app.tab {
        Tab::Board => 0,
        Tab::Dashboard => 1,
    };
    let titles = vec![
        Line::from(format!(" Board ({}) ", app.view.label())),
        Line::from(" Dashboard "),
    ];
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(theme::dimmed())
        .highlight_style(theme::highlighted());
    frame.render_widget(tabs, area);
}
