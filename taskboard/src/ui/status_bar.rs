//! Status bar rendering.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, InputMode};
use crate::prompt;

/// Rows used by the status bar.
pub const HEIGHT: u16 = 2;

/// Render the prompt or latest notification above the filter and key help.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let first = match app.mode {
        InputMode::Create => prompt_line("new", &app.input, prompt::CREATE_HINT),
        InputMode::Edit(id) => prompt_line(&format!("edit #{id}"), &app.input, prompt::EDIT_HINT),
        InputMode::DateRange => prompt_line("due", &app.input, prompt::RANGE_HINT),
        InputMode::ConfirmDelete(id) => Line::from(vec![
            Span::styled(format!("Delete task #{id}? "), theme::bold()),
            Span::styled("y / any key to cancel", theme::dimmed()),
        ]),
        InputMode::Normal => notification_line(app),
    };

    let help = if app.grab.is_some() {
        "←→: target column | ↑↓: pointer | Enter/Space: drop | Esc: cancel"
    } else {
        "Space: grab | </>: quick move | n: new | e: edit | d: delete | v: view | c/p/s: filter | r: dates | R: reload | Tab: dashboard | q: quit"
    };
    let second = Line::from(vec![
        Span::styled(format!("[{}] ", app.view.label()), theme::bold()),
        Span::raw(app.filter.describe(app.view)),
        Span::raw(" | "),
        Span::styled(help, theme::dimmed()),
    ]);

    let paragraph = Paragraph::new(vec![first, second]).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}

fn prompt_line<'a>(label: &str, input: &'a str, hint: &'static str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{label}> "), theme::highlighted()),
        Span::raw(input),
        Span::styled("█", theme::bold()),
        Span::styled(format!("  {hint}"), theme::dimmed()),
    ])
}

fn notification_line(app: &App) -> Line<'_> {
    if let Some(note) = app.board.notifications().latest() {
        return Line::from(Span::styled(
            note.message.as_str(),
            Style::default().fg(theme::level_color(note.level)),
        ));
    }

    let pending = app.board.pending_count();
    let mut spans = vec![match &app.session {
        Some(subject) => Span::styled(format!("● {subject}"), Style::default().fg(theme::SUCCESS)),
        None => Span::styled("○ not connected", theme::dimmed()),
    }];
    if pending > 0 {
        spans.push(Span::styled(format!(" | {pending} pending"), theme::pending()));
    }
    Line::from(spans)
}
