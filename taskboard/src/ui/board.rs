//! Kanban columns.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use taskboard_proto::Task;

use super::theme;
use crate::app::App;
use crate::board::filter::{self, ColumnKey, TaskCounts};

/// Render every column of the active view.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let columns = app.columns();
    let count = u32::try_from(columns.len()).unwrap_or(1).max(1);
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(columns.iter().map(|_| Constraint::Ratio(1, count)))
        .split(area);

    let counts = TaskCounts::from_tasks(app.board.tasks());
    // Legal targets of the held card, from the shared transition table.
    let targets = app
        .grabbed_task()
        .map(|task| filter::drop_targets(task, app.view));

    for (index, (column, column_area)) in columns.iter().zip(areas.iter()).enumerate() {
        let accepts = targets
            .as_ref()
            .and_then(|t| t.iter().find(|(key, _)| key == column))
            .map(|(_, ok)| *ok);
        render_column(frame, *column_area, app, index, *column, &counts, accepts);
    }
}

fn render_column(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    index: usize,
    column: ColumnKey,
    counts: &TaskCounts,
    accepts: Option<bool>,
) {
    let cards = app.column_cards(index);
    let hovered = app.grab.as_ref().is_some_and(|g| g.column == index);
    let focused = app.grab.is_none() && app.selected_column == index;

    let color = match column {
        ColumnKey::Status(s) => theme::status_color(s),
        ColumnKey::Priority(p) => theme::priority_color(p),
    };
    let (title_style, border_style) = match accepts {
        // Own column or a transition the table forbids.
        Some(false) if !hovered => (theme::disabled(), theme::disabled()),
        Some(false) => (theme::disabled(), Style::default().fg(theme::ERROR)),
        _ if hovered || focused => (theme::panel_title(color), theme::highlighted()),
        _ => (theme::panel_title(color), theme::normal()),
    };

    let title = Line::from(vec![
        Span::styled(format!(" {} ", column.label()), title_style),
        Span::styled(
            format!("{}/{} ", cards.len(), counts.column(column)),
            theme::dimmed(),
        ),
    ]);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    let offset = app.column_offset(index);
    let grabbed = app.grab.as_ref().map(|g| g.id);
    let items: Vec<ListItem> = cards
        .iter()
        .enumerate()
        .skip(offset)
        .take(app.column_rows.max(1))
        .map(|(row, task)| {
            let style = if grabbed == Some(task.id) {
                theme::grabbed()
            } else if focused && row == app.selected_row {
                theme::selected()
            } else if app.board.is_pending(task.id) {
                theme::pending()
            } else {
                theme::normal()
            };
            ListItem::new(card_line(task, column)).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// `#id title  badge  due`, where the badge is whichever of status and
/// priority the column does not already show.
fn card_line(task: &Task, column: ColumnKey) -> Line<'_> {
    let badge = match column {
        ColumnKey::Status(_) => Span::styled(
            task.priority.label(),
            Style::default().fg(theme::priority_color(task.priority)),
        ),
        ColumnKey::Priority(_) => Span::styled(
            task.status.label(),
            Style::default().fg(theme::status_color(task.status)),
        ),
    };
    Line::from(vec![
        Span::styled(format!("#{} ", task.id), theme::dimmed()),
        Span::raw(task.title.as_str()),
        Span::raw(" "),
        badge,
        Span::styled(format!(" {}", task.duedate), theme::dimmed()),
    ])
}
