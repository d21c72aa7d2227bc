//! Dashboard tab: totals, monthly bars and a per-category table.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph, Row, Table},
};
use taskboard_proto::{Category, Priority, Status};

use super::theme;
use crate::app::App;
use crate::board::filter::TaskCounts;
use crate::board::stats::{MONTHS, MonthlyStats};

/// Render the dashboard over the unfiltered task list.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let tasks = app.board.tasks();
    let counts = TaskCounts::from_tasks(tasks);
    let stats = MonthlyStats::from_tasks(tasks);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(5),
        ])
        .split(area);

    render_counts(frame, rows[0], &counts);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);
    let totals = stats.months.map(|m| m.total());
    render_bars(frame, charts[0], "Due per month", &totals, stats.peak(), theme::HIGHLIGHT);
    let completed = stats.status_series(Status::Completed);
    render_bars(
        frame,
        charts[1],
        "Completed per month",
        &completed,
        stats.peak(),
        theme::COMPLETED,
    );

    render_categories(frame, rows[2], &stats);
}

fn render_counts(frame: &mut Frame, area: Rect, counts: &TaskCounts) {
    let mut spans = vec![Span::styled(format!(" Total {} ", counts.total), theme::bold())];
    for status in Status::ALL {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{} {}", status.label(), counts.status(status)),
            Style::default().fg(theme::status_color(status)),
        ));
    }
    for priority in Priority::ALL {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("{} {}", priority.label(), counts.priority(priority)),
            Style::default().fg(theme::priority_color(priority)),
        ));
    }

    let block = Block::default()
        .title(Span::styled(" Tasks ", theme::panel_title(theme::HIGHLIGHT)))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    series: &[usize; 12],
    peak: usize,
    color: ratatui::style::Color,
) {
    let data: Vec<(&str, u64)> = MONTHS
        .iter()
        .zip(series)
        .map(|(month, n)| (*month, u64::try_from(*n).unwrap_or(u64::MAX)))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title(Span::styled(format!(" {title} "), theme::panel_title(color)))
                .borders(Borders::ALL),
        )
        .data(data.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(color))
        .value_style(theme::selected())
        .label_style(theme::dimmed())
        .max(u64::try_from(peak.max(1)).unwrap_or(u64::MAX));
    frame.render_widget(chart, area);
}

fn render_categories(frame: &mut Frame, area: Rect, stats: &MonthlyStats) {
    let header = Row::new(
        std::iter::once("").chain(MONTHS.iter().copied()),
    )
    .style(theme::dimmed());

    let rows = Category::ALL.map(|category| {
        let series = stats.category_series(category);
        Row::new(
            std::iter::once(category.label().to_string())
                .chain(series.iter().map(ToString::to_string)),
        )
        .style(Style::default().fg(theme::category_color(category)))
    });

    let widths = std::iter::once(Constraint::Length(12))
        .chain(std::iter::repeat_n(Constraint::Length(4), MONTHS.len()));
    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(Span::styled(" By category ", theme::panel_title(theme::HIGHLIGHT)))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}
