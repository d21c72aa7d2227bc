//! Integration tests for board columns, filters, counts, dashboard stats and
//! drag autoscroll, over a loaded task list.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use chrono::NaiveDate;
use taskboard::api::memory::InMemoryTaskApi;
use taskboard::board::BoardController;
use taskboard::board::filter::{
    BoardFilter, ColumnKey, TaskCounts, ViewMode, column_tasks, columns, drop_targets,
    visible_tasks,
};
use taskboard::board::stats::MonthlyStats;
use taskboard::drag::{AutoScroll, ScrollProfile, Viewport, scrolled};
use taskboard_proto::{Category, Description, Priority, Status, Task, TaskId};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn task(
    id: i64,
    status: Status,
    priority: Priority,
    category: Category,
    due: (i32, u32, u32),
) -> Task {
    Task {
        id: TaskId::new(id),
        title: format!("task {id}"),
        category,
        priority,
        status,
        duedate: NaiveDate::from_ymd_opt(due.0, due.1, due.2).unwrap(),
        description: Description::default(),
    }
}

fn fixture() -> Vec<Task> {
    use Category::{Bugs, Development, Testing};
    use Priority::{High, Low, Medium};
    use Status::{Completed, InProgress, InReview, OnHold};
    vec![
        task(1, InProgress, High, Development, (2024, 1, 5)),
        task(2, InProgress, Low, Bugs, (2024, 1, 20)),
        task(3, InReview, Medium, Testing, (2024, 2, 2)),
        task(4, Completed, High, Bugs, (2024, 2, 28)),
        task(5, Completed, Low, Development, (2023, 2, 14)),
        task(6, OnHold, Medium, Development, (2024, 3, 31)),
        task(7, OnHold, High, Testing, (2024, 12, 1)),
    ]
}

async fn loaded() -> Vec<Task> {
    let mut controller = BoardController::new(InMemoryTaskApi::with_tasks(fixture()));
    controller.load().await.unwrap();
    controller.board().tasks().to_vec()
}

fn ids(tasks: &[&Task]) -> Vec<i64> {
    tasks.iter().map(|t| t.id.get()).collect()
}

// ---------------------------------------------------------------------------
// Columns and filters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn status_view_partitions_every_task() {
    let tasks = loaded().await;
    let filter = BoardFilter::default();

    let per_column: Vec<Vec<i64>> = columns(ViewMode::Status)
        .into_iter()
        .map(|c| ids(&column_tasks(&tasks, &filter, c)))
        .collect();
    assert_eq!(
        per_column,
        vec![vec![1, 2], vec![3], vec![4, 5], vec![6, 7]]
    );
}

#[tokio::test]
async fn priority_view_columns_in_order() {
    let tasks = loaded().await;
    let labels: Vec<&str> = columns(ViewMode::Priority).iter().map(|c| c.label()).collect();
    assert_eq!(labels, vec!["High", "Medium", "Low"]);

    let high = column_tasks(
        &tasks,
        &BoardFilter::default(),
        ColumnKey::Priority(Priority::High),
    );
    assert_eq!(ids(&high), vec![1, 4, 7]);
}

#[tokio::test]
async fn combined_filters_narrow_columns_but_not_counts() {
    let tasks = loaded().await;
    let mut filter = BoardFilter {
        category: Some(Category::Development),
        ..BoardFilter::default()
    };
    filter.set_date_range(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    );

    assert_eq!(ids(&visible_tasks(&tasks, &filter, ViewMode::Status)), vec![1, 6]);

    // Switching to the priority view stops enforcing the priority filter and
    // starts enforcing the status filter.
    filter.priority = Some(Priority::Low);
    filter.status = Some(Status::OnHold);
    assert!(visible_tasks(&tasks, &filter, ViewMode::Status).is_empty());
    assert_eq!(ids(&visible_tasks(&tasks, &filter, ViewMode::Priority)), vec![6]);

    let counts = TaskCounts::from_tasks(&tasks);
    assert_eq!(counts.total, 7);
    assert_eq!(counts.status(Status::OnHold), 2);
    assert_eq!(counts.priority(Priority::High), 3);
    assert_eq!(counts.column(ColumnKey::Status(Status::Completed)), 2);
}

#[test]
fn filter_description_lists_active_filters() {
    let mut filter = BoardFilter::default();
    filter.cycle_category();
    filter.cycle_priority();
    assert_eq!(
        filter.describe(ViewMode::Status),
        "category: Development | priority: High"
    );
    assert_eq!(
        filter.describe(ViewMode::Priority),
        "category: Development | status: All"
    );
}

#[tokio::test]
async fn illegal_targets_are_flagged_for_each_status() {
    let tasks = loaded().await;
    let in_review = tasks.iter().find(|t| t.status == Status::InReview).unwrap();
    let flags: Vec<bool> = drop_targets(in_review, ViewMode::Status)
        .into_iter()
        .map(|(_, ok)| ok)
        .collect();
    // In Progress, In Review (own), Completed, On Hold
    assert_eq!(flags, vec![false, false, true, true]);
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

#[tokio::test]
async fn monthly_stats_merge_years() {
    let tasks = loaded().await;
    let stats = MonthlyStats::from_tasks(&tasks);

    let completed = stats.status_series(Status::Completed);
    // Feb 2024 and Feb 2023 land in the same bucket.
    assert_eq!(completed[1], 2);
    assert_eq!(completed.iter().sum::<usize>(), 2);

    let development = stats.category_series(Category::Development);
    assert_eq!(development[0], 1);
    assert_eq!(development[1], 1);
    assert_eq!(development[2], 1);

    assert_eq!(stats.months[1].total(), 3);
    assert_eq!(stats.peak(), 3);
}

// ---------------------------------------------------------------------------
// Autoscroll
// ---------------------------------------------------------------------------

#[test]
fn autoscroll_accelerates_until_cap_then_resets() {
    let mut scroll = AutoScroll::new(ScrollProfile::PIXELS);
    let mut view = Viewport {
        pointer: 480.0,
        height: 500.0,
        offset: 0.0,
        content_height: 100_000.0,
    };

    let first = scroll.tick(view);
    assert!((first - 30.0).abs() < 1e-9);
    view.offset = scrolled(view, first);

    for _ in 0..1000 {
        let delta = scroll.tick(view);
        view.offset = scrolled(view, delta);
    }
    assert!((scroll.speed() - 60.0).abs() < 1e-9);

    scroll.cancel();
    assert_eq!(scroll.ticks_in_zone(), 0);
    assert!((scroll.speed() - 30.0).abs() < 1e-9);
}

#[test]
fn autoscroll_stops_at_content_end() {
    let mut scroll = AutoScroll::new(ScrollProfile::ROWS);
    let mut view = Viewport {
        pointer: 9.0,
        height: 10.0,
        offset: 0.0,
        content_height: 12.0,
    };
    for _ in 0..50 {
        let delta = scroll.tick(view);
        view.offset = scrolled(view, delta);
    }
    assert!((view.offset - 2.0).abs() < 1e-9);
    assert!(scroll.tick(view).abs() < 1e-9);
}
