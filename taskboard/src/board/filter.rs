//! Board views, filters, columns and counts.
//!
//! Everything here is a pure function of the task list and the current
//! filter; the renderer and the tests share it.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use taskboard_proto::{Category, Priority, Status, Task, can_transition};

/// How the board groups cards into columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// One column per status; moves follow the transition table.
    #[default]
    Status,
    /// One column per priority; any move is allowed.
    Priority,
}

impl ViewMode {
    /// The other view.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Status => Self::Priority,
            Self::Priority => Self::Status,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Priority => "priority",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            other => Err(format!("unknown view {other:?} (expected status or priority)")),
        }
    }
}

/// Column order of the status view.
pub const STATUS_COLUMNS: [Status; 4] = [
    Status::InProgress,
    Status::InReview,
    Status::Completed,
    Status::OnHold,
];

/// Column order of the priority view.
pub const PRIORITY_COLUMNS: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

/// A board column, and the value a card dropped on it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    Status(Status),
    Priority(Priority),
}

impl ColumnKey {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Status(s) => s.label(),
            Self::Priority(p) => p.label(),
        }
    }

    /// The view this column belongs to.
    #[must_use]
    pub const fn view(self) -> ViewMode {
        match self {
            Self::Status(_) => ViewMode::Status,
            Self::Priority(_) => ViewMode::Priority,
        }
    }

    /// True when `task` is listed in this column.
    #[must_use]
    pub fn contains(self, task: &Task) -> bool {
        match self {
            Self::Status(s) => task.status == s,
            Self::Priority(p) => task.priority == p,
        }
    }

    /// The column `task` currently sits in for `view`.
    #[must_use]
    pub const fn of(task: &Task, view: ViewMode) -> Self {
        match view {
            ViewMode::Status => Self::Status(task.status),
            ViewMode::Priority => Self::Priority(task.priority),
        }
    }

    /// True when `task` may be dropped here. Its own column is not a target.
    #[must_use]
    pub fn accepts(self, task: &Task) -> bool {
        match self {
            Self::Status(s) => can_transition(task.status, s),
            Self::Priority(p) => task.priority != p,
        }
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Columns of `view`, in display order.
#[must_use]
pub fn columns(view: ViewMode) -> Vec<ColumnKey> {
    match view {
        ViewMode::Status => STATUS_COLUMNS.map(ColumnKey::Status).to_vec(),
        ViewMode::Priority => PRIORITY_COLUMNS.map(ColumnKey::Priority).to_vec(),
    }
}

/// Every column of `view` paired with whether `task` may be dropped on it.
#[must_use]
pub fn drop_targets(task: &Task, view: ViewMode) -> Vec<(ColumnKey, bool)> {
    columns(view)
        .into_iter()
        .map(|column| (column, column.accepts(task)))
        .collect()
}

/// User-selected filters. `None` means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardFilter {
    pub category: Option<Category>,
    /// Only enforced in the status view.
    pub priority: Option<Priority>,
    /// Only enforced in the priority view.
    pub status: Option<Status>,
    pub due_from: Option<NaiveDate>,
    pub due_to: Option<NaiveDate>,
}

impl BoardFilter {
    /// True when `task` passes every filter relevant to `view`.
    #[must_use]
    pub fn matches(&self, task: &Task, view: ViewMode) -> bool {
        let category = self.category.is_none_or(|c| task.category == c);
        let priority = view != ViewMode::Status || self.priority.is_none_or(|p| task.priority == p);
        let status = view != ViewMode::Priority
            || self.status.is_none_or(|s| task.status.label() == s.label());
        let dates = match (self.due_from, self.due_to) {
            (Some(from), Some(to)) => from <= task.duedate && task.duedate <= to,
            _ => true,
        };
        category && priority && status && dates
    }

    /// Sets an inclusive due-date range. Ends are swapped if reversed.
    pub fn set_date_range(&mut self, from: NaiveDate, to: NaiveDate) {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        self.due_from = Some(from);
        self.due_to = Some(to);
    }

    pub fn clear_date_range(&mut self) {
        self.due_from = None;
        self.due_to = None;
    }

    /// All → Development → Testing → Bugs → All.
    pub fn cycle_category(&mut self) {
        self.category = cycle(self.category, &Category::ALL);
    }

    /// All → High → Medium → Low → All.
    pub fn cycle_priority(&mut self) {
        self.priority = cycle(self.priority, &PRIORITY_COLUMNS);
    }

    /// All → each status in column order → All.
    pub fn cycle_status(&mut self) {
        self.status = cycle(self.status, &STATUS_COLUMNS);
    }

    /// Short description of the active filters for the status bar.
    #[must_use]
    pub fn describe(&self, view: ViewMode) -> String {
        let mut parts = vec![format!(
            "category: {}",
            self.category.map_or("All", Category::label)
        )];
        match view {
            ViewMode::Status => parts.push(format!(
                "priority: {}",
                self.priority.map_or("All", Priority::label)
            )),
            ViewMode::Priority => parts.push(format!(
                "status: {}",
                self.status.map_or("All", Status::label)
            )),
        }
        if let (Some(from), Some(to)) = (self.due_from, self.due_to) {
            parts.push(format!("due: {from}..{to}"));
        }
        parts.join(" | ")
    }
}

fn cycle<T: Copy + PartialEq>(current: Option<T>, all: &[T]) -> Option<T> {
    match current {
        None => all.first().copied(),
        Some(value) => all
            .iter()
            .position(|v| *v == value)
            .and_then(|i| all.get(i + 1))
            .copied(),
    }
}

/// Tasks passing `filter` in `view`, in list order.
#[must_use]
pub fn visible_tasks<'a>(tasks: &'a [Task], filter: &BoardFilter, view: ViewMode) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t, view)).collect()
}

/// Visible tasks of one column.
#[must_use]
pub fn column_tasks<'a>(tasks: &'a [Task], filter: &BoardFilter, column: ColumnKey) -> Vec<&'a Task> {
    let view = column.view();
    tasks
        .iter()
        .filter(|t| column.contains(t) && filter.matches(t, view))
        .collect()
}

/// Totals over the unfiltered list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub total: usize,
    /// Indexed like [`Status::ALL`].
    pub by_status: [usize; 4],
    /// Indexed like [`Priority::ALL`].
    pub by_priority: [usize; 3],
}

impl TaskCounts {
    /// Counts `tasks`.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counts = Self {
            total: tasks.len(),
            ..Self::default()
        };
        for task in tasks {
            if let Some(i) = Status::ALL.iter().position(|s| *s == task.status) {
                counts.by_status[i] += 1;
            }
            if let Some(i) = Priority::ALL.iter().position(|p| *p == task.priority) {
                counts.by_priority[i] += 1;
            }
        }
        counts
    }

    #[must_use]
    pub fn status(&self, status: Status) -> usize {
        Status::ALL
            .iter()
            .position(|s| *s == status)
            .map_or(0, |i| self.by_status[i])
    }

    #[must_use]
    pub fn priority(&self, priority: Priority) -> usize {
        Priority::ALL
            .iter()
            .position(|p| *p == priority)
            .map_or(0, |i| self.by_priority[i])
    }

    /// Count shown in a column header.
    #[must_use]
    pub fn column(&self, column: ColumnKey) -> usize {
        match column {
            ColumnKey::Status(s) => self.status(s),
            ColumnKey::Priority(p) => self.priority(p),
        }
    }
}
