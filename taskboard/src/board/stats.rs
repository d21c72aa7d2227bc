//! Monthly chart series for the dashboard.
//!
//! Tasks are bucketed by the calendar month of their due date; the year is
//! ignored, so a March 2023 and a March 2024 task land in the same bar.

use chrono::Datelike;
use taskboard_proto::{Category, Status, Task};

/// Month labels in chart order.
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Counts for one month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonthCounts {
    /// Indexed like [`Status::ALL`].
    pub by_status: [usize; 4],
    /// Indexed like [`Category::ALL`].
    pub by_category: [usize; 3],
}

impl MonthCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.by_status.iter().sum()
    }
}

/// Twelve months of counts, January first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlyStats {
    pub months: [MonthCounts; 12],
}

impl MonthlyStats {
    /// Buckets `tasks` by due month.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut stats = Self::default();
        for task in tasks {
            let month = task.duedate.month0() as usize;
            let counts = &mut stats.months[month];
            if let Some(i) = Status::ALL.iter().position(|s| *s == task.status) {
                counts.by_status[i] += 1;
            }
            if let Some(i) = Category::ALL.iter().position(|c| *c == task.category) {
                counts.by_category[i] += 1;
            }
        }
        stats
    }

    /// One status series, January to December.
    #[must_use]
    pub fn status_series(&self, status: Status) -> [usize; 12] {
        let i = Status::ALL.iter().position(|s| *s == status).unwrap_or(0);
        self.months.map(|m| m.by_status[i])
    }

    /// One category series, January to December.
    #[must_use]
    pub fn category_series(&self, category: Category) -> [usize; 12] {
        let i = Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or(0);
        self.months.map(|m| m.by_category[i])
    }

    /// Largest monthly total, for scaling bars.
    #[must_use]
    pub fn peak(&self) -> usize {
        self.months.iter().map(MonthCounts::total).max().unwrap_or(0)
    }
}
