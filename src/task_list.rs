use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_key::{normalize_due_date, DateKey};
use crate::models::Task;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Newest first.
    #[default]
    Added,
    /// Earliest due day first; unscheduled tasks last.
    Due,
    Alpha,
    /// High, medium, low.
    Priority,
    /// Alphabetical; uncategorised tasks last.
    Category,
}

/// Stable sort over borrowed tasks; ties keep the source order.
pub fn sort_tasks<'a>(tasks: &'a [Task], sort_by: SortBy, current_year: i32) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    match sort_by {
        SortBy::Added => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortBy::Due => {
            let key = |task: &Task| normalize_due_date(task.due_date.as_deref(), current_year);
            sorted.sort_by(|a, b| compare_missing_last(key(*a), key(*b)));
        }
        SortBy::Alpha => sorted.sort_by_cached_key(|task| task.title.to_lowercase()),
        SortBy::Priority => sorted.sort_by(|a, b| b.priority.rank().cmp(&a.priority.rank())),
        SortBy::Category => sorted.sort_by(|a, b| {
            compare_missing_last(
                a.category.as_deref().map(str::to_lowercase),
                b.category.as_deref().map(str::to_lowercase),
            )
        }),
    }
    sorted
}

fn compare_missing_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn due_on<'a>(tasks: &'a [Task], day: NaiveDate, current_year: i32) -> Vec<&'a Task> {
    let key = DateKey::from(day);
    tasks
        .iter()
        .filter(|task| normalize_due_date(task.due_date.as_deref(), current_year) == Some(key))
        .collect()
}

pub fn in_project<'a>(tasks: &'a [Task], project_id: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.project_id.as_deref() == Some(project_id))
        .collect()
}
