//! Tasks bucketed by due day, and the per-day dot summary the calendar draws.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::date_key::{normalize_due_date, DateKey};
use crate::models::{Project, Task};

/// Dot color for tasks outside any (known) project.
pub const NEUTRAL_COLOR: &str = "#9CA3AF";
pub const MAX_INDICATORS: usize = 3;

pub type TasksByDate<'a> = BTreeMap<DateKey, Vec<&'a Task>>;

/// Buckets tasks by their normalized due date. Each bucket keeps the source
/// order; tasks without a usable due date land in no bucket.
pub fn group_tasks_by_date(tasks: &[Task], current_year: i32) -> TasksByDate<'_> {
    let mut buckets = TasksByDate::new();
    for task in tasks {
        match normalize_due_date(task.due_date.as_deref(), current_year) {
            Some(key) => buckets.entry(key).or_default().push(task),
            None => {
                if let Some(raw) = task.due_date.as_deref().filter(|raw| !raw.trim().is_empty()) {
                    log::debug!("task {} has unparseable due date {:?}; unscheduled", task.id, raw);
                }
            }
        }
    }
    buckets
}

pub fn tasks_on<'a, 'm>(buckets: &'m TasksByDate<'a>, key: &DateKey) -> &'m [&'a Task] {
    buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
}

pub fn task_color<'a>(task: &Task, projects: &'a [Project]) -> &'a str {
    task.project_id
        .as_deref()
        .and_then(|project_id| projects.iter().find(|project| project.id == project_id))
        .map(|project| project.color.as_str())
        .unwrap_or(NEUTRAL_COLOR)
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct IndicatorDot {
    pub task_id: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DayIndicators {
    pub dots: Vec<IndicatorDot>,
    pub overflow: usize,
}

impl DayIndicators {
    /// `+N` when more tasks are due than dots are drawn.
    pub fn overflow_label(&self) -> Option<String> {
        (self.overflow > 0).then(|| format!("+{}", self.overflow))
    }
}

pub fn day_indicators(bucket: &[&Task], projects: &[Project]) -> DayIndicators {
    DayIndicators {
        dots: bucket
            .iter()
            .take(MAX_INDICATORS)
            .map(|task| IndicatorDot {
                task_id: task.id.clone(),
                color: task_color(task, projects).to_string(),
            })
            .collect(),
        overflow: bucket.len().saturating_sub(MAX_INDICATORS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;

    fn make_task(id: &str, due_date: Option<&str>, project_id: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task-{id}"),
            description: None,
            completed: false,
            created_at: 1,
            completed_at: None,
            due_date: due_date.map(str::to_string),
            due_time: None,
            priority: TaskPriority::Low,
            category: None,
            project_id: project_id.map(str::to_string),
            attachments: Vec::new(),
        }
    }

    fn key(raw: &str) -> DateKey {
        raw.parse().expect("canonical key")
    }

    #[test]
    fn unscheduled_tasks_land_in_no_bucket() {
        let tasks = vec![
            make_task("a", Some("12/01/2025"), None),
            make_task("b", None, None),
            make_task("c", Some("13/40"), None),
            make_task("d", Some(""), None),
        ];
        let buckets = group_tasks_by_date(&tasks, 2025);

        let ids: Vec<_> = tasks_on(&buckets, &key("2025-12-01"))
            .iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a"]);
        assert_eq!(buckets.len(), 1);
        assert!(buckets
            .values()
            .flatten()
            .all(|task| task.id != "b" && task.id != "c"));
    }

    #[test]
    fn buckets_keep_source_order_across_formats() {
        let tasks = vec![
            make_task("a", Some("12/01/2025"), None),
            make_task("x", Some("12/02/2025"), None),
            make_task("b", Some("2025-12-01"), None),
            make_task("c", Some("12-1-25"), None),
        ];
        let buckets = group_tasks_by_date(&tasks, 2025);
        let ids: Vec<_> = tasks_on(&buckets, &key("2025-12-01"))
            .iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn buckets_borrow_the_source_tasks() {
        let tasks = vec![make_task("a", Some("12/01/2025"), None)];
        let buckets = group_tasks_by_date(&tasks, 2025);
        let bucket = tasks_on(&buckets, &key("2025-12-01"));
        assert!(std::ptr::eq(bucket[0], &tasks[0]));
    }

    #[test]
    fn missing_key_yields_empty_slice() {
        let tasks: Vec<Task> = Vec::new();
        let buckets = group_tasks_by_date(&tasks, 2025);
        assert!(tasks_on(&buckets, &key("2025-12-01")).is_empty());
    }

    #[test]
    fn day_indicators_cap_at_three_with_overflow() {
        let projects = crate::models::Project::defaults(0);
        let tasks: Vec<Task> = (0..5)
            .map(|index| {
                let project = if index == 0 { Some("school") } else { None };
                make_task(&index.to_string(), Some("12/01/2025"), project)
            })
            .collect();
        let buckets = group_tasks_by_date(&tasks, 2025);
        let indicators = day_indicators(tasks_on(&buckets, &key("2025-12-01")), &projects);

        let ids: Vec<_> = indicators.dots.iter().map(|dot| dot.task_id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
        assert_eq!(indicators.dots[0].color, "#60A5FA");
        assert_eq!(indicators.dots[1].color, NEUTRAL_COLOR);
        assert_eq!(indicators.overflow, 2);
        assert_eq!(indicators.overflow_label().as_deref(), Some("+2"));
    }

    #[test]
    fn small_days_have_no_overflow() {
        let tasks = vec![make_task("a", Some("12/01/2025"), Some("gone"))];
        let refs: Vec<&Task> = tasks.iter().collect();
        let indicators = day_indicators(&refs, &[]);
        assert_eq!(indicators.dots.len(), 1);
        assert_eq!(indicators.dots[0].color, NEUTRAL_COLOR);
        assert_eq!(indicators.overflow, 0);
        assert_eq!(indicators.overflow_label(), None);
    }
}
