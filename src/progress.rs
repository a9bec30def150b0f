use chrono::{Datelike, Local, NaiveDate, TimeZone};
use serde::Serialize;

use crate::models::{Project, Task, Timestamp};
use crate::range::add_days;

/// Days covered by the weekly bar chart, ending today.
pub const WEEK_BAR_DAYS: i64 = 7;

fn local_day<Tz: TimeZone>(timestamp: Timestamp, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.date_naive())
}

/// Completed tasks whose completion time falls on `day` in `tz`.
pub fn completed_on<Tz: TimeZone>(tasks: &[Task], day: NaiveDate, tz: &Tz) -> usize {
    tasks
        .iter()
        .filter(|task| task.completed)
        .filter(|task| {
            task.completed_at
                .and_then(|at| local_day(at, tz))
                .is_some_and(|done_day| done_day == day)
        })
        .count()
}

pub fn completed_today(tasks: &[Task]) -> usize {
    completed_on(tasks, Local::now().date_naive(), &Local)
}

/// Today's completions measured against the daily goal, one honeycomb cell
/// per goal unit.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Nectar {
    pub completed: usize,
    pub goal: u32,
}

impl Nectar {
    pub fn new(completed: usize, goal: u32) -> Self {
        Self { completed, goal }
    }

    pub fn filled_cells(&self) -> usize {
        self.completed.min(self.goal as usize)
    }

    /// One flag per cell, filled cells first.
    pub fn cells(&self) -> Vec<bool> {
        (0..self.goal as usize)
            .map(|index| index < self.filled_cells())
            .collect()
    }

    pub fn goal_reached(&self) -> bool {
        self.completed >= self.goal as usize
    }

    pub fn percent(&self) -> u32 {
        if self.goal == 0 {
            return 100;
        }
        let percent = (self.completed as f64 / f64::from(self.goal) * 100.0).round() as u32;
        percent.min(100)
    }
}

/// Completions in the given calendar month of `tz`.
pub fn completed_in_month<Tz: TimeZone>(tasks: &[Task], year: i32, month: u32, tz: &Tz) -> usize {
    tasks
        .iter()
        .filter(|task| task.completed)
        .filter_map(|task| task.completed_at.and_then(|at| local_day(at, tz)))
        .filter(|day| day.year() == year && day.month() == month)
        .count()
}

pub fn completed_total(tasks: &[Task]) -> usize {
    tasks.iter().filter(|task| task.completed).count()
}

/// Whole jars of honey: one per `goal` completions.
pub fn honey_jars(completed: usize, goal: u32) -> usize {
    completed / (goal.max(1) as usize)
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct DayBar {
    pub date: NaiveDate,
    pub completed: usize,
    /// Percent of the daily goal, capped at 100. Zero when there is no goal.
    pub height: u32,
}

/// One bar per day for the week ending on `today`, oldest first.
pub fn weekly_bars<Tz: TimeZone>(
    tasks: &[Task],
    today: NaiveDate,
    goal: u32,
    tz: &Tz,
) -> Vec<DayBar> {
    (0..WEEK_BAR_DAYS)
        .rev()
        .map(|back| {
            let date = add_days(today, -back);
            let completed = completed_on(tasks, date, tz);
            let height = if goal == 0 {
                0
            } else {
                let percent = (completed as f64 / f64::from(goal) * 100.0).round() as u32;
                percent.min(100)
            };
            DayBar {
                date,
                completed,
                height,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct HoneyStats {
    pub today: Nectar,
    pub month: usize,
    pub all_time: usize,
    pub month_jars: usize,
    pub all_time_jars: usize,
    pub week: Vec<DayBar>,
}

pub fn honey_stats<Tz: TimeZone>(
    tasks: &[Task],
    today: NaiveDate,
    goal: u32,
    tz: &Tz,
) -> HoneyStats {
    let month = completed_in_month(tasks, today.year(), today.month(), tz);
    let all_time = completed_total(tasks);
    HoneyStats {
        today: Nectar::new(completed_on(tasks, today, tz), goal),
        month,
        all_time,
        month_jars: honey_jars(month, goal),
        all_time_jars: honey_jars(all_time, goal),
        week: weekly_bars(tasks, today, goal, tz),
    }
}

/// Share of completed tasks, rounded to a whole percent.
pub fn completion_percent(tasks: &[Task]) -> u32 {
    if tasks.is_empty() {
        return 0;
    }
    let completed = tasks.iter().filter(|task| task.completed).count();
    (completed as f64 / tasks.len() as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ProjectSummary {
    pub project_id: String,
    pub total: usize,
    pub completed: usize,
}

pub fn project_summaries(tasks: &[Task], projects: &[Project]) -> Vec<ProjectSummary> {
    projects
        .iter()
        .map(|project| {
            let in_project = tasks
                .iter()
                .filter(|task| task.project_id.as_deref() == Some(project.id.as_str()));
            let (total, completed) = in_project.fold((0, 0), |(total, completed), task| {
                (total + 1, completed + usize::from(task.completed))
            });
            ProjectSummary {
                project_id: project.id.clone(),
                total,
                completed,
            }
        })
        .collect()
}
