//! Calendar core for the Do Bee task planner: due-date normalization,
//! 5-day/week/month windows, per-day task dots, and the JSON-backed state
//! the terminal front end drives.

pub mod agenda;
pub mod calendar;
pub mod commands;
pub mod date_key;
pub mod events;
pub mod format;
pub mod logging;
pub mod models;
pub mod progress;
pub mod range;
pub mod state;
pub mod storage;
pub mod task_list;

pub use agenda::{day_indicators, group_tasks_by_date, DayIndicators, TasksByDate};
pub use calendar::{CalendarPage, CalendarView, Direction, ViewMode};
pub use date_key::{normalize_due_date, to_date_key, DateKey};
pub use models::{Project, Settings, Task};
pub use range::{build_five_day_range, build_month_grid, build_week_range, DayCell};
pub use state::AppState;
