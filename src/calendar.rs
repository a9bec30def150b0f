//! Calendar view controller: which window of days is visible, which day is
//! selected, and how prev/next/today move them.

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::agenda::{day_indicators, group_tasks_by_date, tasks_on, DayIndicators};
use crate::date_key::DateKey;
use crate::format::{full_date_label, month_year_label};
use crate::models::{Project, Task};
use crate::range::{
    add_days, add_months, build_five_day_range, build_month_grid, build_week_range, DayCell,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "5day")]
    FiveDay,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::FiveDay, ViewMode::Week, ViewMode::Month];

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::FiveDay => "5 days",
            ViewMode::Week => "Week",
            ViewMode::Month => "Month",
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "5day" | "5days" | "five_day" => Ok(ViewMode::FiveDay),
            "week" => Ok(ViewMode::Week),
            "month" => Ok(ViewMode::Month),
            other => Err(format!("unknown view mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Prev,
    Next,
}

impl Direction {
    fn sign(self) -> i32 {
        match self {
            Direction::Prev => -1,
            Direction::Next => 1,
        }
    }
}

/// Visible window for a mode. The 5-day strip starts at `selected` and
/// ignores `reference`; week and month views follow `reference`.
pub fn build_range(mode: ViewMode, reference: NaiveDate, selected: NaiveDate) -> Vec<DayCell> {
    match mode {
        ViewMode::FiveDay => build_five_day_range(selected),
        ViewMode::Week => build_week_range(reference),
        ViewMode::Month => build_month_grid(reference),
    }
}

/// One navigation step. Returns the new `(reference, selected)` pair.
///
/// In 5-day mode both dates move together, since the strip is drawn from
/// `selected`. Dates saturate at the ends of the supported range.
pub fn step(
    mode: ViewMode,
    direction: Direction,
    reference: NaiveDate,
    selected: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let sign = direction.sign();
    match mode {
        ViewMode::FiveDay => {
            let delta = i64::from(sign) * 5;
            (add_days(reference, delta), add_days(selected, delta))
        }
        ViewMode::Week => (add_days(reference, i64::from(sign) * 7), selected),
        ViewMode::Month => (add_months(reference, sign), selected),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct CalendarView {
    mode: ViewMode,
    reference: NaiveDate,
    selected: NaiveDate,
    today: NaiveDate,
}

impl CalendarView {
    pub fn new(mode: ViewMode, today: NaiveDate) -> Self {
        Self {
            mode,
            reference: today,
            selected: today,
            today,
        }
    }

    /// A view anchored on the local clock's today.
    pub fn starting_today(mode: ViewMode) -> Self {
        Self::new(mode, Local::now().date_naive())
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Switching modes keeps the selected day.
    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    pub fn step(&mut self, direction: Direction) {
        let (reference, selected) = step(self.mode, direction, self.reference, self.selected);
        self.reference = reference;
        self.selected = selected;
    }

    /// Moves both the window and the selection to `date`.
    pub fn jump_to(&mut self, date: NaiveDate) {
        self.reference = date;
        self.selected = date;
    }

    pub fn go_today(&mut self) {
        self.reference = self.today;
        self.selected = self.today;
    }

    pub fn visible_range(&self) -> Vec<DayCell> {
        build_range(self.mode, self.reference, self.selected)
    }

    pub fn header_label(&self) -> String {
        month_year_label(self.reference)
    }

    /// Everything a renderer needs for the current window. Tasks are
    /// regrouped on every call.
    pub fn page<'a>(
        &self,
        tasks: &'a [Task],
        projects: &[Project],
        current_year: i32,
    ) -> CalendarPage<'a> {
        let buckets = group_tasks_by_date(tasks, current_year);
        let days = self
            .visible_range()
            .into_iter()
            .map(|cell| {
                let key = DateKey::from(cell.date);
                CalendarDay {
                    cell,
                    key,
                    is_selected: cell.date == self.selected,
                    is_today: cell.date == self.today,
                    indicators: day_indicators(tasks_on(&buckets, &key), projects),
                }
            })
            .collect();
        let selected_tasks = tasks_on(&buckets, &DateKey::from(self.selected)).to_vec();

        CalendarPage {
            mode: self.mode,
            header: self.header_label(),
            days,
            selected_label: full_date_label(self.selected),
            selected_tasks,
        }
    }

    /// [`CalendarView::page`] resolving short due dates against today's year.
    pub fn page_for_today<'a>(&self, tasks: &'a [Task], projects: &[Project]) -> CalendarPage<'a> {
        self.page(tasks, projects, self.today.year())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarDay {
    pub cell: DayCell,
    pub key: DateKey,
    pub is_selected: bool,
    pub is_today: bool,
    pub indicators: DayIndicators,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CalendarPage<'a> {
    pub mode: ViewMode,
    pub header: String,
    pub days: Vec<CalendarDay>,
    pub selected_label: String,
    pub selected_tasks: Vec<&'a Task>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPriority;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    fn make_task(id: &str, due_date: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task-{id}"),
            description: None,
            completed: false,
            created_at: 1,
            completed_at: None,
            due_date: Some(due_date.to_string()),
            due_time: None,
            priority: TaskPriority::Low,
            category: None,
            project_id: None,
            attachments: Vec::new(),
        }
    }

    #[test]
    fn view_mode_serde_and_parse() {
        assert_eq!(serde_json::to_value(ViewMode::FiveDay).unwrap(), serde_json::json!("5day"));
        assert_eq!("month".parse::<ViewMode>().unwrap(), ViewMode::Month);
        assert_eq!("5day".parse::<ViewMode>().unwrap(), ViewMode::FiveDay);
        assert!("year".parse::<ViewMode>().is_err());
        assert_eq!(ViewMode::FiveDay.label(), "5 days");
    }

    #[test]
    fn five_day_navigation_moves_reference_and_selection() {
        let mut view = CalendarView::new(ViewMode::FiveDay, ymd(2025, 11, 15));
        view.step(Direction::Next);
        assert_eq!(view.reference(), ymd(2025, 11, 20));
        assert_eq!(view.selected(), ymd(2025, 11, 20));
        assert_eq!(view.visible_range()[0].date, ymd(2025, 11, 20));

        view.step(Direction::Prev);
        view.step(Direction::Prev);
        assert_eq!(view.reference(), ymd(2025, 11, 10));
        assert_eq!(view.selected(), ymd(2025, 11, 10));
    }

    #[test]
    fn five_day_strip_follows_the_selected_day() {
        let mut view = CalendarView::new(ViewMode::FiveDay, ymd(2025, 11, 15));
        view.select(ymd(2025, 11, 17));
        let range = view.visible_range();
        assert_eq!(range.len(), 5);
        assert_eq!(range[0].date, ymd(2025, 11, 17));
    }

    #[test]
    fn week_navigation_moves_reference_only() {
        let mut view = CalendarView::new(ViewMode::Week, ymd(2025, 11, 15));
        view.step(Direction::Next);
        assert_eq!(view.reference(), ymd(2025, 11, 22));
        assert_eq!(view.selected(), ymd(2025, 11, 15));
        assert_eq!(view.visible_range()[0].date, ymd(2025, 11, 16));
    }

    #[test]
    fn month_navigation_keeps_rollover_quirk() {
        let mut view = CalendarView::new(ViewMode::Month, ymd(2025, 1, 31));
        view.step(Direction::Next);
        assert_eq!(view.reference(), ymd(2025, 3, 3));
        assert_eq!(view.header_label(), "March 2025");
        assert_eq!(view.selected(), ymd(2025, 1, 31));
    }

    #[test]
    fn switching_modes_keeps_selection_and_today_resets() {
        let mut view = CalendarView::new(ViewMode::Week, ymd(2025, 11, 15));
        view.select(ymd(2025, 11, 18));
        view.set_mode(ViewMode::Month);
        assert_eq!(view.selected(), ymd(2025, 11, 18));

        view.step(Direction::Next);
        view.step(Direction::Next);
        view.go_today();
        assert_eq!(view.reference(), ymd(2025, 11, 15));
        assert_eq!(view.selected(), ymd(2025, 11, 15));
    }

    #[test]
    fn jump_to_moves_window_and_selection() {
        let mut view = CalendarView::new(ViewMode::Month, ymd(2025, 11, 15));
        view.jump_to(ymd(2026, 2, 3));
        assert_eq!(view.header_label(), "February 2026");
        assert_eq!(view.selected(), ymd(2026, 2, 3));
        assert_eq!(view.today(), ymd(2025, 11, 15));
    }

    #[test]
    fn stepping_past_the_date_limits_saturates() {
        let mut view = CalendarView::new(ViewMode::FiveDay, NaiveDate::MAX);
        view.step(Direction::Next);
        assert_eq!(view.selected(), NaiveDate::MAX);
        assert_eq!(view.visible_range().len(), 5);

        let mut view = CalendarView::new(ViewMode::Month, NaiveDate::MIN);
        view.step(Direction::Prev);
        assert_eq!(view.reference(), NaiveDate::MIN);
        assert_eq!(view.visible_range().len(), 42);
    }

    #[test]
    fn free_step_function_matches_view() {
        let start = ymd(2025, 11, 15);
        assert_eq!(
            step(ViewMode::Month, Direction::Prev, start, start),
            (ymd(2025, 10, 15), start)
        );
        assert_eq!(
            step(ViewMode::FiveDay, Direction::Prev, start, start),
            (ymd(2025, 11, 10), ymd(2025, 11, 10))
        );
    }

    #[test]
    fn month_page_end_to_end() {
        let tasks = vec![
            make_task("a", "11/15/2025"),
            make_task("b", "11/15"),
            make_task("c", "2025-11-15"),
            make_task("d", "11/15/25"),
            make_task("e", "not a date"),
            make_task("f", "12/06/2025"),
        ];
        let view = CalendarView::new(ViewMode::Month, ymd(2025, 11, 15));
        let page = view.page(&tasks, &[], 2025);

        assert_eq!(page.header, "November 2025");
        assert_eq!(page.days.len(), 42);
        assert_eq!(page.days[0].cell.date, ymd(2025, 10, 26));
        assert!(!page.days[0].cell.is_current_month);
        assert_eq!(page.days[41].cell.date, ymd(2025, 12, 6));
        assert_eq!(page.days[41].indicators.dots.len(), 1);

        let selected = &page.days[20];
        assert_eq!(selected.key.to_string(), "2025-11-15");
        assert!(selected.is_selected);
        assert!(selected.is_today);
        assert!(selected.cell.is_current_month);
        assert_eq!(selected.indicators.dots.len(), 3);
        assert_eq!(selected.indicators.overflow, 1);

        assert_eq!(page.selected_label, "Sat, Nov 15, 2025");
        let ids: Vec<_> = page.selected_tasks.iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }
}
