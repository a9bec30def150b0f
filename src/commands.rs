use std::path::PathBuf;

use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;

use crate::calendar::{CalendarDay, CalendarView, ViewMode};
use crate::events::StatePayload;
use crate::models::{NewTask, Project, ProjectUpdate, Settings, Task, TaskUpdate};
use crate::progress::{completed_today, honey_stats, HoneyStats, Nectar};
use crate::state::AppState;
use crate::storage::{Storage, StorageError};
use crate::task_list::{due_on, in_project, sort_tasks, SortBy};

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// What a front end supplies to the commands: where data lives and how
/// state changes are announced.
pub trait CommandCtx {
    fn data_dir(&self) -> Result<PathBuf, StorageError>;
    fn emit_state_updated(&self, payload: StatePayload);
}

fn ok<T>(data: T) -> CommandResult<T> {
    CommandResult {
        ok: true,
        data: Some(data),
        error: None,
    }
}

fn err<T>(message: &str) -> CommandResult<T> {
    CommandResult {
        ok: false,
        data: None,
        error: Some(message.to_string()),
    }
}

fn payload(state: &AppState) -> StatePayload {
    StatePayload {
        tasks: state.tasks(),
        projects: state.projects(),
        settings: state.settings(),
    }
}

fn persist(ctx: &impl CommandCtx, state: &AppState) -> Result<(), StorageError> {
    let storage = Storage::new(ctx.data_dir()?);
    storage.ensure_dirs()?;
    storage.save_data(&state.data_file())?;
    storage.save_settings(&state.settings_file())?;
    ctx.emit_state_updated(payload(state));
    Ok(())
}

fn persist_or_err<T>(ctx: &impl CommandCtx, state: &AppState, data: T) -> CommandResult<T> {
    match persist(ctx, state) {
        Ok(()) => ok(data),
        Err(error) => {
            log::error!("persist failed: {error}");
            err(&format!("storage error: {error}"))
        }
    }
}

/// Loads data and settings into `state`. A fresh data directory starts with
/// the default projects; unreadable data is reported rather than replaced.
pub fn load_state(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<StatePayload> {
    let root = match ctx.data_dir() {
        Ok(path) => path,
        Err(e) => return err(&format!("data_dir error: {e}")),
    };
    let storage = Storage::new(root);
    if let Err(error) = storage.ensure_dirs() {
        return err(&format!("storage error: {error}"));
    }

    let (tasks, projects) = match storage.load_data() {
        Ok(data) => (data.tasks, data.projects),
        Err(error) if error.is_not_found() => {
            log::info!("no data file in {}; starting fresh", storage.root().display());
            (Vec::new(), Project::defaults(Utc::now().timestamp()))
        }
        Err(error) => {
            log::error!("failed to load data: {error}");
            return err(&format!("storage error: {error}"));
        }
    };
    let settings = match storage.load_settings() {
        Ok(data) => {
            if data.settings.validate().is_err() {
                log::warn!("settings out of range, clamping: {:?}", data.settings);
            }
            data.settings.clamped()
        }
        Err(error) => {
            if !error.is_not_found() {
                log::warn!("failed to load settings, using defaults: {error}");
            }
            Settings::default()
        }
    };

    state.replace_tasks(tasks);
    state.replace_projects(projects);
    state.update_settings(settings);
    log::debug!(
        "state loaded tasks={} projects={}",
        state.tasks().len(),
        state.projects().len()
    );
    ok(payload(state))
}

pub fn create_task(ctx: &impl CommandCtx, state: &AppState, input: NewTask) -> CommandResult<Task> {
    let Some(task) = state.add_task(input) else {
        return err("task.title must not be empty");
    };
    if let Err(message) = task.validate() {
        state.remove_task(&task.id);
        return err(&message);
    }
    log::info!("task created id={}", task.id);
    persist_or_err(ctx, state, task)
}

pub fn toggle_task(ctx: &impl CommandCtx, state: &AppState, task_id: &str) -> CommandResult<Task> {
    let Some(task) = state.toggle_task(task_id) else {
        return err("task not found");
    };
    persist_or_err(ctx, state, task)
}

/// Validates the edited task before committing it.
pub fn update_task(
    ctx: &impl CommandCtx,
    state: &AppState,
    task_id: &str,
    update: TaskUpdate,
) -> CommandResult<Task> {
    let Some(mut preview) = state.task(task_id) else {
        return err("task not found");
    };
    update.clone().apply(&mut preview);
    if let Err(message) = preview.validate() {
        return err(&message);
    }
    let Some(task) = state.update_task(task_id, update) else {
        return err("task not found");
    };
    persist_or_err(ctx, state, task)
}

pub fn delete_task(ctx: &impl CommandCtx, state: &AppState, task_id: &str) -> CommandResult<bool> {
    if !state.remove_task(task_id) {
        return err("task not found");
    }
    persist_or_err(ctx, state, true)
}

pub fn clear_completed(ctx: &impl CommandCtx, state: &AppState) -> CommandResult<usize> {
    let removed = state.clear_completed();
    log::info!("cleared {removed} completed tasks");
    persist_or_err(ctx, state, removed)
}

pub fn create_project(
    ctx: &impl CommandCtx,
    state: &AppState,
    name: &str,
    color: &str,
    icon: &str,
) -> CommandResult<Project> {
    let Some(project) = state.create_project(name, color, icon) else {
        return err("project.name must not be empty");
    };
    if let Err(message) = project.validate() {
        state.delete_project(&project.id);
        return err(&message);
    }
    persist_or_err(ctx, state, project)
}

pub fn update_project(
    ctx: &impl CommandCtx,
    state: &AppState,
    project_id: &str,
    update: ProjectUpdate,
) -> CommandResult<Project> {
    let Some(before) = state.projects().into_iter().find(|p| p.id == project_id) else {
        return err("project not found");
    };
    let Some(project) = state.update_project(project_id, update) else {
        return err("project not found");
    };
    if let Err(message) = project.validate() {
        state.update_project(
            project_id,
            ProjectUpdate {
                name: Some(before.name),
                color: Some(before.color),
                icon: Some(before.icon),
            },
        );
        return err(&message);
    }
    persist_or_err(ctx, state, project)
}

/// Deletes the project; its tasks stay and become unassigned. Returns the
/// number of detached tasks.
pub fn delete_project(
    ctx: &impl CommandCtx,
    state: &AppState,
    project_id: &str,
) -> CommandResult<usize> {
    let Some(detached) = state.delete_project(project_id) else {
        return err("project not found");
    };
    log::info!("project deleted id={project_id} detached_tasks={detached}");
    persist_or_err(ctx, state, detached)
}

pub fn set_daily_goal(ctx: &impl CommandCtx, state: &AppState, goal: u32) -> CommandResult<Settings> {
    let mut settings = state.settings();
    settings.daily_goal = goal;
    update_settings(ctx, state, settings)
}

pub fn update_settings(
    ctx: &impl CommandCtx,
    state: &AppState,
    settings: Settings,
) -> CommandResult<Settings> {
    if let Err(message) = settings.validate() {
        return err(&message);
    }
    state.update_settings(settings.clone());
    persist_or_err(ctx, state, settings)
}

/// Owned snapshot of one calendar window plus today's nectar.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarSnapshot {
    pub mode: ViewMode,
    pub header: String,
    pub days: Vec<CalendarDay>,
    pub selected_label: String,
    pub selected_tasks: Vec<Task>,
    pub nectar: Nectar,
}

/// Read-only; nothing is persisted.
pub fn calendar_page(state: &AppState, view: &CalendarView) -> CommandResult<CalendarSnapshot> {
    let tasks = state.tasks();
    let projects = state.projects();
    let page = view.page_for_today(&tasks, &projects);
    let nectar = Nectar::new(completed_today(&tasks), state.settings().daily_goal);
    ok(CalendarSnapshot {
        mode: page.mode,
        header: page.header,
        days: page.days,
        selected_label: page.selected_label,
        selected_tasks: page.selected_tasks.into_iter().cloned().collect(),
        nectar,
    })
}

/// Narrows a task listing. Empty fields keep everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub due_on: Option<NaiveDate>,
    pub project_id: Option<String>,
}

/// Filtered, sorted copy of the task list. Read-only.
pub fn list_tasks(
    state: &AppState,
    sort_by: SortBy,
    filter: &TaskFilter,
    current_year: i32,
) -> CommandResult<Vec<Task>> {
    let mut tasks = state.tasks();
    if let Some(day) = filter.due_on {
        tasks = due_on(&tasks, day, current_year).into_iter().cloned().collect();
    }
    if let Some(project_id) = filter.project_id.as_deref() {
        tasks = in_project(&tasks, project_id).into_iter().cloned().collect();
    }
    ok(sort_tasks(&tasks, sort_by, current_year)
        .into_iter()
        .cloned()
        .collect())
}

/// Today's nectar, month and all-time totals, jars and the weekly chart.
/// Read-only.
pub fn stats(state: &AppState) -> CommandResult<HoneyStats> {
    let tasks = state.tasks();
    let today = Local::now().date_naive();
    ok(honey_stats(&tasks, today, state.settings().daily_goal, &Local))
}
