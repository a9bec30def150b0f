use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::models::{
    DataFile, NewTask, Project, ProjectUpdate, Settings, SettingsFile, Task, TaskUpdate,
    SCHEMA_VERSION,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(tasks: Vec<Task>, projects: Vec<Project>, settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppData {
                tasks,
                projects,
                settings,
            })),
        }
    }

    pub fn data_file(&self) -> DataFile {
        let guard = self.inner.lock().expect("state poisoned");
        DataFile {
            schema_version: SCHEMA_VERSION,
            tasks: guard.tasks.clone(),
            projects: guard.projects.clone(),
        }
    }

    pub fn settings_file(&self) -> SettingsFile {
        let guard = self.inner.lock().expect("state poisoned");
        SettingsFile {
            schema_version: SCHEMA_VERSION,
            settings: guard.settings.clone(),
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.clone()
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.tasks.iter().find(|t| t.id == task_id).cloned()
    }

    /// Newest tasks go first. Blank titles are rejected.
    pub fn add_task(&self, input: NewTask) -> Option<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return None;
        }
        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            description: input
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            completed: false,
            created_at: Utc::now().timestamp(),
            completed_at: None,
            due_date: non_blank(input.due_date),
            due_time: non_blank(input.due_time),
            priority: input.priority,
            category: non_blank(input.category),
            project_id: non_blank(input.project_id),
            attachments: input.attachments,
        };
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks.insert(0, task.clone());
        Some(task)
    }

    pub fn replace_tasks(&self, tasks: Vec<Task>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.tasks = tasks;
    }

    pub fn update_task(&self, task_id: &str, update: TaskUpdate) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == task_id)?;
        update.apply(task);
        Some(task.clone())
    }

    /// Flips completion, stamping or clearing `completed_at`.
    pub fn toggle_task(&self, task_id: &str) -> Option<Task> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let task = guard.tasks.iter_mut().find(|t| t.id == task_id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then(|| Utc::now().timestamp());
        Some(task.clone())
    }

    pub fn remove_task(&self, task_id: &str) -> bool {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.tasks.len();
        guard.tasks.retain(|task| task.id != task_id);
        guard.tasks.len() != before
    }

    /// Returns how many tasks were dropped.
    pub fn clear_completed(&self) -> usize {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.tasks.len();
        guard.tasks.retain(|task| !task.completed);
        before - guard.tasks.len()
    }

    pub fn projects(&self) -> Vec<Project> {
        let guard = self.inner.lock().expect("state poisoned");
        guard.projects.clone()
    }

    pub fn replace_projects(&self, projects: Vec<Project>) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.projects = projects;
    }

    pub fn create_project(&self, name: &str, color: &str, icon: &str) -> Option<Project> {
        let name = collapse_whitespace(name);
        if name.is_empty() {
            return None;
        }
        let project = Project {
            id: project_id_for(&name),
            name,
            color: color.trim().to_string(),
            icon: icon.to_string(),
            created_at: Utc::now().timestamp(),
        };
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.projects.push(project.clone());
        Some(project)
    }

    pub fn update_project(&self, project_id: &str, update: ProjectUpdate) -> Option<Project> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let project = guard.projects.iter_mut().find(|p| p.id == project_id)?;
        if let Some(name) = update
            .name
            .map(|n| collapse_whitespace(&n))
            .filter(|n| !n.is_empty())
        {
            project.name = name;
        }
        if let Some(color) = update.color {
            project.color = color.trim().to_string();
        }
        if let Some(icon) = update.icon {
            project.icon = icon;
        }
        Some(project.clone())
    }

    /// Removes the project and detaches its tasks. Returns how many tasks
    /// were detached, or `None` when the project does not exist.
    pub fn delete_project(&self, project_id: &str) -> Option<usize> {
        let mut guard = self.inner.lock().expect("state poisoned");
        let before = guard.projects.len();
        guard.projects.retain(|project| project.id != project_id);
        if guard.projects.len() == before {
            return None;
        }
        let mut detached = 0;
        for task in guard
            .tasks
            .iter_mut()
            .filter(|task| task.project_id.as_deref() == Some(project_id))
        {
            task.project_id = None;
            detached += 1;
        }
        Some(detached)
    }

    pub fn settings(&self) -> Settings {
        let guard = self.inner.lock().expect("state poisoned");
        guard.settings.clone()
    }

    pub fn update_settings(&self, settings: Settings) {
        let mut guard = self.inner.lock().expect("state poisoned");
        guard.settings = settings;
    }
}

#[derive(Debug)]
struct AppData {
    tasks: Vec<Task>,
    projects: Vec<Project>,
    settings: Settings,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// `"  Deep   Work "` -> `"Deep Work"`
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `Deep Work` -> `deep-work-x3f9`
fn project_id_for(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    let suffix: String = uuid::Uuid::new_v4().simple().to_string().chars().take(4).collect();
    format!("{slug}-{suffix}")
}
