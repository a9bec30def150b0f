use serde::{Deserialize, Deserializer, Serialize};

use crate::calendar::ViewMode;
use crate::task_list::SortBy;

pub type Timestamp = i64;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    #[default]
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Ordering weight used by the priority sort; higher comes first.
    pub fn rank(self) -> u8 {
        match self {
            TaskPriority::High => 2,
            TaskPriority::Medium => 1,
            TaskPriority::Low => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Image,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TaskAttachment {
    pub id: String,
    pub uri: String,
    pub kind: AttachmentKind,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: Timestamp,
    #[serde(default)]
    pub completed_at: Option<Timestamp>,
    /// Raw due date as entered, e.g. `11/30/2025` or `2025-11-30`.
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<TaskAttachment>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        if self.completed_at.is_some() && !self.completed {
            return Err("task.completed_at must be empty for an open task".to_string());
        }
        for attachment in &self.attachments {
            validate_non_empty(&attachment.id, "task.attachments[].id")?;
            validate_non_empty(&attachment.uri, "task.attachments[].uri")?;
        }
        Ok(())
    }
}

/// Fields accepted when creating a task from a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub due_time: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<TaskAttachment>,
}

/// Partial edit of a task. `None` leaves a field untouched; for the optional
/// task fields `Some(None)` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_time: Option<Option<String>>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub project_id: Option<Option<String>>,
    #[serde(default)]
    pub attachments: Option<Vec<TaskAttachment>>,
}

impl TaskUpdate {
    pub fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(project_id) = self.project_id {
            task.project_id = project_id;
        }
        if let Some(attachments) = self.attachments {
            task.attachments = attachments;
        }
    }
}

pub const DEFAULT_PROJECT_COLORS: [&str; 5] =
    ["#FACC15", "#4ADE80", "#60A5FA", "#FB7185", "#A855F7"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
    pub created_at: Timestamp,
}

impl Project {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "project.id")?;
        validate_non_empty(&self.name, "project.name")?;
        validate_hex_color(&self.color, "project.color")
    }

    /// Projects a fresh install starts with.
    pub fn defaults(now: Timestamp) -> Vec<Project> {
        vec![
            Project {
                id: "inbox".to_string(),
                name: "Inbox".to_string(),
                color: DEFAULT_PROJECT_COLORS[0].to_string(),
                icon: "📥".to_string(),
                created_at: now,
            },
            Project {
                id: "school".to_string(),
                name: "School".to_string(),
                color: DEFAULT_PROJECT_COLORS[2].to_string(),
                icon: "📚".to_string(),
                created_at: now,
            },
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProjectUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    #[serde(default)]
    pub default_view: ViewMode,
    #[serde(default)]
    pub sort_by: SortBy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: default_daily_goal(),
            default_view: ViewMode::default(),
            sort_by: SortBy::default(),
        }
    }
}

pub const MIN_DAILY_GOAL: u32 = 1;
pub const MAX_DAILY_GOAL: u32 = 50;

impl Settings {
    pub fn validate(&self) -> Result<(), String> {
        if !(MIN_DAILY_GOAL..=MAX_DAILY_GOAL).contains(&self.daily_goal) {
            return Err(format!(
                "settings.daily_goal must be between {MIN_DAILY_GOAL} and {MAX_DAILY_GOAL}"
            ));
        }
        Ok(())
    }

    /// Pulls hand-edited values back into range.
    pub fn clamped(mut self) -> Self {
        self.daily_goal = self.daily_goal.clamp(MIN_DAILY_GOAL, MAX_DAILY_GOAL);
        self
    }
}

fn default_daily_goal() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataFile {
    pub schema_version: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub projects: Vec<Project>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SettingsFile {
    pub schema_version: u32,
    pub settings: Settings,
}

// Maps an explicit `null` to `Some(None)` so it clears the field.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

fn validate_hex_color(value: &str, field_name: &str) -> Result<(), String> {
    let Some(digits) = value.strip_prefix('#') else {
        return Err(format!("{field_name} must be #RRGGBB"));
    };
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("{field_name} must be #RRGGBB"));
    }
    Ok(())
}
