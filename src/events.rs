use crate::models::{Project, Settings, Task};

pub const EVENT_STATE_UPDATED: &str = "state_updated";

#[derive(Debug, Clone, serde::Serialize)]
pub struct StatePayload {
    pub tasks: Vec<Task>,
    pub projects: Vec<Project>,
    pub settings: Settings,
}
