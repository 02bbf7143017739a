use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Task priority. Corresponds to the `task_priority` SQL enum; serialized
/// capitalized ("Low"/"Medium"/"High") as the client forms send it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    /// Rank used for priority sorting: High > Medium > Low.
    pub fn rank(&self) -> u8 {
        match self {
            TaskPriority::High => 3,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 1,
        }
    }
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Low
    }
}

/// The `completed` flag as it arrives on the wire.
///
/// The browser forms transport it as the strings "Yes"/"No", older callers as
/// a boolean or a 0/1 count. All accepted shapes are collapsed to a boolean
/// exactly once, here at the boundary; any other JSON shape fails
/// deserialization and surfaces as a validation error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CompletedInput {
    Flag(bool),
    Count(i64),
    Text(String),
}

impl CompletedInput {
    /// "Yes" and "true" (and their boolean/1 equivalents) mean completed;
    /// every other accepted value means pending.
    pub fn as_bool(&self) -> bool {
        match self {
            CompletedInput::Flag(flag) => *flag,
            CompletedInput::Count(n) => *n == 1,
            CompletedInput::Text(text) => matches!(text.as_str(), "Yes" | "true"),
        }
    }
}

/// Payload for creating a task. Only the title is required.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<NaiveDate>,

    pub completed: Option<CompletedInput>,
}

/// Partial update: absent fields leave the stored value untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<NaiveDate>,

    pub completed: Option<CompletedInput>,
}

/// A task as stored and as returned by the API. The owner is fixed at
/// creation; every query that touches a task filters on it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: i32,
}

impl Task {
    /// Builds the stored record for a create request: new id, caller as
    /// owner, priority defaulting to Low, completed normalized.
    pub fn new(input: NewTask, owner_id: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            priority: input.priority.unwrap_or_default(),
            due_date: input.due_date,
            completed: input.completed.map(|c| c.as_bool()).unwrap_or(false),
            created_at: Utc::now(),
            owner_id,
        }
    }
}
