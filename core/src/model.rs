//! Octopus Deploy API resource types.
//!
//! Wire format is PascalCase JSON. Fields the chains do not strictly need
//! are modeled tolerantly (`Option` / `#[serde(default)]`) so that server
//! version drift in optional fields never breaks deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A space: the top-level multi-tenant partition of an instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub task_queue_stopped: bool,
}

/// Paged envelope returned by collection endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceCollection<T> {
    #[serde(default)]
    pub item_type: Option<String>,
    #[serde(default)]
    pub total_results: Option<i64>,
    #[serde(default)]
    pub items_per_page: Option<i64>,
    pub items: Vec<T>,
}

/// A single execution record of a release against one environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deployment {
    pub id: String,
    pub name: String,
    pub space_id: String,
    #[serde(default)]
    pub release_id: Option<String>,
    pub environment_id: String,
    #[serde(default)]
    pub tenant_id: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub deployment_process_id: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub form_values: Option<Value>,
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub queue_time_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub use_guided_failure: bool,
    #[serde(default)]
    pub specific_machine_ids: Vec<String>,
    #[serde(default)]
    pub excluded_machine_ids: Vec<String>,
    #[serde(default)]
    pub skip_actions: Vec<String>,
    #[serde(default)]
    pub force_package_download: bool,
    #[serde(default)]
    pub force_package_redeployment: bool,
}

/// An immutable versioned snapshot of a deployment process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Release {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub release_notes: Option<String>,
}

/// Terminal and in-flight states of a server task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    Queued,
    Executing,
    Paused,
    TimedOut,
    Failed,
    Canceled,
    Cancelling,
    Success,
    #[serde(other)]
    Unknown,
}

/// The server task resource itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerTask {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: TaskState,
    #[serde(default)]
    pub space_id: Option<String>,
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub has_been_picked_up_by_processor: bool,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub finished_successfully: bool,
    #[serde(default)]
    pub has_pending_interruptions: bool,
}

/// Progress summary attached to task details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskProgress {
    #[serde(default)]
    pub progress_percentage: i32,
    #[serde(default)]
    pub estimated_time_remaining: Option<String>,
}

/// One entry in an activity step's log stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivityLogEntry {
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub message_text: Option<String>,
}

/// A node in the activity log tree (steps nest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActivityElement {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub started: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ended: Option<DateTime<Utc>>,
    #[serde(default)]
    pub children: Vec<ActivityElement>,
    #[serde(default)]
    pub log_elements: Vec<ActivityLogEntry>,
}

/// Full task detail payload: the task plus its execution logs and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskDetails {
    pub task: ServerTask,
    #[serde(default)]
    pub progress: Option<TaskProgress>,
    #[serde(default)]
    pub physical_log_size: Option<i64>,
    #[serde(default)]
    pub activity_logs: Vec<ActivityElement>,
}
