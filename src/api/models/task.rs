use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;

/// Function name of the task the provider schedules when backup storage gets
/// enabled; the activation poll filters the server's task list by it.
pub const ACTIVATION_FUNCTION: &str = "addBackupFTP";

/// An asynchronous provider-side task; we never create these ourselves, we
/// only list and poll them.
#[derive(Clone, Debug, Deserialize)]
#[cfg_attr(test, derive(PartialEq, Eq))]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub task_id: TaskId,
    pub function: String,
    pub status: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub done_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_update: Option<DateTime<Utc>>,
}

impl Task {
    /// Statuses are not a closed set from our side, so - like the original
    /// automation this replaces - we treat any status carrying the `done`
    /// marker as terminal; the comparison ignores case, since the provider
    /// camel-cases compound statuses such as `customerDone`.
    pub fn is_done(&self) -> bool {
        self.status.to_ascii_lowercase().contains("done")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
