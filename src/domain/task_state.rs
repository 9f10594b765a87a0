use serde::{Deserialize, Serialize};

/// Lifecycle state of a console task.
///
/// `New -> Running -> Terminated`; `Terminated` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Created but never started
    #[default]
    New,
    /// Worker thread spawned and body executing
    Running,
    /// Body returned or failed; completion side effects have been posted
    Terminated,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::New => "new",
            TaskState::Running => "running",
            TaskState::Terminated => "terminated",
        }
    }

    /// Whether the task has finished (successfully or not)
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Terminated)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
