use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Status of a shared task on the team's task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

/// A single shared task on the team's coordination task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedTask {
    pub id: String,
    pub subject: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Runtime + config-file state for one sub-agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<String>,
}

/// Team coordination state extracted from a transcript and merged with the
/// on-disk team-config file (spec §4.5). Created fresh at every extraction
/// pass; has no persistent in-memory identity between passes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_session_id: Option<String>,
    #[serde(default)]
    pub members: BTreeMap<String, TeamMember>,
    #[serde(default)]
    pub tasks: Vec<SharedTask>,
    /// Indices of every record identified as team-coordination traffic
    /// (sub-agent spawns, task create/update, team create/send-message,
    /// task notifications) — used by team-protect (spec §4.6).
    #[serde(default)]
    pub coordination_indices: BTreeSet<usize>,
}

impl TeamState {
    pub fn is_empty(&self) -> bool {
        self.team_name.is_none()
            && self.lead_agent_id.is_none()
            && self.members.is_empty()
            && self.tasks.is_empty()
    }
}
