use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use slimtrace_types::{ContentBlock, Record, RecordKind, SharedTask, TaskStatus, TeamMember, TeamState};

use crate::error::Result;

#[derive(Debug, Default, Deserialize)]
struct ConfigMember {
    role: Option<String>,
    description: Option<String>,
    prompt: Option<String>,
    model: Option<String>,
    working_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    team_name: Option<String>,
    lead_agent_id: Option<String>,
    lead_session_id: Option<String>,
    #[serde(default)]
    members: BTreeMap<String, ConfigMember>,
}

const COORDINATION_TOOL_NAMES: &[&str] = &["Task", "TaskUpdate", "TaskCreate", "TaskList", "SendMessage"];

/// Extract a [`TeamState`] from a transcript, optionally merged with the
/// on-disk `teams/<name>/config.json`.
///
/// The config file is authoritative for static roster facts — role,
/// description, model, working directory — since those are set once at team
/// creation and don't change; the transcript is authoritative for what
/// actually happened during the session — task status, latest results, and
/// which record indices are team-coordination traffic (spec §4.5).
pub fn extract_team_state(records: &[Record], config_path: Option<&Path>) -> Result<TeamState> {
    let mut state = TeamState::default();
    let mut coordination_indices = BTreeSet::new();

    for (i, record) in records.iter().enumerate() {
        if !is_team_coordination_record(record) {
            continue;
        }
        coordination_indices.insert(i);

        for block in &record.content_blocks {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                if name == "Task" {
                    record_task_spawn(&mut state, input);
                }
            }
        }

        if record.kind == RecordKind::QueueOperation {
            if let Some(task) = shared_task_from_queue_op(record) {
                upsert_task(&mut state, task);
            }
        }
    }

    state.coordination_indices = coordination_indices;

    if let Some(path) = config_path {
        if path.exists() {
            let config = load_config_file(path)?;
            merge_config(&mut state, config);
        }
    }

    Ok(state)
}

fn is_team_coordination_record(record: &Record) -> bool {
    if record.kind == RecordKind::QueueOperation {
        return true;
    }
    record.content_blocks.iter().any(|block| match block {
        ContentBlock::ToolUse { name, .. } => COORDINATION_TOOL_NAMES.contains(&name.as_str()),
        _ => false,
    })
}

fn record_task_spawn(state: &mut TeamState, input: &serde_json::Value) {
    let Some(description) = input.get("description").and_then(|v| v.as_str()) else {
        return;
    };
    let member = state.members.entry(description.to_string()).or_default();
    member.description = Some(description.to_string());
    if let Some(prompt) = input.get("prompt").and_then(|v| v.as_str()) {
        member.prompt = Some(prompt.to_string());
    }
    if let Some(subagent_type) = input.get("subagent_type").and_then(|v| v.as_str()) {
        member.role = Some(subagent_type.to_string());
    }
    member.status = Some(TaskStatus::InProgress.as_str().to_string());
}

fn shared_task_from_queue_op(record: &Record) -> Option<SharedTask> {
    let id = record.raw.get("taskId").and_then(|v| v.as_str())?.to_string();
    let subject = record
        .raw
        .get("subject")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let status = match record.raw.get("status").and_then(|v| v.as_str()) {
        Some("in_progress") => TaskStatus::InProgress,
        Some("completed") => TaskStatus::Completed,
        Some("cancelled") => TaskStatus::Cancelled,
        _ => TaskStatus::Pending,
    };
    let owner = record.raw.get("owner").and_then(|v| v.as_str()).map(str::to_string);
    Some(SharedTask { id, subject, status, owner })
}

fn upsert_task(state: &mut TeamState, task: SharedTask) {
    match state.tasks.iter_mut().find(|t| t.id == task.id) {
        Some(existing) => *existing = task,
        None => state.tasks.push(task),
    }
}

fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn merge_config(state: &mut TeamState, config: ConfigFile) {
    if config.team_name.is_some() {
        state.team_name = config.team_name;
    }
    if config.lead_agent_id.is_some() {
        state.lead_agent_id = config.lead_agent_id;
    }
    if config.lead_session_id.is_some() {
        state.lead_session_id = config.lead_session_id;
    }
    for (name, member) in config.members {
        let entry = state.members.entry(name).or_insert_with(TeamMember::default);
        if member.role.is_some() {
            entry.role = member.role;
        }
        if member.description.is_some() {
            entry.description = member.description;
        }
        if member.prompt.is_some() {
            entry.prompt = member.prompt;
        }
        if member.model.is_some() {
            entry.model = member.model;
        }
        if member.working_dir.is_some() {
            entry.working_dir = member.working_dir;
        }
    }
}
