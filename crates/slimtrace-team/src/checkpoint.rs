use std::path::Path;

use slimtrace_types::TeamState;

use crate::error::Result;

/// Render a [`TeamState`] as plain text: no ANSI escapes, safe to print to a
/// terminal or drop into a file a human will open directly (spec §4.5,
/// §6 `checkpoint --show`).
pub fn format_checkpoint(state: &TeamState, session_label: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("slimtrace checkpoint: {session_label}\n"));

    if let Some(team_name) = &state.team_name {
        out.push_str(&format!("team: {team_name}\n"));
    }
    if let Some(lead) = &state.lead_agent_id {
        out.push_str(&format!("lead agent: {lead}\n"));
    }

    if !state.members.is_empty() {
        out.push_str("members:\n");
        for (name, member) in &state.members {
            let role = member.role.as_deref().unwrap_or("unknown role");
            let status = member.status.as_deref().unwrap_or("unknown status");
            out.push_str(&format!("  - {name} ({role}): {status}\n"));
            if let Some(result) = &member.latest_result {
                out.push_str(&format!("      last result: {result}\n"));
            }
        }
    }

    if !state.tasks.is_empty() {
        out.push_str("tasks:\n");
        for task in &state.tasks {
            let owner = task.owner.as_deref().unwrap_or("unassigned");
            out.push_str(&format!(
                "  - [{}] {} (owner: {owner})\n",
                task.status.as_str(),
                task.subject
            ));
        }
    }

    if state.team_name.is_none() && state.members.is_empty() && state.tasks.is_empty() {
        out.push_str("(no team coordination detected in this session)\n");
    }

    out
}

/// Write a checkpoint file to `path`, creating parent directories as needed.
pub fn write_checkpoint(path: &Path, state: &TeamState, session_label: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format_checkpoint(state, session_label))?;
    Ok(())
}

pub fn read_checkpoint(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_has_no_ansi_escapes() {
        let mut state = TeamState::default();
        state.team_name = Some("alpha".to_string());
        let text = format_checkpoint(&state, "session-1");
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn empty_state_still_produces_readable_output() {
        let state = TeamState::default();
        let text = format_checkpoint(&state, "session-1");
        assert!(text.contains("no team coordination"));
    }

    #[test]
    fn write_and_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project").join("checkpoint.txt");
        let mut state = TeamState::default();
        state.team_name = Some("alpha".to_string());
        write_checkpoint(&path, &state, "session-1").unwrap();
        let text = read_checkpoint(&path).unwrap();
        assert!(text.contains("alpha"));
    }
}
