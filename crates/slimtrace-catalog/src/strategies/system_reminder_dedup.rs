use std::collections::HashSet;

use slimtrace_types::{Action, ContentBlock, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::with_content_blocks;

const SENTINEL: &str = "<system-reminder>";

/// Keeps the first occurrence of each distinct `<system-reminder>` block and
/// drops exact repeats, which the host agent re-sends on most turns.
pub struct SystemReminderDedup;

impl Strategy for SystemReminderDedup {
    fn name(&self) -> &'static str {
        "system-reminder-dedup"
    }

    fn tier(&self) -> Tier {
        Tier::Standard
    }

    fn description(&self) -> &'static str {
        "Keep the first copy of each repeated system-reminder block, drop the rest."
    }

    fn expected_savings_label(&self) -> &'static str {
        "moderate, grows with session length"
    }

    fn apply(&self, records: &[Record], _config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let mut seen: HashSet<String> = HashSet::new();

        for (i, record) in records.iter().enumerate() {
            let has_reminder = record
                .content_blocks
                .iter()
                .any(|b| matches!(b, ContentBlock::Text { text } if text.contains(SENTINEL)));
            if !has_reminder {
                continue;
            }

            let mut changed = false;
            let new_blocks: Vec<ContentBlock> = record
                .content_blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } if text.contains(SENTINEL) => {
                        if seen.contains(text) {
                            changed = true;
                            None
                        } else {
                            seen.insert(text.clone());
                            Some(block.clone())
                        }
                    }
                    other => Some(other.clone()),
                })
                .collect();

            if !changed {
                continue;
            }

            if new_blocks.is_empty() {
                result.actions.push(Action::Drop(i));
                result.removed_count += 1;
            } else {
                result.actions.push(Action::Replace(i, with_content_blocks(record, new_blocks)));
                result.modified_count += 1;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reminder_record(uuid: &str, text: &str) -> Record {
        Record::from_value(
            0,
            json!({
                "uuid": uuid,
                "role": "user",
                "message": {"role": "user", "content": [{"type": "text", "text": text}]}
            }),
            None,
        )
    }

    #[test]
    fn drops_repeated_reminder_and_keeps_first() {
        let reminder = format!("{SENTINEL}Remember to run tests{SENTINEL}");
        let records = vec![
            reminder_record("a", &reminder),
            reminder_record("b", &reminder),
        ];
        let result = SystemReminderDedup.apply(&records, &StrategyConfig::default());
        assert_eq!(result.actions.len(), 1);
        assert!(matches!(result.actions[0], Action::Drop(1)));
    }

    #[test]
    fn distinct_reminders_are_both_kept() {
        let records = vec![
            reminder_record("a", &format!("{SENTINEL}one{SENTINEL}")),
            reminder_record("b", &format!("{SENTINEL}two{SENTINEL}")),
        ];
        let result = SystemReminderDedup.apply(&records, &StrategyConfig::default());
        assert!(result.is_noop());
    }
}
