use std::sync::LazyLock;

use regex::Regex;

use slimtrace_types::{Action, Record, StrategyResult};

use crate::config::StrategyConfig;
use crate::strategy::{Strategy, Tier};
use crate::util::synthetic_text_record;

static HTTP_LOG_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(GET|POST|PUT|DELETE|PATCH|HEAD)\s+\S+\s+HTTP/\d").unwrap());

fn is_http_log_record(record: &Record) -> bool {
    record
        .content_blocks
        .iter()
        .filter_map(|b| b.textual_content())
        .any(|text| HTTP_LOG_LINE.is_match(text.trim()))
}

/// Collapses runs of raw HTTP-request-log lines, the kind of noise emitted
/// by a dev server or proxy a tool invocation happens to capture.
pub struct HttpSpam;

impl Strategy for HttpSpam {
    fn name(&self) -> &'static str {
        "http-spam"
    }

    fn tier(&self) -> Tier {
        Tier::Aggressive
    }

    fn description(&self) -> &'static str {
        "Collapse runs of raw HTTP request-log lines captured incidentally by a tool."
    }

    fn expected_savings_label(&self) -> &'static str {
        "high when a dev server's access log leaks into tool output"
    }

    fn apply(&self, records: &[Record], config: &StrategyConfig) -> StrategyResult {
        let mut result = StrategyResult::empty(self.name());
        let mut i = 0;
        while i < records.len() {
            if !is_http_log_record(&records[i]) {
                i += 1;
                continue;
            }
            let start = i;
            let mut end = i;
            while end + 1 < records.len() && is_http_log_record(&records[end + 1]) {
                end += 1;
            }
            let run_len = end - start + 1;
            if run_len >= config.http_spam_min_run {
                let summary = format!("[{run_len} HTTP access-log lines collapsed]");
                let synthetic = synthetic_text_record(
                    records[start].uuid.clone(),
                    records[start].parent_uuid.clone(),
                    records[start].kind,
                    summary,
                );
                result.actions.push(Action::ReplaceRange(start, end, synthetic));
                result.removed_count += run_len - 1;
                result.modified_count += 1;
            }
            i = end + 1;
        }
        result
    }
}
