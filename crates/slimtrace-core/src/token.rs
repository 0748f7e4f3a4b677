use slimtrace_types::Record;

/// Fixed context-window size used to compute the percentage shown in
/// diagnosis output (spec §4.2).
pub const CONTEXT_WINDOW_TOKENS: u64 = 200_000;

/// Estimate the token count of a single record. If the record carries
/// explicit token counters (`metadata.input_tokens`/`output_tokens`), their
/// sum is authoritative; otherwise falls back to `ceil(bytes / 4)` over the
/// textual content of every kept block (spec §4.2). This is an estimate,
/// not a true tokenizer (spec §1 Non-goals).
pub fn estimate_record_tokens(record: &Record) -> u64 {
    if let Some(total) = record.metadata.as_ref().and_then(|m| m.total_tokens()) {
        return total;
    }

    let bytes: usize = record
        .content_blocks
        .iter()
        .filter_map(|b| b.textual_content())
        .map(|t| t.len())
        .sum();

    bytes.div_ceil(4) as u64
}

/// Sum estimated tokens across a full record sequence.
pub fn estimate_total_tokens(records: &[Record]) -> u64 {
    records.iter().map(estimate_record_tokens).sum()
}

/// Percentage of the fixed context window a token count represents.
pub fn context_window_percent(tokens: u64) -> f64 {
    (tokens as f64 / CONTEXT_WINDOW_TOKENS as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use slimtrace_types::Record;

    #[test]
    fn falls_back_to_byte_estimate_without_explicit_counters() {
        let line = serde_json::json!({
            "uuid": "a",
            "role": "user",
            "message": {"role": "user", "content": [{"type": "text", "text": "abcdefgh"}]}
        })
        .to_string();
        let record = Record::parse_line(1, &line);
        assert_eq!(estimate_record_tokens(&record), 2); // 8 bytes / 4
    }

    #[test]
    fn prefers_explicit_usage_counters() {
        let line = serde_json::json!({
            "uuid": "a",
            "role": "assistant",
            "message": {
                "role": "assistant",
                "content": [{"type": "text", "text": "padding padding padding"}],
                "usage": {"input_tokens": 100, "output_tokens": 50}
            }
        })
        .to_string();
        let record = Record::parse_line(1, &line);
        assert_eq!(estimate_record_tokens(&record), 150);
    }
}
