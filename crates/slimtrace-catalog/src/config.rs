/// How the `thinking-blocks` strategy handles a `thinking` content block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThinkingMode {
    /// Delete the block and its signature entirely.
    #[default]
    Remove,
    /// Keep the first 200 characters and drop the signature.
    Truncate,
    /// Drop the signature field alone, keep the thinking text.
    SignatureOnly,
}

impl ThinkingMode {
    pub fn parse(s: &str) -> Option<ThinkingMode> {
        match s {
            "remove" => Some(ThinkingMode::Remove),
            "truncate" => Some(ThinkingMode::Truncate),
            "signature-only" => Some(ThinkingMode::SignatureOnly),
            _ => None,
        }
    }
}

/// The small configuration object every strategy is a pure function of,
/// alongside the current record sequence (spec §4.3).
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub thinking_mode: ThinkingMode,
    pub tool_output_trim_bytes: usize,
    pub tool_output_trim_lines: usize,
    pub tool_output_head_lines: usize,
    pub tool_output_tail_lines: usize,
    pub mega_block_bytes: usize,
    pub mega_block_head_lines: usize,
    pub mega_block_tail_lines: usize,
    pub document_min_bytes: usize,
    pub http_spam_min_run: usize,
    pub progress_min_run: usize,
    pub error_retry_min_run: usize,
    pub background_poll_min_run: usize,
    pub thinking_truncate_chars: usize,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            thinking_mode: ThinkingMode::Remove,
            tool_output_trim_bytes: 8 * 1024,
            tool_output_trim_lines: 100,
            tool_output_head_lines: 50,
            tool_output_tail_lines: 20,
            mega_block_bytes: 32 * 1024,
            mega_block_head_lines: 80,
            mega_block_tail_lines: 30,
            document_min_bytes: 1024,
            http_spam_min_run: 3,
            progress_min_run: 2,
            error_retry_min_run: 2,
            background_poll_min_run: 2,
            thinking_truncate_chars: 200,
        }
    }
}
