pub mod background_poll_collapse;
pub mod document_dedup;
pub mod envelope_strip;
pub mod error_retry_collapse;
pub mod file_history_dedup;
pub mod http_spam;
pub mod mega_block_trim;
pub mod metadata_strip;
pub mod progress_collapse;
pub mod stale_reads;
pub mod system_reminder_dedup;
pub mod thinking_blocks;
pub mod tool_output_trim;

pub use background_poll_collapse::BackgroundPollCollapse;
pub use document_dedup::DocumentDedup;
pub use envelope_strip::EnvelopeStrip;
pub use error_retry_collapse::ErrorRetryCollapse;
pub use file_history_dedup::FileHistoryDedup;
pub use http_spam::HttpSpam;
pub use mega_block_trim::MegaBlockTrim;
pub use metadata_strip::MetadataStrip;
pub use progress_collapse::ProgressCollapse;
pub use stale_reads::StaleReads;
pub use system_reminder_dedup::SystemReminderDedup;
pub use thinking_blocks::ThinkingBlocks;
pub use tool_output_trim::ToolOutputTrim;
