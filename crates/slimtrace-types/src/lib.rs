// Internal modules
mod action;
mod content;
mod error;
mod kind;
mod record;
mod team;

pub use action::{Action, StrategyResult};
pub use content::{canonical_bytes, text_repr, ContentBlock};
pub use error::{Error, Result};
pub use kind::{classify, RecordKind};
pub use record::{strip_value_keys, Metadata, Record};
pub use team::{SharedTask, TaskStatus, TeamMember, TeamState};
