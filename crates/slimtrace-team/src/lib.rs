pub mod checkpoint;
pub mod error;
pub mod extractor;
pub mod protect;

pub use checkpoint::{format_checkpoint, read_checkpoint, write_checkpoint};
pub use error::{Error, Result};
pub use extractor::extract_team_state;
pub use protect::team_protect_apply;
