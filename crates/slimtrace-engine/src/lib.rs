pub mod applier;
pub mod diagnosis;
pub mod error;

pub use applier::{run, AppliedResult};
pub use diagnosis::{diagnose, Diagnosis};
pub use error::{Error, Result};
