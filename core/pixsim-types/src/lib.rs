//! Core type definitions for the pixsim console.
//!
//! This crate defines the plain, serializable types shared by the console
//! runtime and its front ends:
//! - Console log entries and their identifiers
//! - Millisecond timestamps
//! - Operation parameter specifications (runtime type tags and constraints)
//! - Override records used for undo
//!
//! Registries, live views, and evaluation belong in `pixsim-console`, not here.

mod entry;
mod ids;
mod overrides;
mod param;
mod timestamp;

pub use entry::{ConsoleEntry, EntryKind};
pub use ids::{EntryId, EntryIdGenerator};
pub use overrides::OverrideRecord;
pub use param::{ParamConstraints, ParamSpec, ParamType};
pub use timestamp::Timestamp;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unknown parameter type: {0}")]
    UnknownParamType(String),

    #[error("unknown entry kind: {0}")]
    UnknownEntryKind(String),
}
