//! Live command and introspection namespace for the pixsim debug console.
//!
//! Feature code registers state stores, operation categories, and startup
//! modules; the console reads them back through a single tree:
//! - [`Namespace::context`]: a [`LiveView`] over the application context
//! - [`Namespace::data`]: registered stores, each readable as a live view
//! - [`Namespace::ops`]: validated, invokable operations by category
//!
//! [`Console`] pairs a namespace with a [`CommandLog`] (bounded entry log and
//! command recall). Parameter overrides written through the namespace are
//! undoable.
//!
//! Everything here is meant for a single UI thread. Registries are shared
//! handles with unrestricted mutation: this is a developer console, not a
//! multi-tenant boundary.

mod config;
mod console;
mod error;
mod history;
mod live;
mod modules;
mod namespace;
mod operation;
mod operations;
mod outcome;
mod overrides;
pub mod script;
mod stores;

pub use config::{ConsoleConfig, DEFAULT_MAX_HISTORY};
pub use console::Console;
pub use error::ConsoleError;
pub use history::{CommandLog, render};
pub use live::{LiveView, Node, SourceSlot, StateSource, kind_of};
pub use modules::{ModuleDescriptor, ModuleRegistry, ModuleState};
pub use namespace::{HELP_TEXT, Namespace, Registrar};
pub use operation::{Execution, OperationArgs, OperationDefinition};
pub use operations::{CategoryNamespace, OperationRegistry, OpsNamespace};
pub use outcome::Outcome;
pub use overrides::{OverrideHistory, UndoOutcome};
pub use stores::{DataNamespace, DataStoreRegistry, StateWriter, StoreRegistration};

pub use pixsim_types::{ConsoleEntry, EntryId, EntryKind, OverrideRecord, ParamConstraints, ParamSpec, ParamType};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, ConsoleError>;
