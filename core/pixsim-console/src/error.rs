//! Error types for the console namespace.
//!
//! Configuration errors (unknown categories, broken module graphs) are
//! returned from setup calls and must not be swallowed. Invocation errors are
//! caught at the console boundary and become `error` log entries.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown operation '{operation}' in category '{category}' (available: {})", format_list(.available))]
    UnknownOperation {
        category: String,
        operation: String,
        available: Vec<String>,
    },

    #[error("invalid parameter '{parameter}' for '{operation}': expected {expected}, {reason}")]
    InvalidParameter {
        operation: String,
        parameter: String,
        expected: String,
        reason: String,
    },

    #[error("operation {category}.{operation} failed: {message}")]
    OperationFailed {
        category: String,
        operation: String,
        message: String,
    },

    #[error("module '{module}' depends on unknown module '{dependency}'")]
    UnknownModuleDependency { module: String, dependency: String },

    #[error("cyclic dependency: module '{module}' depends on '{dependency}' ({})", .cycle.join(" -> "))]
    CyclicDependency {
        module: String,
        dependency: String,
        cycle: Vec<String>,
    },

    #[error("module '{module}' failed to register: {message}")]
    ModuleFailed { module: String, message: String },

    #[error("namespace not initialized: call initialize() before reading context")]
    NamespaceNotInitialized,

    #[error("unknown store: {0}")]
    UnknownStore(String),

    #[error("store '{0}' is read-only")]
    ReadOnlyStore(String),

    #[error("unknown path: {0}")]
    UnknownPath(String),

    #[error("store write failed: {store}: {message}")]
    StoreWrite { store: String, message: String },

    #[error("parse error at column {column}: {message}")]
    Parse { column: usize, message: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn format_list(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
