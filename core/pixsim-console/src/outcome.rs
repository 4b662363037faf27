use crate::error::ConsoleError;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;

/// Result of a successful invocation or evaluation.
///
/// Callers must not assume an operation finished synchronously;
/// [`Outcome::resolve`] handles both shapes.
pub enum Outcome {
    Ready(Value),
    Pending(BoxFuture<'static, Result<Value, ConsoleError>>),
}

impl Outcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    /// The value, if it is already available.
    pub fn into_ready(self) -> Option<Value> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Pending(_) => None,
        }
    }

    /// Waits for the value.
    pub async fn resolve(self) -> Result<Value, ConsoleError> {
        match self {
            Outcome::Ready(v) => Ok(v),
            Outcome::Pending(fut) => fut.await,
        }
    }
}

impl From<Value> for Outcome {
    fn from(value: Value) -> Self {
        Outcome::Ready(value)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(v) => f.debug_tuple("Ready").field(v).finish(),
            Outcome::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}
