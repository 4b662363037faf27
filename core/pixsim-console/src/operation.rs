//! Operation definitions and their arguments.
//!
//! Parameters are declared as runtime data ([`ParamSpec`]) because console
//! input is untyped. Handlers receive [`OperationArgs`] after validation, so
//! they can read arguments by name with the declared types already checked.

use futures::FutureExt;
use futures::future::BoxFuture;
use pixsim_types::ParamSpec;
use serde_json::{Value, json};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// What a handler hands back: a value now, or a future for one.
pub enum Execution {
    Ready(anyhow::Result<Value>),
    Deferred(BoxFuture<'static, anyhow::Result<Value>>),
}

impl fmt::Debug for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Execution::Ready(r) => f.debug_tuple("Ready").field(r).finish(),
            Execution::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

pub type Handler = Arc<dyn Fn(&OperationArgs) -> Execution + Send + Sync>;

/// A named, parameter-validated action.
#[derive(Clone)]
pub struct OperationDefinition {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub parameters: Vec<ParamSpec>,
    handler: Handler,
}

impl OperationDefinition {
    /// An operation whose handler returns immediately.
    pub fn new<F>(id: &str, display_name: &str, description: &str, handler: F) -> Self
    where
        F: Fn(&OperationArgs) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            parameters: Vec::new(),
            handler: Arc::new(move |args| Execution::Ready(handler(args))),
        }
    }

    /// An operation whose handler completes later. The handler receives its
    /// own copy of the arguments so the future can own them.
    pub fn deferred<F, Fut>(id: &str, display_name: &str, description: &str, handler: F) -> Self
    where
        F: Fn(OperationArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            parameters: Vec::new(),
            handler: Arc::new(move |args| Execution::Deferred(handler(args.clone()).boxed())),
        }
    }

    #[must_use]
    pub fn with_param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub(crate) fn execute(&self, args: &OperationArgs) -> Execution {
        (self.handler)(args)
    }

    /// `name(a: string, b?: number)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.parameters.iter().map(ParamSpec::signature).collect();
        format!("{}({})", self.id, params.join(", "))
    }

    /// Metadata as shown by `__describe__`.
    pub fn describe(&self, category: &str) -> Value {
        json!({
            "id": self.id,
            "category": category,
            "displayName": self.display_name,
            "description": self.description,
            "signature": self.signature(),
            "parameters": self.parameters,
        })
    }
}

impl fmt::Debug for OperationDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDefinition")
            .field("id", &self.id)
            .field("parameters", &self.parameters)
            .finish()
    }
}

/// Validated arguments, in declaration order.
///
/// Arguments beyond the declared parameters are kept in [`Self::rest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationArgs {
    named: Vec<(String, Value)>,
    rest: Vec<Value>,
}

impl OperationArgs {
    pub(crate) fn new(named: Vec<(String, Value)>, rest: Vec<Value>) -> Self {
        Self { named, rest }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Like [`Self::str`] but an error when absent, for use with `?`.
    pub fn require_str(&self, name: &str) -> anyhow::Result<&str> {
        self.str(name)
            .ok_or_else(|| anyhow::anyhow!("missing string argument '{name}'"))
    }

    /// Undeclared trailing arguments.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    /// Every argument as a flat list, declared ones first.
    pub fn to_vec(&self) -> Vec<Value> {
        self.named
            .iter()
            .map(|(_, v)| v.clone())
            .chain(self.rest.iter().cloned())
            .collect()
    }
}
