//! Live state accessor.
//!
//! A [`LiveView`] stores only a source getter and a path. Every read calls
//! the getter again and walks the path from the fresh snapshot, so a view
//! held across time (or a child view taken from it) never goes stale.
//! Nothing below the root is ever cached.

use serde_json::{Map, Value, json};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::warn;

/// Zero-argument getter returning the current full state.
pub type StateSource = Arc<dyn Fn() -> Value + Send + Sync>;

/// The getter behind a family of views.
///
/// A slot may start empty and be filled later; views created before
/// [`SourceSlot::install`] start resolving as soon as a getter is installed.
pub struct SourceSlot {
    label: String,
    getter: RwLock<Option<StateSource>>,
    warned: AtomicBool,
}

impl SourceSlot {
    /// A slot with no getter yet. Reads warn once and resolve to nothing.
    pub fn empty(label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            label: label.into(),
            getter: RwLock::new(None),
            warned: AtomicBool::new(false),
        })
    }

    pub fn with_source(label: impl Into<String>, getter: StateSource) -> Arc<Self> {
        let slot = Self::empty(label);
        slot.install(getter);
        slot
    }

    /// Installs `getter`, replacing any previous one.
    /// Returns `true` if a getter was already installed.
    pub fn install(&self, getter: StateSource) -> bool {
        let mut guard = self.getter.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = guard.replace(getter).is_some();
        self.warned.store(false, Ordering::Relaxed);
        replaced
    }

    pub fn is_installed(&self) -> bool {
        self.getter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Calls the getter now. `None` if no getter is installed.
    fn snapshot(&self) -> Option<Value> {
        let getter = self
            .getter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match getter {
            Some(getter) => Some(getter()),
            None => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    warn!(source = %self.label, "state source read before initialization; returning nothing");
                }
                None
            }
        }
    }
}

impl fmt::Debug for SourceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceSlot")
            .field("label", &self.label)
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Result of reading one key through a view.
#[derive(Debug, Clone)]
pub enum Node {
    /// The key holds a plain object; reads through this view stay live.
    View(LiveView),
    /// The key holds a primitive or an array, returned by value.
    Value(Value),
}

impl Node {
    /// Materializes the node into a plain value at the current moment.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Node::View(view) => view.value(),
            Node::Value(v) => Some(v),
        }
    }

    pub fn as_view(&self) -> Option<&LiveView> {
        match self {
            Node::View(view) => Some(view),
            Node::Value(_) => None,
        }
    }
}

/// Read-only, always-current view of a nested state snapshot.
#[derive(Clone)]
pub struct LiveView {
    slot: Arc<SourceSlot>,
    path: Vec<String>,
}

impl LiveView {
    /// A root view over `getter`.
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::from_slot(SourceSlot::with_source("state", Arc::new(getter)), Vec::new())
    }

    /// A view at `path` resolving through `slot`.
    pub fn from_slot(slot: Arc<SourceSlot>, path: Vec<String>) -> Self {
        Self { slot, path }
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.slot.is_installed()
    }

    /// A child view at `key`, without resolving anything.
    pub fn child(&self, key: &str) -> LiveView {
        let mut path = self.path.clone();
        path.push(key.to_string());
        Self::from_slot(Arc::clone(&self.slot), path)
    }

    /// Reads `key` from the current state.
    ///
    /// Plain objects come back as nested views; everything else by value.
    /// A missing segment or a non-traversable value yields `None`.
    pub fn get(&self, key: &str) -> Option<Node> {
        let root = self.slot.snapshot()?;
        let value = walk(&root, self.path.iter().map(String::as_str).chain([key]))?;
        Some(if value.is_object() {
            Node::View(self.child(key))
        } else {
            Node::Value(value.clone())
        })
    }

    /// Reads a multi-segment path relative to this view.
    pub fn at<S: AsRef<str>>(&self, segments: &[S]) -> Option<Node> {
        match segments.split_last() {
            None => {
                let value = self.value()?;
                Some(if value.is_object() {
                    Node::View(self.clone())
                } else {
                    Node::Value(value)
                })
            }
            Some((last, parents)) => {
                let mut view = self.clone();
                for seg in parents {
                    view = view.child(seg.as_ref());
                }
                view.get(last.as_ref())
            }
        }
    }

    /// The current value at this view's path, fully materialized.
    pub fn value(&self) -> Option<Value> {
        let root = self.slot.snapshot()?;
        walk(&root, self.path.iter().map(String::as_str)).cloned()
    }

    /// True if `key` exists at this path right now.
    pub fn has(&self, key: &str) -> bool {
        self.slot
            .snapshot()
            .and_then(|root| {
                walk(&root, self.path.iter().map(String::as_str).chain([key])).map(|_| ())
            })
            .is_some()
    }

    /// The key set at this path right now. Array positions are listed as
    /// indices; primitives and missing paths have no keys.
    pub fn keys(&self) -> Vec<String> {
        match self.value() {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            Some(Value::Array(items)) => (0..items.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Shape summary: the path, the value kind, and each key's kind.
    pub fn describe(&self) -> Value {
        let path = self.path.join(".");
        match self.value() {
            Some(Value::Object(map)) => {
                let keys: Map<String, Value> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), json!(kind_of(v))))
                    .collect();
                json!({ "path": path, "kind": "object", "keys": keys })
            }
            Some(other) => json!({ "path": path, "kind": kind_of(&other) }),
            None => json!({ "path": path, "kind": "undefined" }),
        }
    }
}

impl fmt::Debug for LiveView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveView")
            .field("source", &self.slot.label())
            .field("path", &self.path)
            .finish()
    }
}

/// Short type name of a JSON value, as shown by `__describe__`.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Walks `segments` from `root`. Objects are indexed by key, arrays by
/// decimal position; anything else stops the walk.
pub(crate) fn walk<'a, 'b, I>(root: &'a Value, segments: I) -> Option<&'a Value>
where
    I: IntoIterator<Item = &'b str>,
{
    let mut current = root;
    for seg in segments {
        current = match current {
            Value::Object(map) => map.get(seg)?,
            Value::Array(items) => items.get(seg.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
