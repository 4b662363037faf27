//! Data store registry.
//!
//! Feature code registers named state sources here. The registry never
//! copies state: every read calls the store's source again, and the
//! namespace built by [`DataStoreRegistry::as_namespace`] resolves each
//! store id through a [`LiveView`] that looks the store up on every access.
//!
//! The registry is a shared handle. Clones see the same table, and any
//! holder may register or unregister; this is a trust boundary for a
//! developer console, not a multi-tenant one.

use crate::error::ConsoleError;
use crate::live::{LiveView, Node, SourceSlot, StateSource, kind_of};
use serde_json::{Value, json};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Writes `Some(value)` at `path` (relative to the store root), or removes
/// the key at `path` when given `None`.
pub type StateWriter = Arc<dyn Fn(&[String], Option<Value>) -> anyhow::Result<()> + Send + Sync>;

/// A named source of application state.
#[derive(Clone)]
pub struct StoreRegistration {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub state_source: StateSource,
    /// Documentation only; never checked against the actual state shape.
    pub readable_keys: Option<Vec<String>>,
    /// Present for stores that accept parameter overrides.
    pub writer: Option<StateWriter>,
}

impl StoreRegistration {
    pub fn new<F>(id: &str, display_name: &str, description: &str, source: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            state_source: Arc::new(source),
            readable_keys: None,
            writer: None,
        }
    }

    #[must_use]
    pub fn with_readable_keys(mut self, keys: &[&str]) -> Self {
        self.readable_keys = Some(keys.iter().map(|k| (*k).to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_writer<F>(mut self, writer: F) -> Self
    where
        F: Fn(&[String], Option<Value>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.writer = Some(Arc::new(writer));
        self
    }

    /// Metadata as shown by `data.__help__`.
    pub fn metadata(&self) -> Value {
        json!({
            "id": self.id,
            "displayName": self.display_name,
            "description": self.description,
            "readableKeys": self.readable_keys,
            "writable": self.writer.is_some(),
        })
    }
}

impl fmt::Debug for StoreRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRegistration")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("readable_keys", &self.readable_keys)
            .field("writable", &self.writer.is_some())
            .finish()
    }
}

#[derive(Default)]
struct StoreTable {
    stores: Vec<StoreRegistration>,
}

impl StoreTable {
    fn find(&self, id: &str) -> Option<&StoreRegistration> {
        self.stores.iter().find(|s| s.id == id)
    }
}

/// Catalog of named state sources.
#[derive(Clone, Default)]
pub struct DataStoreRegistry {
    table: Arc<RwLock<StoreTable>>,
}

impl DataStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a store. An existing store with the same id is replaced in
    /// place (keeping its listing position) and a warning is logged.
    pub fn register(&self, registration: StoreRegistration) {
        let mut table = self.write();
        match table.stores.iter_mut().find(|s| s.id == registration.id) {
            Some(existing) => {
                warn!(store_id = %registration.id, "store already registered; overwriting");
                *existing = registration;
            }
            None => {
                debug!(store_id = %registration.id, "store registered");
                table.stores.push(registration);
            }
        }
    }

    /// Removes a store. Returns whether one existed.
    pub fn unregister(&self, id: &str) -> bool {
        let mut table = self.write();
        let before = table.stores.len();
        table.stores.retain(|s| s.id != id);
        before != table.stores.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().find(id).is_some()
    }

    /// The store's current state, read now.
    pub fn get_state(&self, id: &str) -> Option<Value> {
        // Clone the source out so the lock is not held while it runs.
        let source = self.read().find(id).map(|s| Arc::clone(&s.state_source))?;
        Some(source())
    }

    pub fn registration(&self, id: &str) -> Option<StoreRegistration> {
        self.read().find(id).cloned()
    }

    /// Registered ids, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.read().stores.iter().map(|s| s.id.clone()).collect()
    }

    /// Metadata for every registered store.
    pub fn help(&self) -> Value {
        Value::Array(self.read().stores.iter().map(StoreRegistration::metadata).collect())
    }

    /// Writes through the store's writer.
    pub fn write_state(&self, id: &str, path: &[String], value: Value) -> Result<(), ConsoleError> {
        self.run_writer(id, path, Some(value))
    }

    /// Removes the key at `path` through the store's writer.
    pub fn remove_state(&self, id: &str, path: &[String]) -> Result<(), ConsoleError> {
        self.run_writer(id, path, None)
    }

    fn run_writer(&self, id: &str, path: &[String], value: Option<Value>) -> Result<(), ConsoleError> {
        let writer = {
            let table = self.read();
            let store = table
                .find(id)
                .ok_or_else(|| ConsoleError::UnknownStore(id.to_string()))?;
            store
                .writer
                .clone()
                .ok_or_else(|| ConsoleError::ReadOnlyStore(id.to_string()))?
        };
        writer(path, value).map_err(|e| ConsoleError::StoreWrite {
            store: id.to_string(),
            message: e.to_string(),
        })
    }

    /// The `data` namespace over this registry.
    pub fn as_namespace(&self) -> DataNamespace {
        DataNamespace {
            registry: self.clone(),
        }
    }
}

impl fmt::Debug for DataStoreRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataStoreRegistry")
            .field("stores", &self.keys())
            .finish()
    }
}

/// The `data` level of the console namespace.
#[derive(Debug, Clone)]
pub struct DataNamespace {
    registry: DataStoreRegistry,
}

impl DataNamespace {
    /// A live view rooted at store `id`.
    ///
    /// The view looks the store up by id on every read, so it keeps working
    /// if the store is re-registered and resolves to nothing once it is
    /// unregistered.
    pub fn view(&self, id: &str) -> LiveView {
        let registry = self.registry.clone();
        let store_id = id.to_string();
        let source: StateSource =
            Arc::new(move || registry.get_state(&store_id).unwrap_or(Value::Null));
        LiveView::from_slot(SourceSlot::with_source(format!("data.{id}"), source), Vec::new())
    }

    /// `data.<id>`: a view for object state, the value otherwise.
    pub fn get(&self, id: &str) -> Option<Node> {
        match id {
            "__keys__" => Some(Node::Value(json!(self.keys()))),
            "__help__" => Some(Node::Value(self.registry.help())),
            _ => {
                let state = self.registry.get_state(id)?;
                Some(if state.is_object() {
                    Node::View(self.view(id))
                } else {
                    Node::Value(state)
                })
            }
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.registry.keys()
    }

    /// Shape summary for each store: its metadata plus the current kind.
    pub fn describe(&self) -> Value {
        let entries: Vec<Value> = self
            .registry
            .keys()
            .iter()
            .filter_map(|id| {
                let reg = self.registry.registration(id)?;
                let state = (reg.state_source)();
                let mut meta = reg.metadata();
                meta["kind"] = json!(kind_of(&state));
                Some(meta)
            })
            .collect();
        Value::Array(entries)
    }
}
