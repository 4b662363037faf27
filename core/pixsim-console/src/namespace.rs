//! Namespace façade: the `context` / `data` / `ops` tree the console sees.
//!
//! Registries are explicit instances owned by the namespace (one per
//! application, passed down), so tests can build isolated ones. Every read
//! goes back to the registries and state sources; nothing is cached here.

use crate::config::ConsoleConfig;
use crate::error::ConsoleError;
use crate::live::{LiveView, SourceSlot, StateSource};
use crate::modules::{ModuleDescriptor, ModuleRegistry};
use crate::operation::OperationDefinition;
use crate::operations::{OperationRegistry, OpsNamespace};
use crate::outcome::Outcome;
use crate::overrides::{OverrideHistory, UndoOutcome};
use crate::script::{self, Expr};
use crate::stores::{DataNamespace, DataStoreRegistry, StoreRegistration};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, warn};

/// Static usage summary printed by `help()`.
pub const HELP_TEXT: &str = "\
pixsim console

  context.<path>                 live application context
  context.__keys__               keys at a context path
  data.__keys__                  registered stores
  data.__help__                  store metadata
  data.<store>.<path>            live store state
  ops.__keys__                   operation categories
  ops.<category>.__keys__        operations in a category
  ops.<category>.<op>.__describe__
                                 parameters of an operation
  ops.<category>.<op>(a, b, ...) invoke (arguments are JSON)
  set(\"store\", \"a.b\", value)     override a store value
  undo()                         revert the latest override
  help()                         this text

Any path may be prefixed with the root name, e.g. pixsim.ops.__keys__";

/// Handle given to modules while they register. Clones share the
/// underlying registries.
#[derive(Debug, Clone)]
pub struct Registrar {
    stores: DataStoreRegistry,
    ops: OperationRegistry,
}

impl Registrar {
    pub fn register_store(&self, registration: StoreRegistration) {
        self.stores.register(registration);
    }

    pub fn register_category(&self, id: &str, display_name: &str, description: &str) {
        self.ops.register_category(id, display_name, description);
    }

    pub fn register_operation(&self, category: &str, op: OperationDefinition) -> Result<(), ConsoleError> {
        self.ops.register(category, op)
    }

    pub fn stores(&self) -> &DataStoreRegistry {
        &self.stores
    }

    pub fn operations(&self) -> &OperationRegistry {
        &self.ops
    }
}

#[derive(Debug)]
pub struct Namespace {
    config: ConsoleConfig,
    context: Arc<SourceSlot>,
    registrar: Registrar,
    modules: ModuleRegistry<Registrar>,
    overrides: OverrideHistory,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new(ConsoleConfig::default())
    }
}

impl Namespace {
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            context: SourceSlot::empty("context"),
            registrar: Registrar {
                stores: DataStoreRegistry::new(),
                ops: OperationRegistry::new(),
            },
            modules: ModuleRegistry::new(),
            overrides: OverrideHistory::new(config.max_undo),
            config,
        }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// Installs the getter behind `context`. Calling again replaces it
    /// (last writer wins) and logs a warning.
    pub fn initialize<F>(&self, context_getter: F)
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        let getter: StateSource = Arc::new(context_getter);
        if self.context.install(getter) {
            warn!("namespace initialized twice; replacing context getter");
        } else {
            info!("namespace initialized");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.context.is_installed()
    }

    // ================================================================
    // Registration API
    // ================================================================

    pub fn registrar(&self) -> &Registrar {
        &self.registrar
    }

    pub fn register_store(&self, registration: StoreRegistration) {
        self.registrar.register_store(registration);
    }

    pub fn register_category(&self, id: &str, display_name: &str, description: &str) {
        self.registrar.register_category(id, display_name, description);
    }

    pub fn register_operation(&self, category: &str, op: OperationDefinition) -> Result<(), ConsoleError> {
        self.registrar.register_operation(category, op)
    }

    /// Catalogs a module; it runs on the next [`Self::register_modules`].
    pub fn register_module(&mut self, descriptor: ModuleDescriptor<Registrar>) {
        self.modules.register(descriptor);
    }

    /// Catalogs `descriptors` and runs every pending module in dependency
    /// order. Returns the ids that ran.
    pub fn register_modules(
        &mut self,
        descriptors: Vec<ModuleDescriptor<Registrar>>,
    ) -> Result<Vec<String>, ConsoleError> {
        self.modules.register_all(descriptors, &self.registrar)
    }

    pub fn modules(&self) -> &ModuleRegistry<Registrar> {
        &self.modules
    }

    // ================================================================
    // Namespace levels
    // ================================================================

    /// `context`: a live view over the initialized getter.
    pub fn context(&self) -> LiveView {
        LiveView::from_slot(Arc::clone(&self.context), Vec::new())
    }

    /// `data`
    pub fn data(&self) -> DataNamespace {
        self.registrar.stores.as_namespace()
    }

    /// `ops`
    pub fn ops(&self) -> OpsNamespace {
        self.registrar.ops.as_namespace()
    }

    pub fn stores(&self) -> &DataStoreRegistry {
        &self.registrar.stores
    }

    pub fn operations(&self) -> &OperationRegistry {
        &self.registrar.ops
    }

    pub fn keys(&self) -> Vec<String> {
        vec!["context".into(), "data".into(), "ops".into()]
    }

    pub fn help(&self) -> &'static str {
        HELP_TEXT
    }

    // ================================================================
    // Overrides
    // ================================================================

    /// Writes `value` at `store_id.path` and records it for undo.
    pub fn set_override(&mut self, store_id: &str, path: Vec<String>, value: Value) -> Result<Value, ConsoleError> {
        let record = self
            .overrides
            .apply(&self.registrar.stores, store_id, path, value)?;
        Ok(serde_json::to_value(record)?)
    }

    /// Reverts the most recent override.
    pub fn undo(&mut self) -> Result<UndoOutcome, ConsoleError> {
        self.overrides.undo(&self.registrar.stores)
    }

    pub fn overrides(&self) -> &OverrideHistory {
        &self.overrides
    }

    // ================================================================
    // Evaluation
    // ================================================================

    /// Parses and evaluates one console line.
    pub fn evaluate(&mut self, line: &str) -> Result<Outcome, ConsoleError> {
        match script::parse(line, &self.config.root_name)? {
            Expr::Path(path) => self.resolve(&path).map(Outcome::Ready),
            Expr::Call { target, args } => self.call(&target, args),
        }
    }

    /// Reads a dotted path from the namespace tree.
    pub fn resolve<S: AsRef<str>>(&self, path: &[S]) -> Result<Value, ConsoleError> {
        let segs: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        match segs.as_slice() {
            [] | ["__keys__"] => Ok(json!(self.keys())),
            ["help"] | ["__help__"] => Ok(json!(HELP_TEXT)),
            ["context", rest @ ..] => {
                if !self.is_initialized() {
                    // Reading through the view logs the one-time warning.
                    let _ = self.context().value();
                    return Ok(Value::Null);
                }
                read_view(&self.context(), rest, &segs)
            }
            ["data"] | ["data", "__keys__"] => Ok(json!(self.data().keys())),
            ["data", "__help__"] => Ok(self.registrar.stores.help()),
            ["data", "__describe__"] => Ok(self.data().describe()),
            ["data", store, rest @ ..] => {
                if !self.registrar.stores.contains(store) {
                    return Err(ConsoleError::UnknownStore((*store).to_string()));
                }
                read_view(&self.data().view(store), rest, &segs)
            }
            ["ops"] | ["ops", "__keys__"] => Ok(json!(self.ops().keys())),
            ["ops", "__help__"] => Ok(self.ops().help()),
            ["ops", category] | ["ops", category, "__keys__"] => {
                Ok(json!(self.ops().category(category)?.keys()?))
            }
            ["ops", category, "__help__" | "__describe__"] => self.ops().category(category)?.help(),
            ["ops", category, op] | ["ops", category, op, "__describe__"] => {
                self.registrar.ops.describe(category, op)
            }
            _ => Err(ConsoleError::UnknownPath(segs.join("."))),
        }
    }

    /// Calls a function in the namespace tree.
    pub fn call<S: AsRef<str>>(&mut self, target: &[S], args: Vec<Value>) -> Result<Outcome, ConsoleError> {
        let segs: Vec<&str> = target.iter().map(AsRef::as_ref).collect();
        match segs.as_slice() {
            ["help"] => Ok(Outcome::Ready(json!(HELP_TEXT))),
            ["undo"] => Ok(Outcome::Ready(json!(self.undo()?.message()))),
            ["set"] => {
                let (store, path, value) = match args.as_slice() {
                    [Value::String(store), path, value] => (store.clone(), script::path_arg(path)?, value.clone()),
                    _ => {
                        return Err(ConsoleError::InvalidParameter {
                            operation: "set".into(),
                            parameter: "args".into(),
                            expected: "(store: string, path: string, value: any)".into(),
                            reason: format!("got {} argument(s)", args.len()),
                        });
                    }
                };
                self.set_override(&store, path, value).map(Outcome::Ready)
            }
            ["ops", category, op] => self.registrar.ops.invoke(category, op, args),
            _ => Err(ConsoleError::UnknownPath(format!("{} is not callable", segs.join(".")))),
        }
    }
}

/// Reads `rest` below `view`, honoring the `__keys__` / `__describe__`
/// suffixes. `full` is the whole path, for error messages.
fn read_view(view: &LiveView, rest: &[&str], full: &[&str]) -> Result<Value, ConsoleError> {
    let unknown = || ConsoleError::UnknownPath(full.join("."));
    match rest.split_last() {
        Some((&"__keys__", parents)) => Ok(json!(descend(view, parents).keys())),
        Some((&"__describe__" | &"__help__", parents)) => {
            let target = descend(view, parents);
            if !parents.is_empty() && target.value().is_none() {
                return Err(unknown());
            }
            Ok(target.describe())
        }
        _ => view
            .at(rest)
            .and_then(|node| node.into_value())
            .ok_or_else(unknown),
    }
}

fn descend(view: &LiveView, segments: &[&str]) -> LiveView {
    segments.iter().fold(view.clone(), |v, seg| v.child(seg))
}
