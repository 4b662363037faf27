//! Operation registry.
//!
//! Operations are grouped into categories that must be declared first.
//! The registry keeps only metadata and handler references; operations act
//! on external state themselves. A duplicate `(category, id)` registration
//! replaces the earlier one and logs a warning, the same policy the store
//! and module registries follow.

use crate::error::ConsoleError;
use crate::live::kind_of;
use crate::operation::{Execution, OperationArgs, OperationDefinition};
use crate::outcome::Outcome;
use futures::FutureExt;
use serde_json::{Value, json};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

struct Category {
    id: String,
    display_name: String,
    description: String,
    operations: Vec<Arc<OperationDefinition>>,
}

impl Category {
    fn find(&self, op_id: &str) -> Option<&Arc<OperationDefinition>> {
        self.operations.iter().find(|op| op.id == op_id)
    }

    fn operation_ids(&self) -> Vec<String> {
        self.operations.iter().map(|op| op.id.clone()).collect()
    }
}

#[derive(Default)]
struct OperationTable {
    categories: Vec<Category>,
}

impl OperationTable {
    fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    fn category_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }
}

/// Catalog of invokable operations. Clones share the same table.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    table: Arc<RwLock<OperationTable>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, OperationTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, OperationTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ================================================================
    // Registration
    // ================================================================

    /// Declares a category. Re-declaring updates its metadata and keeps its
    /// operations.
    pub fn register_category(&self, id: &str, display_name: &str, description: &str) {
        let mut table = self.write();
        match table.category_mut(id) {
            Some(existing) => {
                warn!(category = %id, "category already registered; updating metadata");
                existing.display_name = display_name.into();
                existing.description = description.into();
            }
            None => {
                debug!(category = %id, "category registered");
                table.categories.push(Category {
                    id: id.into(),
                    display_name: display_name.into(),
                    description: description.into(),
                    operations: Vec::new(),
                });
            }
        }
    }

    /// Adds an operation to a declared category.
    pub fn register(&self, category: &str, op: OperationDefinition) -> Result<(), ConsoleError> {
        let mut table = self.write();
        let cat = table
            .category_mut(category)
            .ok_or_else(|| ConsoleError::UnknownCategory(category.to_string()))?;

        match cat.operations.iter_mut().find(|existing| existing.id == op.id) {
            Some(existing) => {
                warn!(category = %category, operation = %op.id, "operation already registered; overwriting");
                *existing = Arc::new(op);
            }
            None => {
                debug!(category = %category, operation = %op.id, "operation registered");
                cat.operations.push(Arc::new(op));
            }
        }
        Ok(())
    }

    /// Removes an operation. Returns whether one existed.
    pub fn unregister(&self, category: &str, op_id: &str) -> bool {
        let mut table = self.write();
        match table.category_mut(category) {
            Some(cat) => {
                let before = cat.operations.len();
                cat.operations.retain(|op| op.id != op_id);
                before != cat.operations.len()
            }
            None => false,
        }
    }

    // ================================================================
    // Queries
    // ================================================================

    /// Category ids, in declaration order.
    pub fn categories(&self) -> Vec<String> {
        self.read().categories.iter().map(|c| c.id.clone()).collect()
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.read().category(id).is_some()
    }

    /// Operation ids in `category`, in registration order.
    pub fn operation_ids(&self, category: &str) -> Result<Vec<String>, ConsoleError> {
        self.read()
            .category(category)
            .map(Category::operation_ids)
            .ok_or_else(|| ConsoleError::UnknownCategory(category.to_string()))
    }

    pub fn get(&self, category: &str, op_id: &str) -> Result<Arc<OperationDefinition>, ConsoleError> {
        let table = self.read();
        let cat = table
            .category(category)
            .ok_or_else(|| ConsoleError::UnknownCategory(category.to_string()))?;
        cat.find(op_id)
            .cloned()
            .ok_or_else(|| ConsoleError::UnknownOperation {
                category: category.to_string(),
                operation: op_id.to_string(),
                available: cat.operation_ids(),
            })
    }

    /// Metadata for one operation.
    pub fn describe(&self, category: &str, op_id: &str) -> Result<Value, ConsoleError> {
        Ok(self.get(category, op_id)?.describe(category))
    }

    /// Metadata for a category and its operations.
    pub fn describe_category(&self, category: &str) -> Result<Value, ConsoleError> {
        let table = self.read();
        let cat = table
            .category(category)
            .ok_or_else(|| ConsoleError::UnknownCategory(category.to_string()))?;
        let ops: Vec<Value> = cat.operations.iter().map(|op| op.describe(&cat.id)).collect();
        Ok(json!({
            "id": cat.id,
            "displayName": cat.display_name,
            "description": cat.description,
            "operations": ops,
        }))
    }

    // ================================================================
    // Invocation
    // ================================================================

    /// Validates `args` against the operation's parameters and runs it.
    ///
    /// Handler errors become [`ConsoleError::OperationFailed`] carrying the
    /// original message, whether the handler fails immediately or later.
    pub fn invoke(&self, category: &str, op_id: &str, args: Vec<Value>) -> Result<Outcome, ConsoleError> {
        // The handler runs without the table lock so it may register or query.
        let op = self.get(category, op_id)?;
        let validated = validate(&op, args)?;

        let fail = {
            let category = category.to_string();
            let operation = op_id.to_string();
            move |e: anyhow::Error| ConsoleError::OperationFailed {
                category,
                operation,
                message: format!("{e:#}"),
            }
        };

        match op.execute(&validated) {
            Execution::Ready(Ok(value)) => Ok(Outcome::Ready(value)),
            Execution::Ready(Err(e)) => Err(fail(e)),
            Execution::Deferred(fut) => Ok(Outcome::Pending(fut.map(|r| r.map_err(fail)).boxed())),
        }
    }

    /// The `ops` namespace over this registry.
    pub fn as_namespace(&self) -> OpsNamespace {
        OpsNamespace {
            registry: self.clone(),
        }
    }
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("categories", &self.categories())
            .finish()
    }
}

/// Matches positional `args` to the declared parameters.
fn validate(op: &OperationDefinition, args: Vec<Value>) -> Result<OperationArgs, ConsoleError> {
    let mut args = args.into_iter();
    let mut named = Vec::with_capacity(op.parameters.len());

    for spec in &op.parameters {
        let invalid = |reason: String| ConsoleError::InvalidParameter {
            operation: op.id.clone(),
            parameter: spec.name.clone(),
            expected: spec.param_type.to_string(),
            reason,
        };

        // An explicit null for an optional parameter counts as omitted.
        let supplied = match args.next() {
            Some(Value::Null) if !spec.required => None,
            other => other,
        };

        let value = match supplied {
            Some(value) => value,
            None if spec.required => return Err(invalid("missing required argument".into())),
            None => match &spec.default {
                Some(default) => default.clone(),
                None => continue,
            },
        };

        if !spec.param_type.matches(&value) {
            return Err(invalid(format!("got {}", kind_of(&value))));
        }
        if let Some(constraints) = &spec.constraints {
            constraints.check(&value).map_err(invalid)?;
        }
        named.push((spec.name.clone(), value));
    }

    Ok(OperationArgs::new(named, args.collect()))
}

/// The `ops` level of the console namespace.
#[derive(Debug, Clone)]
pub struct OpsNamespace {
    registry: OperationRegistry,
}

impl OpsNamespace {
    /// `ops.__keys__`
    pub fn keys(&self) -> Vec<String> {
        self.registry.categories()
    }

    /// `ops.<category>`
    pub fn category(&self, id: &str) -> Result<CategoryNamespace, ConsoleError> {
        if !self.registry.has_category(id) {
            return Err(ConsoleError::UnknownCategory(id.to_string()));
        }
        Ok(CategoryNamespace {
            registry: self.registry.clone(),
            category: id.to_string(),
        })
    }

    /// `ops.__help__`: every category with its operations.
    pub fn help(&self) -> Value {
        Value::Array(
            self.keys()
                .iter()
                .filter_map(|c| self.registry.describe_category(c).ok())
                .collect(),
        )
    }
}

/// One category inside the `ops` namespace.
#[derive(Debug, Clone)]
pub struct CategoryNamespace {
    registry: OperationRegistry,
    category: String,
}

impl CategoryNamespace {
    pub fn id(&self) -> &str {
        &self.category
    }

    /// `ops.<category>.__keys__`
    pub fn keys(&self) -> Result<Vec<String>, ConsoleError> {
        self.registry.operation_ids(&self.category)
    }

    /// `ops.<category>.<op>.__describe__`
    pub fn describe(&self, op_id: &str) -> Result<Value, ConsoleError> {
        self.registry.describe(&self.category, op_id)
    }

    /// `ops.<category>.__help__`
    pub fn help(&self) -> Result<Value, ConsoleError> {
        self.registry.describe_category(&self.category)
    }

    /// `ops.<category>.<op>(...args)`
    pub fn call(&self, op_id: &str, args: Vec<Value>) -> Result<Outcome, ConsoleError> {
        self.registry.invoke(&self.category, op_id, args)
    }
}
