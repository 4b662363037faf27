//! Module registry: ordered, once-only startup registration.
//!
//! Modules declare the ids of modules they depend on. [`ModuleRegistry::register`]
//! only catalogs a descriptor; [`ModuleRegistry::register_all`] resolves the
//! dependency graph and runs each pending module's `register` exactly once,
//! dependencies first, ties broken by catalog order.
//!
//! Graph errors (unknown dependency, cycle) are detected before any module
//! runs. A failing `register` stops the pass immediately: later modules may
//! rely on what it was supposed to set up.

use crate::error::ConsoleError;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type RegisterFn<C> = Arc<dyn Fn(&C) -> anyhow::Result<()> + Send + Sync>;

/// A unit of startup registration. `C` is what `register` receives.
pub struct ModuleDescriptor<C> {
    pub id: String,
    pub display_name: String,
    pub description: String,
    pub dependencies: Vec<String>,
    register: RegisterFn<C>,
}

impl<C> ModuleDescriptor<C> {
    pub fn new<F>(id: &str, display_name: &str, description: &str, register: F) -> Self
    where
        F: Fn(&C) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: description.into(),
            dependencies: Vec::new(),
            register: Arc::new(register),
        }
    }

    #[must_use]
    pub fn depends_on(mut self, ids: &[&str]) -> Self {
        self.dependencies.extend(ids.iter().map(|id| (*id).to_string()));
        self
    }
}

impl<C> Clone for ModuleDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            description: self.description.clone(),
            dependencies: self.dependencies.clone(),
            register: Arc::clone(&self.register),
        }
    }
}

impl<C> fmt::Debug for ModuleDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Lifecycle of a cataloged module. `Registered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Unregistered,
    Registering,
    Registered,
}

pub struct ModuleRegistry<C> {
    /// Catalog order doubles as the tie-breaker for resolution.
    modules: Vec<ModuleDescriptor<C>>,
    states: HashMap<String, ModuleState>,
}

impl<C> Default for ModuleRegistry<C> {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
            states: HashMap::new(),
        }
    }
}

impl<C> ModuleRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor to the catalog without running it.
    ///
    /// Re-cataloging an id replaces its descriptor (warning logged). A module
    /// that already ran is not run again.
    pub fn register(&mut self, descriptor: ModuleDescriptor<C>) {
        match self.modules.iter_mut().find(|m| m.id == descriptor.id) {
            Some(existing) => {
                if descriptor.dependencies != existing.dependencies
                    || !Arc::ptr_eq(&descriptor.register, &existing.register)
                {
                    warn!(module = %descriptor.id, "module already cataloged; overwriting descriptor");
                }
                *existing = descriptor;
            }
            None => {
                self.states
                    .insert(descriptor.id.clone(), ModuleState::Unregistered);
                self.modules.push(descriptor);
            }
        }
    }

    /// Catalogs `descriptors` and runs every pending module in dependency
    /// order. Returns the ids that ran during this call, in run order.
    pub fn register_all(
        &mut self,
        descriptors: Vec<ModuleDescriptor<C>>,
        ctx: &C,
    ) -> Result<Vec<String>, ConsoleError> {
        for descriptor in descriptors {
            self.register(descriptor);
        }

        let order = self.resolve_order()?;
        let mut ran = Vec::with_capacity(order.len());

        for idx in order {
            let module = &self.modules[idx];
            let id = module.id.clone();
            let register = Arc::clone(&module.register);

            self.states.insert(id.clone(), ModuleState::Registering);
            debug!(module = %id, "registering module");

            if let Err(e) = register(ctx) {
                // No failed state: the module can be retried by a later pass.
                self.states.insert(id.clone(), ModuleState::Unregistered);
                return Err(ConsoleError::ModuleFailed {
                    module: id,
                    message: format!("{e:#}"),
                });
            }

            self.states.insert(id.clone(), ModuleState::Registered);
            ran.push(id);
        }

        if !ran.is_empty() {
            info!(count = ran.len(), modules = ?ran, "modules registered");
        }
        Ok(ran)
    }

    /// Kahn's algorithm over pending modules. Dependencies that already ran
    /// count as satisfied; the smallest catalog index is always taken first.
    fn resolve_order(&self) -> Result<Vec<usize>, ConsoleError> {
        let index: HashMap<&str, usize> = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, m)| (m.id.as_str(), i))
            .collect();

        let pending: Vec<usize> = (0..self.modules.len())
            .filter(|&i| !self.is_registered(&self.modules[i].id))
            .collect();

        let mut in_degree: HashMap<usize, usize> = HashMap::new();
        let mut dependents: HashMap<usize, Vec<usize>> = HashMap::new();

        for &i in &pending {
            let module = &self.modules[i];
            let mut degree = 0;
            for dep in &module.dependencies {
                let &d = index.get(dep.as_str()).ok_or_else(|| {
                    ConsoleError::UnknownModuleDependency {
                        module: module.id.clone(),
                        dependency: dep.clone(),
                    }
                })?;
                if !self.is_registered(dep) {
                    degree += 1;
                    dependents.entry(d).or_default().push(i);
                }
            }
            in_degree.insert(i, degree);
        }

        let mut ready: BTreeSet<usize> = pending
            .iter()
            .copied()
            .filter(|i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(pending.len());

        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &next in dependents.get(&i).map(Vec::as_slice).unwrap_or_default() {
                if let Some(degree) = in_degree.get_mut(&next) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(next);
                    }
                }
            }
        }

        if order.len() < pending.len() {
            return Err(self.cycle_error(&pending, &order));
        }
        Ok(order)
    }

    /// Builds the error for modules left unresolved by [`Self::resolve_order`].
    fn cycle_error(&self, pending: &[usize], resolved: &[usize]) -> ConsoleError {
        let stuck: Vec<usize> = pending
            .iter()
            .copied()
            .filter(|i| !resolved.contains(i))
            .collect();
        let stuck_dep = |i: usize| {
            self.modules[i]
                .dependencies
                .iter()
                .find_map(|dep| stuck.iter().copied().find(|&j| self.modules[j].id == *dep))
        };

        // Follow unresolved edges from the first stuck module until one repeats.
        let mut path = vec![stuck[0]];
        let cycle_start = loop {
            let Some(next) = path.last().and_then(|&cur| stuck_dep(cur)) else {
                break 0;
            };
            if let Some(pos) = path.iter().position(|&p| p == next) {
                path.push(next);
                break pos;
            }
            path.push(next);
        };

        let cycle: Vec<String> = path[cycle_start..]
            .iter()
            .map(|&i| self.modules[i].id.clone())
            .collect();
        let module = cycle.first().cloned().unwrap_or_default();
        let dependency = cycle.get(1).cloned().unwrap_or_default();
        ConsoleError::CyclicDependency {
            module,
            dependency,
            cycle,
        }
    }

    /// All cataloged ids, in catalog order.
    pub fn keys(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }

    pub fn state(&self, id: &str) -> Option<ModuleState> {
        self.states.get(id).copied()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.state(id) == Some(ModuleState::Registered)
    }

    pub fn descriptor(&self, id: &str) -> Option<&ModuleDescriptor<C>> {
        self.modules.iter().find(|m| m.id == id)
    }
}

impl<C> fmt::Debug for ModuleRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.keys())
            .field("states", &self.states)
            .finish()
    }
}
