//! Demo scene and console modules for the pixsim shell.
//!
//! The shell has no real simulation behind it; [`SceneState`] stands in for
//! one so every namespace level has something live to show.

use anyhow::{Context, bail};
use pixsim_console::{
    Console, ConsoleConfig, ConsoleEntry, EntryKind, ModuleDescriptor, OperationDefinition, ParamConstraints,
    ParamSpec, ParamType, Registrar, StoreRegistration, kind_of,
};
use serde_json::{Value, json};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Render quality levels accepted by `ops.render.quality`.
pub const QUALITY_LEVELS: [&str; 3] = ["low", "medium", "high"];

/// Shared scene graph. Clones see the same state.
#[derive(Debug, Clone)]
pub struct SceneState {
    inner: Arc<RwLock<Value>>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(json!({
                "nodes": [],
                "selected": null,
                "camera": {"zoom": 1.0, "x": 0.0, "y": 0.0},
                "render": {"quality": "medium"}
            }))),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Value> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Value> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Value {
        self.read().clone()
    }

    /// Writes `value` at `path`, creating missing object keys on the way.
    pub fn set(&self, path: &[String], value: Value) -> anyhow::Result<()> {
        set_path(&mut self.write(), path, value)
    }

    /// Removes the key or array item at `path`. A missing key is not an error.
    pub fn remove(&self, path: &[String]) -> anyhow::Result<()> {
        let mut state = self.write();
        let Some((last, parents)) = path.split_last() else {
            bail!("cannot remove the scene root");
        };
        let mut target = &mut *state;
        for seg in parents {
            target = match target {
                Value::Object(map) => match map.get_mut(seg) {
                    Some(child) => child,
                    None => return Ok(()),
                },
                Value::Array(items) => {
                    let idx = array_index(seg, items.len())?;
                    &mut items[idx]
                }
                other => bail!("cannot remove '{seg}' inside a {}", kind_of(other)),
            };
        }
        match target {
            Value::Object(map) => {
                map.remove(last);
            }
            Value::Array(items) => {
                let idx = array_index(last, items.len())?;
                items.remove(idx);
            }
            other => bail!("cannot remove '{last}' inside a {}", kind_of(other)),
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.read()["nodes"].as_array().map_or(0, Vec::len)
    }

    pub fn add_node(&self, name: &str, x: f64, y: f64) -> Value {
        let mut state = self.write();
        let next_id = state["nodes"]
            .as_array()
            .and_then(|nodes| nodes.iter().filter_map(|n| n["id"].as_u64()).max())
            .unwrap_or(0)
            + 1;
        let node = json!({"id": next_id, "name": name, "position": {"x": x, "y": y}});
        if let Value::Array(nodes) = &mut state["nodes"] {
            nodes.push(node.clone());
        } else {
            state["nodes"] = json!([node.clone()]);
        }
        debug!(id = next_id, name, "node added");
        node
    }

    pub fn select(&self, id: u64) -> anyhow::Result<Value> {
        let mut state = self.write();
        let node = state["nodes"]
            .as_array()
            .and_then(|nodes| nodes.iter().find(|n| n["id"].as_u64() == Some(id)))
            .cloned()
            .with_context(|| format!("no node with id {id}"))?;
        state["selected"] = json!(id);
        Ok(node)
    }
}

fn set_path(root: &mut Value, path: &[String], value: Value) -> anyhow::Result<()> {
    let Some((last, parents)) = path.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut target = root;
    for seg in parents {
        target = match target {
            Value::Object(map) => map.entry(seg.clone()).or_insert_with(|| json!({})),
            Value::Array(items) => {
                let idx = array_index(seg, items.len())?;
                &mut items[idx]
            }
            other => bail!("cannot set '{seg}' inside a {}", kind_of(other)),
        };
    }

    match target {
        Value::Object(map) => {
            map.insert(last.clone(), value);
        }
        Value::Array(items) => {
            let idx = array_index(last, items.len())?;
            items[idx] = value;
        }
        other => bail!("cannot set '{last}' inside a {}", kind_of(other)),
    }
    Ok(())
}

fn array_index(seg: &str, len: usize) -> anyhow::Result<usize> {
    let idx: usize = seg
        .parse()
        .with_context(|| format!("'{seg}' is not an array index"))?;
    if idx >= len {
        bail!("index {idx} out of range (length {len})");
    }
    Ok(idx)
}

/// What `context` shows in the shell.
pub fn context_snapshot(scene: &SceneState) -> Value {
    let state = scene.snapshot();
    json!({
        "app": "pixsim-shell",
        "version": env!("CARGO_PKG_VERSION"),
        "scene": {
            "nodeCount": state["nodes"].as_array().map_or(0, Vec::len),
            "selected": state["selected"],
        }
    })
}

// ================================================================
// Modules
// ================================================================

/// The shell's console modules, deliberately listed dependents first.
pub fn demo_modules(scene: &SceneState) -> Vec<ModuleDescriptor<Registrar>> {
    vec![render_module(scene), scene_module(scene)]
}

fn scene_module(scene: &SceneState) -> ModuleDescriptor<Registrar> {
    let scene = scene.clone();
    ModuleDescriptor::new("scene", "Scene", "Scene graph store and edits", move |r: &Registrar| {
        let reader = scene.clone();
        let writer = scene.clone();
        r.register_store(
            StoreRegistration::new("scene", "Scene Graph", "Nodes, selection and camera", move || {
                reader.snapshot()
            })
            .with_readable_keys(&["nodes", "selected", "camera", "render"])
            .with_writer(move |path, value| match value {
                Some(value) => writer.set(path, value),
                None => writer.remove(path),
            }),
        );

        r.register_category("scene", "Scene", "Scene graph edits");

        let s = scene.clone();
        r.register_operation(
            "scene",
            OperationDefinition::new("list", "List Nodes", "All nodes in the scene", move |_| {
                Ok(s.snapshot()["nodes"].clone())
            }),
        )?;

        let s = scene.clone();
        r.register_operation(
            "scene",
            OperationDefinition::new("add_node", "Add Node", "Add a node at a position", move |args| {
                let name = args.require_str("name")?;
                Ok(s.add_node(
                    name,
                    args.f64("x").unwrap_or_default(),
                    args.f64("y").unwrap_or_default(),
                ))
            })
            .with_param(
                ParamSpec::required("name", ParamType::String, "Node name").with_constraints(ParamConstraints {
                    min_length: Some(1),
                    max_length: Some(64),
                    ..Default::default()
                }),
            )
            .with_param(ParamSpec::optional("x", ParamType::Number, "X position").with_default(json!(0.0)))
            .with_param(ParamSpec::optional("y", ParamType::Number, "Y position").with_default(json!(0.0))),
        )?;

        let s = scene.clone();
        r.register_operation(
            "scene",
            OperationDefinition::new("select", "Select Node", "Select a node by id", move |args| {
                let id = args.i64("id").context("missing id")?;
                s.select(u64::try_from(id)?)
            })
            .with_param(
                ParamSpec::required("id", ParamType::Integer, "Node id").with_constraints(ParamConstraints {
                    min: Some(1.0),
                    ..Default::default()
                }),
            ),
        )?;

        let s = scene.clone();
        r.register_operation(
            "scene",
            OperationDefinition::new("zoom", "Set Zoom", "Set the camera zoom", move |args| {
                let level = args.f64("level").context("missing level")?;
                s.set(&["camera".into(), "zoom".into()], json!(level))?;
                Ok(json!(level))
            })
            .with_param(
                ParamSpec::required("level", ParamType::Number, "Zoom factor")
                    .with_constraints(ParamConstraints::range(0.1, 10.0)),
            ),
        )?;

        Ok(())
    })
}

fn render_module(scene: &SceneState) -> ModuleDescriptor<Registrar> {
    let scene = scene.clone();
    ModuleDescriptor::new("render", "Render", "Render statistics and settings", move |r: &Registrar| {
        let reader = scene.clone();
        r.register_store(StoreRegistration::new(
            "render",
            "Render Stats",
            "Derived frame statistics (read-only)",
            move || render_stats(&reader),
        ));

        r.register_category("render", "Render", "Render settings and captures");

        let s = scene.clone();
        r.register_operation(
            "render",
            OperationDefinition::new("quality", "Set Quality", "Set render quality", move |args| {
                let level = args.require_str("level")?;
                s.set(&["render".into(), "quality".into()], json!(level))?;
                Ok(json!(level))
            })
            .with_param(
                ParamSpec::required("level", ParamType::String, "Quality level").with_constraints(
                    ParamConstraints::one_of(QUALITY_LEVELS.iter().map(|q| json!(q)).collect()),
                ),
            ),
        )?;

        let s = scene.clone();
        r.register_operation(
            "render",
            OperationDefinition::deferred("capture", "Capture Frame", "Render a frame after a delay", move |args| {
                let s = s.clone();
                let delay = args.i64("delay_ms").unwrap_or_default().max(0).unsigned_abs();
                async move {
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    let stats = render_stats(&s);
                    info!(nodes = %stats["nodeCount"], "frame captured");
                    Ok::<_, anyhow::Error>(json!({"captured": true, "stats": stats}))
                }
            })
            .with_param(
                ParamSpec::optional("delay_ms", ParamType::Integer, "Delay before capture")
                    .with_constraints(ParamConstraints::range(0.0, 5000.0))
                    .with_default(json!(50)),
            ),
        )?;

        Ok(())
    })
    .depends_on(&["scene"])
}

fn render_stats(scene: &SceneState) -> Value {
    let state = scene.snapshot();
    json!({
        "nodeCount": state["nodes"].as_array().map_or(0, Vec::len),
        "zoom": state["camera"]["zoom"],
        "quality": state["render"]["quality"],
    })
}

/// Builds a console with the demo modules registered and `context`
/// initialized.
pub fn build_console(config: ConsoleConfig) -> anyhow::Result<(Console, SceneState)> {
    let scene = SceneState::new();
    let mut console = Console::new(config);

    let ns = console.namespace_mut();
    let ran = ns.register_modules(demo_modules(&scene))?;
    let ctx = scene.clone();
    ns.initialize(move || context_snapshot(&ctx));

    info!(modules = ?ran, "demo modules registered");
    console.log_mut().info("pixsim console ready; type help() for usage");
    Ok((console, scene))
}

/// Terminal form of a log entry; `None` for entries not echoed.
pub fn format_entry(entry: &ConsoleEntry) -> Option<String> {
    match entry.kind {
        EntryKind::Input => None,
        EntryKind::Output => Some(entry.content.clone()),
        EntryKind::Error => Some(format!("error: {}", entry.content)),
        EntryKind::Info => Some(format!("[{}] {}", entry.timestamp, entry.content)),
    }
}
