use pixsim_console::{ConsoleError, ModuleDescriptor, ModuleRegistry, ModuleState};
use pretty_assertions::assert_eq;
use std::sync::Mutex;

/// Records the order in which modules ran.
type RunLog = Mutex<Vec<String>>;

fn module(id: &str, deps: &[&str]) -> ModuleDescriptor<RunLog> {
    let name = id.to_string();
    ModuleDescriptor::new(id, id, "", move |log: &RunLog| {
        log.lock().unwrap().push(name.clone());
        Ok(())
    })
    .depends_on(deps)
}

fn failing(id: &str, deps: &[&str]) -> ModuleDescriptor<RunLog> {
    ModuleDescriptor::new(id, id, "", |_: &RunLog| anyhow::bail!("gpu unavailable"))
        .depends_on(deps)
}

fn ran(log: &RunLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn dependencies_run_first_regardless_of_input_order() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    let order = reg
        .register_all(
            vec![module("c", &["b"]), module("a", &[]), module("b", &["a"])],
            &log,
        )
        .unwrap();

    assert_eq!(order, vec!["a", "b", "c"]);
    assert_eq!(ran(&log), vec!["a", "b", "c"]);
}

#[test]
fn independent_modules_keep_catalog_order() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    reg.register_all(
        vec![module("z", &[]), module("y", &[]), module("x", &[])],
        &log,
    )
    .unwrap();
    assert_eq!(ran(&log), vec!["z", "y", "x"]);
}

#[test]
fn diamond_runs_each_module_once() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    reg.register_all(
        vec![
            module("app", &["left", "right"]),
            module("left", &["base"]),
            module("right", &["base"]),
            module("base", &[]),
        ],
        &log,
    )
    .unwrap();
    assert_eq!(ran(&log), vec!["base", "left", "right", "app"]);
}

// ── Once-only ────────────────────────────────────────────────────

#[test]
fn second_pass_skips_registered_modules() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    reg.register_all(vec![module("a", &[]), module("b", &["a"])], &log)
        .unwrap();

    let second = reg
        .register_all(vec![module("a", &[]), module("c", &["a"])], &log)
        .unwrap();
    assert_eq!(second, vec!["c"]);
    assert_eq!(ran(&log), vec!["a", "b", "c"]);
}

#[test]
fn catalog_then_register_all_with_empty_list() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    reg.register(module("b", &["a"]));
    reg.register(module("a", &[]));
    assert_eq!(reg.state("a"), Some(ModuleState::Unregistered));

    reg.register_all(Vec::new(), &log).unwrap();
    assert_eq!(ran(&log), vec!["a", "b"]);
    assert!(reg.is_registered("a"));
    assert_eq!(reg.state("b"), Some(ModuleState::Registered));
    assert_eq!(reg.state("ghost"), None);
}

#[test]
fn dependency_registered_in_earlier_pass_is_satisfied() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    reg.register_all(vec![module("core", &[])], &log).unwrap();
    reg.register_all(vec![module("feature", &["core"])], &log)
        .unwrap();
    assert_eq!(ran(&log), vec!["core", "feature"]);
    assert_eq!(reg.keys(), vec!["core", "feature"]);
}

// ── Graph errors ─────────────────────────────────────────────────

#[test]
fn cycle_is_reported_before_any_module_runs() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    let err = reg
        .register_all(
            vec![module("ok", &[]), module("a", &["b"]), module("b", &["a"])],
            &log,
        )
        .unwrap_err();

    match &err {
        ConsoleError::CyclicDependency { module, dependency, cycle } => {
            assert_eq!(module, "a");
            assert_eq!(dependency, "b");
            assert_eq!(cycle, &vec!["a".to_string(), "b".into(), "a".into()]);
        }
        other => panic!("expected CyclicDependency, got {other:?}"),
    }
    assert!(err.to_string().contains("a -> b -> a"));
    assert!(ran(&log).is_empty());
    assert_eq!(reg.state("ok"), Some(ModuleState::Unregistered));
}

#[test]
fn self_dependency_is_a_cycle() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    let err = reg.register_all(vec![module("loop", &["loop"])], &log).unwrap_err();
    assert!(matches!(
        err,
        ConsoleError::CyclicDependency { ref module, ref dependency, .. }
            if module == "loop" && dependency == "loop"
    ));
}

#[test]
fn unknown_dependency_is_reported_before_any_module_runs() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    let err = reg
        .register_all(vec![module("a", &[]), module("b", &["missing"])], &log)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "module 'b' depends on unknown module 'missing'"
    );
    assert!(ran(&log).is_empty());
}

// ── Failures ─────────────────────────────────────────────────────

#[test]
fn failing_module_stops_the_pass() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    let err = reg
        .register_all(
            vec![module("a", &[]), failing("gpu", &["a"]), module("c", &["gpu"])],
            &log,
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "module 'gpu' failed to register: gpu unavailable"
    );
    assert_eq!(ran(&log), vec!["a"]);
    assert!(reg.is_registered("a"));
    assert_eq!(reg.state("gpu"), Some(ModuleState::Unregistered));
    assert_eq!(reg.state("c"), Some(ModuleState::Unregistered));
}

#[test]
fn failed_module_can_be_retried_after_replacement() {
    let log = RunLog::default();
    let mut reg = ModuleRegistry::new();
    assert!(reg.register_all(vec![failing("gpu", &[])], &log).is_err());

    let retried = reg.register_all(vec![module("gpu", &[])], &log).unwrap();
    assert_eq!(retried, vec!["gpu"]);
    assert!(reg.is_registered("gpu"));
}

#[test]
fn descriptor_lookup() {
    let mut reg: ModuleRegistry<RunLog> = ModuleRegistry::new();
    reg.register(module("render", &["scene"]));
    let d = reg.descriptor("render").unwrap();
    assert_eq!(d.dependencies, vec!["scene"]);
    assert!(reg.descriptor("scene").is_none());
}
