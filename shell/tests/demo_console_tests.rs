use pixsim_console::{ConsoleConfig, EntryKind};
use pixsim_shell::{SceneState, build_console, format_entry};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn result_of(console: &mut pixsim_console::Console, line: &str) -> serde_json::Value {
    let entry = console.submit(line).await.unwrap();
    assert_eq!(entry.kind, EntryKind::Output, "{line} failed: {}", entry.content);
    entry.result.unwrap()
}

#[tokio::test]
async fn modules_register_in_dependency_order() {
    let (console, _) = build_console(ConsoleConfig::default()).unwrap();
    let ns = console.namespace();
    assert!(ns.modules().is_registered("scene"));
    assert!(ns.modules().is_registered("render"));
    assert_eq!(ns.stores().keys(), vec!["scene", "render"]);
    assert_eq!(ns.operations().categories(), vec!["scene", "render"]);
}

#[tokio::test]
async fn context_tracks_scene() {
    let (mut console, scene) = build_console(ConsoleConfig::default()).unwrap();
    assert_eq!(result_of(&mut console, "context.scene.nodeCount").await, json!(0));

    scene.add_node("rock", 1.0, 2.0);
    assert_eq!(result_of(&mut console, "context.scene.nodeCount").await, json!(1));
    assert_eq!(result_of(&mut console, "context.app").await, json!("pixsim-shell"));
}

#[tokio::test]
async fn add_select_and_list_nodes() {
    let (mut console, scene) = build_console(ConsoleConfig::default()).unwrap();
    let node = result_of(&mut console, r#"ops.scene.add_node("tree", 3)"#).await;
    assert_eq!(node, json!({"id": 1, "name": "tree", "position": {"x": 3.0, "y": 0.0}}));

    result_of(&mut console, "ops.scene.select(1)").await;
    assert_eq!(scene.snapshot()["selected"], json!(1));
    assert_eq!(result_of(&mut console, "data.scene.nodes.0.name").await, json!("tree"));
    assert_eq!(scene.node_count(), 1);
}

#[tokio::test]
async fn invalid_arguments_are_logged_as_errors() {
    let (mut console, _) = build_console(ConsoleConfig::default()).unwrap();
    let entry = console.submit(r#"ops.scene.add_node("")"#).await.unwrap();
    assert_eq!(entry.kind, EntryKind::Error);
    assert!(entry.content.contains("length must be >= 1"));

    let entry = console.submit("ops.scene.select(9)").await.unwrap();
    assert_eq!(entry.content, "operation scene.select failed: no node with id 9");

    let entry = console.submit(r#"ops.render.quality("ultra")"#).await.unwrap();
    assert!(entry.is_error());
}

#[tokio::test]
async fn render_store_is_read_only_and_derived() {
    let (mut console, _) = build_console(ConsoleConfig::default()).unwrap();
    result_of(&mut console, "ops.scene.zoom(2.5)").await;
    result_of(&mut console, r#"ops.render.quality("high")"#).await;
    assert_eq!(
        result_of(&mut console, "data.render").await,
        json!({"nodeCount": 0, "zoom": 2.5, "quality": "high"})
    );

    let entry = console.submit(r#"set("render", "zoom", 1)"#).await.unwrap();
    assert_eq!(entry.content, "store 'render' is read-only");
}

#[tokio::test]
async fn capture_is_deferred() {
    let (mut console, _) = build_console(ConsoleConfig::default()).unwrap();
    let result = result_of(&mut console, "ops.render.capture(0)").await;
    assert_eq!(result["captured"], json!(true));
    assert_eq!(result["stats"]["quality"], json!("medium"));
}

#[tokio::test]
async fn override_and_undo_through_the_shell() {
    let (mut console, scene) = build_console(ConsoleConfig::default()).unwrap();
    result_of(&mut console, r#"set("scene", "camera.zoom", 4)"#).await;
    assert_eq!(scene.snapshot()["camera"]["zoom"], json!(4));

    let message = result_of(&mut console, "undo()").await;
    assert_eq!(message, json!("restored scene.camera.zoom to 1.0"));
    assert_eq!(scene.snapshot()["camera"]["zoom"], json!(1.0));
}

#[tokio::test]
async fn undo_of_a_new_key_removes_it() {
    let (mut console, scene) = build_console(ConsoleConfig::default()).unwrap();
    let before = result_of(&mut console, "data.scene.camera.__keys__").await;

    result_of(&mut console, r#"set("scene", "camera.fov", 70)"#).await;
    assert_eq!(scene.snapshot()["camera"]["fov"], json!(70));

    let message = result_of(&mut console, "undo()").await;
    assert_eq!(message, json!("removed scene.camera.fov"));
    assert_eq!(result_of(&mut console, "data.scene.camera.__keys__").await, before);
    assert!(scene.snapshot()["camera"].get("fov").is_none());
}

#[test]
fn scene_remove_drops_keys_and_items() {
    let scene = SceneState::new();
    scene.add_node("a", 0.0, 0.0);
    scene.remove(&["camera".into(), "x".into()]).unwrap();
    assert_eq!(scene.snapshot()["camera"], json!({"zoom": 1.0, "y": 0.0}));

    scene.remove(&["nodes".into(), "0".into()]).unwrap();
    assert_eq!(scene.node_count(), 0);

    scene.remove(&["debug".into(), "wireframe".into()]).unwrap();
    assert!(scene.remove(&[]).is_err());
}

#[test]
fn scene_set_creates_missing_keys_and_rejects_primitives() {
    let scene = SceneState::new();
    scene.set(&["camera".into(), "fov".into()], json!(70)).unwrap();
    assert_eq!(scene.snapshot()["camera"]["fov"], json!(70));

    scene.set(&["debug".into(), "wireframe".into()], json!(true)).unwrap();
    assert_eq!(scene.snapshot()["debug"], json!({"wireframe": true}));

    let err = scene.set(&["selected".into(), "x".into()], json!(1)).unwrap_err();
    assert_eq!(err.to_string(), "cannot set 'x' inside a null");

    let err = scene.set(&["nodes".into(), "3".into()], json!({})).unwrap_err();
    assert!(err.to_string().contains("out of range"));
}

#[tokio::test]
async fn format_entry_hides_inputs() {
    let (mut console, _) = build_console(ConsoleConfig::default()).unwrap();
    console.submit("data.__keys__").await;
    let entries: Vec<_> = console.log().entries().filter_map(format_entry).collect();
    // Startup info line, then the output
    assert_eq!(entries.len(), 2);
    assert!(entries[0].ends_with("pixsim console ready; type help() for usage"));
    assert_eq!(entries[1], "[\n  \"scene\",\n  \"render\"\n]");
}
