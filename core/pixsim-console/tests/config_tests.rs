use pixsim_console::{ConsoleConfig, ConsoleError, DEFAULT_MAX_HISTORY};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn defaults() {
    let config = ConsoleConfig::default();
    assert_eq!(config.max_history, DEFAULT_MAX_HISTORY);
    assert_eq!(config.max_command_history, 100);
    assert_eq!(config.max_undo, 100);
    assert_eq!(config.root_name, "pixsim");
    assert!(config.serialize_pretty);
}

#[test]
fn partial_toml_fills_defaults() {
    let config = ConsoleConfig::from_toml_str("max_history = 50\nroot_name = \"sim\"\n").unwrap();
    assert_eq!(config.max_history, 50);
    assert_eq!(config.root_name, "sim");
    assert_eq!(config.max_undo, 100);
}

#[test]
fn empty_toml_is_default() {
    assert_eq!(ConsoleConfig::from_toml_str("").unwrap(), ConsoleConfig::default());
}

#[test]
fn zero_history_is_rejected() {
    let err = ConsoleConfig::from_toml_str("max_history = 0").unwrap_err();
    assert!(matches!(err, ConsoleError::Config(_)));
}

#[test]
fn dotted_root_name_is_rejected() {
    let err = ConsoleConfig::from_toml_str("root_name = \"a.b\"").unwrap_err();
    assert!(err.to_string().contains("root_name"));
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = ConsoleConfig::from_toml_str("max_history = [").unwrap_err();
    assert!(matches!(err, ConsoleError::Config(_)));
}

#[test]
fn load_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConsoleConfig::load_from(&dir.path().join("console.toml"));
    assert_eq!(config, ConsoleConfig::default());
}

#[test]
fn load_reads_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("console.toml");
    fs::write(&path, "max_history = 10\nserialize_pretty = false\n").unwrap();

    let config = ConsoleConfig::load_from(&path);
    assert_eq!(config.max_history, 10);
    assert!(!config.serialize_pretty);
}

#[test]
fn load_invalid_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("console.toml");
    fs::write(&path, "max_history = 0\n").unwrap();
    assert_eq!(ConsoleConfig::load_from(&path), ConsoleConfig::default());
}
