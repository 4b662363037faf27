//! Console configuration, read from `console.toml`.
//!
//! A missing or unparseable file never prevents the console from starting:
//! defaults are used and a warning is logged.

use crate::error::ConsoleError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Default cap on console log entries.
pub const DEFAULT_MAX_HISTORY: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Maximum number of log entries kept; oldest are evicted first.
    pub max_history: usize,
    /// Maximum number of distinct commands kept for up/down recall.
    pub max_command_history: usize,
    /// Maximum number of override records kept for undo.
    pub max_undo: usize,
    /// Global prefix accepted in front of namespace paths (`pixsim.ops...`).
    pub root_name: String,
    /// Pretty-print object results in output entries.
    pub serialize_pretty: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            max_command_history: 100,
            max_undo: 100,
            root_name: "pixsim".to_string(),
            serialize_pretty: true,
        }
    }
}

impl ConsoleConfig {
    /// Parses a TOML document. Unknown keys are ignored, missing keys default.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConsoleError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConsoleError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`, falling back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No console config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded console config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse console config {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read console config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConsoleError> {
        if self.max_history == 0 {
            return Err(ConsoleError::Config("max_history must be at least 1".into()));
        }
        if self.root_name.is_empty() || self.root_name.contains('.') {
            return Err(ConsoleError::Config(format!(
                "root_name must be a single non-empty segment, got '{}'",
                self.root_name
            )));
        }
        Ok(())
    }
}
