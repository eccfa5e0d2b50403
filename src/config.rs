//! Runtime settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "fsm-designer.toml";

/// Environment variable prefix, e.g. `FSM_DESIGNER_PROMPT`.
pub const ENV_PREFIX: &str = "FSM_DESIGNER";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Prompt printed before each interactive line
    pub prompt: String,
    /// Extension (without the dot) that marks a compiled FSM file
    pub compiled_extension: String,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Echo each statement read from a script before its result
    pub echo_script: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prompt: "? ".to_string(),
            compiled_extension: "fs".to_string(),
            log_level: "warn".to_string(),
            echo_script: true,
        }
    }
}

impl Settings {
    /// Load settings with precedence:
    /// 1. Default values
    /// 2. `fsm-designer.toml` in the working directory
    /// 3. Environment variables prefixed with `FSM_DESIGNER_`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Same as [`Settings::load`] with an explicit file location.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        builder.build()?.try_deserialize()
    }
}
