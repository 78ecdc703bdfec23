//! Command hook configuration
//!
//! ```toml
//! [hooks]
//! shell = "sh"
//!
//! [hooks.commands]
//! saveProject = "git commit -am 'menu save'"
//! ```
//!
//! Command keys are hook names. They are validated when the hooks are
//! mounted, not here, so a typo only disables that one entry.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Shell commands bound to hooks
#[derive(Debug, Clone, PartialEq)]
pub struct HooksConfig {
    /// Shell used to run commands (`<shell> -c <command>`)
    pub shell: String,
    /// Hook name -> command line
    pub commands: BTreeMap<String, String>,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            commands: BTreeMap::new(),
        }
    }
}

/// Hook settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileHooks {
    pub shell: Option<String>,
    #[serde(default)]
    pub commands: BTreeMap<String, String>,
}

impl HooksConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileHooks>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            shell: file.shell.unwrap_or(defaults.shell),
            commands: file.commands,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.commands.is_empty()
    }
}
