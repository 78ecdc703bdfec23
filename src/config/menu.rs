//! Menu and program configuration

use crate::menu::RunTracking;
use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────────────
// Menu
// ─────────────────────────────────────────────────────────────────────────────

/// Menu behavior configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuConfig {
    /// When the running indicator drops back after a run: "tick" or "completion"
    pub run_tracking: RunTracking,
}

/// Menu settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileMenu {
    pub run_tracking: Option<String>,
}

impl MenuConfig {
    /// Create from file config with defaults
    ///
    /// Unknown tracking modes keep the default and are reported on stderr,
    /// since logging is not initialized yet at load time.
    pub fn from_file(file: Option<FileMenu>) -> Self {
        let file = file.unwrap_or_default();
        let run_tracking = match file.run_tracking.as_deref().map(str::parse) {
            Some(Ok(tracking)) => tracking,
            Some(Err(e)) => {
                eprintln!("Ignoring [menu] run_tracking: {}", e);
                RunTracking::default()
            }
            None => RunTracking::default(),
        };
        Self { run_tracking }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Program
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory program configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramConfig {
    /// Entry point ids in execution order
    pub entry_points: Vec<String>,
    /// Simulated duration of one run (milliseconds)
    pub step_delay_ms: u64,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            entry_points: vec!["start".to_string()],
            step_delay_ms: 500,
        }
    }
}

/// Program settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileProgram {
    pub entry_points: Option<Vec<String>>,
    pub step_delay_ms: Option<u64>,
}

impl ProgramConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileProgram>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            entry_points: file.entry_points.unwrap_or(defaults.entry_points),
            step_delay_ms: file.step_delay_ms.unwrap_or(defaults.step_delay_ms),
        }
    }
}
