//! Configuration for the menu host
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/blockmenu/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::component::FeatureFlags;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod features;
mod hooks;
mod menu;
mod observability;
mod serialization;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use features::FileFeatures;
pub use hooks::{FileHooks, HooksConfig};
pub use menu::{FileMenu, FileProgram, MenuConfig, ProgramConfig};
pub use observability::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Localized string overrides: namespace -> key -> text
pub type StringOverrides = BTreeMap<String, BTreeMap<String, String>>;

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to run the terminal view (false = headless)
    pub enable_tui: bool,

    /// Optional menu controls
    pub features: FeatureFlags,

    /// Menu behavior
    pub menu: MenuConfig,

    /// In-memory program the run control starts
    pub program: ProgramConfig,

    /// Shell commands attached to hooks
    pub hooks: HooksConfig,

    /// Display string overrides
    pub strings: StringOverrides,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_tui: true,
            features: FeatureFlags::default(),
            menu: MenuConfig::default(),
            program: ProgramConfig::default(),
            hooks: HooksConfig::default(),
            strings: StringOverrides::new(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    /// Optional [features] section
    pub features: Option<FileFeatures>,

    /// Optional [menu] section
    pub menu: Option<FileMenu>,

    /// Optional [program] section
    pub program: Option<FileProgram>,

    /// Optional [hooks] section
    pub hooks: Option<FileHooks>,

    /// Optional [strings.<namespace>] sections
    #[serde(default)]
    pub strings: StringOverrides,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/blockmenu/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("blockmenu").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be read or parsed is fatal:
    /// the process prints the problem and exits with status 1.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse_file_config(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Invalid boolean values (use true/false)");
                    eprintln!("    - Hook commands outside the [hooks.commands] table\n");
                    eprintln!("  To reset, run `blockmenu config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    pub(crate) fn parse_file_config(contents: &str) -> Result<FileConfig, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load configuration: file -> env vars -> defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with environment lookups
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        // TUI toggle: env only (runtime flag)
        let enable_tui = env("BLOCKMENU_NO_TUI")
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true);

        let features = FeatureFlags::from_file(file.features);

        // Run tracking: env > file > default
        let mut menu = MenuConfig::from_file(file.menu);
        if let Some(value) = env("BLOCKMENU_RUN_TRACKING") {
            match value.parse() {
                Ok(tracking) => menu.run_tracking = tracking,
                Err(e) => eprintln!("Ignoring BLOCKMENU_RUN_TRACKING: {}", e),
            }
        }

        let program = ProgramConfig::from_file(file.program);
        let hooks = HooksConfig::from_file(file.hooks);

        // Log level: env > file > default (RUST_LOG still wins at filter build time)
        let mut logging = LoggingConfig::from_file(file.logging);
        if let Some(level) = env("BLOCKMENU_LOG_LEVEL") {
            logging.level = level;
        }

        Self {
            enable_tui,
            features,
            menu,
            program,
            hooks,
            strings: file.strings,
            logging,
        }
    }
}
