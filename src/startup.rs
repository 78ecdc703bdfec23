// Startup module - banner and module status
//
// Headless runs print the banner to stdout before the menu starts. The
// terminal view gets the same information as log lines in its log panel.

use crate::component::FlagName;
use crate::config::{Config, VERSION};

/// ANSI color codes for terminal output
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Module loading result for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleStatus {
    pub name: String,
    pub enabled: bool,
    pub description: String,
}

impl ModuleStatus {
    fn new(name: impl Into<String>, enabled: bool, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled,
            description: description.into(),
        }
    }
}

fn flag_description(flag: FlagName) -> &'static str {
    match flag {
        FlagName::UploadFile => "Upload to local storage",
        FlagName::Recording => "Start/stop recording",
        FlagName::ExportDrawing => "Export drawing",
        FlagName::LoadProject => "Load project",
        FlagName::SaveProject => "Save project",
    }
}

/// Status of every module and optional control
pub fn module_status(config: &Config) -> Vec<ModuleStatus> {
    let mut modules = vec![
        ModuleStatus::new("transport", true, "Run, stop, reset"),
        ModuleStatus::new("tui", config.enable_tui, "Terminal view"),
    ];

    modules.extend(
        config
            .features
            .iter()
            .map(|(flag, on)| ModuleStatus::new(flag.as_str(), on, flag_description(flag))),
    );

    modules.push(ModuleStatus::new(
        "run-tracking",
        true,
        format!("Running clears on {}", config.menu.run_tracking),
    ));
    modules.push(ModuleStatus::new(
        "hooks",
        config.hooks.is_configured(),
        format!("{} command hook(s)", config.hooks.commands.len()),
    ));
    modules.push(ModuleStatus::new(
        "file-log",
        config.logging.file_enabled,
        format!("JSON logs in {}", config.logging.file_dir.display()),
    ));

    modules
}

/// Print the startup banner and module status
pub fn print_startup(config: &Config) {
    use colors::*;

    println!();
    println!("  {BOLD}{CYAN}blockmenu{RESET} {DIM}v{VERSION}{RESET}");
    println!("  {DIM}Program control menu{RESET}");
    println!();

    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("  {DIM}Config:{RESET} {GREEN}✓{RESET} {}", path.display());
        } else {
            println!("  {DIM}Config:{RESET} {DIM}(using defaults){RESET}");
        }
    }
    println!();

    println!("  {DIM}Loading modules...{RESET}");
    for module in &module_status(config) {
        print_module_status(module);
    }
    println!();

    println!(
        "  {MAGENTA}▸{RESET} Entry points: {BOLD}{}{RESET}",
        entry_points(config)
    );
    println!();
}

fn entry_points(config: &Config) -> String {
    if config.program.entry_points.is_empty() {
        "(none)".to_string()
    } else {
        config.program.entry_points.join(", ")
    }
}

fn print_module_status(module: &ModuleStatus) {
    use colors::*;

    let (icon, style) = if module.enabled {
        (format!("{GREEN}✓{RESET}"), "")
    } else {
        (format!("{DIM}○{RESET}"), DIM)
    };

    println!(
        "    {icon} {style}{:<14}{RESET} {DIM}{}{RESET}",
        module.name, module.description
    );
}

/// Log startup status into the log panel
pub fn log_startup(config: &Config) {
    tracing::info!("blockmenu v{}", VERSION);
    for module in &module_status(config) {
        let icon = if module.enabled { "✓" } else { "○" };
        tracing::info!("  {} {} - {}", icon, module.name, module.description);
    }
    tracing::info!("▸ Entry points: {}", entry_points(config));
    tracing::info!("Ready. r run · s stop · x reset · q quit");
}
