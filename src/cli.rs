// CLI module - command-line argument parsing and handlers
//
// Running without a subcommand starts the menu (terminal view, or headless
// with --headless). Subcommands manage configuration:
// - config --show: Display effective configuration
// - config --reset: Regenerate config file with defaults
// - config --edit: Open config file in $EDITOR
// - config --update: Rewrite config in the current format, keeping values
// - config --path: Show config file path

use crate::config::{Config, VERSION};
use crate::view::headless::ScriptStep;
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::process::Command;

/// blockmenu - program control menu
#[derive(Parser, Debug)]
#[command(name = "blockmenu")]
#[command(version = VERSION)]
#[command(about = "Run/stop/reset menu for a block program", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,
}

/// Options for running the menu
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Run without the terminal view
    #[arg(long)]
    pub headless: bool,

    /// Headless script, e.g. "run,wait:100,loadProject:song.tb,stop"
    #[arg(long, requires = "headless", value_parser = parse_script)]
    pub script: Option<Script>,

    /// Entry point to run from (repeatable, replaces [program] entry_points)
    #[arg(long = "entry", value_name = "NODE")]
    pub entries: Vec<String>,
}

/// Parsed `--script` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script(pub Vec<ScriptStep>);

fn parse_script(s: &str) -> Result<Script, String> {
    ScriptStep::parse_script(s)
        .map(Script)
        .map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Rewrite config in the current format (preserves user values)
        #[arg(long)]
        update: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

/// Parse the command line and handle subcommands
///
/// Returns the run options when the menu should start, or None when a
/// subcommand was handled (exit after).
pub fn handle_cli() -> Option<RunArgs> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            show,
            reset,
            edit,
            update,
            path,
        }) => {
            if path {
                handle_config_path();
            } else if show {
                handle_config_show();
            } else if reset {
                handle_config_reset();
            } else if edit {
                handle_config_edit();
            } else if update {
                handle_config_update();
            } else {
                println!("Usage: blockmenu config [--show|--reset|--edit|--update|--path]");
                println!();
                println!("Options:");
                println!("  --show    Display effective configuration");
                println!("  --reset   Reset config file to defaults");
                println!("  --edit    Open config file in $EDITOR");
                println!("  --update  Rewrite config in the current format (preserves values)");
                println!("  --path    Show config file path");
            }
            None
        }
        None => Some(cli.run),
    }
}

fn config_path_or_exit() -> std::path::PathBuf {
    match Config::config_path() {
        Some(path) => path,
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_path() {
    println!("{}", config_path_or_exit().display());
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!("# enable_tui = {}", config.enable_tui);
    println!();
    print!("{}", config.to_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let path = config_path_or_exit();

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let _ = std::io::stderr().flush();

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_err()
            || !input.trim().eq_ignore_ascii_case("y")
        {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let path = config_path_or_exit();

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

fn handle_config_update() {
    let path = config_path_or_exit();

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
        return;
    }

    let existing = Config::from_env();
    let updated = existing.to_toml();

    let backup_path = path.with_extension("toml.bak");
    if let Err(e) = std::fs::copy(&path, &backup_path) {
        eprintln!("Warning: Could not create backup: {}", e);
    } else {
        println!("Backup created: {}", backup_path.display());
    }

    if let Err(e) = std::fs::write(&path, updated) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config updated with latest structure: {}", path.display());
    println!("Your values have been preserved.");
}
