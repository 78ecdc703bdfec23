// Command hooks - shell commands bound to menu hooks from config
//
// Each `[hooks.commands]` entry goes through the string-keyed registration
// path, so unknown names and controls disabled by feature flags are
// reported and skipped without affecting the other entries.
//
// Commands run as `<shell> -c <command>` on the tokio runtime with:
//   BLOCKMENU_HOOK   hook name (camelCase)
//   BLOCKMENU_FILES  selected paths joined by ':' (change hooks only)

use crate::config::HooksConfig;
use crate::menu::widgets::ChangeEvent;
use crate::menu::{HookError, HookName, Menu};
use anyhow::{Context, Result};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::runtime::Handle;

/// Outcome of mounting the configured commands
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MountReport {
    pub mounted: Vec<HookName>,
    /// Names that failed to mount, with the reason
    pub skipped: Vec<(String, HookError)>,
}

/// Mount every configured command hook
///
/// Must be called after the menu's setup has completed, from inside a tokio
/// runtime.
pub fn mount_command_hooks(menu: &Menu, config: &HooksConfig) -> Result<MountReport> {
    let handle = Handle::try_current().context("Command hooks need a tokio runtime")?;
    let mut report = MountReport::default();

    for (name, command) in &config.commands {
        let shell = config.shell.clone();
        let owned_command = command.clone();
        let handle = handle.clone();
        let hook_name = name.clone();

        let result = menu.mount_hook_by_name(name, move |payload| {
            let files = payload.map(join_files);
            let shell = shell.clone();
            let command = owned_command.clone();
            let hook_name = hook_name.clone();
            handle.spawn(async move {
                match run_command(&shell, &command, &hook_name, files.as_deref()).await {
                    Ok(output) => log_output(&hook_name, &output),
                    Err(e) => tracing::error!(hook = %hook_name, "command hook failed: {:#}", e),
                }
            });
        });

        match result {
            Ok(()) => {
                // mount_hook_by_name only succeeds for valid names
                if let Ok(parsed) = name.parse::<HookName>() {
                    tracing::debug!(hook = %parsed, command = %command, "command hook mounted");
                    report.mounted.push(parsed);
                }
            }
            Err(e) => {
                if !matches!(e, HookError::UnknownHook(_)) {
                    // unknown names were already warned about by the registry
                    tracing::warn!(hook = %name, "skipping command hook: {}", e);
                }
                report.skipped.push((name.clone(), e));
            }
        }
    }

    Ok(report)
}

/// Paths of a change event joined by ':'
fn join_files(event: &ChangeEvent) -> String {
    event
        .files
        .iter()
        .map(|path| path.to_string_lossy())
        .collect::<Vec<_>>()
        .join(":")
}

/// Run one command to completion, capturing its output
pub async fn run_command(
    shell: &str,
    command: &str,
    hook: &str,
    files: Option<&str>,
) -> Result<Output> {
    let mut cmd = Command::new(shell);
    cmd.arg("-c")
        .arg(command)
        .env("BLOCKMENU_HOOK", hook)
        .stdin(Stdio::null())
        .kill_on_drop(true);
    if let Some(files) = files {
        cmd.env("BLOCKMENU_FILES", files);
    }

    tracing::info!(hook = %hook, command = %command, "running command hook");
    cmd.output()
        .await
        .with_context(|| format!("Failed to spawn '{} -c {}'", shell, command))
}

fn log_output(hook: &str, output: &Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
        tracing::info!(hook = %hook, "{}", line);
    }

    if output.status.success() {
        tracing::debug!(hook = %hook, "command hook finished");
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        tracing::warn!(
            hook = %hook,
            status = %output.status,
            stderr = %stderr.trim(),
            "command hook exited with failure"
        );
    }
}
