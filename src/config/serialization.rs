//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;
use std::collections::BTreeMap;

/// Quote a string as a TOML basic string
fn quoted(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

/// Bare key when possible, quoted otherwise
fn key(name: &str) -> String {
    let bare = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if bare {
        name.to_string()
    } else {
        quoted(name)
    }
}

fn table_entries(entries: &BTreeMap<String, String>) -> String {
    entries
        .iter()
        .map(|(k, v)| format!("{} = {}\n", key(k), quoted(v)))
        .collect()
}

impl Config {
    /// Serialize hook commands, or an example when none are configured
    pub(super) fn hook_commands_to_toml(&self) -> String {
        if self.hooks.commands.is_empty() {
            return r#"# saveProject = "git add -A && git commit -qm 'menu save'"
# loadProject = "echo loading $BLOCKMENU_FILES"
"#
            .to_string();
        }
        table_entries(&self.hooks.commands)
    }

    /// Serialize string overrides as [strings.<namespace>] sections
    pub(super) fn strings_to_toml(&self) -> String {
        if self.strings.is_empty() {
            return r#"
# [strings.menu]
# run = "Play"
# stop = "Halt"
"#
            .to_string();
        }

        let mut output = String::new();
        for (namespace, entries) in &self.strings {
            output.push_str(&format!("\n[strings.{}]\n", key(namespace)));
            output.push_str(&table_entries(entries));
        }
        output
    }

    /// Render the full config file
    pub fn to_toml(&self) -> String {
        let program_entries = self
            .program
            .entry_points
            .iter()
            .map(|id| quoted(id))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"# blockmenu configuration

# Optional menu controls (run, stop and reset are always present)
[features]
upload_file = {upload_file}
recording = {recording}
export_drawing = {export_drawing}
load_project = {load_project}
save_project = {save_project}

[menu]
# When the running indicator clears after run: "tick" or "completion"
run_tracking = "{run_tracking}"

# In-memory program started by the run control
[program]
entry_points = [{program_entries}]
step_delay_ms = {step_delay_ms}

# Shell commands run when a control is activated.
# Keys are hook names: uploadFileInLocalStorage, startRecording, stopRecording,
# exportDrawing, loadProject, saveProject, run, reset.
# Commands see BLOCKMENU_HOOK and, for file controls, BLOCKMENU_FILES.
[hooks]
shell = {shell}

[hooks.commands]
{hook_commands}
# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to the log panel or stdout)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
{strings}"#,
            upload_file = self.features.upload_file,
            recording = self.features.recording,
            export_drawing = self.features.export_drawing,
            load_project = self.features.load_project,
            save_project = self.features.save_project,
            run_tracking = self.menu.run_tracking,
            program_entries = program_entries,
            step_delay_ms = self.program.step_delay_ms,
            shell = quoted(&self.hooks.shell),
            hook_commands = self.hook_commands_to_toml(),
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.to_string_lossy()),
            log_file_rotation = self.logging.file_rotation,
            log_file_prefix = quoted(&self.logging.file_prefix),
            strings = self.strings_to_toml(),
        )
    }
}
