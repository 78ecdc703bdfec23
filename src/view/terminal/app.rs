// Terminal view state and key handling
//
// Key handling is pure: it turns a key press into an Action and never
// touches the widgets itself. The event loop applies actions.

use crate::logging::LogBuffer;
use crate::menu::widgets::{EventKind, WidgetName};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::path::PathBuf;

/// What the event loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Click a control
    Activate(WidgetName),
    /// Deliver a change event with the picked files
    Select(WidgetName, Vec<PathBuf>),
    Quit,
}

/// Key bound to each control
pub fn key_for(name: WidgetName) -> char {
    match name {
        WidgetName::Run => 'r',
        WidgetName::Stop => 's',
        WidgetName::Reset => 'x',
        WidgetName::UploadFileInLocalStorage => 'u',
        WidgetName::StartRecording => '[',
        WidgetName::StopRecording => ']',
        WidgetName::ExportDrawing => 'e',
        WidgetName::LoadProject => 'l',
        WidgetName::SaveProject => 'w',
    }
}

/// Control bound to a key
pub fn control_for(key: char) -> Option<WidgetName> {
    WidgetName::ALL.into_iter().find(|name| key_for(*name) == key)
}

/// File path entry for a change-type control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrompt {
    pub widget: WidgetName,
    pub input: String,
}

impl PathPrompt {
    pub fn new(widget: WidgetName) -> Self {
        Self {
            widget,
            input: String::new(),
        }
    }

    /// Paths typed so far, `;`-separated
    pub fn paths(&self) -> Vec<PathBuf> {
        self.input
            .split(';')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect()
    }
}

/// Terminal view state
pub struct App {
    pub log_buffer: LogBuffer,
    /// Controls present in the view, in display order, with their labels
    pub controls: Vec<(WidgetName, String)>,
    pub prompt: Option<PathPrompt>,
    pub should_quit: bool,
    /// Frames presented so far
    pub frames: u64,
}

impl App {
    pub fn new(log_buffer: LogBuffer, controls: Vec<(WidgetName, String)>) -> Self {
        Self {
            log_buffer,
            controls,
            prompt: None,
            should_quit: false,
            frames: 0,
        }
    }

    pub fn label(&self, name: WidgetName) -> Option<&str> {
        self.controls
            .iter()
            .find(|(control, _)| *control == name)
            .map(|(_, label)| label.as_str())
    }

    fn has_control(&self, name: WidgetName) -> bool {
        self.controls.iter().any(|(control, _)| *control == name)
    }

    /// Handle a key press
    /// Layered: prompt captures all input when open, then global keys, then controls
    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Action::Quit;
        }

        if self.prompt.is_some() {
            return self.handle_prompt_key(key);
        }

        let KeyCode::Char(c) = key.code else {
            return Action::None;
        };

        if c == 'q' {
            self.should_quit = true;
            return Action::Quit;
        }

        let Some(name) = control_for(c) else {
            return Action::None;
        };
        if !self.has_control(name) {
            tracing::info!(control = %name, "control not enabled");
            return Action::None;
        }

        match name.native_event() {
            EventKind::Click => Action::Activate(name),
            EventKind::Change => {
                self.prompt = Some(PathPrompt::new(name));
                Action::None
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) -> Action {
        let Some(prompt) = self.prompt.as_mut() else {
            return Action::None;
        };

        match key.code {
            KeyCode::Esc => {
                self.prompt = None;
                Action::None
            }
            KeyCode::Enter => {
                let paths = prompt.paths();
                let widget = prompt.widget;
                self.prompt = None;
                if paths.is_empty() {
                    tracing::info!(control = %widget, "no files entered");
                    Action::None
                } else {
                    Action::Select(widget, paths)
                }
            }
            KeyCode::Backspace => {
                prompt.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                prompt.input.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }
}
