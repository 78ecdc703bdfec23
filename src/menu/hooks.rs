//! Hook registry
//!
//! External code attaches behavior to menu controls through named hooks.
//! [`Hook`] is a tagged union with one variant per hook name; each variant
//! carries a callback of the shape that hook delivers (no arguments for
//! click-bound hooks, the change payload for file-bound hooks). Because the
//! match over `Hook` is exhaustive there is no "unknown name" branch at this
//! level. Names only arrive as strings through [`Menu::mount_hook_by_name`],
//! and that path reports unknown names as [`HookError::UnknownHook`].
//!
//! Registration appends. Mounting the same hook twice leaves two listeners,
//! both of which fire, in registration order.

use super::widgets::{ChangeEvent, EventKind, WidgetEvent, WidgetName};
use super::Menu;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Callback for click-bound hooks
pub type ClickCallback = Box<dyn Fn() + Send + Sync>;

/// Callback for change-bound hooks
pub type ChangeCallback = Box<dyn Fn(&ChangeEvent) + Send + Sync>;

/// The closed set of hook names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookName {
    UploadFileInLocalStorage,
    StartRecording,
    StopRecording,
    ExportDrawing,
    LoadProject,
    SaveProject,
    Run,
    Reset,
}

impl HookName {
    pub const ALL: [HookName; 8] = [
        HookName::UploadFileInLocalStorage,
        HookName::StartRecording,
        HookName::StopRecording,
        HookName::ExportDrawing,
        HookName::LoadProject,
        HookName::SaveProject,
        HookName::Run,
        HookName::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HookName::UploadFileInLocalStorage => "uploadFileInLocalStorage",
            HookName::StartRecording => "startRecording",
            HookName::StopRecording => "stopRecording",
            HookName::ExportDrawing => "exportDrawing",
            HookName::LoadProject => "loadProject",
            HookName::SaveProject => "saveProject",
            HookName::Run => "run",
            HookName::Reset => "reset",
        }
    }

    /// Widget the hook attaches to
    pub fn widget(&self) -> WidgetName {
        match self {
            HookName::UploadFileInLocalStorage => WidgetName::UploadFileInLocalStorage,
            HookName::StartRecording => WidgetName::StartRecording,
            HookName::StopRecording => WidgetName::StopRecording,
            HookName::ExportDrawing => WidgetName::ExportDrawing,
            HookName::LoadProject => WidgetName::LoadProject,
            HookName::SaveProject => WidgetName::SaveProject,
            HookName::Run => WidgetName::Run,
            HookName::Reset => WidgetName::Reset,
        }
    }

    /// Event the hook's listener is bound to
    pub fn binding(&self) -> EventKind {
        match self {
            HookName::UploadFileInLocalStorage | HookName::LoadProject => EventKind::Change,
            HookName::StartRecording
            | HookName::StopRecording
            | HookName::ExportDrawing
            | HookName::SaveProject
            | HookName::Run
            | HookName::Reset => EventKind::Click,
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookName {
    type Err = HookError;

    /// Exact, case-sensitive match against the hook names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| HookError::UnknownHook(s.to_string()))
    }
}

/// Errors from hook registration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("unknown hook '{0}'")]
    UnknownHook(String),

    #[error("menu is not set up; hooks can only be mounted after setup completes")]
    NotMounted,

    #[error("hook '{0}' has no widget (feature disabled)")]
    WidgetUnavailable(HookName),
}

/// A hook together with its callback
pub enum Hook {
    UploadFileInLocalStorage(ChangeCallback),
    StartRecording(ClickCallback),
    StopRecording(ClickCallback),
    ExportDrawing(ClickCallback),
    LoadProject(ChangeCallback),
    SaveProject(ClickCallback),
    Run(ClickCallback),
    Reset(ClickCallback),
}

impl Hook {
    pub fn upload_file_in_local_storage(f: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Self {
        Hook::UploadFileInLocalStorage(Box::new(f))
    }

    pub fn start_recording(f: impl Fn() + Send + Sync + 'static) -> Self {
        Hook::StartRecording(Box::new(f))
    }

    pub fn stop_recording(f: impl Fn() + Send + Sync + 'static) -> Self {
        Hook::StopRecording(Box::new(f))
    }

    pub fn export_drawing(f: impl Fn() + Send + Sync + 'static) -> Self {
        Hook::ExportDrawing(Box::new(f))
    }

    pub fn load_project(f: impl Fn(&ChangeEvent) + Send + Sync + 'static) -> Self {
        Hook::LoadProject(Box::new(f))
    }

    pub fn save_project(f: impl Fn() + Send + Sync + 'static) -> Self {
        Hook::SaveProject(Box::new(f))
    }

    pub fn run(f: impl Fn() + Send + Sync + 'static) -> Self {
        Hook::Run(Box::new(f))
    }

    pub fn reset(f: impl Fn() + Send + Sync + 'static) -> Self {
        Hook::Reset(Box::new(f))
    }

    /// Build a hook for a name chosen at runtime
    ///
    /// The callback receives the change payload for change-bound hooks and
    /// `None` for click-bound ones.
    pub fn from_fn<F>(name: HookName, f: F) -> Self
    where
        F: Fn(Option<&ChangeEvent>) + Send + Sync + 'static,
    {
        match name {
            HookName::UploadFileInLocalStorage => {
                Hook::upload_file_in_local_storage(move |event| f(Some(event)))
            }
            HookName::StartRecording => Hook::start_recording(move || f(None)),
            HookName::StopRecording => Hook::stop_recording(move || f(None)),
            HookName::ExportDrawing => Hook::export_drawing(move || f(None)),
            HookName::LoadProject => Hook::load_project(move |event| f(Some(event))),
            HookName::SaveProject => Hook::save_project(move || f(None)),
            HookName::Run => Hook::run(move || f(None)),
            HookName::Reset => Hook::reset(move || f(None)),
        }
    }

    pub fn name(&self) -> HookName {
        match self {
            Hook::UploadFileInLocalStorage(_) => HookName::UploadFileInLocalStorage,
            Hook::StartRecording(_) => HookName::StartRecording,
            Hook::StopRecording(_) => HookName::StopRecording,
            Hook::ExportDrawing(_) => HookName::ExportDrawing,
            Hook::LoadProject(_) => HookName::LoadProject,
            Hook::SaveProject(_) => HookName::SaveProject,
            Hook::Run(_) => HookName::Run,
            Hook::Reset(_) => HookName::Reset,
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hook").field(&self.name()).finish()
    }
}

/// Listener body for a change-bound hook: forward the payload
fn on_change(callback: ChangeCallback) -> impl Fn(&WidgetEvent) + Send + Sync + 'static {
    move |event| {
        if let WidgetEvent::Change(change) = event {
            callback(change);
        }
    }
}

/// Listener body for a click-bound hook: call with no arguments
fn on_click(callback: ClickCallback) -> impl Fn(&WidgetEvent) + Send + Sync + 'static {
    move |_| callback()
}

impl Menu {
    /// Attach `hook` to its widget as an additional listener
    ///
    /// Only valid once [`Menu::setup`] has completed.
    pub fn mount_hook(&self, hook: Hook) -> Result<(), HookError> {
        let name = hook.name();
        let widgets = self.widgets().ok_or(HookError::NotMounted)?;
        let widget = widgets
            .get(name.widget())
            .ok_or(HookError::WidgetUnavailable(name))?;

        match hook {
            Hook::UploadFileInLocalStorage(callback) | Hook::LoadProject(callback) => {
                widget.add_listener(EventKind::Change, on_change(callback))
            }
            Hook::StartRecording(callback)
            | Hook::StopRecording(callback)
            | Hook::ExportDrawing(callback)
            | Hook::SaveProject(callback)
            | Hook::Run(callback)
            | Hook::Reset(callback) => widget.add_listener(EventKind::Click, on_click(callback)),
        }

        tracing::debug!(hook = %name, binding = ?name.binding(), "hook mounted");
        Ok(())
    }

    /// Attach a callback to a hook named by string
    ///
    /// Unknown names are rejected with [`HookError::UnknownHook`] and leave
    /// every widget untouched.
    pub fn mount_hook_by_name<F>(&self, name: &str, f: F) -> Result<(), HookError>
    where
        F: Fn(Option<&ChangeEvent>) + Send + Sync + 'static,
    {
        let name = match name.parse::<HookName>() {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(hook = %name, "ignoring hook registration: {}", e);
                return Err(e);
            }
        };
        self.mount_hook(Hook::from_fn(name, f))
    }
}
