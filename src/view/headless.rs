// Headless view
//
// A view with no rendering surface. Frames are presented either by hand
// (tests) or by a frame pump task (`--headless`). Controls are driven by
// scripts: a comma-separated list of steps such as
//
//     run,wait:100,loadProject:demo.tb,saveProject,stop
//
// Click controls are named bare; change controls take `name:path[;path]`.

use super::{build_widgets, FrameClock, ViewBridge, ViewConfig};
use crate::menu::widgets::{EventKind, WidgetHandle, WidgetName, Widgets};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;

/// Errors from parsing or running a script
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown script step '{0}'")]
    UnknownStep(String),

    #[error("'{0}' needs at least one file (use {0}:path)")]
    MissingFiles(WidgetName),

    #[error("'{0}' is a button and takes no files")]
    UnexpectedFiles(WidgetName),

    #[error("invalid wait '{0}' (use wait:<millis>)")]
    InvalidWait(String),

    #[error("view is not set up")]
    NotSetUp,

    #[error("control '{0}' is not available (feature disabled)")]
    WidgetUnavailable(WidgetName),
}

/// One scripted interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Press a button
    Activate(WidgetName),
    /// Pick files on a file control
    Select(WidgetName, Vec<PathBuf>),
    /// Let the runtime run for a while
    Wait(Duration),
}

impl ScriptStep {
    /// Parse a single step
    pub fn parse(step: &str) -> Result<Self, ScriptError> {
        let step = step.trim();
        let (head, arg) = match step.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (step, None),
        };

        if head == "wait" {
            let millis = arg
                .and_then(|ms| ms.trim().parse::<u64>().ok())
                .ok_or_else(|| ScriptError::InvalidWait(step.to_string()))?;
            return Ok(ScriptStep::Wait(Duration::from_millis(millis)));
        }

        let name: WidgetName = head
            .parse()
            .map_err(|_| ScriptError::UnknownStep(step.to_string()))?;

        match (name.native_event(), arg) {
            (EventKind::Click, None) => Ok(ScriptStep::Activate(name)),
            (EventKind::Click, Some(_)) => Err(ScriptError::UnexpectedFiles(name)),
            (EventKind::Change, Some(paths)) => {
                let files: Vec<PathBuf> = paths
                    .split(';')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(PathBuf::from)
                    .collect();
                if files.is_empty() {
                    Err(ScriptError::MissingFiles(name))
                } else {
                    Ok(ScriptStep::Select(name, files))
                }
            }
            (EventKind::Change, None) => Err(ScriptError::MissingFiles(name)),
        }
    }

    /// Parse a comma-separated script
    pub fn parse_script(script: &str) -> Result<Vec<Self>, ScriptError> {
        script
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Self::parse)
            .collect()
    }
}

/// Built view state
#[derive(Debug)]
struct Built {
    widgets: Widgets,
    labels: BTreeMap<WidgetName, String>,
}

/// View without a rendering surface
#[derive(Debug, Default)]
pub struct HeadlessView {
    clock: FrameClock,
    built: Mutex<Option<Built>>,
}

impl HeadlessView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Present one frame
    pub fn present_frame(&self) {
        self.clock.present();
    }

    /// Present a frame every `interval` until the task is aborted
    pub fn spawn_frame_pump(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let view = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                view.present_frame();
            }
        })
    }

    /// Translated label for a control
    #[cfg(test)]
    pub fn label(&self, name: WidgetName) -> Option<String> {
        self.lock()
            .as_ref()
            .and_then(|built| built.labels.get(&name).cloned())
    }

    /// Press a button (or any control, as a click)
    pub fn activate(&self, name: WidgetName) -> Result<usize, ScriptError> {
        let (widget, label) = self.widget(name)?;
        tracing::debug!(widget = %name, label = %label, "activate");
        Ok(widget.click())
    }

    /// Pick files on a file control
    pub fn select_files(&self, name: WidgetName, files: Vec<PathBuf>) -> Result<usize, ScriptError> {
        let (widget, label) = self.widget(name)?;
        tracing::debug!(widget = %name, label = %label, files = files.len(), "select files");
        Ok(widget.change(files))
    }

    /// Execute a script step by step
    pub async fn run_script(&self, steps: &[ScriptStep]) -> Result<(), ScriptError> {
        for step in steps {
            match step {
                ScriptStep::Activate(name) => {
                    self.activate(*name)?;
                }
                ScriptStep::Select(name, files) => {
                    self.select_files(*name, files.clone())?;
                }
                ScriptStep::Wait(duration) => tokio::time::sleep(*duration).await,
            }
            // Let deferred work scheduled by the listeners run between steps
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Widget handle and its translated label
    fn widget(&self, name: WidgetName) -> Result<(WidgetHandle, String), ScriptError> {
        let built = self.lock();
        let built = built.as_ref().ok_or(ScriptError::NotSetUp)?;
        let widget = built
            .widgets
            .get(name)
            .cloned()
            .ok_or(ScriptError::WidgetUnavailable(name))?;
        let label = built
            .labels
            .get(&name)
            .cloned()
            .unwrap_or_else(|| name.string_key().to_string());
        Ok((widget, label))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Built>> {
        self.built.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ViewBridge for HeadlessView {
    fn setup(&self, config: ViewConfig) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            let widgets = build_widgets(&config.flags);
            let labels = widgets
                .names()
                .map(|name| (name, (config.i18n)(name.string_key())))
                .collect();
            tracing::debug!(widgets = widgets.len(), "headless view built");
            *self.lock() = Some(Built { widgets, labels });
            Ok(())
        }
        .boxed()
    }

    fn next_frame(&self) -> BoxFuture<'static, ()> {
        self.clock.next_frame()
    }

    fn widgets(&self) -> Option<Widgets> {
        self.lock().as_ref().map(|built| built.widgets.clone())
    }
}
