//! Menu component: transport controls and hook registration
//!
//! # Lifecycle
//!
//! ```text
//!  Unmounted ──mount(flags)──► Mounted ──setup()──► Ready ──unmount()──► Unmounted
//!                  │                        │
//!          view.setup(config)        view.next_frame()
//!            (Mounting)              attach run/stop/reset
//!                                      (SettingUp)
//! ```
//!
//! `Mounting` and `SettingUp` carry the attempt number that entered them. An
//! attempt that finds a different number after its await was overtaken by
//! an unmount (and possibly a newer attempt) and gives up without touching
//! the phase.
//!
//! `mount` hands the flags and a namespace-scoped translator to the view and
//! waits for the view to build itself. `setup` waits for the next presented
//! frame, fetches the widget handles and attaches the default behavior of
//! the three transport controls. Hooks (see [`hooks`]) can be mounted once
//! the menu is Ready.
//!
//! # Running state
//!
//! Activating run starts the first entry point (if any), sets running to
//! true, and schedules running back to false. With [`RunTracking::Tick`] the
//! reset happens after one scheduler tick regardless of how long the program
//! takes; with [`RunTracking::Completion`] it waits for the engine to report
//! completion. Either way the deferred reset is dropped if the menu has been
//! unmounted in the meantime.

pub mod hooks;
pub mod state;
pub mod widgets;

use crate::component::{FeatureFlags, DEFINITION, NAMESPACE};
use crate::engine::{ExecutionGraph, RunCompletion};
use crate::i18n::Catalog;
use crate::view::{ViewBridge, ViewConfig};
use state::{Liveness, RunningState};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::runtime::Handle;
use widgets::{EventKind, WidgetName, Widgets};

pub use hooks::{Hook, HookError, HookName};

/// How the running state returns to false after a run activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunTracking {
    /// Reset after one scheduler tick (approximate UI feedback)
    #[default]
    Tick,
    /// Reset when the engine reports the run finished
    Completion,
}

impl RunTracking {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunTracking::Tick => "tick",
            RunTracking::Completion => "completion",
        }
    }
}

impl fmt::Display for RunTracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunTracking {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tick" => Ok(RunTracking::Tick),
            "completion" => Ok(RunTracking::Completion),
            other => Err(format!(
                "invalid run tracking '{}' (expected 'tick' or 'completion')",
                other
            )),
        }
    }
}

/// Menu behavior options
#[derive(Debug, Clone, Copy, Default)]
pub struct MenuOptions {
    pub run_tracking: RunTracking,
}

/// Collaborators the menu is wired to
#[derive(Clone)]
pub struct MenuContext {
    pub view: Arc<dyn ViewBridge>,
    pub graph: Arc<dyn ExecutionGraph>,
    pub running: RunningState,
    pub catalog: Arc<Catalog>,
    pub options: MenuOptions,
}

/// Errors from the mount lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("menu is already mounted")]
    AlreadyMounted,

    #[error("menu is not mounted")]
    NotMounted,

    #[error("menu is already set up")]
    AlreadySetUp,

    #[error("view setup failed: {0}")]
    View(String),

    #[error("view reported ready but exposes no transport widgets")]
    WidgetsMissing,

    #[error("setup must run inside a tokio runtime")]
    NoRuntime,

    #[error("component '{0}' is listed as both a required and an optional dependency")]
    ConflictingDependency(String),
}

/// Where the menu is in its lifecycle
#[derive(Debug, Clone)]
enum Phase {
    Unmounted,
    /// `mount` is waiting for the view
    Mounting(u64),
    Mounted,
    /// `setup` is waiting for a frame
    SettingUp(u64),
    Ready {
        widgets: Widgets,
        liveness: Liveness,
    },
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Phase::Unmounted => "unmounted",
            Phase::Mounting(_) => "mounting",
            Phase::Mounted => "mounted",
            Phase::SettingUp(_) => "setting-up",
            Phase::Ready { .. } => "ready",
        }
    }
}

/// The menu component
pub struct Menu {
    ctx: MenuContext,
    phase: Mutex<Phase>,
    attempts: AtomicU64,
}

impl Menu {
    pub fn new(ctx: MenuContext) -> Self {
        Self {
            ctx,
            phase: Mutex::new(Phase::Unmounted),
            attempts: AtomicU64::new(0),
        }
    }

    /// Widget handles, once setup has completed
    pub fn widgets(&self) -> Option<Widgets> {
        match &*self.lock_phase() {
            Phase::Ready { widgets, .. } => Some(widgets.clone()),
            _ => None,
        }
    }

    /// Whether setup has completed and the menu has not been unmounted
    pub fn is_ready(&self) -> bool {
        matches!(&*self.lock_phase(), Phase::Ready { .. })
    }

    /// Build the view with `flags`
    pub async fn mount(&self, flags: FeatureFlags) -> Result<(), MountError> {
        if let Some(conflict) = DEFINITION.dependencies.conflict() {
            return Err(MountError::ConflictingDependency(conflict.to_string()));
        }

        let attempt = self.next_attempt();
        {
            let mut phase = self.lock_phase();
            if !matches!(*phase, Phase::Unmounted) {
                return Err(MountError::AlreadyMounted);
            }
            *phase = Phase::Mounting(attempt);
        }

        self.ctx.catalog.register(NAMESPACE, DEFINITION.strings);
        let config = ViewConfig {
            flags,
            i18n: self.ctx.catalog.translator(NAMESPACE),
        };

        tracing::debug!(features = ?flags.enabled(), "mounting menu");
        let built = self.ctx.view.setup(config).await;

        let mut phase = self.lock_phase();
        if !matches!(*phase, Phase::Mounting(current) if current == attempt) {
            // Unmounted while the view was building
            return Err(MountError::NotMounted);
        }
        if let Err(e) = built {
            *phase = Phase::Unmounted;
            return Err(MountError::View(format!("{:#}", e)));
        }
        *phase = Phase::Mounted;
        tracing::info!("menu mounted");
        Ok(())
    }

    /// Wait for the next frame, then attach the transport controls' behavior
    pub async fn setup(&self) -> Result<(), MountError> {
        let attempt = self.next_attempt();
        {
            let mut phase = self.lock_phase();
            match *phase {
                Phase::Mounted => *phase = Phase::SettingUp(attempt),
                Phase::Unmounted | Phase::Mounting(_) => return Err(MountError::NotMounted),
                Phase::SettingUp(_) | Phase::Ready { .. } => return Err(MountError::AlreadySetUp),
            }
        }

        self.ctx.view.next_frame().await;

        let mut phase = self.lock_phase();
        if !matches!(*phase, Phase::SettingUp(current) if current == attempt) {
            // Unmounted while waiting for the frame
            return Err(MountError::NotMounted);
        }

        let Some(widgets) = self.ctx.view.widgets() else {
            *phase = Phase::Mounted;
            return Err(MountError::WidgetsMissing);
        };
        let liveness = Liveness::new();
        if let Err(e) = self.attach_transport(&widgets, &liveness) {
            *phase = Phase::Mounted;
            return Err(e);
        }

        *phase = Phase::Ready { widgets, liveness };
        tracing::info!("menu ready");
        Ok(())
    }

    /// Detach from the view
    ///
    /// Pending deferred state resets are cancelled and default listeners stop
    /// reacting. Listeners stay on the view's widgets until the view drops them.
    pub fn unmount(&self) {
        let mut phase = self.lock_phase();
        if let Phase::Ready { liveness, .. } = &*phase {
            liveness.revoke();
        }
        tracing::info!(from = phase.label(), "menu unmounted");
        *phase = Phase::Unmounted;
    }

    fn attach_transport(&self, widgets: &Widgets, liveness: &Liveness) -> Result<(), MountError> {
        let handle = Handle::try_current().map_err(|_| MountError::NoRuntime)?;
        let (Some(run), Some(stop), Some(reset)) = (
            widgets.get(WidgetName::Run),
            widgets.get(WidgetName::Stop),
            widgets.get(WidgetName::Reset),
        ) else {
            return Err(MountError::WidgetsMissing);
        };

        let graph = Arc::clone(&self.ctx.graph);
        let running = self.ctx.running.clone();
        let alive = liveness.clone();
        let tracking = self.ctx.options.run_tracking;
        run.add_listener(EventKind::Click, move |_| {
            if !alive.is_alive() {
                return;
            }
            let completion = start_first_entry(graph.as_ref());
            running.set(true);
            schedule_reset(&handle, tracking, completion, running.clone(), alive.clone());
        });

        for widget in [stop, reset] {
            let running = self.ctx.running.clone();
            let alive = liveness.clone();
            let name = widget.name();
            widget.add_listener(EventKind::Click, move |_| {
                if !alive.is_alive() {
                    return;
                }
                tracing::debug!(widget = %name, "transport stop");
                running.set(false);
            });
        }

        Ok(())
    }

    fn next_attempt(&self) -> u64 {
        self.attempts.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn lock_phase(&self) -> std::sync::MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Start the first entry point, if there is one
fn start_first_entry(graph: &dyn ExecutionGraph) -> Option<RunCompletion> {
    match graph.entry_points().into_iter().next() {
        Some(entry) => {
            tracing::info!(node = %entry.id, "run");
            Some(graph.run(&entry.id))
        }
        None => {
            tracing::info!("run requested with no entry points");
            None
        }
    }
}

/// Set running back to false later, unless the menu is gone by then
fn schedule_reset(
    handle: &Handle,
    tracking: RunTracking,
    completion: Option<RunCompletion>,
    running: RunningState,
    alive: Liveness,
) {
    handle.spawn(async move {
        match (tracking, completion) {
            (RunTracking::Completion, Some(completion)) => completion.await,
            _ => tokio::task::yield_now().await,
        }
        if alive.is_alive() {
            running.set(false);
        } else {
            tracing::debug!("menu unmounted; dropping deferred running reset");
        }
    });
}

#[cfg(test)]
mod tests;
