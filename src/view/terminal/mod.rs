// Terminal view - ratatui rendering of the menu
//
// This module owns the terminal while it runs:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, running-state changes)
// - Presenting a frame on the FrameClock after every draw
// - Applying key actions to the widget handles

pub mod app;
pub mod ui;

use super::{build_widgets, FrameClock, ViewBridge, ViewConfig};
use crate::engine::ExecutionGraph;
use crate::logging::LogBuffer;
use crate::menu::state::RunningState;
use crate::menu::widgets::{WidgetName, Widgets};
use anyhow::{Context, Result};
use app::{Action, App};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::future::BoxFuture;
use futures::FutureExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct Built {
    widgets: Widgets,
    /// Present controls in menu order, with translated labels
    controls: Vec<(WidgetName, String)>,
}

/// Collaborators the event loop reads from
pub struct TerminalContext {
    pub log_buffer: LogBuffer,
    pub running: RunningState,
    pub graph: Arc<dyn ExecutionGraph>,
}

/// View rendered in the terminal
#[derive(Debug, Default)]
pub struct TerminalView {
    clock: FrameClock,
    built: Mutex<Option<Built>>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Built>> {
        self.built.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run the terminal until the user quits
    ///
    /// The view must have been set up (mounted) first; the first draw is the
    /// frame the menu's setup waits for.
    pub async fn run(&self, ctx: TerminalContext) -> Result<()> {
        let (widgets, controls) = {
            let built = self.lock();
            let built = built
                .as_ref()
                .context("Terminal view has not been set up")?;
            (built.widgets.clone(), built.controls.clone())
        };

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

        let mut app = App::new(ctx.log_buffer.clone(), controls);
        let result = self
            .run_event_loop(&mut terminal, &mut app, &widgets, &ctx)
            .await;

        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to restore terminal")?;
        terminal.show_cursor().context("Failed to show cursor")?;

        result
    }

    async fn run_event_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        app: &mut App,
        widgets: &Widgets,
        ctx: &TerminalContext,
    ) -> Result<()> {
        let mut tick_interval = tokio::time::interval(Duration::from_millis(200));
        let mut running_rx = ctx.running.subscribe();

        loop {
            let entry_points: Vec<String> = ctx
                .graph
                .entry_points()
                .into_iter()
                .map(|entry| entry.id.0)
                .collect();
            let snapshot = ui::Snapshot {
                running: *running_rx.borrow_and_update(),
                entry_points: &entry_points,
            };
            terminal
                .draw(|f| ui::draw(f, app, &snapshot))
                .context("Failed to draw terminal")?;
            self.clock.present();
            app.frames = self.clock.frame();

            tokio::select! {
                // Keyboard input
                action = async {
                    if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                        if let Ok(Event::Key(key_event)) = event::read() {
                            return app.handle_key(key_event);
                        }
                    }
                    // Hand the task back so futures sharing it make progress
                    tokio::task::yield_now().await;
                    Action::None
                } => apply(action, widgets),

                // Periodic redraw (log panel)
                _ = tick_interval.tick() => {}

                // Redraw as soon as the running indicator flips
                changed = running_rx.changed() => {
                    if changed.is_err() {
                        tracing::debug!("running state closed");
                    }
                }
            }

            if app.should_quit {
                break;
            }
        }

        Ok(())
    }
}

/// Apply a key action to the widget handles
fn apply(action: Action, widgets: &Widgets) {
    match action {
        Action::Activate(name) => {
            if let Some(widget) = widgets.get(name) {
                widget.click();
            }
        }
        Action::Select(name, files) => {
            if let Some(widget) = widgets.get(name) {
                widget.change(files);
            }
        }
        Action::None | Action::Quit => {}
    }
}

impl ViewBridge for TerminalView {
    fn setup(&self, config: ViewConfig) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            let widgets = build_widgets(&config.flags);
            let controls = WidgetName::ALL
                .into_iter()
                .filter(|name| widgets.contains(*name))
                .map(|name| (name, (config.i18n)(name.string_key())))
                .collect();
            *self.lock() = Some(Built { widgets, controls });
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
