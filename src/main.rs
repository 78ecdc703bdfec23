// blockmenu - run/stop/reset menu for a block program
//
// A menu component mounted into a view. It owns the transport controls
// (run, stop, reset), the optional feature-gated controls, and a registry
// that lets other code hook into control activations.
//
// Architecture:
// - Menu (menu): mount lifecycle, default transport behavior, hook registry
// - View (view): terminal (ratatui) or headless; builds widgets, paints frames
// - Engine (engine): in-memory program the run control starts
// - Command hooks: shell commands bound to hooks from config
// - Running state: watch channel shared by the menu and the view

mod cli;
mod command_hooks;
mod component;
mod config;
mod engine;
mod i18n;
mod logging;
mod menu;
mod startup;
mod view;

use anyhow::Result;
use cli::{RunArgs, Script};
use config::{Config, HooksConfig, LogRotation, LoggingConfig};
use engine::Program;
use i18n::Catalog;
use logging::{LogBuffer, PanelLogLayer};
use menu::state::RunningState;
use menu::{Hook, HookError, HookName, Menu, MenuContext, MenuOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use view::headless::HeadlessView;
use view::terminal::{TerminalContext, TerminalView};

/// Frame interval of the headless frame pump (~60 FPS)
const HEADLESS_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Shared pieces both views are wired to
struct Runtime {
    program: Arc<Program>,
    running: RunningState,
    catalog: Arc<Catalog>,
    options: MenuOptions,
}

impl Runtime {
    fn from_config(config: &Config, args: &RunArgs) -> Self {
        let program = Program::from_config(&config.program);
        if !args.entries.is_empty() {
            program.clear_crumbs();
            for entry in &args.entries {
                program.push_crumb(entry.as_str());
            }
        }

        Self {
            program: Arc::new(program),
            running: RunningState::new(),
            catalog: Arc::new(Catalog::with_overrides(&config.strings)),
            options: MenuOptions {
                run_tracking: config.menu.run_tracking,
            },
        }
    }

    fn menu_context(&self, view: Arc<dyn view::ViewBridge>) -> MenuContext {
        MenuContext {
            view,
            graph: self.program.clone(),
            running: self.running.clone(),
            catalog: self.catalog.clone(),
            options: self.options,
        }
    }
}

/// Non-blocking rolling file writer for the JSON log layer
fn file_writer(
    logging: &LoggingConfig,
) -> Option<(
    tracing_appender::non_blocking::NonBlocking,
    tracing_appender::non_blocking::WorkerGuard,
)> {
    if !logging.file_enabled {
        return None;
    }
    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        return None;
    }

    let appender = match logging.file_rotation {
        LogRotation::Hourly => {
            tracing_appender::rolling::hourly(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Daily => {
            tracing_appender::rolling::daily(&logging.file_dir, &logging.file_prefix)
        }
        LogRotation::Never => {
            tracing_appender::rolling::never(&logging.file_dir, &logging.file_prefix)
        }
    };
    Some(tracing_appender::non_blocking(appender))
}

/// Initialize tracing
///
/// Terminal mode captures logs into the panel buffer (stdout belongs to the
/// terminal view); headless mode writes to stdout. File logging is added on
/// top when enabled. The returned guard must live until exit so logs flush.
///
/// Precedence: RUST_LOG env var > config file > default "info"
fn init_tracing(
    config: &Config,
    log_buffer: &LogBuffer,
    tui: bool,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let default_filter = format!("blockmenu={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    let panel_layer = tui.then(|| PanelLogLayer::new(log_buffer.clone()));
    let stdout_layer = (!tui).then(tracing_subscriber::fmt::layer);

    let (file_layer, guard) = match file_writer(&config.logging) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(panel_layer)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    guard
}

/// Log every activation of every available control
fn mount_observers(menu: &Menu) -> Result<usize> {
    let mut mounted = 0;
    for name in HookName::ALL {
        let hook = Hook::from_fn(name, move |payload| match payload {
            Some(event) => tracing::info!(hook = %name, files = ?event.files, "activated"),
            None => tracing::info!(hook = %name, "activated"),
        });
        match menu.mount_hook(hook) {
            Ok(()) => mounted += 1,
            Err(HookError::WidgetUnavailable(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(mounted)
}

/// Attach observers and configured command hooks once setup is done
fn attach_hooks(menu: &Menu, hooks: &HooksConfig) -> Result<()> {
    let observers = mount_observers(menu)?;
    tracing::debug!(observers, "observer hooks mounted");

    if hooks.is_configured() {
        let report = command_hooks::mount_command_hooks(menu, hooks)?;
        tracing::info!(
            mounted = report.mounted.len(),
            skipped = report.skipped.len(),
            "command hooks"
        );
    }
    Ok(())
}

/// Finish setup and attach hooks on a task of its own
///
/// Setup waits for a painted frame, so it must not share a task with the
/// loop that paints.
fn spawn_setup(menu: Arc<Menu>, hooks: HooksConfig) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = menu.setup().await {
            tracing::error!("Menu setup failed: {}", e);
            return;
        }
        if let Err(e) = attach_hooks(&menu, &hooks) {
            tracing::error!("Attaching hooks failed: {:#}", e);
        }
    })
}

async fn run_terminal(config: &Config, runtime: &Runtime, log_buffer: LogBuffer) -> Result<()> {
    startup::log_startup(config);

    let view = Arc::new(TerminalView::new());
    let menu = Arc::new(Menu::new(runtime.menu_context(view.clone())));
    menu.mount(config.features).await?;

    let wiring = spawn_setup(menu.clone(), config.hooks.clone());
    let result = view
        .run(TerminalContext {
            log_buffer,
            running: runtime.running.clone(),
            graph: runtime.program.clone(),
        })
        .await;

    if !menu.is_ready() {
        tracing::warn!("terminal closed before the menu finished setting up");
    }
    wiring.abort();
    menu.unmount();
    result
}

async fn run_headless(config: &Config, runtime: &Runtime, args: RunArgs) -> Result<()> {
    startup::print_startup(config);

    let view = Arc::new(HeadlessView::new());
    let menu = Menu::new(runtime.menu_context(view.clone()));
    menu.mount(config.features).await?;

    let pump = view.spawn_frame_pump(HEADLESS_FRAME_INTERVAL);
    menu.setup().await?;
    attach_hooks(&menu, &config.hooks)?;

    let mut running_rx = runtime.running.subscribe();
    let watcher = tokio::spawn(async move {
        while running_rx.changed().await.is_ok() {
            let running = *running_rx.borrow_and_update();
            tracing::info!(running, "running state changed");
        }
    });

    match args.script {
        Some(Script(steps)) => {
            tracing::info!(steps = steps.len(), "running script");
            view.run_script(&steps).await?;

            // Give a started run the chance to finish before exiting
            let grace = Duration::from_millis(config.program.step_delay_ms) + Duration::from_secs(1);
            let mut rx = runtime.running.subscribe();
            if tokio::time::timeout(grace, rx.wait_for(|running| !*running))
                .await
                .is_err()
            {
                tracing::warn!("still running after script; exiting anyway");
            }
        }
        None => {
            tracing::info!("Headless mode, press Ctrl+C to exit");
            tokio::signal::ctrl_c().await?;
        }
    }

    menu.unmount();
    pump.abort();
    watcher.abort();
    tracing::info!(runs = runtime.program.runs().len(), "Shutdown complete");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, ...)
    let Some(args) = cli::handle_cli() else {
        return Ok(());
    };

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();
    let tui = config.enable_tui && !args.headless;

    let log_buffer = LogBuffer::new();
    let _file_guard = init_tracing(&config, &log_buffer, tui);

    let runtime = Runtime::from_config(&config, &args);

    if tui {
        if let Err(e) = run_terminal(&config, &runtime, log_buffer).await {
            // The panel is gone; report on stderr
            eprintln!("Terminal error: {:#}", e);
            return Err(e);
        }
        Ok(())
    } else {
        run_headless(&config, &runtime, args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::FeatureFlags;
    use crate::engine::ExecutionGraph;
    use crate::menu::widgets::{EventKind, WidgetName};

    fn runtime(args: &RunArgs) -> Runtime {
        Runtime::from_config(&Config::default(), args)
    }

    #[tokio::test]
    async fn test_setup_completes_beside_a_busy_paint_loop() {
        let runtime = runtime(&RunArgs::default());
        let view = Arc::new(HeadlessView::new());
        let menu = Arc::new(Menu::new(runtime.menu_context(view.clone())));
        menu.mount(FeatureFlags::NONE).await.unwrap();

        let wiring = spawn_setup(menu.clone(), HooksConfig::default());

        // Same shape as the terminal loop: paint, then give up the thread
        let mut frames = 0;
        while !menu.is_ready() && frames < 1000 {
            view.present_frame();
            tokio::task::yield_now().await;
            frames += 1;
        }
        assert!(menu.is_ready(), "setup starved after {} frames", frames);

        // Observer hooks are attached in the same task right after setup
        wiring.await.unwrap();
        let widgets = menu.widgets().unwrap();
        assert_eq!(
            widgets.get(WidgetName::Run).unwrap().listener_count(EventKind::Click),
            2
        );
        menu.unmount();
    }

    #[tokio::test]
    async fn test_setup_task_reports_unmounted_menu() {
        let runtime = runtime(&RunArgs::default());
        let view = Arc::new(HeadlessView::new());
        let menu = Arc::new(Menu::new(runtime.menu_context(view.clone())));

        // Never mounted: the task ends on its own without attaching anything
        spawn_setup(menu.clone(), HooksConfig::default()).await.unwrap();
        assert!(!menu.is_ready());
    }

    #[test]
    fn test_entry_flags_replace_configured_entry_points() {
        let args = RunArgs {
            entries: vec!["intro".into(), "main".into()],
            ..Default::default()
        };
        let ids: Vec<String> = runtime(&args)
            .program
            .entry_points()
            .into_iter()
            .map(|entry| entry.id.to_string())
            .collect();
        assert_eq!(ids, vec!["intro", "main"]);
    }
}
