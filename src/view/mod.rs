//! View bridge
//!
//! The menu does not draw anything. A view builds the widgets, paints them,
//! and tells the menu when a frame has been presented. Two views ship with
//! the crate: [`headless::HeadlessView`] (scripted, used by tests and
//! `--headless`) and [`terminal::TerminalView`] (ratatui).
//!
//! # Frame signal
//!
//! ```text
//! Menu::setup ── next_frame() ──► FrameClock ◄── present() ── view paint loop
//!      │                                │
//!      └──── resumes after the next ────┘
//!            presented frame
//! ```

pub mod headless;
pub mod terminal;

use crate::component::FeatureFlags;
use crate::i18n::Translator;
use crate::menu::widgets::{Widget, WidgetName, Widgets};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;
use tokio::sync::watch;

/// Configuration handed to the view at mount time
#[derive(Clone)]
pub struct ViewConfig {
    /// Feature flags deciding which optional controls exist
    pub flags: FeatureFlags,
    /// String lookup scoped to the menu namespace
    pub i18n: Translator,
}

impl std::fmt::Debug for ViewConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewConfig")
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// Contract between the menu and whatever renders it
pub trait ViewBridge: Send + Sync {
    /// Build the view; resolves when the view reports readiness
    fn setup(&self, config: ViewConfig) -> BoxFuture<'_, anyhow::Result<()>>;

    /// Resolves after the next frame is presented
    fn next_frame(&self) -> BoxFuture<'static, ()>;

    /// Widget handles, once the view has been set up
    fn widgets(&self) -> Option<Widgets>;
}

/// Build the widget set for `flags`
///
/// Run, stop and reset always exist. Every other control exists only when
/// its feature flag is enabled.
pub fn build_widgets(flags: &FeatureFlags) -> Widgets {
    let mut widgets = Widgets::new();
    for name in WidgetName::ALL {
        let enabled = match name {
            WidgetName::Run | WidgetName::Stop | WidgetName::Reset => true,
            WidgetName::UploadFileInLocalStorage => flags.upload_file,
            WidgetName::StartRecording | WidgetName::StopRecording => flags.recording,
            WidgetName::ExportDrawing => flags.export_drawing,
            WidgetName::LoadProject => flags.load_project,
            WidgetName::SaveProject => flags.save_project,
        };
        if enabled {
            widgets.insert(Arc::new(Widget::new(name)));
        }
    }
    widgets
}

/// Presented-frame counter that futures can wait on
#[derive(Debug, Clone)]
pub struct FrameClock {
    frames: Arc<watch::Sender<u64>>,
}

impl FrameClock {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            frames: Arc::new(tx),
        }
    }

    /// Mark a frame as presented, waking every pending `next_frame`
    pub fn present(&self) {
        self.frames.send_modify(|frame| *frame = frame.wrapping_add(1));
    }

    /// Number of frames presented so far
    pub fn frame(&self) -> u64 {
        *self.frames.borrow()
    }

    /// Future resolving on the first `present()` after this call
    ///
    /// The subscription is taken here, not on first poll, so a frame
    /// presented between the call and the first poll still counts.
    pub fn next_frame(&self) -> BoxFuture<'static, ()> {
        let mut rx = self.frames.subscribe();
        rx.borrow_and_update();
        async move {
            // Sender lives as long as the clock; an error means the view is gone
            let _ = rx.changed().await;
        }
        .boxed()
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
