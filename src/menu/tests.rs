//! Menu lifecycle and hook registry tests
//!
//! Driven through the headless view with manually presented frames and a
//! fake execution graph that records every run request.

use super::*;
use crate::engine::{completed, EntryPoint, NodeId};
use crate::menu::widgets::{ChangeEvent, WidgetEvent};
use crate::view::headless::HeadlessView;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

// ─────────────────────────────────────────────────────────────────────────────
// Test doubles
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FakeGraph {
    entries: Vec<EntryPoint>,
    runs: Mutex<Vec<NodeId>>,
    /// When set, the next run completes only once this receiver fires
    pending: Mutex<Option<oneshot::Receiver<()>>>,
}

impl FakeGraph {
    fn with_entries(ids: &[&str]) -> Self {
        Self {
            entries: ids.iter().map(|id| EntryPoint::new(*id)).collect(),
            ..Default::default()
        }
    }

    fn runs(&self) -> Vec<NodeId> {
        self.runs.lock().unwrap().clone()
    }
}

impl ExecutionGraph for FakeGraph {
    fn entry_points(&self) -> Vec<EntryPoint> {
        self.entries.clone()
    }

    fn run(&self, id: &NodeId) -> RunCompletion {
        self.runs.lock().unwrap().push(id.clone());
        match self.pending.lock().unwrap().take() {
            Some(rx) => async move {
                let _ = rx.await;
            }
            .boxed(),
            None => completed(),
        }
    }
}

struct FailingView;

impl ViewBridge for FailingView {
    fn setup(&self, _config: ViewConfig) -> BoxFuture<'_, anyhow::Result<()>> {
        async { Err::<(), _>(anyhow::anyhow!("no display")) }.boxed()
    }

    fn next_frame(&self) -> BoxFuture<'static, ()> {
        futures::future::ready(()).boxed()
    }

    fn widgets(&self) -> Option<Widgets> {
        None
    }
}

/// Headless view whose build waits for the gate to open
#[derive(Default)]
struct GatedView {
    inner: HeadlessView,
    gate: Notify,
    builds: AtomicUsize,
}

impl ViewBridge for GatedView {
    fn setup(&self, config: ViewConfig) -> BoxFuture<'_, anyhow::Result<()>> {
        async move {
            self.builds.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.inner.setup(config).await
        }
        .boxed()
    }

    fn next_frame(&self) -> BoxFuture<'static, ()> {
        self.inner.next_frame()
    }

    fn widgets(&self) -> Option<Widgets> {
        self.inner.widgets()
    }
}

fn gated_menu() -> (Menu, Arc<GatedView>) {
    let view = Arc::new(GatedView::default());
    let menu = Menu::new(MenuContext {
        view: view.clone(),
        graph: Arc::new(FakeGraph::default()),
        running: RunningState::new(),
        catalog: Arc::new(Catalog::new()),
        options: MenuOptions::default(),
    });
    (menu, view)
}

struct Harness {
    menu: Menu,
    view: Arc<HeadlessView>,
    graph: Arc<FakeGraph>,
    running: RunningState,
}

fn harness_with(graph: FakeGraph, run_tracking: RunTracking) -> Harness {
    let view = Arc::new(HeadlessView::new());
    let graph = Arc::new(graph);
    let running = RunningState::new();
    let menu = Menu::new(MenuContext {
        view: view.clone(),
        graph: graph.clone(),
        running: running.clone(),
        catalog: Arc::new(Catalog::new()),
        options: MenuOptions { run_tracking },
    });
    Harness {
        menu,
        view,
        graph,
        running,
    }
}

fn harness(entries: &[&str]) -> Harness {
    harness_with(FakeGraph::with_entries(entries), RunTracking::Tick)
}

/// Run setup to completion, presenting exactly one frame
async fn complete_setup(h: &Harness) {
    let mut setup = Box::pin(h.menu.setup());
    assert!(futures::poll!(&mut setup).is_pending());
    h.view.present_frame();
    setup.await.unwrap();
}

async fn ready(entries: &[&str], flags: FeatureFlags) -> Harness {
    let h = harness(entries);
    h.menu.mount(flags).await.unwrap();
    complete_setup(&h).await;
    h
}

async fn wait_until_idle(running: &RunningState) {
    let mut rx = running.subscribe();
    tokio::time::timeout(Duration::from_secs(1), rx.wait_for(|running| !*running))
        .await
        .expect("running state never returned to false")
        .expect("running state channel closed");
}

fn listener_counts(widgets: &Widgets) -> Vec<(WidgetName, usize, usize)> {
    widgets
        .names()
        .map(|name| {
            let widget = widgets.get(name).unwrap();
            (
                name,
                widget.listener_count(EventKind::Click),
                widget.listener_count(EventKind::Change),
            )
        })
        .collect()
}

fn trigger(widgets: &Widgets, name: HookName) {
    let widget = widgets.get(name.widget()).unwrap();
    match name.binding() {
        EventKind::Click => widget.click(),
        EventKind::Change => widget.change(vec![PathBuf::from("project.tb")]),
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Mount lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_resolves_only_after_next_frame() {
    let h = harness(&[]);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();

    let mut setup = Box::pin(h.menu.setup());
    assert!(futures::poll!(&mut setup).is_pending());
    assert!(futures::poll!(&mut setup).is_pending());
    assert!(h.menu.widgets().is_none());

    h.view.present_frame();
    setup.await.unwrap();

    let widgets = h.menu.widgets().expect("widgets after setup");
    for name in [WidgetName::Run, WidgetName::Stop, WidgetName::Reset] {
        assert!(widgets.get(name).unwrap().listener_count(EventKind::Click) >= 1);
    }
}

#[tokio::test]
async fn test_mount_registers_strings_and_builds_view() {
    let h = harness(&[]);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    assert_eq!(
        h.view.label(WidgetName::Run).as_deref(),
        crate::component::DEFINITION.string("run")
    );
}

#[tokio::test]
async fn test_mount_twice_is_rejected() {
    let h = harness(&[]);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    assert_eq!(
        h.menu.mount(FeatureFlags::NONE).await,
        Err(MountError::AlreadyMounted)
    );
}

#[tokio::test]
async fn test_setup_requires_mount() {
    let h = harness(&[]);
    assert_eq!(h.menu.setup().await, Err(MountError::NotMounted));
}

#[tokio::test]
async fn test_setup_twice_is_rejected() {
    let h = ready(&[], FeatureFlags::NONE).await;
    assert_eq!(h.menu.setup().await, Err(MountError::AlreadySetUp));
    // still one default listener per transport control
    let widgets = h.menu.widgets().unwrap();
    assert_eq!(
        widgets.get(WidgetName::Stop).unwrap().listener_count(EventKind::Click),
        1
    );
}

#[tokio::test]
async fn test_view_setup_failure_is_reported() {
    let menu = Menu::new(MenuContext {
        view: Arc::new(FailingView),
        graph: Arc::new(FakeGraph::default()),
        running: RunningState::new(),
        catalog: Arc::new(Catalog::new()),
        options: MenuOptions::default(),
    });
    match menu.mount(FeatureFlags::NONE).await {
        Err(MountError::View(message)) => assert!(message.contains("no display")),
        other => panic!("expected view error, got {:?}", other),
    }
    // a failed mount leaves the menu unmounted, so it can be retried
    assert_eq!(menu.setup().await, Err(MountError::NotMounted));
    assert!(matches!(
        menu.mount(FeatureFlags::NONE).await,
        Err(MountError::View(_))
    ));
}

#[tokio::test]
async fn test_mount_while_view_builds_is_rejected() {
    let (menu, view) = gated_menu();

    let mut first = Box::pin(menu.mount(FeatureFlags::NONE));
    assert!(futures::poll!(&mut first).is_pending());

    assert_eq!(
        menu.mount(FeatureFlags::NONE).await,
        Err(MountError::AlreadyMounted)
    );
    assert_eq!(menu.setup().await, Err(MountError::NotMounted));
    assert_eq!(view.builds.load(Ordering::SeqCst), 1);

    view.gate.notify_one();
    first.await.unwrap();
    assert_eq!(view.builds.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unmount_while_view_builds_abandons_that_mount() {
    let (menu, view) = gated_menu();

    let mut stale = Box::pin(menu.mount(FeatureFlags::NONE));
    assert!(futures::poll!(&mut stale).is_pending());
    menu.unmount();

    let mut fresh = Box::pin(menu.mount(FeatureFlags::NONE));
    assert!(futures::poll!(&mut fresh).is_pending());
    assert_eq!(view.builds.load(Ordering::SeqCst), 2);

    view.gate.notify_waiters();
    assert_eq!(stale.await, Err(MountError::NotMounted));
    fresh.await.unwrap();

    let mut setup = Box::pin(menu.setup());
    assert!(futures::poll!(&mut setup).is_pending());
    view.inner.present_frame();
    setup.await.unwrap();
    assert!(menu.is_ready());
}

// ─────────────────────────────────────────────────────────────────────────────
// Transport controls
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_with_no_entry_points() {
    let h = ready(&[], FeatureFlags::NONE).await;
    let widgets = h.menu.widgets().unwrap();

    widgets.get(WidgetName::Run).unwrap().click();
    assert!(h.running.get(), "running is set synchronously");
    assert!(h.graph.runs().is_empty());

    wait_until_idle(&h.running).await;
    assert!(h.graph.runs().is_empty());
}

#[tokio::test]
async fn test_run_starts_first_entry_point_once() {
    let h = ready(&["n1", "n2"], FeatureFlags::NONE).await;
    let widgets = h.menu.widgets().unwrap();

    widgets.get(WidgetName::Run).unwrap().click();
    assert!(h.running.get());
    assert_eq!(h.graph.runs(), vec![NodeId::new("n1")]);

    wait_until_idle(&h.running).await;
    assert_eq!(h.graph.runs(), vec![NodeId::new("n1")]);
}

#[tokio::test]
async fn test_tick_reset_does_not_wait_for_completion() {
    let graph = FakeGraph::with_entries(&["n1"]);
    let (_done_tx, done_rx) = oneshot::channel();
    *graph.pending.lock().unwrap() = Some(done_rx);
    let h = harness_with(graph, RunTracking::Tick);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    complete_setup(&h).await;

    h.menu.widgets().unwrap().get(WidgetName::Run).unwrap().click();
    // the run never completes, yet running still drops after a tick
    wait_until_idle(&h.running).await;
}

#[tokio::test(start_paused = true)]
async fn test_tick_reset_needs_no_clock_time() {
    let h = ready(&["n1"], FeatureFlags::NONE).await;
    let started = tokio::time::Instant::now();

    h.menu.widgets().unwrap().get(WidgetName::Run).unwrap().click();
    assert!(h.running.get());

    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert!(!h.running.get(), "reset lands after a scheduler tick");
    assert_eq!(tokio::time::Instant::now(), started);
}

#[tokio::test]
async fn test_completion_tracking_waits_for_engine() {
    let graph = FakeGraph::with_entries(&["n1"]);
    let (done_tx, done_rx) = oneshot::channel();
    *graph.pending.lock().unwrap() = Some(done_rx);
    let h = harness_with(graph, RunTracking::Completion);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    complete_setup(&h).await;

    h.menu.widgets().unwrap().get(WidgetName::Run).unwrap().click();
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(h.running.get(), "still running until the engine completes");

    done_tx.send(()).unwrap();
    wait_until_idle(&h.running).await;
}

#[tokio::test]
async fn test_completion_tracking_without_entry_points_resets() {
    let h = harness_with(FakeGraph::default(), RunTracking::Completion);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    complete_setup(&h).await;

    h.menu.widgets().unwrap().get(WidgetName::Run).unwrap().click();
    assert!(h.running.get());
    wait_until_idle(&h.running).await;
}

#[tokio::test]
async fn test_stop_and_reset_always_clear_running() {
    let h = ready(&["n1"], FeatureFlags::NONE).await;
    let widgets = h.menu.widgets().unwrap();

    for name in [WidgetName::Stop, WidgetName::Reset] {
        // set directly
        h.running.set(true);
        widgets.get(name).unwrap().click();
        assert!(!h.running.get());

        // via a run activation, before the deferred reset lands
        widgets.get(WidgetName::Run).unwrap().click();
        assert!(h.running.get());
        widgets.get(name).unwrap().click();
        assert!(!h.running.get());

        // repeated presses stay false
        widgets.get(name).unwrap().click();
        assert!(!h.running.get());
    }
}

#[tokio::test]
async fn test_unmount_drops_pending_reset() {
    let h = ready(&["n1"], FeatureFlags::NONE).await;
    let widgets = h.menu.widgets().unwrap();
    let mut rx = h.running.subscribe();

    widgets.get(WidgetName::Run).unwrap().click();
    assert!(*rx.borrow_and_update());
    h.menu.unmount();

    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!rx.has_changed().unwrap(), "no write after unmount");
    assert!(h.running.get());
}

#[tokio::test]
async fn test_default_listeners_inert_after_unmount() {
    let h = ready(&["n1"], FeatureFlags::NONE).await;
    let widgets = h.menu.widgets().unwrap();
    h.menu.unmount();
    assert!(!h.menu.is_ready());

    widgets.get(WidgetName::Run).unwrap().click();
    assert!(!h.running.get());
    assert!(h.graph.runs().is_empty());
}

#[tokio::test]
async fn test_unmount_during_setup() {
    let h = harness(&[]);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();

    let mut setup = Box::pin(h.menu.setup());
    assert!(futures::poll!(&mut setup).is_pending());
    h.menu.unmount();
    h.view.present_frame();
    assert_eq!(setup.await, Err(MountError::NotMounted));
    assert!(h.menu.widgets().is_none());
}

#[tokio::test]
async fn test_setup_from_before_remount_stays_out() {
    let h = harness(&[]);
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    let mut stale = Box::pin(h.menu.setup());
    assert!(futures::poll!(&mut stale).is_pending());

    h.menu.unmount();
    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    let mut fresh = Box::pin(h.menu.setup());
    assert!(futures::poll!(&mut fresh).is_pending());

    h.view.present_frame();
    assert_eq!(stale.await, Err(MountError::NotMounted));
    fresh.await.unwrap();

    assert!(h.menu.is_ready());
    let widgets = h.menu.widgets().unwrap();
    for name in [WidgetName::Run, WidgetName::Stop, WidgetName::Reset] {
        assert_eq!(
            widgets.get(name).unwrap().listener_count(EventKind::Click),
            1,
            "{} attached once",
            name
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hook registry
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_every_hook_fires_all_callbacks_in_order() {
    const N: usize = 3;
    let h = ready(&[], FeatureFlags::ALL).await;
    let widgets = h.menu.widgets().unwrap();

    for name in HookName::ALL {
        let fired = Arc::new(Mutex::new(Vec::new()));
        for i in 0..N {
            let fired = fired.clone();
            h.menu
                .mount_hook(Hook::from_fn(name, move |_| fired.lock().unwrap().push(i)))
                .unwrap();
        }

        trigger(&widgets, name);
        assert_eq!(*fired.lock().unwrap(), (0..N).collect::<Vec<_>>(), "{}", name);
    }
}

#[tokio::test]
async fn test_change_hooks_receive_payload() {
    let h = ready(&[], FeatureFlags::ALL).await;
    let seen: Arc<Mutex<Vec<ChangeEvent>>> = Arc::new(Mutex::new(Vec::new()));

    let uploads = seen.clone();
    h.menu
        .mount_hook(Hook::upload_file_in_local_storage(move |event| {
            uploads.lock().unwrap().push(event.clone())
        }))
        .unwrap();
    let loads = seen.clone();
    h.menu
        .mount_hook(Hook::load_project(move |event| {
            loads.lock().unwrap().push(event.clone())
        }))
        .unwrap();

    let widgets = h.menu.widgets().unwrap();
    widgets
        .get(WidgetName::UploadFileInLocalStorage)
        .unwrap()
        .change(vec![PathBuf::from("sample.wav")]);
    widgets
        .get(WidgetName::LoadProject)
        .unwrap()
        .dispatch(&WidgetEvent::Change(ChangeEvent {
            widget: WidgetName::LoadProject,
            files: vec![PathBuf::from("song.tb")],
        }));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].widget, WidgetName::UploadFileInLocalStorage);
    assert_eq!(seen[0].files, vec![PathBuf::from("sample.wav")]);
    assert_eq!(seen[1].files, vec![PathBuf::from("song.tb")]);
}

#[tokio::test]
async fn test_change_hooks_ignore_clicks() {
    let h = ready(&[], FeatureFlags::ALL).await;
    let fired = Arc::new(Mutex::new(0));
    let count = fired.clone();
    h.menu
        .mount_hook(Hook::load_project(move |_| *count.lock().unwrap() += 1))
        .unwrap();

    h.menu
        .widgets()
        .unwrap()
        .get(WidgetName::LoadProject)
        .unwrap()
        .click();
    assert_eq!(*fired.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_run_hook_fires_after_default_behavior() {
    let h = ready(&["n1"], FeatureFlags::NONE).await;
    let observed = Arc::new(Mutex::new(None));

    let running = h.running.clone();
    let graph = h.graph.clone();
    let slot = observed.clone();
    h.menu
        .mount_hook(Hook::run(move || {
            *slot.lock().unwrap() = Some((running.get(), graph.runs().len()));
        }))
        .unwrap();

    h.menu.widgets().unwrap().get(WidgetName::Run).unwrap().click();
    assert_eq!(*observed.lock().unwrap(), Some((true, 1)));
}

#[tokio::test]
async fn test_unknown_hook_name_has_no_effect() {
    let h = ready(&[], FeatureFlags::ALL).await;
    let widgets = h.menu.widgets().unwrap();
    let before = listener_counts(&widgets);

    for bogus in ["uploadFile", "Run", "stop", "", "saveproject"] {
        let result = h.menu.mount_hook_by_name(bogus, |_| panic!("must never fire"));
        assert_eq!(result, Err(HookError::UnknownHook(bogus.to_string())));
    }

    assert_eq!(listener_counts(&widgets), before);
    for name in widgets.names().collect::<Vec<_>>() {
        let widget = widgets.get(name).unwrap();
        widget.click();
        widget.change(vec![]);
    }
}

#[tokio::test]
async fn test_hook_by_name_accumulates() {
    let h = ready(&[], FeatureFlags::ALL).await;
    let fired = Arc::new(Mutex::new(Vec::new()));
    for tag in ["a", "b"] {
        let fired = fired.clone();
        h.menu
            .mount_hook_by_name("saveProject", move |payload| {
                assert!(payload.is_none());
                fired.lock().unwrap().push(tag);
            })
            .unwrap();
    }

    trigger(&h.menu.widgets().unwrap(), HookName::SaveProject);
    assert_eq!(*fired.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_hook_before_setup_is_rejected() {
    let h = harness(&[]);
    assert_eq!(
        h.menu.mount_hook(Hook::run(|| {})),
        Err(HookError::NotMounted)
    );

    h.menu.mount(FeatureFlags::NONE).await.unwrap();
    assert_eq!(
        h.menu.mount_hook(Hook::reset(|| {})),
        Err(HookError::NotMounted)
    );
}

#[tokio::test]
async fn test_hook_for_disabled_feature_is_rejected() {
    let h = ready(&[], FeatureFlags::NONE).await;
    assert_eq!(
        h.menu.mount_hook(Hook::save_project(|| {})),
        Err(HookError::WidgetUnavailable(HookName::SaveProject))
    );
    assert_eq!(
        h.menu.mount_hook_by_name("startRecording", |_| {}),
        Err(HookError::WidgetUnavailable(HookName::StartRecording))
    );
}

#[tokio::test]
async fn test_hook_after_unmount_is_rejected() {
    let h = ready(&[], FeatureFlags::NONE).await;
    h.menu.unmount();
    assert_eq!(
        h.menu.mount_hook(Hook::run(|| {})),
        Err(HookError::NotMounted)
    );
}
