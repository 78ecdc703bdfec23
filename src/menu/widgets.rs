//! Widget handles and their listener lists
//!
//! Widgets are created and owned by the view. The menu only holds cloned
//! handles and appends listeners to them. Listeners accumulate: adding one
//! never replaces another, and dispatch runs them in registration order.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// The fixed set of controls a menu view can expose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetName {
    Run,
    Stop,
    Reset,
    UploadFileInLocalStorage,
    StartRecording,
    StopRecording,
    ExportDrawing,
    LoadProject,
    SaveProject,
}

impl WidgetName {
    pub const ALL: [WidgetName; 9] = [
        WidgetName::Run,
        WidgetName::Stop,
        WidgetName::Reset,
        WidgetName::UploadFileInLocalStorage,
        WidgetName::StartRecording,
        WidgetName::StopRecording,
        WidgetName::ExportDrawing,
        WidgetName::LoadProject,
        WidgetName::SaveProject,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetName::Run => "run",
            WidgetName::Stop => "stop",
            WidgetName::Reset => "reset",
            WidgetName::UploadFileInLocalStorage => "uploadFileInLocalStorage",
            WidgetName::StartRecording => "startRecording",
            WidgetName::StopRecording => "stopRecording",
            WidgetName::ExportDrawing => "exportDrawing",
            WidgetName::LoadProject => "loadProject",
            WidgetName::SaveProject => "saveProject",
        }
    }

    /// Key of the widget's label in the menu string table
    pub fn string_key(&self) -> &'static str {
        match self {
            WidgetName::UploadFileInLocalStorage => "uploadFile",
            other => other.as_str(),
        }
    }

    /// Native event the widget emits when used
    pub fn native_event(&self) -> EventKind {
        match self {
            WidgetName::UploadFileInLocalStorage | WidgetName::LoadProject => EventKind::Change,
            _ => EventKind::Click,
        }
    }
}

impl fmt::Display for WidgetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WidgetName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unknown widget '{}'", s))
    }
}

/// Kind of event a listener is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Activation (button press)
    Click,
    /// Value change (file picked)
    Change,
}

/// Payload of a change event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Widget that produced the event
    pub widget: WidgetName,
    /// Files selected through the control
    pub files: Vec<PathBuf>,
}

/// Event delivered to widget listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    Click,
    Change(ChangeEvent),
}

impl WidgetEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WidgetEvent::Click => EventKind::Click,
            WidgetEvent::Change(_) => EventKind::Change,
        }
    }
}

/// Listener callback attached to a widget
pub type Listener = Arc<dyn Fn(&WidgetEvent) + Send + Sync>;

/// A single control owned by the view
pub struct Widget {
    name: WidgetName,
    listeners: Mutex<Vec<(EventKind, Listener)>>,
}

/// Shared reference to a widget
pub type WidgetHandle = Arc<Widget>;

impl Widget {
    pub fn new(name: WidgetName) -> Self {
        Self {
            name,
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> WidgetName {
        self.name
    }

    /// Append a listener for `kind`
    pub fn add_listener<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&WidgetEvent) + Send + Sync + 'static,
    {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((kind, Arc::new(listener)));
    }

    /// Number of listeners bound to `kind`
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Deliver `event` to every matching listener, in registration order
    ///
    /// The list is snapshotted first, so listeners added while dispatching
    /// only see later events. Returns the number of listeners invoked.
    pub fn dispatch(&self, event: &WidgetEvent) -> usize {
        let kind = event.kind();
        let matching: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(widget = %self.name, ?kind, listeners = matching.len(), "dispatch");

        for listener in &matching {
            listener(event);
        }
        matching.len()
    }

    /// Activate the control
    pub fn click(&self) -> usize {
        self.dispatch(&WidgetEvent::Click)
    }

    /// Report a file selection on the control
    pub fn change(&self, files: Vec<PathBuf>) -> usize {
        self.dispatch(&WidgetEvent::Change(ChangeEvent {
            widget: self.name,
            files,
        }))
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.name)
            .field("click_listeners", &self.listener_count(EventKind::Click))
            .field("change_listeners", &self.listener_count(EventKind::Change))
            .finish()
    }
}

/// The set of widget handles a view exposes
#[derive(Debug, Clone, Default)]
pub struct Widgets {
    handles: BTreeMap<WidgetName, WidgetHandle>,
}

impl Widgets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: WidgetHandle) {
        self.handles.insert(handle.name(), handle);
    }

    pub fn get(&self, name: WidgetName) -> Option<&WidgetHandle> {
        self.handles.get(&name)
    }

    pub fn contains(&self, name: WidgetName) -> bool {
        self.handles.contains_key(&name)
    }

    /// Widget names in display order
    pub fn names(&self) -> impl Iterator<Item = WidgetName> + '_ {
        self.handles.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listeners_fire_in_registration_order() {
        let widget = Widget::new(WidgetName::Run);
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let order = order.clone();
            widget.add_listener(EventKind::Click, move |_| order.lock().unwrap().push(i));
        }

        assert_eq!(widget.click(), 4);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_dispatch_filters_by_kind() {
        let widget = Widget::new(WidgetName::LoadProject);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let clicks = seen.clone();
        widget.add_listener(EventKind::Click, move |_| clicks.lock().unwrap().push("click"));
        let changes = seen.clone();
        widget.add_listener(EventKind::Change, move |event| {
            if let WidgetEvent::Change(change) = event {
                assert_eq!(change.widget, WidgetName::LoadProject);
                changes.lock().unwrap().push("change");
            }
        });

        assert_eq!(widget.change(vec![PathBuf::from("song.tb")]), 1);
        assert_eq!(*seen.lock().unwrap(), vec!["change"]);
    }

    #[test]
    fn test_listener_added_during_dispatch_waits_for_next_event() {
        let widget = Arc::new(Widget::new(WidgetName::Reset));
        let count = Arc::new(Mutex::new(0));

        let inner_widget = Arc::downgrade(&widget);
        let inner_count = count.clone();
        widget.add_listener(EventKind::Click, move |_| {
            if let Some(widget) = inner_widget.upgrade() {
                let count = inner_count.clone();
                widget.add_listener(EventKind::Click, move |_| *count.lock().unwrap() += 1);
            }
        });

        assert_eq!(widget.click(), 1);
        assert_eq!(*count.lock().unwrap(), 0);
        assert_eq!(widget.click(), 2);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_widget_name_parse_and_keys() {
        assert_eq!("saveProject".parse(), Ok(WidgetName::SaveProject));
        assert!("SaveProject".parse::<WidgetName>().is_err());
        assert_eq!(WidgetName::UploadFileInLocalStorage.string_key(), "uploadFile");
        assert_eq!(WidgetName::LoadProject.native_event(), EventKind::Change);
        assert_eq!(WidgetName::ExportDrawing.native_event(), EventKind::Click);
    }
}
