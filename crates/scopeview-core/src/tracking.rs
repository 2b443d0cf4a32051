//! Usage analytics.
//!
//! The shell reports key-driven UI changes through a [`Tracker`]. The
//! default [`LogTracker`] emits them as structured `tracing` events under
//! the `scopeview::tracking` target.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};
use tracing::info;

use crate::selectors;
use crate::state::ViewState;

pub type TrackingProps = Map<String, Value>;

pub trait Tracker: Send {
    fn track(&mut self, event: &str, props: TrackingProps);
}

/// Writes each event to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTracker;

impl Tracker for LogTracker {
    fn track(&mut self, event: &str, props: TrackingProps) {
        info!(target: "scopeview::tracking", event, props = %serde_json::Value::Object(props));
    }
}

/// Keeps every event in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingTracker {
    events: Arc<Mutex<Vec<(String, TrackingProps)>>>,
}

impl RecordingTracker {
    pub fn events(&self) -> Vec<(String, TrackingProps)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Tracker for RecordingTracker {
    fn track(&mut self, event: &str, props: TrackingProps) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((event.to_owned(), props));
    }
}

/// Context attached to every tracked event: layout plus topology ids.
pub fn tracking_context(state: &ViewState) -> TrackingProps {
    let current = selectors::current_topology(state);
    let mut props = Map::new();
    props.insert(
        "layout".into(),
        Value::String(state.topology_view_mode.to_string()),
    );
    props.insert(
        "topologyId".into(),
        state
            .current_topology_id
            .clone()
            .map_or(Value::Null, Value::String),
    );
    props.insert(
        "parentTopologyId".into(),
        current
            .and_then(|c| c.parent_id)
            .map_or(Value::Null, |p| Value::String(p.to_owned())),
    );
    props
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::state::TopologyViewMode;

    #[test]
    fn context_carries_layout_and_topology_ids() {
        let state = ViewState {
            topologies: serde_json::from_value(serde_json::json!([
                {"name": "Hosts", "url": "/api/topology/hosts",
                 "sub_topologies": [{"name": "by IP", "url": "/api/topology/hosts-by-ip"}]}
            ]))
            .unwrap(),
            current_topology_id: Some("hosts-by-ip".into()),
            topology_view_mode: TopologyViewMode::Resource,
            ..ViewState::default()
        };

        let ctx = tracking_context(&state);
        assert_eq!(ctx["layout"], "resource");
        assert_eq!(ctx["topologyId"], "hosts-by-ip");
        assert_eq!(ctx["parentTopologyId"], "hosts");
    }

    #[test]
    fn recording_tracker_clones_share_events() {
        let recorder = RecordingTracker::default();
        let mut handle = recorder.clone();
        handle.track("scope.layout.selector.keypress", TrackingProps::new());
        assert_eq!(recorder.events().len(), 1);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn log_tracker_writes_props_as_json() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let mut props = TrackingProps::new();
        props.insert("layout".into(), Value::String("table".into()));
        tracing::subscriber::with_default(subscriber, || {
            LogTracker.track("scope.layout.selector.keypress", props);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("scopeview::tracking"), "{output}");
        assert!(output.contains("scope.layout.selector.keypress"), "{output}");
        assert!(output.contains(r#"props={"layout":"table"}"#), "{output}");
    }
}
