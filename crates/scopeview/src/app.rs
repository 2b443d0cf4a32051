//! Application shell: mount/unmount lifecycle, keyboard and resize
//! listeners, the event loop, and frame rendering.
//!
//! The shell owns the [`Store`] and is the only place that dispatches into
//! it. Key handlers dispatch synchronously; background fetch tasks send
//! actions over the channel, which is drained once per loop turn.

use std::collections::VecDeque;
use std::iter;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Frame, layout::Rect};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use scopeview_api::ScopeClient;
use scopeview_core::{
    Action, Debouncer, Location, Router, RouterOptions, Store, Tracker, ViewState, selectors,
    tracking::tracking_context,
};

use crate::event::{Event, EventReader};
use crate::fetch::Fetcher;
use crate::keys::{Tracked, char_shortcut};
use crate::layout::{ShellLayout, node_rows, row_anchor};
use crate::tui::{Surface, Tui};
use crate::widgets::{debug_toolbar, details, help, monitor, nodes, status, terminal};

const KEYS_TARGET: &str = "scopeview::keys";

#[derive(Debug, Clone)]
pub struct ShellOptions {
    pub router: RouterOptions,
    /// Fetch topologies on mount even when the route already asked for data.
    pub always_fetch_topologies: bool,
    pub resize_debounce: Duration,
    pub refresh_interval: Duration,
    pub tick_rate: Duration,
    pub frame_rate: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            router: RouterOptions::default(),
            always_fetch_topologies: false,
            resize_debounce: Duration::from_millis(200),
            refresh_interval: Duration::from_secs(5),
            tick_rate: Duration::from_millis(250),
            frame_rate: Duration::from_millis(33),
        }
    }
}

/// Which input listeners are registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Listeners {
    key_up: bool,
    key_press: bool,
    resize: bool,
}

impl Listeners {
    const ALL: Self = Self {
        key_up: true,
        key_press: true,
        resize: true,
    };
    const NONE: Self = Self {
        key_up: false,
        key_press: false,
        resize: false,
    };
}

#[allow(clippy::struct_excessive_bools)]
pub struct AppShell {
    store: Store,
    router: Router,
    options: ShellOptions,
    surface: Box<dyn Surface>,
    resize: Debouncer,
    listeners: Listeners,
    /// Actions held back until the next loop turn.
    deferred: VecDeque<Action>,
    debug_toolbar: bool,
    /// Without release reporting, Esc/Ctrl+D presses stand in for their
    /// releases.
    releases_reported: bool,
    /// Backspace was handled on press; swallow the matching release.
    backspace_held: bool,
    render_requested: bool,
    mounted: bool,
    running: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    fetcher: Fetcher,
    tracker: Box<dyn Tracker>,
}

impl AppShell {
    pub fn new(
        state: ViewState,
        location: Location,
        options: ShellOptions,
        client: Option<ScopeClient>,
        surface: Box<dyn Surface>,
        tracker: Box<dyn Tracker>,
    ) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let fetcher = Fetcher::new(client, action_tx.clone(), options.refresh_interval);
        Self {
            store: Store::new(state),
            router: Router::new(location),
            resize: Debouncer::new(options.resize_debounce),
            options,
            surface,
            listeners: Listeners::NONE,
            deferred: VecDeque::new(),
            debug_toolbar: false,
            releases_reported: true,
            backspace_held: false,
            render_requested: false,
            mounted: false,
            running: true,
            action_tx,
            action_rx,
            fetcher,
            tracker,
        }
    }

    pub fn state(&self) -> &ViewState {
        self.store.state()
    }

    pub fn location(&self) -> &Location {
        self.router.location()
    }

    pub fn set_releases_reported(&mut self, reported: bool) {
        self.releases_reported = reported;
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Clear the fragment, measure, register listeners, route, and load
    /// topologies unless the route already asked for them.
    pub fn mount(&mut self) {
        if self.mounted {
            return;
        }
        self.router.location_mut().clear_fragment();
        self.set_viewport_dimensions();
        self.listeners = Listeners::ALL;

        let mut routed = Vec::new();
        self.router.start(self.options.router, |action| routed.push(action));
        for action in &routed {
            self.dispatch(action);
        }

        if !self.state().route_set || self.options.always_fetch_topologies {
            self.fetch_topologies(true);
        }
        self.mounted = true;
        info!(location = %self.router.location(), "shell mounted");
    }

    /// Deregister every listener and release what the shell holds. Safe to
    /// call twice; only the first call dispatches `Shutdown`.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.listeners = Listeners::NONE;
        self.resize.cancel();
        self.deferred.clear();
        self.dispatch(&Action::Shutdown);
        self.mounted = false;
        info!("shell unmounted");
    }

    // ── Dispatch ────────────────────────────────────────────────────

    fn dispatch(&mut self, action: &Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Render => self.render_requested = true,
            _ => {}
        }
        self.store.dispatch(action);
        match action {
            // The router asked for data; keep any poll already running.
            Action::Route(_) => self.fetch_topologies(false),
            Action::Shutdown => self.fetcher.stop(),
            _ => {}
        }
    }

    fn fetch_topologies(&mut self, force: bool) {
        let options = selectors::active_topology_options(self.store.state());
        let store = &mut self.store;
        self.fetcher
            .fetch_topologies(&options, |action| store.dispatch(&action), force);
    }

    /// Measure the surface and record the result.
    fn set_viewport_dimensions(&mut self) {
        if let Some((width, height)) = self.surface.measure() {
            self.dispatch(&Action::SetViewportDimensions { width, height });
        }
    }

    /// Report `event` with the shared context, plus `metricType` when given.
    fn track_event(&mut self, event: &str, metric_type: Option<Value>) {
        let mut props = tracking_context(self.store.state());
        if let Some(metric) = metric_type {
            props.insert("metricType".into(), metric);
        }
        self.tracker.track(event, props);
    }

    fn pinned_metric(&self) -> Value {
        self.state()
            .pinned_metric_type
            .clone()
            .map_or(Value::Null, Value::String)
    }

    // ── Events ──────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: Event) {
        self.handle_event_at(event, Instant::now());
    }

    pub fn handle_event_at(&mut self, event: Event, now: Instant) {
        match event {
            Event::KeyPress(key) => self.handle_key(key),
            Event::KeyRelease(key) => {
                let handled_on_press =
                    key.code == KeyCode::Backspace && std::mem::take(&mut self.backspace_held);
                if !handled_on_press {
                    self.on_key_up(key);
                }
            }
            Event::Resize(..) => self.on_resize_at(now),
            Event::Render => {
                let _ = self.action_tx.send(Action::Render);
            }
            Event::Tick => {}
        }
        self.tick_at(now);
    }

    /// A terminal resize. Measuring waits until resizes stop for the
    /// debounce interval.
    pub fn on_resize_at(&mut self, now: Instant) {
        if self.listeners.resize {
            self.resize.call_at(now);
        }
    }

    /// Fire the debounced resize if its quiet period is over.
    pub fn tick_at(&mut self, now: Instant) {
        if self.resize.poll_at(now) {
            self.set_viewport_dimensions();
            self.deferred.push_back(Action::Render);
        }
    }

    /// Key release listener.
    pub fn on_key_up(&mut self, key: KeyEvent) {
        if !self.listeners.key_up {
            return;
        }
        match key.code {
            KeyCode::Esc => {
                debug!(target: KEYS_TARGET, "esc");
                self.dispatch(&Action::HitEsc);
            }
            KeyCode::Backspace => {
                debug!(target: KEYS_TARGET, "backspace");
                self.dispatch(&Action::HitBackspace);
            }
            KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && !selectors::showing_terminal(self.state()) =>
            {
                self.debug_toolbar = !self.debug_toolbar;
                debug!(target: KEYS_TARGET, visible = self.debug_toolbar, "debug toolbar");
            }
            _ => {}
        }
    }

    /// Key press listener for the character shortcuts. Returns `true` when
    /// the key was consumed and must not reach text entry.
    pub fn on_key_press(&mut self, key: KeyEvent) -> bool {
        if !self.listeners.key_press {
            return false;
        }
        let KeyCode::Char(c) = key.code else {
            return false;
        };
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        let state = self.state();
        if state.search_focused || selectors::showing_terminal(state) {
            return false;
        }
        let Some(shortcut) = char_shortcut(c) else {
            return false;
        };

        debug!(target: KEYS_TARGET, key = %c, action = ?shortcut.action, "shortcut");
        if let Some(Tracked::UnpinMetric(event)) = shortcut.tracked {
            let metric = self.pinned_metric();
            self.track_event(event, Some(metric));
        }
        self.dispatch(&shortcut.action);
        match shortcut.tracked {
            Some(Tracked::PinMetric(event)) => {
                let metric = self.pinned_metric();
                self.track_event(event, Some(metric));
            }
            Some(Tracked::Layout(event)) => self.track_event(event, None),
            Some(Tracked::UnpinMetric(_)) | None => {}
        }
        shortcut.prevent_default
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.dispatch(&Action::Quit);
            return;
        }
        // Terminals on the kitty protocol only report Backspace releases
        // with every key sent as an escape code, so it always acts on press.
        if key.code == KeyCode::Backspace {
            self.backspace_held = self.releases_reported;
            self.on_key_up(key);
            return;
        }
        if !self.releases_reported && stands_in_for_release(key) {
            self.on_key_up(key);
            return;
        }
        if !self.on_key_press(key) {
            self.default_key_action(key);
        }
    }

    /// What a key does when no listener consumed it: text entry into the
    /// focused search box, otherwise cursor movement.
    fn default_key_action(&mut self, key: KeyEvent) {
        if !self.listeners.key_press {
            return;
        }
        let state = self.state();
        if state.search_focused {
            match key.code {
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    let query = format!("{}{c}", state.search_query);
                    self.dispatch(&Action::DoSearch(query));
                }
                KeyCode::Enter => self.dispatch(&Action::PinSearch),
                _ => {}
            }
            return;
        }
        if selectors::showing_terminal(state) {
            return;
        }
        match key.code {
            KeyCode::Down => self.move_highlight(true),
            KeyCode::Up => self.move_highlight(false),
            KeyCode::Enter => self.click_highlighted(),
            KeyCode::Tab => self.cycle_topology(true),
            KeyCode::BackTab => self.cycle_topology(false),
            _ => {}
        }
    }

    fn move_highlight(&mut self, down: bool) {
        let state = self.store.state();
        let visible = selectors::filtered_nodes(state);
        let Some(last) = visible.len().checked_sub(1) else {
            return;
        };
        let next = match (nodes::highlighted_index(state, &visible), down) {
            (None, true) => 0,
            (None, false) => last,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        let Some(node) = visible.get(next) else {
            return;
        };
        let id = node.id.clone();

        let area = state
            .viewport
            .map_or_else(Rect::default, |v| Rect::new(0, 0, v.width, v.height));
        let layout = ShellLayout::new(area, state, self.debug_toolbar);
        let rows = node_rows(layout.nodes, nodes::has_header(state.topology_view_mode));
        let (left, top) = row_anchor(rows, next);

        self.dispatch(&Action::HighlightNode { id, left, top });
    }

    fn click_highlighted(&mut self) {
        let state = self.store.state();
        let Some(node) = state
            .highlighted_node_id
            .as_deref()
            .and_then(|id| state.nodes.get(id))
        else {
            return;
        };
        let Some(topology_id) = state.current_topology_id.clone() else {
            return;
        };
        let action = Action::ClickNode {
            id: node.id.clone(),
            label: node.label.clone(),
            topology_id,
        };
        self.dispatch(&action);
    }

    fn cycle_topology(&mut self, forward: bool) {
        let state = self.store.state();
        let ids: Vec<&str> = state
            .topologies
            .iter()
            .flat_map(|t| iter::once(t).chain(t.sub_topologies.iter()))
            .map(scopeview_api::Topology::id)
            .collect();
        let Some(last) = ids.len().checked_sub(1) else {
            return;
        };
        let current = state
            .current_topology_id
            .as_deref()
            .and_then(|c| ids.iter().position(|id| *id == c));
        let next = match (current, forward) {
            (Some(i), true) if i < last => i + 1,
            (Some(0) | None, false) => last,
            (Some(i), false) => i - 1,
            _ => 0,
        };
        let Some(id) = ids.get(next).map(|id| (*id).to_owned()) else {
            return;
        };
        self.dispatch(&Action::ChangeTopology(id));
    }

    /// Process everything queued on the action channel, then bring the
    /// location and the fetcher in line with the new state. Deferred
    /// actions are queued for the next turn.
    ///
    /// Returns `true` if a frame should be drawn.
    pub fn drain_actions(&mut self) -> bool {
        while let Ok(action) = self.action_rx.try_recv() {
            self.dispatch(&action);
        }

        let state = self.store.state();
        self.router.update_route(state);
        if self.mounted {
            self.fetcher.watch(state);
            self.fetcher.sync_details(state);
        }

        for action in self.deferred.drain(..) {
            let _ = self.action_tx.send(action);
        }
        std::mem::take(&mut self.render_requested)
    }

    // ── Loop ────────────────────────────────────────────────────────

    /// Run until quit. Returns the final location so a session can be
    /// resumed from it.
    pub async fn run(&mut self) -> Result<Location> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.set_releases_reported(tui.releases_reported());
        self.mount();

        let mut events = EventReader::new(self.options.tick_rate, self.options.frame_rate);
        info!("event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };
            self.handle_event(event);
            if self.drain_actions() {
                tui.draw(|frame| self.render(frame))?;
            }
        }

        self.unmount();
        events.stop();
        tui.exit()?;
        info!(location = %self.location(), "event loop ended");
        Ok(self.location().clone())
    }

    // ── Rendering ───────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let state = self.state();
        let layout = ShellLayout::new(area, state, self.debug_toolbar);

        status::render_status(frame, layout.status, state, &self.router.location().to_string());
        status::render_search(frame, layout.search, state);
        nodes::render(frame, layout.nodes, state);

        if let (Some(area), Some(entry)) = (layout.details, state.node_details.values().last()) {
            details::render(frame, area, entry);
        }
        if let (Some(area), Some(pipe)) = (layout.terminal, state.control_pipes.values().last()) {
            terminal::render(frame, area, pipe);
        }
        if let Some(monitor_data) = &state.monitor_data {
            monitor::render(frame, layout.nodes, monitor_data);
        }
        if state.showing_help {
            help::render(frame, area);
        }
        if let Some(area) = layout.debug {
            debug_toolbar::render(frame, area, state, self.store.version());
        }
    }
}

fn stands_in_for_release(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('d') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crossterm::event::{KeyEventKind, KeyEventState};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    use scopeview_api::{NodeSummary, TransportConfig};
    use scopeview_core::route::encode_route;
    use scopeview_core::{
        ControlPipe, MonitorData, MonitorMetrics, RecordingTracker, TopologyViewMode, UrlState,
        ViewportDimensions,
    };

    use super::*;
    use crate::keys::{LAYOUT_EVENT, PIN_NEXT_EVENT, SHORTCUT_CHARS, UNPIN_EVENT};

    struct FakeSurface(Arc<Mutex<(u16, u16)>>);

    impl Surface for FakeSurface {
        fn measure(&self) -> Option<(u16, u16)> {
            Some(*self.0.lock().unwrap())
        }
    }

    struct Harness {
        shell: AppShell,
        tracker: RecordingTracker,
        size: Arc<Mutex<(u16, u16)>>,
    }

    impl Harness {
        fn version(&self) -> u64 {
            self.shell.store.version()
        }
    }

    fn harness_with(state: ViewState, location: &str, options: ShellOptions) -> Harness {
        harness_with_client(state, location, options, None)
    }

    fn harness_with_client(
        state: ViewState,
        location: &str,
        options: ShellOptions,
        client: Option<ScopeClient>,
    ) -> Harness {
        let tracker = RecordingTracker::default();
        let size = Arc::new(Mutex::new((120, 40)));
        let shell = AppShell::new(
            state,
            Location::parse(location),
            options,
            client,
            Box::new(FakeSurface(Arc::clone(&size))),
            Box::new(tracker.clone()),
        );
        Harness {
            shell,
            tracker,
            size,
        }
    }

    fn mounted(state: ViewState) -> Harness {
        let mut h = harness_with(state, "/", ShellOptions::default());
        h.shell.mount();
        h
    }

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(c: char) -> KeyEvent {
        key(KeyCode::Char(c), KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn release(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        key(code, modifiers, KeyEventKind::Release)
    }

    fn with_metrics() -> ViewState {
        let mut state = ViewState::with_preferred_topology("containers");
        scopeview_core::reduce(
            &mut state,
            &Action::ReceiveTopologies(
                serde_json::from_value(serde_json::json!([
                    {"name": "Containers", "url": "/api/topology/containers"},
                    {"name": "Weave Net", "url": "/api/topology/weave"}
                ]))
                .unwrap(),
            ),
        );
        let list: Vec<NodeSummary> = serde_json::from_value(serde_json::json!([
            {"id": "a", "label": "nginx",
             "metrics": [{"id": "cpu", "value": 1.0}, {"id": "memory", "value": 2.0},
                         {"id": "throughput_rate", "value": 42.0}]},
            {"id": "b", "label": "redis"}
        ]))
        .unwrap();
        let nodes: IndexMap<String, NodeSummary> =
            list.into_iter().map(|n| (n.id.clone(), n)).collect();
        scopeview_core::reduce(
            &mut state,
            &Action::ReceiveNodes {
                topology_id: "containers".into(),
                nodes,
            },
        );
        state
    }

    /// A terminal pipe restored from the location.
    fn with_pipe(mut state: ViewState) -> ViewState {
        state.control_pipes.insert(
            "p1".into(),
            ControlPipe {
                id: "p1".into(),
                node_id: "a".into(),
                raw_tty: true,
            },
        );
        state
    }

    fn screen(shell: &AppShell) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| shell.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    // ── Mount / unmount ─────────────────────────────────────────────

    #[test]
    fn mount_measures_and_requests_topologies() {
        let h = mounted(ViewState::default());
        let state = h.shell.state();
        assert_eq!(
            state.viewport,
            Some(ViewportDimensions {
                width: 120,
                height: 40
            })
        );
        assert!(state.topologies_loading);
        assert!(!state.route_set);
    }

    #[test]
    fn mount_discards_hashbang_route_with_the_fragment() {
        let route = encode_route(&UrlState {
            topology_id: Some("hosts".into()),
            ..UrlState::default()
        })
        .unwrap();
        let mut h = harness_with(
            ViewState::default(),
            &format!("/#!{route}"),
            ShellOptions::default(),
        );
        h.shell.mount();
        assert!(!h.shell.state().route_set);
        assert_eq!(h.shell.state().current_topology_id, None);
    }

    #[test]
    fn path_route_survives_mount_and_still_loads_data() {
        let route = encode_route(&UrlState {
            topology_id: Some("hosts".into()),
            topology_view_mode: TopologyViewMode::Table,
            ..UrlState::default()
        })
        .unwrap();
        let options = ShellOptions {
            router: RouterOptions { hashbang: false },
            ..ShellOptions::default()
        };
        let mut h = harness_with(ViewState::default(), &route, options);
        h.shell.mount();

        let state = h.shell.state();
        assert!(state.route_set);
        assert_eq!(state.current_topology_id.as_deref(), Some("hosts"));
        assert_eq!(state.topology_view_mode, TopologyViewMode::Table);
        assert!(state.topologies_loading);
    }

    fn hosts_route() -> String {
        encode_route(&UrlState {
            topology_id: Some("hosts".into()),
            ..UrlState::default()
        })
        .unwrap()
    }

    fn path_routing(always_fetch_topologies: bool) -> ShellOptions {
        ShellOptions {
            router: RouterOptions { hashbang: false },
            always_fetch_topologies,
            ..ShellOptions::default()
        }
    }

    #[test]
    fn unrouted_mount_forces_one_fetch() {
        let h = mounted(ViewState::default());
        // Viewport, then the forced topologies request.
        assert_eq!(h.version(), 2);
    }

    #[test]
    fn routed_mount_skips_forced_fetch() {
        let mut h = harness_with(ViewState::default(), &hosts_route(), path_routing(false));
        h.shell.mount();
        // Viewport, route, and the route's own request.
        assert_eq!(h.version(), 3);
        assert!(h.shell.state().route_set);
    }

    #[test]
    fn routed_mount_with_always_fetch_forces_another_fetch() {
        let mut h = harness_with(ViewState::default(), &hosts_route(), path_routing(true));
        h.shell.mount();
        assert_eq!(h.version(), 4);
        assert!(h.shell.state().topologies_loading);
    }

    #[tokio::test]
    async fn routed_mount_polls_the_app_server() {
        let server = wiremock::MockServer::start().await;
        let client =
            ScopeClient::new(url::Url::parse(&server.uri()).unwrap(), &TransportConfig::default())
                .unwrap();

        for always_fetch in [false, true] {
            let mut h = harness_with_client(
                ViewState::default(),
                &hosts_route(),
                path_routing(always_fetch),
                Some(client.clone()),
            );
            h.shell.mount();
            assert!(h.shell.fetcher.is_polling(), "always_fetch {always_fetch}");

            h.shell.unmount();
            assert!(!h.shell.fetcher.is_polling());
        }
    }

    #[test]
    fn unmount_dispatches_one_shutdown_and_silences_listeners() {
        let mut h = mounted(ViewState {
            showing_help: true,
            ..ViewState::default()
        });
        let before = h.version();

        h.shell.unmount();
        assert_eq!(h.version(), before + 1);
        assert!(h.shell.state().shutdown);

        h.shell.unmount();
        h.shell.on_key_up(release(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!h.shell.on_key_press(press('?')));
        h.shell.on_resize_at(Instant::now());
        h.shell.tick_at(Instant::now() + Duration::from_secs(1));

        assert_eq!(h.version(), before + 1);
        assert!(h.shell.state().showing_help);
    }

    // ── Key release ─────────────────────────────────────────────────

    #[test]
    fn escape_release_hits_esc_with_any_modifiers() {
        for modifiers in [
            KeyModifiers::NONE,
            KeyModifiers::SHIFT,
            KeyModifiers::CONTROL,
            KeyModifiers::ALT,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ] {
            let mut h = mounted(ViewState {
                showing_help: true,
                ..ViewState::default()
            });
            let before = h.version();
            h.shell.on_key_up(release(KeyCode::Esc, modifiers));
            assert_eq!(h.version(), before + 1);
            assert!(!h.shell.state().showing_help, "modifiers {modifiers:?}");
        }
    }

    #[test]
    fn backspace_release_hits_backspace() {
        let mut h = mounted(ViewState {
            search_focused: true,
            search_query: "ng".into(),
            ..ViewState::default()
        });
        h.shell.on_key_up(release(KeyCode::Backspace, KeyModifiers::SHIFT));
        assert_eq!(h.shell.state().search_query, "n");
    }

    #[test]
    fn ctrl_d_toggles_debug_toolbar_unless_terminal_shown() {
        let mut h = mounted(ViewState::default());
        let ctrl_d = release(KeyCode::Char('d'), KeyModifiers::CONTROL);

        h.shell.on_key_up(ctrl_d);
        assert!(h.shell.debug_toolbar);
        assert!(screen(&h.shell).contains("viewport 120x40"));
        h.shell.on_key_up(ctrl_d);
        assert!(!h.shell.debug_toolbar);

        let mut h = mounted(with_pipe(ViewState::default()));
        h.shell.on_key_up(ctrl_d);
        assert!(!h.shell.debug_toolbar);
    }

    #[test]
    fn backspace_press_edits_query_when_releases_are_reported() {
        let mut h = mounted(ViewState {
            search_focused: true,
            search_query: "abc".into(),
            ..ViewState::default()
        });
        h.shell.set_releases_reported(true);
        let backspace = |kind| key(KeyCode::Backspace, KeyModifiers::NONE, kind);

        h.shell.handle_event(Event::KeyPress(backspace(KeyEventKind::Press)));
        assert_eq!(h.shell.state().search_query, "ab");

        // A release that does arrive must not delete a second character.
        h.shell.handle_event(Event::KeyRelease(backspace(KeyEventKind::Release)));
        assert_eq!(h.shell.state().search_query, "ab");

        h.shell.handle_event(Event::KeyPress(backspace(KeyEventKind::Repeat)));
        h.shell.handle_event(Event::KeyPress(backspace(KeyEventKind::Repeat)));
        assert_eq!(h.shell.state().search_query, "");
    }

    #[test]
    fn backspace_press_unpins_on_basic_terminals() {
        let mut h = mounted(ViewState {
            search_focused: true,
            pinned_searches: vec!["nginx".into(), "redis".into()],
            ..ViewState::default()
        });
        h.shell.set_releases_reported(false);
        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Backspace,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        )));
        assert_eq!(h.shell.state().pinned_searches, vec!["nginx"]);
    }

    #[test]
    fn presses_stand_in_for_releases_on_basic_terminals() {
        let mut h = mounted(ViewState {
            showing_help: true,
            ..ViewState::default()
        });
        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        )));
        assert!(h.shell.state().showing_help);

        h.shell.set_releases_reported(false);
        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Esc,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        )));
        assert!(!h.shell.state().showing_help);
    }

    // ── Key press ───────────────────────────────────────────────────

    #[test]
    fn each_shortcut_dispatches_exactly_once() {
        for c in SHORTCUT_CHARS {
            let mut h = mounted(with_metrics());
            let before = h.version();
            h.shell.on_key_press(press(c));
            assert_eq!(h.version(), before + 1, "key {c}");
        }
    }

    #[test]
    fn shortcuts_are_suppressed_while_searching() {
        for c in SHORTCUT_CHARS {
            let mut h = mounted(ViewState {
                search_focused: true,
                ..ViewState::default()
            });
            let before = h.version();
            assert!(!h.shell.on_key_press(press(c)));
            assert_eq!(h.version(), before, "key {c}");
            assert!(h.tracker.events().is_empty());
        }
    }

    #[test]
    fn shortcuts_are_suppressed_while_terminal_shown() {
        for c in SHORTCUT_CHARS {
            let mut h = mounted(with_pipe(with_metrics()));
            let before = h.version();
            h.shell.handle_event(Event::KeyPress(press(c)));
            assert_eq!(h.version(), before, "key {c}");
        }
    }

    #[test]
    fn slash_focuses_search_without_typing_itself() {
        let mut h = mounted(ViewState::default());
        h.shell.handle_event(Event::KeyPress(press('/')));
        assert!(h.shell.state().search_focused);
        assert_eq!(h.shell.state().search_query, "");

        h.shell.handle_event(Event::KeyPress(press('g')));
        h.shell.handle_event(Event::KeyPress(press('/')));
        assert_eq!(h.shell.state().search_query, "g/");
        assert_eq!(h.shell.state().topology_view_mode, TopologyViewMode::Graph);
    }

    #[test]
    fn enter_pins_the_search_query() {
        let mut h = mounted(ViewState {
            search_focused: true,
            search_query: "redis".into(),
            ..ViewState::default()
        });
        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Enter,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        )));
        assert_eq!(h.shell.state().pinned_searches, vec!["redis"]);
    }

    #[test]
    fn metric_shortcuts_track_the_metric() {
        let mut h = mounted(with_metrics());
        h.shell.on_key_press(press('>'));
        h.shell.on_key_press(press('q'));

        let events = h.tracker.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, PIN_NEXT_EVENT);
        assert_eq!(events[0].1["metricType"], "cpu");
        assert_eq!(events[0].1["topologyId"], "containers");
        // Unpin reports the metric it is about to drop.
        assert_eq!(events[1].0, UNPIN_EVENT);
        assert_eq!(events[1].1["metricType"], "cpu");
        assert_eq!(h.shell.state().pinned_metric_type, None);
    }

    #[test]
    fn layout_shortcuts_track_the_new_layout() {
        let mut h = mounted(with_metrics());
        h.shell.on_key_press(press('t'));
        let events = h.tracker.events();
        assert_eq!(events[0].0, LAYOUT_EVENT);
        assert_eq!(events[0].1["layout"], "table");
        assert_eq!(events[0].1["parentTopologyId"], Value::Null);
        assert!(!events[0].1.contains_key("metricType"));
    }

    #[test]
    fn ctrl_c_quits_even_while_searching() {
        let mut h = mounted(ViewState {
            search_focused: true,
            ..ViewState::default()
        });
        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        )));
        assert!(!h.shell.running);
        assert_eq!(h.shell.state().search_query, "");
    }

    // ── Navigation ──────────────────────────────────────────────────

    #[test]
    fn cursor_highlight_anchors_monitor_overlay() {
        let mut h = mounted(with_metrics());
        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Down,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        )));

        let state = h.shell.state();
        assert_eq!(state.highlighted_node_id.as_deref(), Some("a"));
        let monitor = state.monitor_data.unwrap();
        // Status + search rows, then the panel border.
        assert_eq!((monitor.left, monitor.top), (3, 3));
        assert_eq!(monitor.data.unwrap().throughput_rate, Some(42.0));

        h.shell.handle_event(Event::KeyPress(key(
            KeyCode::Enter,
            KeyModifiers::NONE,
            KeyEventKind::Press,
        )));
        assert!(selectors::showing_details(h.shell.state()));
    }

    #[test]
    fn tab_cycles_topologies() {
        let mut h = mounted(with_metrics());
        let tab = key(KeyCode::Tab, KeyModifiers::NONE, KeyEventKind::Press);
        h.shell.handle_event(Event::KeyPress(tab));
        assert_eq!(h.shell.state().current_topology_id.as_deref(), Some("weave"));
        h.shell.handle_event(Event::KeyPress(tab));
        assert_eq!(
            h.shell.state().current_topology_id.as_deref(),
            Some("containers")
        );
    }

    // ── Resize ──────────────────────────────────────────────────────

    #[test]
    fn resize_burst_measures_once_after_quiet_period() {
        let mut h = mounted(ViewState::default());
        let base = Instant::now();
        let before = h.version();

        for i in 0..10u64 {
            let now = base + Duration::from_millis(i * 20);
            *h.size.lock().unwrap() = (100 + u16::try_from(i).unwrap(), 30);
            h.shell.on_resize_at(now);
            h.shell.tick_at(now);
        }
        assert_eq!(h.version(), before);

        let quiet = base + Duration::from_millis(180) + Duration::from_millis(200);
        h.shell.tick_at(quiet);
        h.shell.tick_at(quiet + Duration::from_secs(1));

        assert_eq!(h.version(), before + 1);
        assert_eq!(
            h.shell.state().viewport,
            Some(ViewportDimensions {
                width: 109,
                height: 30
            })
        );
    }

    #[test]
    fn debounced_resize_renders_on_the_next_turn() {
        let mut h = mounted(ViewState::default());
        let base = Instant::now();
        h.shell.on_resize_at(base);
        h.shell.tick_at(base + Duration::from_millis(200));

        assert!(!h.shell.drain_actions());
        assert!(h.shell.drain_actions());
        assert!(!h.shell.drain_actions());
    }

    // ── Routing & rendering ─────────────────────────────────────────

    #[test]
    fn drained_batch_rewrites_the_location() {
        let mut h = mounted(with_metrics());
        h.shell.on_key_press(press('t'));
        h.shell.drain_actions();

        let fragment = h.shell.location().fragment.clone().unwrap();
        let route = fragment.strip_prefix('!').unwrap();
        let decoded = scopeview_core::route::decode_route(route).unwrap().unwrap();
        assert_eq!(decoded.topology_view_mode, TopologyViewMode::Table);
        assert_eq!(decoded.topology_id.as_deref(), Some("containers"));
    }

    #[test]
    fn overlay_only_renders_with_monitor_data() {
        let mut h = mounted(with_metrics());
        assert!(!screen(&h.shell).contains("Throughput"));

        h.shell.store.dispatch(&Action::HighlightNode {
            id: "b".into(),
            left: 3,
            top: 4,
        });
        assert!(!screen(&h.shell).contains("Throughput"));

        h.shell.dispatch(&Action::HighlightNode {
            id: "a".into(),
            left: 3,
            top: 10,
        });
        let text = screen(&h.shell);
        assert!(text.contains("42.0 req/s"));
        assert!(text.contains("Latency    -"));
    }

    #[test]
    fn details_panel_renders_when_a_node_is_selected() {
        let mut h = mounted(with_metrics());
        h.shell.dispatch(&Action::ClickNode {
            id: "b".into(),
            label: "redis".into(),
            topology_id: "containers".into(),
        });
        let text = screen(&h.shell);
        assert!(text.contains(" redis "));
        assert!(text.contains("Loading details"));
    }

    #[test]
    fn monitor_state_without_values_still_shows_dashes() {
        let h = mounted(ViewState {
            monitor_data: Some(MonitorData {
                left: 10,
                top: 10,
                data: Some(MonitorMetrics::default()),
            }),
            ..ViewState::default()
        });
        let text = screen(&h.shell);
        assert!(text.contains("Throughput -"));
    }

    #[test]
    fn monitor_state_without_metrics_still_draws_overlay() {
        let h = mounted(ViewState {
            monitor_data: Some(MonitorData {
                left: 10,
                top: 10,
                data: None,
            }),
            ..ViewState::default()
        });
        let text = screen(&h.shell);
        assert!(text.contains("Throughput -"));
        assert!(text.contains("Latency    -"));
    }
}
