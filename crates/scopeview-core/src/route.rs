//! Location handling and the router that keeps view state and location in
//! sync.
//!
//! A [`Location`] stands in for a browser URL: a path plus an optional
//! fragment. Routable state is serialized as JSON, percent-encoded, and
//! carried as `/state/<json>`, either in the path or (hashbang mode) in the
//! fragment as `#!/state/<json>`.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use scopeview_api::TopologyOptions;

use crate::action::Action;
use crate::error::CoreError;
use crate::selectors;
use crate::state::{ControlPipe, TopologyViewMode, ViewState};

const STATE_PREFIX: &str = "/state/";

// ── Location ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    pub path: String,
    pub fragment: Option<String>,
}

impl Location {
    /// Split `path#fragment`. An empty path becomes `/`.
    pub fn parse(raw: &str) -> Self {
        let (path, fragment) = match raw.split_once('#') {
            Some((p, f)) => (p, Some(f.to_owned())),
            None => (raw, None),
        };
        Self {
            path: if path.is_empty() { "/".into() } else { path.to_owned() },
            fragment: fragment.filter(|f| !f.is_empty()),
        }
    }

    pub fn clear_fragment(&mut self) {
        self.fragment = None;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

// ── URL state ────────────────────────────────────────────────────────

/// A details panel as recorded in the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetailsRef {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub topology_id: String,
}

/// The routable slice of [`ViewState`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlState {
    pub topology_id: Option<String>,
    pub topology_view_mode: TopologyViewMode,
    #[serde(skip_serializing_if = "TopologyOptions::is_empty")]
    pub topology_options: TopologyOptions,
    pub pinned_metric_type: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pinned_searches: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub search_query: String,
    pub selected_node_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_details: Vec<NodeDetailsRef>,
    pub control_pipe: Option<ControlPipe>,
}

/// Encode state as a `/state/<json>` route.
pub fn encode_route(state: &UrlState) -> Result<String, CoreError> {
    let json = serde_json::to_string(state)?;
    Ok(format!("{STATE_PREFIX}{}", urlencoding::encode(&json)))
}

/// Decode a route. `/` (or empty) is the root route and yields `None`.
pub fn decode_route(route: &str) -> Result<Option<UrlState>, CoreError> {
    if route.is_empty() || route == "/" {
        return Ok(None);
    }
    let encoded = route
        .strip_prefix(STATE_PREFIX)
        .ok_or_else(|| CoreError::InvalidRoute(route.to_owned()))?;
    let json = urlencoding::decode(encoded)?;
    Ok(Some(serde_json::from_str(&json)?))
}

// ── Router ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterOptions {
    /// Carry the route in the fragment (`#!/state/...`) instead of the path.
    pub hashbang: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self { hashbang: true }
    }
}

/// Reads the initial route from a [`Location`] and rewrites the location
/// as the view state changes.
#[derive(Debug, Clone)]
pub struct Router {
    location: Location,
    options: RouterOptions,
    started: bool,
}

impl Router {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            options: RouterOptions::default(),
            started: false,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    /// The route as the router sees it under the current options.
    fn current_route(&self) -> &str {
        if self.options.hashbang {
            self.location
                .fragment
                .as_deref()
                .and_then(|f| f.strip_prefix('!'))
                .unwrap_or("/")
        } else {
            &self.location.path
        }
    }

    /// Start routing. A `/state/...` route dispatches [`Action::Route`];
    /// the root route dispatches nothing. Malformed routes are logged and
    /// treated as the root route.
    ///
    /// Returns `true` if a route was dispatched.
    pub fn start(&mut self, options: RouterOptions, mut dispatch: impl FnMut(Action)) -> bool {
        self.options = options;
        self.started = true;

        match decode_route(self.current_route()) {
            Ok(Some(url_state)) => {
                debug!(location = %self.location, "routing from location");
                dispatch(Action::Route(Box::new(url_state)));
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, location = %self.location, "ignoring malformed route");
                false
            }
        }
    }

    /// Rewrite the location from the current state. No-op until started.
    pub fn update_route(&mut self, state: &ViewState) {
        if !self.started {
            return;
        }
        let route = match encode_route(&selectors::url_state(state)) {
            Ok(route) => route,
            Err(e) => {
                warn!(error = %e, "failed to encode route");
                return;
            }
        };
        if self.options.hashbang {
            self.location.fragment = Some(format!("!{route}"));
        } else {
            self.location.path = route;
        }
    }
}
