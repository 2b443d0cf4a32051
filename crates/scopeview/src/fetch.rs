//! Fetcher: connects the [`ScopeClient`] to the action channel.
//!
//! A polling task lists topologies and the current topology's nodes every
//! `refresh_interval`, forwarding results as [`Action`]s. The shell tells
//! the task which topology is current through a `watch` channel, so a
//! topology change is fetched right away instead of on the next poll.
//! Node details are one-off requests issued for every details panel that
//! is still waiting for data.

use std::collections::HashSet;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use scopeview_api::{ScopeClient, TopologyOptions};
use scopeview_core::{Action, ViewState, selectors};

/// What the polling task fetches nodes for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollTarget {
    pub topology_id: String,
    pub url: String,
    pub options: TopologyOptions,
}

impl PollTarget {
    fn from_state(state: &ViewState) -> Option<Self> {
        let current = selectors::current_topology(state)?;
        Some(Self {
            topology_id: current.id().to_owned(),
            url: current.topology.url.clone(),
            options: selectors::active_topology_options(state),
        })
    }
}

pub struct Fetcher {
    client: Option<ScopeClient>,
    action_tx: mpsc::UnboundedSender<Action>,
    refresh_interval: Duration,
    target: watch::Sender<Option<PollTarget>>,
    poll: Option<CancellationToken>,
    /// Node ids whose details request has been issued.
    requested_details: HashSet<String>,
}

impl Fetcher {
    /// `client` is `None` when no app server is configured; every fetch
    /// then only records the request in the state.
    pub fn new(
        client: Option<ScopeClient>,
        action_tx: mpsc::UnboundedSender<Action>,
        refresh_interval: Duration,
    ) -> Self {
        let (target, _) = watch::channel(None);
        Self {
            client,
            action_tx,
            refresh_interval,
            target,
            poll: None,
            requested_details: HashSet::new(),
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll.as_ref().is_some_and(|c| !c.is_cancelled())
    }

    /// Start loading topologies.
    ///
    /// `TopologiesRequested` always goes through `dispatch`. With `force`,
    /// a running poll task is replaced; without it, a running task is kept.
    pub fn fetch_topologies(
        &mut self,
        options: &TopologyOptions,
        mut dispatch: impl FnMut(Action),
        force: bool,
    ) {
        dispatch(Action::TopologiesRequested);

        let Some(client) = self.client.clone() else {
            warn!("no app server configured, topologies will not load");
            return;
        };
        if self.is_polling() && !force {
            debug!("topology polling already running");
            return;
        }
        if let Some(previous) = self.poll.take() {
            previous.cancel();
        }

        let cancel = CancellationToken::new();
        self.poll = Some(cancel.clone());
        info!(force, interval = ?self.refresh_interval, "starting topology polling");

        tokio::spawn(poll_topologies(
            client,
            self.action_tx.clone(),
            self.target.subscribe(),
            options.clone(),
            self.refresh_interval,
            cancel,
        ));
    }

    /// Point the polling task at whatever topology `state` shows.
    pub fn watch(&self, state: &ViewState) {
        let next = PollTarget::from_state(state);
        self.target.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    /// Request details for every open panel that has none yet.
    pub fn sync_details(&mut self, state: &ViewState) {
        self.requested_details
            .retain(|id| state.node_details.get(id).is_some_and(|e| e.details.is_none()));

        let Some(client) = &self.client else {
            return;
        };
        for entry in state.node_details.values() {
            if entry.details.is_some() || self.requested_details.contains(&entry.id) {
                continue;
            }
            // Restored panels wait for the topology listing.
            let Some(topology) = selectors::find_topology(&state.topologies, &entry.topology_id)
            else {
                continue;
            };

            self.requested_details.insert(entry.id.clone());
            let client = client.clone();
            let tx = self.action_tx.clone();
            let url = topology.topology.url.clone();
            let node_id = entry.id.clone();
            let options = selectors::active_topology_options(state);
            tokio::spawn(async move {
                match client.node_details(&url, &node_id, &options).await {
                    Ok(details) => {
                        let _ = tx.send(Action::ReceiveNodeDetails(Box::new(details)));
                    }
                    Err(e) => {
                        warn!(error = %e, %node_id, "node details request failed");
                        let _ = tx.send(Action::ReceiveError(e.to_string()));
                    }
                }
            });
        }
    }

    /// Cancel polling.
    pub fn stop(&mut self) {
        if let Some(cancel) = self.poll.take() {
            cancel.cancel();
            debug!("topology polling stopped");
        }
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_topologies(
    client: ScopeClient,
    action_tx: mpsc::UnboundedSender<Action>,
    mut target_rx: watch::Receiver<Option<PollTarget>>,
    options: TopologyOptions,
    refresh_interval: Duration,
    cancel: CancellationToken,
) {
    let mut list_topologies = true;

    loop {
        if list_topologies {
            match client.list_topologies(&options).await {
                Ok(topologies) => {
                    debug!(count = topologies.len(), "topologies received");
                    let _ = action_tx.send(Action::ReceiveTopologies(topologies));
                }
                Err(e) => {
                    warn!(error = %e, transient = e.is_transient(), "topology listing failed");
                    let _ = action_tx.send(Action::ReceiveError(e.to_string()));
                }
            }
        }

        let target = target_rx.borrow_and_update().clone();
        if let Some(target) = target {
            match client.topology_nodes(&target.url, &target.options).await {
                Ok(nodes) => {
                    let _ = action_tx.send(Action::ReceiveNodes {
                        topology_id: target.topology_id,
                        nodes,
                    });
                }
                Err(e) => {
                    warn!(error = %e, topology = %target.topology_id, "node listing failed");
                    let _ = action_tx.send(Action::ReceiveError(e.to_string()));
                }
            }
        }

        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            () = tokio::time::sleep(refresh_interval) => list_topologies = true,

            changed = target_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                list_topologies = false;
            }
        }

        if action_tx.is_closed() {
            break;
        }
    }

    debug!("topology polling task ended");
}
