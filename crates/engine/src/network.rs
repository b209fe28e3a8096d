//! Connectivity monitor.
//!
//! Platform glue (reachability callbacks, connectivity plugins) feeds
//! [`NetworkMonitor::set_online`]; consumers read the current flag or
//! subscribe for transitions. Repeated reports of an unchanged state publish
//! nothing, so subscribers observe each transition exactly once.

use tokio::sync::watch;

pub struct NetworkMonitor {
    state: watch::Sender<bool>,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(initially_online);
        Self { state }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Report the current connectivity. Returns `true` when this call was an
    /// actual transition (and was therefore published to subscribers).
    pub fn set_online(&self, online: bool) -> bool {
        let transitioned = self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if transitioned {
            log::info!(
                "Connectivity changed: {}",
                if online { "online" } else { "offline" }
            );
        }
        transitioned
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}
