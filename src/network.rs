// src/network.rs
// Online/offline tracking shared between request code and status indicators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    pub online: bool,
    pub changed_at: DateTime<Utc>,
}

/// Cloneable handle; every clone observes the same status.
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    sender: Arc<watch::Sender<NetworkStatus>>,
}

impl NetworkMonitor {
    pub fn new(initially_online: bool) -> Self {
        let (sender, _) = watch::channel(NetworkStatus {
            online: initially_online,
            changed_at: Utc::now(),
        });

        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn status(&self) -> NetworkStatus {
        *self.sender.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.sender.borrow().online
    }

    /// Record a connectivity change. Subscribers are only woken on an actual change.
    pub fn set_online(&self, online: bool) {
        let changed = self.sender.send_if_modified(|status| {
            if status.online == online {
                return false;
            }
            status.online = online;
            status.changed_at = Utc::now();
            true
        });

        if changed {
            info!(online, "Network status changed");
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.sender.subscribe()
    }

    /// Resolves immediately when already online.
    pub async fn wait_until_online(&self) {
        let mut receiver = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = receiver.wait_for(|status| status.online).await;
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_online() {
        assert!(NetworkMonitor::default().is_online());
    }

    #[test]
    fn test_set_online_updates_status() {
        let monitor = NetworkMonitor::new(true);
        let before = monitor.status().changed_at;

        monitor.set_online(false);

        assert!(!monitor.is_online());
        assert!(monitor.status().changed_at >= before);
    }

    #[tokio::test]
    async fn test_subscribers_only_see_real_changes() {
        let monitor = NetworkMonitor::new(true);
        let mut receiver = monitor.subscribe();

        monitor.set_online(true);
        assert!(!receiver.has_changed().unwrap());

        monitor.set_online(false);
        assert!(receiver.has_changed().unwrap());
        assert!(!receiver.borrow_and_update().online);
    }

    #[tokio::test]
    async fn test_wait_until_online() {
        let monitor = NetworkMonitor::new(false);
        let remote = monitor.clone();

        let waiter = tokio::spawn(async move { remote.wait_until_online().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        monitor.set_online(true);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish once online")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_until_online_when_already_online() {
        let monitor = NetworkMonitor::new(true);
        tokio::time::timeout(Duration::from_millis(100), monitor.wait_until_online())
            .await
            .unwrap();
    }
}
