use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use crate::config::WebSocketConfig;
use crate::hub::SignalingHub;
use crate::metrics::HeartbeatMetrics;
use crate::websocket::ServerMessage;

/// Background task for heartbeat and stale connection cleanup
pub struct HeartbeatTask {
    config: WebSocketConfig,
    hub: Arc<SignalingHub>,
    shutdown: broadcast::Receiver<()>,
}

impl HeartbeatTask {
    pub fn new(
        config: WebSocketConfig,
        hub: Arc<SignalingHub>,
        shutdown: broadcast::Receiver<()>,
    ) -> Self {
        Self {
            config,
            hub,
            shutdown,
        }
    }

    /// Run the heartbeat and cleanup loops until shutdown
    pub async fn run(mut self) {
        let heartbeat_interval = Duration::from_secs(self.config.heartbeat_interval);
        let cleanup_interval = Duration::from_secs(self.config.cleanup_interval);
        let connection_timeout = self.config.connection_timeout;

        let mut heartbeat_timer = tokio::time::interval(heartbeat_interval);
        let mut cleanup_timer = tokio::time::interval(cleanup_interval);

        // Skip immediate first tick
        heartbeat_timer.tick().await;
        cleanup_timer.tick().await;

        tracing::info!(
            heartbeat_interval_secs = self.config.heartbeat_interval,
            cleanup_interval_secs = self.config.cleanup_interval,
            connection_timeout_secs = connection_timeout,
            "Heartbeat task started"
        );

        loop {
            tokio::select! {
                _ = self.shutdown.recv() => {
                    tracing::info!("Heartbeat task received shutdown signal");
                    break;
                }
                _ = heartbeat_timer.tick() => {
                    self.send_heartbeats();
                }
                _ = cleanup_timer.tick() => {
                    self.cleanup_stale_connections(connection_timeout);
                }
            }
        }

        tracing::info!("Heartbeat task stopped");
    }

    /// Queue a heartbeat on every connection; the socket writer turns it
    /// into a WebSocket ping, whose pong refreshes the connection's activity
    fn send_heartbeats(&self) {
        let connections = self.hub.registry().get_all_connections();
        if connections.is_empty() {
            return;
        }

        let start = Instant::now();
        let total = connections.len();
        let sent = connections
            .iter()
            .filter(|handle| handle.send(ServerMessage::Heartbeat))
            .count();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        HeartbeatMetrics::record_duration_ms(elapsed_ms);

        tracing::debug!(
            total = total,
            sent = sent,
            failed = total - sent,
            elapsed_ms = elapsed_ms,
            "Heartbeat round completed"
        );
    }

    /// Disconnect connections idle past the timeout, the same way a
    /// transport close would
    fn cleanup_stale_connections(&self, timeout_secs: u64) -> usize {
        let stale = self.hub.registry().find_stale_connections(timeout_secs);
        let removed = stale.len();

        for connection_id in stale {
            tracing::info!(connection_id = %connection_id, "Removing stale connection due to timeout");
            self.hub.disconnect(connection_id);
        }

        if removed > 0 {
            HeartbeatMetrics::record_stale_removed(removed as u64);
            tracing::info!(
                removed = removed,
                timeout_secs = timeout_secs,
                "Cleaned up stale connections"
            );
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchmakingConfig;
    use crate::connection_manager::ConnectionRegistry;
    use tokio::sync::mpsc;

    fn create_hub() -> Arc<SignalingHub> {
        Arc::new(SignalingHub::new(
            Arc::new(ConnectionRegistry::new()),
            MatchmakingConfig::default(),
        ))
    }

    #[tokio::test]
    async fn test_heartbeat_task_shutdown() {
        let config = WebSocketConfig::default();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task = HeartbeatTask::new(config, create_hub(), shutdown_rx);

        // Spawn the task
        let handle = tokio::spawn(async move {
            task.run().await;
        });

        // Wait a bit then send shutdown
        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown_tx.send(()).unwrap();

        // Task should complete
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("Task should complete")
            .expect("Task should not panic");
    }

    #[tokio::test]
    async fn test_heartbeat_sends_to_connections() {
        let config = WebSocketConfig {
            heartbeat_interval: 1,
            connection_timeout: 60,
            cleanup_interval: 60,
        };
        let hub = create_hub();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = hub.connect(tx);
        assert!(matches!(rx.recv().await, Some(ServerMessage::Connected { .. })));

        let task = HeartbeatTask::new(config, hub, shutdown_rx);
        let task_handle = tokio::spawn(async move {
            task.run().await;
        });

        // Wait for heartbeat
        let msg = tokio::time::timeout(Duration::from_secs(3), rx.recv())
            .await
            .expect("Should receive heartbeat")
            .expect("Channel should not be closed");
        assert_eq!(msg, ServerMessage::Heartbeat);

        // Shutdown
        shutdown_tx.send(()).unwrap();
        let _ = task_handle.await;
    }

    #[tokio::test]
    async fn test_stale_cleanup_releases_partner() {
        let hub = create_hub();
        let (tx_a, _rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = hub.connect(tx_a);
        let b = hub.connect(tx_b);
        hub.matchmaker().request_match(a.id);
        hub.matchmaker().request_match(b.id);
        while rx_b.try_recv().is_ok() {}

        a.set_last_activity(chrono::Utc::now() - chrono::Duration::seconds(600));

        let (_shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = HeartbeatTask::new(WebSocketConfig::default(), hub.clone(), shutdown_rx);
        let removed = task.cleanup_stale_connections(120);

        assert_eq!(removed, 1);
        assert!(!hub.registry().contains(a.id));
        assert_eq!(rx_b.try_recv().unwrap(), ServerMessage::PartnerDisconnected);
        assert_eq!(hub.matchmaker().partner_of(b.id), None);
    }
}
