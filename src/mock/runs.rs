use std::collections::HashMap;

use tokio::sync::{watch, RwLock};

use crate::mock::entities::RunStatus;

/// Status channels for pipeline runs that are still in flight.
///
/// A channel is registered when a run starts and dropped once the run reaches
/// a terminal state; later watchers fall back to the stored run.
#[derive(Default)]
pub struct RunTracker {
    channels: RwLock<HashMap<String, watch::Sender<RunStatus>>>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, run_id: &str) {
        let (sender, _) = watch::channel(RunStatus::Running);
        self.channels
            .write()
            .await
            .insert(run_id.to_string(), sender);
    }

    pub async fn subscribe(&self, run_id: &str) -> Option<watch::Receiver<RunStatus>> {
        self.channels
            .read()
            .await
            .get(run_id)
            .map(|sender| sender.subscribe())
    }

    /// Publish the new status; terminal states close the channel
    pub async fn publish(&self, run_id: &str, status: RunStatus) {
        let mut channels = self.channels.write().await;
        if let Some(sender) = channels.get(run_id) {
            sender.send_replace(status);
        }
        if status.is_terminal() {
            channels.remove(run_id);
        }
    }

    pub async fn in_flight(&self) -> usize {
        self.channels.read().await.len()
    }
}
