use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Re-requests standings on a fixed interval so newly posted results show up.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests }
    }

    pub async fn run(self) {
        let mut scores_interval = interval(REFRESH_INTERVAL);
        // Skip the immediate first tick so startup loading isn't double-triggered.
        scores_interval.tick().await;

        loop {
            scores_interval.tick().await;
            if self.network_requests.send(NetworkRequest::LoadScores).await.is_err() {
                break;
            }
        }
    }
}
