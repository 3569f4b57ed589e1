use std::sync::Arc;

use crate::core::ListingState;

/// Writes the latest listing and wakes the trading consumer.
#[derive(Clone)]
pub struct ListingPublisher {
    state: Arc<ListingState>,
}

impl ListingPublisher {
    pub fn new(state: Arc<ListingState>) -> Self {
        Self { state }
    }

    /// Stores `candidate` unless it is empty or already the latest listing.
    ///
    /// The buy-ready signal is raised while the write lock is held, so a woken
    /// consumer always reads the new value. Returns whether anything changed.
    pub async fn publish(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }

        let mut latest = self.state.latest.write().await;
        if latest.as_deref() == Some(candidate) {
            return false;
        }

        *latest = Some(candidate.to_string());
        self.state.buy_ready().set();
        drop(latest);

        tracing::info!("New listing detected: {}", candidate);
        true
    }
}
