use std::sync::Arc;

use crate::core::ListingState;

/// Admits each candidate symbol at most once per process lifetime.
#[derive(Clone)]
pub struct DedupGate {
    state: Arc<ListingState>,
}

impl DedupGate {
    pub fn new(state: Arc<ListingState>) -> Self {
        Self { state }
    }

    /// Returns `true` when `candidate` is novel, recording it as seen.
    ///
    /// Novel means non-empty, not the current latest listing and never admitted before.
    /// The check and the insert happen under one lock, so concurrent callers
    /// racing on the same symbol admit it once.
    pub async fn admit(&self, candidate: &str) -> bool {
        if candidate.is_empty() {
            return false;
        }

        let latest = self.state.latest.read().await;
        if latest.as_deref() == Some(candidate) {
            return false;
        }

        let mut seen = self.state.seen.lock().await;
        let admitted = seen.insert(candidate.to_string());
        if admitted {
            tracing::info!("New previously found coins: {:?}", *seen);
        }
        admitted
    }
}
