use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::publisher::ListingPublisher;
use super::resolver::AnnouncementResolver;
use crate::core::{ListingState, SourceHealth};
use crate::storage;

/// Drives the resolver on a fixed interval until stop is requested.
pub struct ListingPoller {
    resolver: AnnouncementResolver,
    publisher: ListingPublisher,
    state: Arc<ListingState>,
    health: SourceHealth,
    interval: Duration,
    cycle_timeout: Duration,
    test_listing_file: Option<PathBuf>,
}

impl ListingPoller {
    pub fn new(
        resolver: AnnouncementResolver,
        state: Arc<ListingState>,
        health: SourceHealth,
        interval: Duration,
        cycle_timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            publisher: ListingPublisher::new(state.clone()),
            state,
            health,
            interval,
            cycle_timeout,
            test_listing_file: None,
        }
    }

    /// Dry-run only: fall back to this fixture when no exchange has news.
    pub fn with_test_listing_file(mut self, path: PathBuf) -> Self {
        self.test_listing_file = Some(path);
        self
    }

    pub async fn run(&self) {
        tracing::info!(
            "🆕 Checking for coin announcements every {}s",
            self.interval.as_secs_f64()
        );

        loop {
            if self.state.stop().sleep(self.interval).await {
                break;
            }

            if let Err(e) = self.tick().await {
                tracing::error!("Listing poll cycle failed: {:#}", e);
            }
        }

        tracing::info!("Listing poll loop has stopped");
    }

    /// One poll cycle. Returns the symbol published this cycle, if any.
    pub async fn tick(&self) -> Result<Option<String>> {
        self.health.record_cycle().await;

        let detection = match tokio::time::timeout(self.cycle_timeout, self.resolver.resolve()).await
        {
            Ok(detection) => detection,
            Err(_) => {
                tracing::warn!(
                    "Announcement check exceeded {:?}, abandoning this cycle",
                    self.cycle_timeout
                );
                None
            }
        };

        if let Some(detection) = detection {
            return Ok(self.publish(&detection.symbol).await);
        }

        if let Some(path) = &self.test_listing_file {
            let fixture = path.clone();
            let consumed =
                tokio::task::spawn_blocking(move || storage::consume_test_listing(&fixture)).await??;
            if let Some(listing) = consumed {
                tracing::info!("Loaded test listing {} from {}", listing.symbol(), path.display());
                return Ok(self.publish(listing.symbol()).await);
            }
        }

        tracing::debug!("No new listings this cycle");
        Ok(None)
    }

    async fn publish(&self, symbol: &str) -> Option<String> {
        if self.publisher.publish(symbol).await {
            self.health.record_published().await;
            Some(symbol.to_string())
        } else {
            None
        }
    }
}
