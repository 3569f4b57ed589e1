use std::sync::Arc;

use super::dedup::DedupGate;
use super::extractor::extract_symbol;
use crate::announcements::{AnnouncementSource, Exchange};
use crate::core::{SourceHealth, SourceOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub exchange: Exchange,
    pub symbol: String,
}

struct SourceSlot {
    source: Arc<dyn AnnouncementSource>,
    enabled: bool,
}

/// Checks announcement sources in priority order and stops at the first novel symbol.
pub struct AnnouncementResolver {
    sources: Vec<SourceSlot>,
    gate: DedupGate,
    health: SourceHealth,
}

impl AnnouncementResolver {
    pub fn new(gate: DedupGate, health: SourceHealth) -> Self {
        Self {
            sources: Vec::new(),
            gate,
            health,
        }
    }

    /// Appends a source; sources are consulted in the order they were added.
    pub fn with_source(mut self, source: Arc<dyn AnnouncementSource>, enabled: bool) -> Self {
        tracing::info!(
            "{} announcements {}",
            source.exchange(),
            if enabled { "enabled" } else { "disabled" }
        );
        self.sources.push(SourceSlot { source, enabled });
        self
    }

    pub async fn resolve(&self) -> Option<Detection> {
        for slot in self.sources.iter().filter(|slot| slot.enabled) {
            let exchange = slot.source.exchange();

            let announcement = match slot.source.fetch().await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    self.health
                        .record_source(exchange.name(), SourceOutcome::Empty)
                        .await;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("{} announcement fetch failed: {}", exchange, e);
                    self.health
                        .record_source(
                            exchange.name(),
                            SourceOutcome::Failed {
                                error: e.to_string(),
                            },
                        )
                        .await;
                    continue;
                }
            };

            let Some(symbol) = extract_symbol(&announcement, exchange.intent_marker()) else {
                tracing::debug!("{} announcement is not a listing: {}", exchange, announcement);
                self.health
                    .record_source(exchange.name(), SourceOutcome::Empty)
                    .await;
                continue;
            };

            self.health
                .record_source(
                    exchange.name(),
                    SourceOutcome::Candidate {
                        symbol: symbol.clone(),
                    },
                )
                .await;

            if self.gate.admit(&symbol).await {
                tracing::info!("New {} coin detected: {}", exchange, symbol);
                return Some(Detection { exchange, symbol });
            }
        }

        None
    }
}
