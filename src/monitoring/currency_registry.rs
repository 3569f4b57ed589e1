use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::api::CurrencyProvider;
use crate::core::{Config, ListingState};
use crate::storage;

/// Keeps the exchange's tradable currency universe on disk and in memory.
///
/// Every refresh replaces the previous list wholesale; currencies that
/// disappeared upstream are dropped.
pub struct CurrencyRegistry {
    provider: Arc<dyn CurrencyProvider>,
    state: Arc<ListingState>,
    cache: Arc<RwLock<Vec<String>>>,
    currencies_file: PathBuf,
    refresh_interval: Duration,
}

impl CurrencyRegistry {
    pub fn new(
        provider: Arc<dyn CurrencyProvider>,
        state: Arc<ListingState>,
        currencies_file: PathBuf,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            provider,
            state,
            cache: Arc::new(RwLock::new(Vec::new())),
            currencies_file,
            refresh_interval,
        }
    }

    pub fn from_config(
        config: &Config,
        provider: Arc<dyn CurrencyProvider>,
        state: Arc<ListingState>,
    ) -> Self {
        Self::new(
            provider,
            state,
            config.storage.currencies_file.clone(),
            config.polling.currency_refresh_interval(),
        )
    }

    /// Fetches the universe once, persists it and returns it.
    pub async fn refresh_once(&self) -> Result<Vec<String>> {
        tracing::info!("Getting the list of supported currencies from gate io");

        let currencies: Vec<String> = self
            .provider
            .list_currencies()
            .await
            .context("Failed to list currencies")?
            .into_iter()
            .map(|currency| currency.currency)
            .collect();

        let file = self.currencies_file.clone();
        let snapshot = currencies.clone();
        tokio::task::spawn_blocking(move || storage::write_json_pretty(&file, &snapshot))
            .await
            .context("Currency file writer panicked")??;
        *self.cache.write().await = currencies.clone();

        tracing::info!(
            "List of {} gate io currencies saved to {}",
            currencies.len(),
            self.currencies_file.display()
        );
        Ok(currencies)
    }

    /// Refreshes on the configured interval until stop is requested.
    pub async fn run(&self) {
        tracing::info!(
            "🗂️  Currency registry starting (refresh every {}s)",
            self.refresh_interval.as_secs()
        );

        while !self.state.stop().is_triggered() {
            if let Err(e) = self.refresh_once().await {
                tracing::error!("❌ Currency refresh failed: {:#}", e);
            }

            if self.state.stop().sleep(self.refresh_interval).await {
                break;
            }
        }

        tracing::info!("Currency refresh loop has stopped");
    }

    pub async fn supported_currencies(&self) -> Vec<String> {
        self.cache.read().await.clone()
    }

    pub async fn is_supported(&self, symbol: &str) -> bool {
        self.cache.read().await.iter().any(|c| c == symbol)
    }
}
