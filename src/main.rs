use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;

use listing_scanner::announcements::{BinanceAnnouncements, HttpPageFetcher, KucoinAnnouncements};
use listing_scanner::api::GateIoClient;
use listing_scanner::core::logging::init_logging;
use listing_scanner::core::{Config, ListingState, SourceHealth};
use listing_scanner::monitoring::CurrencyRegistry;
use listing_scanner::scanner::{AnnouncementResolver, DedupGate, ListingPoller};
use listing_scanner::storage;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config.monitoring.log_level);

    tracing::info!("🚀 Listing scanner starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Test mode: {}", config.trade_options.test_mode);

    let old_coins = storage::load_old_coins(&config.storage.old_coins_file)?;
    tracing::info!(
        "Known coins snapshot: {} entries from {}",
        old_coins.len(),
        config.storage.old_coins_file.display()
    );

    let state = Arc::new(ListingState::new());
    let health = SourceHealth::new();

    let renderer = Arc::new(HttpPageFetcher::new(config.polling.request_timeout())?);
    let resolver = AnnouncementResolver::new(DedupGate::new(state.clone()), health.clone())
        .with_source(
            Arc::new(BinanceAnnouncements::from_config(&config, renderer)),
            config.trade_options.binance_announcements,
        )
        .with_source(
            Arc::new(KucoinAnnouncements::from_config(&config)?),
            config.trade_options.kucoin_announcements,
        );

    let mut poller = ListingPoller::new(
        resolver,
        state.clone(),
        health.clone(),
        config.polling.listing_interval(),
        config.polling.cycle_timeout(),
    );
    if config.trade_options.test_mode {
        poller = poller.with_test_listing_file(config.storage.test_listing_file.clone());
    }

    let registry = CurrencyRegistry::from_config(
        &config,
        Arc::new(GateIoClient::new(&config)?),
        state.clone(),
    );

    let shutdown = {
        let state = state.clone();
        tokio::spawn(async move { state.stop().trigger_on(tokio::signal::ctrl_c()).await })
    };

    let consumer = tokio::spawn(log_listings(state.clone()));
    let status = tokio::spawn(log_status(
        state.clone(),
        health.clone(),
        Duration::from_secs(config.monitoring.status_log_interval_secs),
    ));

    futures::join!(poller.run(), registry.run());

    shutdown.abort();
    consumer.abort();
    status.await?;

    tracing::info!("✅ Listing scanner stopped");
    Ok(())
}

/// Stand-in consumer: reports every listing the trading side would act on.
async fn log_listings(state: Arc<ListingState>) {
    loop {
        state.buy_ready().wait().await;
        if let Some(symbol) = state.latest_listing().await {
            tracing::info!("🎯 Ready to buy newly listed coin: {}", symbol);
        }
    }
}

async fn log_status(state: Arc<ListingState>, health: SourceHealth, every: Duration) {
    while !state.stop().sleep(every).await {
        let status = health.get_status().await;
        tracing::info!(
            "Scanner status: {} (uptime: {}s, cycles: {}, published: {})",
            status.status,
            status.uptime_seconds,
            status.poll_cycles,
            status.listings_published
        );
    }
}
