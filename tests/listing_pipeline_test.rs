use async_trait::async_trait;
use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use listing_scanner::announcements::{AnnouncementSource, Exchange};
use listing_scanner::core::{FetchError, ListingState, SourceHealth};
use listing_scanner::scanner::{AnnouncementResolver, DedupGate, ListingPoller};
use listing_scanner::storage;

/// Serves scripted announcements and counts how often it was asked.
struct ScriptedSource {
    exchange: Exchange,
    script: Mutex<VecDeque<Result<Option<String>, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(exchange: Exchange, script: Vec<Result<Option<String>, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            exchange,
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnnouncementSource for ScriptedSource {
    fn exchange(&self) -> Exchange {
        self.exchange
    }

    async fn fetch(&self) -> Result<Option<String>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }
}

fn text(s: &str) -> Result<Option<String>, FetchError> {
    Ok(Some(s.to_string()))
}

fn poller(
    state: &Arc<ListingState>,
    binance: (Arc<ScriptedSource>, bool),
    kucoin: (Arc<ScriptedSource>, bool),
) -> ListingPoller {
    let health = SourceHealth::new();
    let resolver = AnnouncementResolver::new(DedupGate::new(state.clone()), health.clone())
        .with_source(binance.0, binance.1)
        .with_source(kucoin.0, kucoin.1);
    ListingPoller::new(
        resolver,
        state.clone(),
        health,
        Duration::from_millis(10),
        Duration::from_secs(2),
    )
}

#[tokio::test]
async fn binance_listing_reaches_consumer() {
    let state = Arc::new(ListingState::new());
    let binance = ScriptedSource::new(Exchange::Binance, vec![text("Binance Will List Foo (FOO)")]);
    let kucoin = ScriptedSource::new(Exchange::Kucoin, vec![]);
    let poller = poller(&state, (binance.clone(), true), (kucoin.clone(), false));

    let consumer = {
        let state = state.clone();
        tokio::spawn(async move {
            state.buy_ready().wait().await;
            state.latest_listing().await
        })
    };

    assert_eq!(poller.tick().await.unwrap().as_deref(), Some("FOO"));

    let seen = tokio::time::timeout(Duration::from_secs(1), consumer)
        .await
        .expect("consumer should be woken")
        .unwrap();
    assert_eq!(seen.as_deref(), Some("FOO"));
    assert_eq!(binance.calls(), 1);
    assert_eq!(kucoin.calls(), 0);
}

#[tokio::test]
async fn kucoin_listing_used_when_binance_has_nothing_new() {
    let state = Arc::new(ListingState::new());
    let binance = ScriptedSource::new(
        Exchange::Binance,
        vec![Err(FetchError::Status(429)), text("Binance Delists Old (OLD)")],
    );
    let kucoin = ScriptedSource::new(
        Exchange::Kucoin,
        vec![text("Binance Gets Listed Bar (BAR)"), text("Binance Gets Listed Bar (BAR)")],
    );
    let poller = poller(&state, (binance.clone(), true), (kucoin.clone(), true));

    assert_eq!(poller.tick().await.unwrap().as_deref(), Some("BAR"));
    // Second sighting of BAR is a duplicate and publishes nothing.
    assert_eq!(poller.tick().await.unwrap(), None);

    assert_eq!(state.latest_listing().await.as_deref(), Some("BAR"));
    assert_eq!(state.buy_ready().times_raised(), 1);
    assert_eq!(binance.calls(), 2);
    assert_eq!(kucoin.calls(), 2);
}

#[tokio::test]
async fn symbols_are_published_once_per_process() {
    let state = Arc::new(ListingState::new());
    let binance = ScriptedSource::new(
        Exchange::Binance,
        vec![
            text("Binance Will List Foo (FOO)"),
            text("Binance Will List Bar (BAR)"),
            text("Binance Will List Foo (FOO)"),
        ],
    );
    let kucoin = ScriptedSource::new(Exchange::Kucoin, vec![]);
    let poller = poller(&state, (binance, true), (kucoin, false));

    assert_eq!(poller.tick().await.unwrap().as_deref(), Some("FOO"));
    assert_eq!(poller.tick().await.unwrap().as_deref(), Some("BAR"));
    // FOO is no longer the latest listing, but it was already seen.
    assert_eq!(poller.tick().await.unwrap(), None);

    assert_eq!(state.latest_listing().await.as_deref(), Some("BAR"));
    assert_eq!(state.seen_symbols().await, vec!["BAR", "FOO"]);
    assert_eq!(state.buy_ready().times_raised(), 2);
}

#[tokio::test]
async fn dry_run_fixture_fills_quiet_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = dir.path().join("test_new_listing.json");
    fs::write(&fixture, r#"{"symbol":"TEST"}"#).unwrap();

    let state = Arc::new(ListingState::new());
    let binance = ScriptedSource::new(Exchange::Binance, vec![]);
    let kucoin = ScriptedSource::new(Exchange::Kucoin, vec![]);
    let poller = poller(&state, (binance, true), (kucoin, true))
        .with_test_listing_file(fixture.clone());

    assert_eq!(poller.tick().await.unwrap().as_deref(), Some("TEST"));
    assert!(storage::used_path(&fixture).is_file());

    assert_eq!(poller.tick().await.unwrap(), None);
    assert!(!fixture.exists());
    assert_eq!(state.buy_ready().times_raised(), 1);
}

#[tokio::test]
async fn poll_loop_survives_failures_and_stops_on_signal() {
    let state = Arc::new(ListingState::new());
    let binance = ScriptedSource::new(
        Exchange::Binance,
        vec![
            Err(FetchError::Render("page did not load".into())),
            Err(FetchError::Timeout(Duration::from_secs(10))),
            text("Binance Will List Late (LATE)"),
        ],
    );
    let kucoin = ScriptedSource::new(Exchange::Kucoin, vec![]);
    let poller = Arc::new(poller(&state, (binance.clone(), true), (kucoin, false)));

    let handle = {
        let poller = poller.clone();
        tokio::spawn(async move { poller.run().await })
    };

    tokio::time::timeout(Duration::from_secs(2), state.buy_ready().wait())
        .await
        .expect("listing should be published despite earlier failures");
    assert_eq!(state.latest_listing().await.as_deref(), Some("LATE"));

    state.stop().trigger();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("poll loop should honour stop")
        .unwrap();
    assert!(binance.calls() >= 3);
}
