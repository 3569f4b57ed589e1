use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};

/// Process-wide listing state shared by the poll loops and the trading consumer.
///
/// Lock order is `latest` before `seen`; every path that needs both follows it.
pub struct ListingState {
    pub(crate) latest: RwLock<Option<String>>,
    pub(crate) seen: Mutex<HashSet<String>>,
    buy_ready: BuyReady,
    stop: StopSignal,
}

impl ListingState {
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(None),
            seen: Mutex::new(HashSet::new()),
            buy_ready: BuyReady::new(),
            stop: StopSignal::new(),
        }
    }

    /// Most recently published listing, `None` until the first publish.
    pub async fn latest_listing(&self) -> Option<String> {
        self.latest.read().await.clone()
    }

    pub async fn seen_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.seen.lock().await.iter().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn buy_ready(&self) -> &BuyReady {
        &self.buy_ready
    }

    pub fn stop(&self) -> &StopSignal {
        &self.stop
    }
}

impl Default for ListingState {
    fn default() -> Self {
        Self::new()
    }
}

/// Level signal raised whenever the latest listing changes.
pub struct BuyReady {
    tx: watch::Sender<bool>,
    raised: AtomicU64,
}

impl BuyReady {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx,
            raised: AtomicU64::new(0),
        }
    }

    pub fn set(&self) {
        self.raised.fetch_add(1, Ordering::Relaxed);
        self.tx.send_replace(true);
    }

    pub fn clear(&self) {
        self.tx.send_replace(false);
    }

    pub fn is_set(&self) -> bool {
        *self.tx.borrow()
    }

    /// Total number of times the signal has been raised.
    pub fn times_raised(&self) -> u64 {
        self.raised.load(Ordering::Relaxed)
    }

    /// Blocks until the signal is raised, then consumes it.
    ///
    /// Only one waiter consumes a given raise; the others keep waiting.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if rx.wait_for(|ready| *ready).await.is_err() {
                return;
            }
            let consumed = self.tx.send_if_modified(|ready| {
                let was_set = *ready;
                *ready = false;
                was_set
            });
            if consumed {
                return;
            }
        }
    }
}

/// Cooperative shutdown flag observed by every long-running loop.
pub struct StopSignal {
    tx: watch::Sender<bool>,
}

impl StopSignal {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn trigger(&self) {
        if !self.tx.send_replace(true) {
            tracing::info!("Stop requested");
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once stop has been requested.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|stop| *stop).await;
    }

    /// Triggers stop once `signal` resolves successfully.
    ///
    /// A listener that fails to install is logged and leaves the loops running.
    pub async fn trigger_on<F>(&self, signal: F)
    where
        F: Future<Output = std::io::Result<()>>,
    {
        match signal.await {
            Ok(()) => {
                tracing::info!("Shutdown signal received");
                self.trigger();
            }
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
    }

    /// Sleeps for `duration` unless stop arrives first. Returns `true` when stopped.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => self.is_triggered(),
            _ = self.stopped() => true,
        }
    }
}
