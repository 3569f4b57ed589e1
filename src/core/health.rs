use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SourceOutcome {
    Candidate { symbol: String },
    Empty,
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatus {
    pub last_outcome: SourceOutcome,
    pub last_checked: DateTime<Utc>,
    pub checks: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub poll_cycles: u64,
    pub listings_published: u64,
    pub sources: BTreeMap<String, SourceStatus>,
}

#[derive(Default)]
struct HealthInner {
    sources: BTreeMap<String, SourceStatus>,
    poll_cycles: u64,
    listings_published: u64,
}

/// Tracks the outcome of every announcement source check.
#[derive(Clone)]
pub struct SourceHealth {
    start_time: std::time::Instant,
    inner: Arc<RwLock<HealthInner>>,
}

impl SourceHealth {
    pub fn new() -> Self {
        Self {
            start_time: std::time::Instant::now(),
            inner: Arc::new(RwLock::new(HealthInner::default())),
        }
    }

    pub async fn get_status(&self) -> HealthStatus {
        let inner = self.inner.read().await;
        let failing = inner
            .sources
            .values()
            .any(|s| matches!(s.last_outcome, SourceOutcome::Failed { .. }));

        HealthStatus {
            status: if failing {
                "degraded".to_string()
            } else {
                "healthy".to_string()
            },
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            poll_cycles: inner.poll_cycles,
            listings_published: inner.listings_published,
            sources: inner.sources.clone(),
        }
    }

    pub async fn record_source(&self, source: &str, outcome: SourceOutcome) {
        let mut inner = self.inner.write().await;
        let failed = matches!(outcome, SourceOutcome::Failed { .. });
        let entry = inner
            .sources
            .entry(source.to_string())
            .or_insert_with(|| SourceStatus {
                last_outcome: SourceOutcome::Empty,
                last_checked: Utc::now(),
                checks: 0,
                failures: 0,
            });

        entry.last_outcome = outcome;
        entry.last_checked = Utc::now();
        entry.checks += 1;
        if failed {
            entry.failures += 1;
        }
    }

    pub async fn record_cycle(&self) {
        self.inner.write().await.poll_cycles += 1;
    }

    pub async fn record_published(&self) {
        self.inner.write().await.listings_published += 1;
    }
}

impl Default for SourceHealth {
    fn default() -> Self {
        Self::new()
    }
}
