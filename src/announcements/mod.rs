pub mod binance;
pub mod cache_bust;
pub mod kucoin;

pub use binance::{BinanceAnnouncements, HttpPageFetcher, PageGuard, RenderedPage, RenderedPageFetcher};
pub use kucoin::KucoinAnnouncements;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::FetchError;

/// Exchanges whose announcement feeds are watched, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exchange {
    Binance,
    Kucoin,
}

impl Exchange {
    pub fn name(&self) -> &'static str {
        match self {
            Exchange::Binance => "binance",
            Exchange::Kucoin => "kucoin",
        }
    }

    /// Phrase an announcement title must contain to count as a new listing.
    pub fn intent_marker(&self) -> &'static str {
        match self {
            Exchange::Binance => "Will List",
            Exchange::Kucoin => "Gets Listed",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One exchange announcement surface.
///
/// `Ok(None)` means the source answered but had no matching announcement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnnouncementSource: Send + Sync {
    fn exchange(&self) -> Exchange;

    async fn fetch(&self) -> Result<Option<String>, FetchError>;
}
