use anyhow::Result;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub trade_options: TradeOptions,
    pub polling: PollingConfig,
    pub endpoints: EndpointConfig,
    pub storage: StorageConfig,
    pub monitoring: MonitoringConfig,
}

/// Per-exchange announcement switches plus the dry-run flag.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeOptions {
    pub binance_announcements: bool,
    pub kucoin_announcements: bool,
    pub test_mode: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    pub listing_interval_secs: u64,
    pub currency_refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
    /// Upper bound for one full resolver cycle across all exchanges.
    pub cycle_timeout_secs: u64,
    /// Wait between page load and DOM query. Only a browser-backed renderer
    /// needs it; the HTTP renderer has the full markup once `open` returns.
    pub render_settle_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub binance_announcement_url: String,
    pub kucoin_announcement_url: String,
    pub gateio_api_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub currencies_file: PathBuf,
    pub old_coins_file: PathBuf,
    pub test_listing_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub status_log_interval_secs: u64,
}

impl PollingConfig {
    pub fn listing_interval(&self) -> Duration {
        Duration::from_secs(self.listing_interval_secs)
    }

    pub fn currency_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.currency_refresh_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cycle_timeout(&self) -> Duration {
        Duration::from_secs(self.cycle_timeout_secs)
    }

    pub fn render_settle(&self) -> Duration {
        Duration::from_secs(self.render_settle_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            trade_options: TradeOptions {
                binance_announcements: true,
                kucoin_announcements: true,
                test_mode: false,
            },
            polling: PollingConfig {
                listing_interval_secs: 3,
                currency_refresh_interval_secs: 300,
                request_timeout_secs: 10,
                cycle_timeout_secs: 30,
                render_settle_secs: 0,
            },
            endpoints: EndpointConfig {
                binance_announcement_url:
                    "https://www.binance.com/en/support/announcement/new-cryptocurrency-listing"
                        .to_string(),
                kucoin_announcement_url: "https://api.kucoin.com/api/v3/announcements".to_string(),
                gateio_api_url: "https://api.gateio.ws/api/v4".to_string(),
            },
            storage: StorageConfig {
                currencies_file: PathBuf::from("currencies.json"),
                old_coins_file: PathBuf::from("old_coins.json"),
                test_listing_file: PathBuf::from("test_new_listing.json"),
            },
            monitoring: MonitoringConfig {
                log_level: "info".to_string(),
                status_log_interval_secs: 60,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let defaults = Config::default();

        Ok(Config {
            trade_options: TradeOptions {
                binance_announcements: env_or(
                    "BINANCE_ANNOUNCEMENTS",
                    defaults.trade_options.binance_announcements,
                ),
                kucoin_announcements: env_or(
                    "KUCOIN_ANNOUNCEMENTS",
                    defaults.trade_options.kucoin_announcements,
                ),
                test_mode: env_or("TEST_MODE", defaults.trade_options.test_mode),
            },
            polling: PollingConfig {
                listing_interval_secs: env_or(
                    "LISTING_POLL_INTERVAL_SECS",
                    defaults.polling.listing_interval_secs,
                ),
                currency_refresh_interval_secs: env_or(
                    "CURRENCY_REFRESH_INTERVAL_SECS",
                    defaults.polling.currency_refresh_interval_secs,
                ),
                request_timeout_secs: env_or(
                    "REQUEST_TIMEOUT_SECS",
                    defaults.polling.request_timeout_secs,
                ),
                cycle_timeout_secs: env_or("CYCLE_TIMEOUT_SECS", defaults.polling.cycle_timeout_secs),
                render_settle_secs: env_or("RENDER_SETTLE_SECS", defaults.polling.render_settle_secs),
            },
            endpoints: EndpointConfig {
                binance_announcement_url: env::var("BINANCE_ANNOUNCEMENT_URL")
                    .unwrap_or(defaults.endpoints.binance_announcement_url),
                kucoin_announcement_url: env::var("KUCOIN_ANNOUNCEMENT_URL")
                    .unwrap_or(defaults.endpoints.kucoin_announcement_url),
                gateio_api_url: env::var("GATEIO_API_URL")
                    .unwrap_or(defaults.endpoints.gateio_api_url),
            },
            storage: StorageConfig {
                currencies_file: env::var("CURRENCIES_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.currencies_file),
                old_coins_file: env::var("OLD_COINS_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.old_coins_file),
                test_listing_file: env::var("TEST_LISTING_FILE")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.test_listing_file),
            },
            monitoring: MonitoringConfig {
                log_level: env::var("LOG_LEVEL").unwrap_or(defaults.monitoring.log_level),
                status_log_interval_secs: env_or(
                    "STATUS_LOG_INTERVAL_SECS",
                    defaults.monitoring.status_log_interval_secs,
                ),
            },
        })
    }
}

/// Reads and parses an env var, keeping the default when unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_enable_both_exchanges() {
        let config = Config::default();
        assert!(config.trade_options.binance_announcements);
        assert!(config.trade_options.kucoin_announcements);
        assert!(!config.trade_options.test_mode);
        assert!(config.polling.currency_refresh_interval() > config.polling.listing_interval());
    }

    #[test]
    fn test_http_renderer_defaults_skip_settle_wait() {
        let config = Config::default();
        assert_eq!(config.polling.render_settle(), Duration::ZERO);
        assert_eq!(config.storage.old_coins_file, PathBuf::from("old_coins.json"));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        env::set_var("LISTING_SCANNER_TEST_GARBAGE", "not-a-number");
        assert_eq!(env_or("LISTING_SCANNER_TEST_GARBAGE", 7u64), 7);

        env::set_var("LISTING_SCANNER_TEST_BOOL", " false ");
        assert!(!env_or("LISTING_SCANNER_TEST_BOOL", true));

        assert_eq!(env_or("LISTING_SCANNER_TEST_UNSET_KEY", 3u64), 3);
    }
}
