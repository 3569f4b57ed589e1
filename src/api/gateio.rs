use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::types::Currency;
use crate::core::{Config, FetchError};

/// Source of the exchange's tradable currency universe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CurrencyProvider: Send + Sync {
    async fn list_currencies(&self) -> Result<Vec<Currency>, FetchError>;
}

/// Public (unauthenticated) Gate.io spot REST client.
pub struct GateIoClient {
    client: Client,
    base_url: String,
}

impl GateIoClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        Self::with_base_url(
            config.endpoints.gateio_api_url.clone(),
            config.polling.request_timeout(),
        )
    }

    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CurrencyProvider for GateIoClient {
    async fn list_currencies(&self) -> Result<Vec<Currency>, FetchError> {
        let url = format!("{}/spot/currencies", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gate.io API error: {} - {}", status, error_text);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
