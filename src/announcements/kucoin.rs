use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use std::collections::BTreeSet;
use std::time::Duration;

use super::cache_bust;
use super::{AnnouncementSource, Exchange};
use crate::api::{AnnouncementPage, KuCoinResponse};
use crate::core::{Config, FetchError};

const SUCCESS_CODE: &str = "200000";
/// Announcement tag set a genuine new-listing post carries, no more and no less.
const LISTING_TAGS: [&str; 2] = ["latest-announcements", "new-listings"];

/// KuCoin public announcements API.
pub struct KucoinAnnouncements {
    client: Client,
    base_url: String,
}

impl KucoinAnnouncements {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Self::new(
            config.endpoints.kucoin_announcement_url.clone(),
            config.polling.request_timeout(),
        )
    }

    fn request_url(&self) -> String {
        let mut rng = rand::thread_rng();
        let page_size: u8 = rng.gen_range(5..=10);
        let queries = vec![
            "page=1".to_string(),
            format!("pageSize={}", page_size),
            "annType=new-listings".to_string(),
            "lang=en_US".to_string(),
            format!("rnd={}", Utc::now().timestamp_millis()),
            cache_bust::random_pair(&mut rng),
        ];
        format!("{}?{}", self.base_url, cache_bust::shuffled_query(queries, &mut rng))
    }
}

#[async_trait]
impl AnnouncementSource for KucoinAnnouncements {
    fn exchange(&self) -> Exchange {
        Exchange::Kucoin
    }

    async fn fetch(&self) -> Result<Option<String>, FetchError> {
        tracing::info!("KUCOIN - Pulling announcement page");
        let url = self.request_url();

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!("Error pulling kucoin announcement page: {}", status);
            return Err(FetchError::Status(status.as_u16()));
        }

        match response.headers().get("X-Cache") {
            Some(cache) => tracing::debug!("X-Cache: {:?}", cache),
            None => tracing::debug!("No X-Cache header, response came from origin"),
        }

        let body = response.text().await?;
        let title = parse_listing_title(&body)?;
        tracing::info!("Finished pulling kucoin announcement page");
        Ok(title)
    }
}

/// Title of the first announcement tagged exactly as a new listing.
pub fn parse_listing_title(body: &str) -> Result<Option<String>, FetchError> {
    let response: KuCoinResponse<AnnouncementPage> = serde_json::from_str(body)?;
    if response.code != SUCCESS_CODE {
        return Err(FetchError::ApiCode(response.code));
    }

    let required: BTreeSet<&str> = LISTING_TAGS.into_iter().collect();
    let title = response
        .data
        .items
        .into_iter()
        .find(|item| {
            let tags: BTreeSet<&str> = item.ann_type.iter().map(String::as_str).collect();
            tags == required
        })
        .map(|item| item.ann_title);

    if title.is_none() {
        tracing::warn!("No new-listing announcements found");
    }
    Ok(title)
}
