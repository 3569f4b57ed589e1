use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::sync::Arc;
use std::time::Duration;

use super::cache_bust;
use super::{AnnouncementSource, Exchange};
use crate::core::{Config, FetchError};

/// Article title nodes on the new-cryptocurrency-listing page.
pub const ARTICLE_SELECTOR: &str = "div.css-1yxx6id";
const LISTING_CATALOG: &str = "c=48";

/// Capability that loads a page and renders it far enough to query its DOM.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RenderedPageFetcher: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>, FetchError>;
}

/// A loaded page holding renderer resources until `close` is called.
#[cfg_attr(test, mockall::automock)]
pub trait RenderedPage: Send {
    /// Text content of every node matching the CSS selector, in document order.
    fn texts(&self, selector: &str) -> Result<Vec<String>, FetchError>;

    fn close(&mut self);
}

/// Owns an open page and closes it on every exit path, including cancellation.
pub struct PageGuard {
    page: Option<Box<dyn RenderedPage>>,
}

impl PageGuard {
    pub fn new(page: Box<dyn RenderedPage>) -> Self {
        Self { page: Some(page) }
    }

    pub fn texts(&self, selector: &str) -> Result<Vec<String>, FetchError> {
        match &self.page {
            Some(page) => page.texts(selector),
            None => Err(FetchError::Render("page already closed".to_string())),
        }
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Some(mut page) = self.page.take() {
            page.close();
        }
    }
}

/// Renderer backed by a plain HTTP GET and an HTML parser.
///
/// Serves pages whose listing titles are present in the server-rendered markup.
/// Swap in a browser-driving implementation when the titles only appear client side.
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)")
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl RenderedPageFetcher for HttpPageFetcher {
    async fn open(&self, url: &str) -> Result<Box<dyn RenderedPage>, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Cache-Control", "no-cache")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let html = response.text().await?;
        Ok(Box::new(HttpPage { html: Some(html) }))
    }
}

struct HttpPage {
    html: Option<String>,
}

impl RenderedPage for HttpPage {
    fn texts(&self, selector: &str) -> Result<Vec<String>, FetchError> {
        let html = self
            .html
            .as_deref()
            .ok_or_else(|| FetchError::Render("page already closed".to_string()))?;
        let selector =
            Selector::parse(selector).map_err(|e| FetchError::Render(e.to_string()))?;
        let document = Html::parse_document(html);

        Ok(document
            .select(&selector)
            .map(|node| node.text().collect::<String>())
            .collect())
    }

    fn close(&mut self) {
        self.html = None;
    }
}

/// Binance "new cryptocurrency listing" announcement page.
pub struct BinanceAnnouncements {
    renderer: Arc<dyn RenderedPageFetcher>,
    base_url: String,
    settle_delay: Duration,
}

impl BinanceAnnouncements {
    pub fn new(renderer: Arc<dyn RenderedPageFetcher>, base_url: String, settle_delay: Duration) -> Self {
        Self {
            renderer,
            base_url,
            settle_delay,
        }
    }

    pub fn from_config(config: &Config, renderer: Arc<dyn RenderedPageFetcher>) -> Self {
        Self::new(
            renderer,
            config.endpoints.binance_announcement_url.clone(),
            config.polling.render_settle(),
        )
    }

    fn request_url(&self) -> String {
        let mut rng = rand::thread_rng();
        let number = cache_bust::random_number(&mut rng);
        let key = cache_bust::random_key(&mut rng);
        format!(
            "{}?{}&rnd={}&{}={}",
            self.base_url, LISTING_CATALOG, number, key, number
        )
    }
}

#[async_trait]
impl AnnouncementSource for BinanceAnnouncements {
    fn exchange(&self) -> Exchange {
        Exchange::Binance
    }

    async fn fetch(&self) -> Result<Option<String>, FetchError> {
        tracing::info!("BINANCE - Pulling announcement page");
        let url = self.request_url();

        let page = PageGuard::new(self.renderer.open(&url).await?);
        // Client-side rendering needs a moment before the article list exists.
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
        let titles = page.texts(ARTICLE_SELECTOR)?;
        drop(page);

        let title = first_listing_title(titles, Exchange::Binance.intent_marker());
        if title.is_none() {
            tracing::debug!("BINANCE - No listing announcement on page");
        }
        Ok(title)
    }
}

/// First non-blank title containing `marker`, trimmed.
pub fn first_listing_title(titles: Vec<String>, marker: &str) -> Option<String> {
    titles
        .into_iter()
        .map(|title| title.trim().to_string())
        .find(|title| !title.is_empty() && title.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_returning(result: Result<Vec<String>, FetchError>) -> MockRenderedPage {
        let mut page = MockRenderedPage::new();
        let mut result = Some(result);
        page.expect_texts()
            .withf(|selector: &str| selector == ARTICLE_SELECTOR)
            .times(1)
            .returning(move |_| result.take().unwrap_or_else(|| Ok(vec![])));
        page.expect_close().times(1).return_const(());
        page
    }

    fn source_with(page: MockRenderedPage) -> BinanceAnnouncements {
        let mut renderer = MockRenderedPageFetcher::new();
        let mut page = Some(page);
        renderer
            .expect_open()
            .withf(|url: &str| url.starts_with("https://example.test/listing?c=48&rnd="))
            .times(1)
            .returning(move |_| {
                Ok(Box::new(page.take().expect("opened once")) as Box<dyn RenderedPage>)
            });
        BinanceAnnouncements::new(
            Arc::new(renderer),
            "https://example.test/listing".to_string(),
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_returns_first_will_list_title() {
        let page = page_returning(Ok(vec![
            "  ".to_string(),
            "Binance Completes Maintenance".to_string(),
            "  Binance Will List Foo (FOO)\n".to_string(),
            "Binance Will List Bar (BAR)".to_string(),
        ]));
        let source = source_with(page);

        let title = source.fetch().await.unwrap();
        assert_eq!(title.as_deref(), Some("Binance Will List Foo (FOO)"));
    }

    #[tokio::test]
    async fn test_empty_page_closes_renderer() {
        let source = source_with(page_returning(Ok(vec![])));
        assert_eq!(source.fetch().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_render_error_still_closes_renderer() {
        let source = source_with(page_returning(Err(FetchError::Render("boom".into()))));
        assert!(matches!(source.fetch().await, Err(FetchError::Render(_))));
    }

    #[test]
    fn test_http_page_extracts_selector_text() {
        let page = HttpPage {
            html: Some(
                r#"<html><body>
                    <div class="css-1yxx6id">Binance Will List <b>Foo</b> (FOO)</div>
                    <div class="other">Binance Will List Nope (NOPE)</div>
                    <div class="css-1yxx6id">Binance Delists Baz (BAZ)</div>
                </body></html>"#
                    .to_string(),
            ),
        };

        let texts = page.texts(ARTICLE_SELECTOR).unwrap();
        assert_eq!(
            texts,
            vec!["Binance Will List Foo (FOO)", "Binance Delists Baz (BAZ)"]
        );
    }

    #[test]
    fn test_closed_http_page_reports_render_error() {
        let mut page = HttpPage {
            html: Some("<div></div>".to_string()),
        };
        page.close();
        assert!(matches!(page.texts("div"), Err(FetchError::Render(_))));
    }

    #[test]
    fn test_request_url_is_fresh_each_call() {
        let source = BinanceAnnouncements::new(
            Arc::new(MockRenderedPageFetcher::new()),
            "https://example.test/listing".to_string(),
            Duration::ZERO,
        );
        let first = source.request_url();
        let second = source.request_url();
        assert!(first.starts_with("https://example.test/listing?c=48&rnd="));
        assert_ne!(first, second);
    }
}
