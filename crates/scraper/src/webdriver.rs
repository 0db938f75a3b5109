//! [`BrowserSession`] over a WebDriver endpoint (chromedriver, geckodriver, Selenium).

use crate::extract::{BrowserSession, ScrollMetrics};
use crate::{ScrapeError, ScrapeResult};
use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const SCROLL_METRICS_SCRIPT: &str = "return [window.scrollY, document.body.scrollHeight];";
const SCROLL_TO_SCRIPT: &str = "window.scrollTo(0, arguments[0]);";

pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    /// Start a headless browser session on the WebDriver server at `webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns `ScrapeError::Browser` if the server cannot be reached or refuses the session.
    pub async fn connect(webdriver_url: &str) -> ScrapeResult<Self> {
        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] }),
        );
        capabilities.insert(
            "moz:firefoxOptions".to_string(),
            json!({ "args": ["-headless"] }),
        );

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|e| {
                ScrapeError::Browser(format!("failed to start WebDriver session: {e}"))
            })?;

        tracing::debug!(webdriver_url, "WebDriver session started");
        Ok(Self { client })
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    type Card = Element;

    async fn goto(&mut self, url: &str) -> ScrapeResult<()> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&mut self, css: &str) -> ScrapeResult<()> {
        self.client.wait().for_element(Locator::Css(css)).await?;
        Ok(())
    }

    async fn cards(&mut self, css: &str) -> ScrapeResult<Vec<Element>> {
        Ok(self.client.find_all(Locator::Css(css)).await?)
    }

    async fn scroll_metrics(&mut self) -> ScrapeResult<ScrollMetrics> {
        let value = self.client.execute(SCROLL_METRICS_SCRIPT, vec![]).await?;
        let metric = |index: usize| {
            value.get(index).and_then(Value::as_f64).ok_or_else(|| {
                ScrapeError::Browser(format!("unexpected scroll metrics: {value}"))
            })
        };

        Ok(ScrollMetrics {
            position: metric(0)?,
            height: metric(1)?,
        })
    }

    async fn scroll_to(&mut self, position: f64) -> ScrapeResult<()> {
        self.client
            .execute(SCROLL_TO_SCRIPT, vec![json!(position)])
            .await?;
        Ok(())
    }

    async fn card_inner_html(
        &mut self,
        card: &Element,
        css: &str,
        timeout: Duration,
    ) -> ScrapeResult<Option<String>> {
        let deadline = Instant::now() + timeout;
        loop {
            match card.find(Locator::Css(css)).await {
                Ok(element) => return Ok(Some(element.html(true).await?)),
                Err(e) if e.is_no_such_element() => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn close(self) -> ScrapeResult<()> {
        self.client.close().await?;
        tracing::debug!("WebDriver session closed");
        Ok(())
    }
}
