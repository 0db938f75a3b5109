use crate::confirm::{confirm_html, fetch_page, Confirmation};
use crate::extract::{extract_menu_items, BrowserSession, MenuItems, ScrapePacing};
use crate::profile::MarkupProfile;
use crate::webdriver::WebDriverSession;
use crate::{ScrapeResult, DEFAULT_MENU_URL, DEFAULT_WEBDRIVER_URL};

/// Scraper for one catalogue page.
///
/// Neither operation returns an error: failures are logged and reported as
/// [`Confirmation::NotConfirmed`] or `None`.
#[derive(Clone, Debug)]
pub struct MenuScraper {
    url: String,
    webdriver_url: String,
    profile: MarkupProfile,
    pacing: ScrapePacing,
    http: reqwest::Client,
}

impl MenuScraper {
    pub fn new(url: impl Into<String>, webdriver_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            webdriver_url: webdriver_url.into(),
            profile: MarkupProfile::default(),
            pacing: ScrapePacing::default(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_profile(mut self, profile: MarkupProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_pacing(mut self, pacing: ScrapePacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the page without running scripts and check its breadcrumbs.
    pub async fn confirm_search(&self) -> Confirmation {
        let html = match fetch_page(&self.http, &self.url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %self.url, "Error confirming search URL: {e}");
                return Confirmation::NotConfirmed;
            }
        };

        match confirm_html(&html, &self.profile) {
            Ok(confirmation) => confirmation,
            Err(e) => {
                tracing::warn!(url = %self.url, "Error confirming search URL: {e}");
                Confirmation::NotConfirmed
            }
        }
    }

    /// Read every item name on the page with a headless browser.
    ///
    /// `None` means extraction failed; an empty map means the page had no cards.
    pub async fn menu_items(&self) -> Option<MenuItems> {
        let session = match WebDriverSession::connect(&self.webdriver_url).await {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Error using headless browser: {e}");
                return None;
            }
        };

        self.menu_items_with(session).await
    }

    /// Run extraction on an already opened session, closing it afterwards.
    pub async fn menu_items_with<B: BrowserSession>(&self, mut session: B) -> Option<MenuItems> {
        let result =
            extract_menu_items(&mut session, &self.url, &self.profile, &self.pacing).await;
        if let Err(e) = session.close().await {
            tracing::warn!("Error closing browser session: {e}");
        }

        log_failure(result)
    }
}

impl Default for MenuScraper {
    fn default() -> Self {
        Self::new(DEFAULT_MENU_URL, DEFAULT_WEBDRIVER_URL)
    }
}

fn log_failure(result: ScrapeResult<MenuItems>) -> Option<MenuItems> {
    match result {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::error!("Error using headless browser: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScrollMetrics;
    use crate::ScrapeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// One card named "Italian Sub"; optionally fails on navigation.
    struct StubSession {
        fail_navigation: bool,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BrowserSession for StubSession {
        type Card = ();

        async fn goto(&mut self, _url: &str) -> ScrapeResult<()> {
            if self.fail_navigation {
                return Err(ScrapeError::Browser("net::ERR_NAME_NOT_RESOLVED".into()));
            }
            Ok(())
        }

        async fn wait_for(&mut self, _css: &str) -> ScrapeResult<()> {
            Ok(())
        }

        async fn cards(&mut self, _css: &str) -> ScrapeResult<Vec<()>> {
            Ok(vec![()])
        }

        async fn scroll_metrics(&mut self) -> ScrapeResult<ScrollMetrics> {
            Ok(ScrollMetrics {
                position: 0.0,
                height: 0.0,
            })
        }

        async fn scroll_to(&mut self, _position: f64) -> ScrapeResult<()> {
            Ok(())
        }

        async fn card_inner_html(
            &mut self,
            _card: &(),
            _css: &str,
            _timeout: Duration,
        ) -> ScrapeResult<Option<String>> {
            Ok(Some(r#"<a href="/pd/italian">Italian Sub</a>"#.into()))
        }

        async fn close(self) -> ScrapeResult<()> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn scraper() -> MenuScraper {
        MenuScraper::new("https://example.test/deli", DEFAULT_WEBDRIVER_URL)
            .with_pacing(ScrapePacing::immediate())
    }

    #[tokio::test]
    async fn test_menu_items_closes_session() {
        let closed = Arc::new(AtomicUsize::new(0));
        let session = StubSession {
            fail_navigation: false,
            closed: Arc::clone(&closed),
        };

        let items = scraper()
            .menu_items_with(session)
            .await
            .expect("extraction should succeed");

        assert_eq!(items.get(&0).map(String::as_str), Some("Italian Sub"));
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_extraction_is_none_and_still_closes() {
        let closed = Arc::new(AtomicUsize::new(0));
        let session = StubSession {
            fail_navigation: true,
            closed: Arc::clone(&closed),
        };

        assert!(scraper().menu_items_with(session).await.is_none());
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_page_is_not_confirmed() {
        // Nothing listens on port 9 on the loopback interface.
        let scraper = MenuScraper::new("http://127.0.0.1:9/deli", DEFAULT_WEBDRIVER_URL);
        assert_eq!(scraper.confirm_search().await, Confirmation::NotConfirmed);
    }

    const DELI_SUBS_PAGE: &str = r#"<html><body>
        <div class="search-page-header-container">
            <search-browse-page-header :structured-breadcrumbs='[{"Name":"Home"},{"Name":"Deli Subs"}]'>
            </search-browse-page-header>
        </div>
    </body></html>"#;

    #[tokio::test]
    async fn test_served_category_page_is_confirmed() {
        let url = crate::test_support::serve_once("200 OK", DELI_SUBS_PAGE).await;
        let scraper = MenuScraper::new(url, DEFAULT_WEBDRIVER_URL);
        assert_eq!(scraper.confirm_search().await, Confirmation::Confirmed);
    }

    #[tokio::test]
    async fn test_error_status_is_not_confirmed_despite_body() {
        let url = crate::test_support::serve_once("404 Not Found", DELI_SUBS_PAGE).await;
        let scraper = MenuScraper::new(url, DEFAULT_WEBDRIVER_URL);
        assert_eq!(scraper.confirm_search().await, Confirmation::NotConfirmed);
    }
}
