//! Menu extraction over a live browser session.
//!
//! Product cards render their contents lazily, once scrolled into view. Extraction walks the
//! cards in document order, scrolls the page down in paced steps before reading each one, then
//! parses the card's title fragment statically to pull out the item name.

use crate::profile::{selector, MarkupProfile};
use crate::ScrapeResult;
use async_trait::async_trait;
use scraper::Html;
use std::collections::BTreeMap;
use std::time::Duration;

/// Position index -> item name. Cards without a name leave a gap in the indices.
pub type MenuItems = BTreeMap<usize, String>;

/// Vertical scroll state of the page, in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollMetrics {
    pub position: f64,
    pub height: f64,
}

impl ScrollMetrics {
    /// Intermediate scroll targets from the current position to the bottom of the page.
    ///
    /// Empty when there is nothing below the current position.
    pub fn steps_to_bottom(&self, steps: u32) -> Vec<f64> {
        if self.height <= self.position || steps == 0 {
            return Vec::new();
        }
        let increment = (self.height - self.position) / f64::from(steps);
        (1..=steps)
            .map(|step| self.position + increment * f64::from(step))
            .collect()
    }
}

/// Timing used while walking the cards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapePacing {
    /// Total time spent scrolling towards the bottom of the page before each card.
    pub scroll_duration: Duration,
    /// Number of increments the scroll is split into.
    pub scroll_steps: u32,
    /// Pause after each card.
    pub card_pause: Duration,
    /// How long to wait for a card's title wrapper to appear after scrolling.
    pub settle_timeout: Duration,
}

impl ScrapePacing {
    /// No pauses at all. Useful against local fixtures.
    pub fn immediate() -> Self {
        Self {
            scroll_duration: Duration::ZERO,
            scroll_steps: 1,
            card_pause: Duration::ZERO,
            settle_timeout: Duration::ZERO,
        }
    }

    fn step_pause(&self) -> Duration {
        if self.scroll_steps == 0 {
            return Duration::ZERO;
        }
        self.scroll_duration / self.scroll_steps
    }
}

impl Default for ScrapePacing {
    fn default() -> Self {
        Self {
            scroll_duration: Duration::from_secs(1),
            scroll_steps: 10,
            card_pause: Duration::from_secs(1),
            settle_timeout: Duration::from_secs(5),
        }
    }
}

/// The browser operations extraction needs.
#[async_trait]
pub trait BrowserSession: Send {
    /// Handle to one product card on the current page.
    type Card: Send + Sync;

    async fn goto(&mut self, url: &str) -> ScrapeResult<()>;

    /// Wait until an element matching `css` is present.
    async fn wait_for(&mut self, css: &str) -> ScrapeResult<()>;

    /// Every element matching `css`, in document order.
    async fn cards(&mut self, css: &str) -> ScrapeResult<Vec<Self::Card>>;

    async fn scroll_metrics(&mut self) -> ScrapeResult<ScrollMetrics>;

    async fn scroll_to(&mut self, position: f64) -> ScrapeResult<()>;

    /// Inner markup of the first element matching `css` inside `card`, waiting up to `timeout`
    /// for it to appear. `None` if it never does.
    async fn card_inner_html(
        &mut self,
        card: &Self::Card,
        css: &str,
        timeout: Duration,
    ) -> ScrapeResult<Option<String>>;

    /// End the session. Called exactly once, whether extraction succeeded or not.
    async fn close(self) -> ScrapeResult<()>;
}

/// Navigate to `url` and read the name of every product card.
///
/// Zero cards is an empty result. A card whose title has no link is logged and skipped.
///
/// # Errors
///
/// Returns `ScrapeError` if navigation, waiting for the content column, or any browser command
/// fails. The session is left open; closing it is the caller's job.
pub async fn extract_menu_items<B>(
    session: &mut B,
    url: &str,
    profile: &MarkupProfile,
    pacing: &ScrapePacing,
) -> ScrapeResult<MenuItems>
where
    B: BrowserSession,
{
    session.goto(url).await?;
    session.wait_for(&profile.content_column).await?;

    let cards = session.cards(&profile.card_in_column()).await?;
    let mut items = MenuItems::new();
    if cards.is_empty() {
        tracing::info!(url, "no product cards found");
        return Ok(items);
    }
    tracing::info!(count = cards.len(), "found product cards");

    for (position, card) in cards.iter().enumerate() {
        scroll_to_bottom(session, pacing).await?;

        let fragment = session
            .card_inner_html(card, &profile.title_wrapper, pacing.settle_timeout)
            .await?;
        let name = match fragment {
            Some(html) => item_name_from_fragment(&html, profile)?,
            None => {
                tracing::warn!(position, "card has no title wrapper");
                None
            }
        };

        match name {
            Some(name) => {
                tracing::debug!(position, name = %name, "menu item");
                items.insert(position, name);
            }
            None => tracing::warn!(position, "no link found in card title"),
        }

        tokio::time::sleep(pacing.card_pause).await;
    }

    tracing::info!(items = items.len(), "menu extraction finished");
    Ok(items)
}

async fn scroll_to_bottom<B>(session: &mut B, pacing: &ScrapePacing) -> ScrapeResult<()>
where
    B: BrowserSession,
{
    let metrics = session.scroll_metrics().await?;
    let pause = pacing.step_pause();

    for target in metrics.steps_to_bottom(pacing.scroll_steps) {
        session.scroll_to(target).await?;
        tokio::time::sleep(pause).await;
    }
    Ok(())
}

/// Text of the first link in a card's title fragment, with runs of whitespace collapsed.
///
/// `Ok(None)` when the fragment contains no link.
///
/// # Errors
///
/// Returns `ScrapeError::Selector` if the profile's link selector is invalid.
pub fn item_name_from_fragment(
    html: &str,
    profile: &MarkupProfile,
) -> ScrapeResult<Option<String>> {
    let link = selector(&profile.item_link)?;
    let fragment = Html::parse_fragment(html);

    Ok(fragment.select(&link).next().map(|anchor| {
        anchor
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScrapeError;

    /// Scripted page: one entry per card, `None` meaning the title wrapper never renders.
    #[derive(Default)]
    struct FakeSession {
        cards: Vec<Option<String>>,
        height: f64,
        position: f64,
        visited: Vec<String>,
        scrolls: Vec<f64>,
        fail_on_card: Option<usize>,
    }

    impl FakeSession {
        fn with_cards(cards: Vec<Option<&str>>) -> Self {
            Self {
                cards: cards.into_iter().map(|c| c.map(str::to_string)).collect(),
                height: 3000.0,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl BrowserSession for FakeSession {
        type Card = usize;

        async fn goto(&mut self, url: &str) -> ScrapeResult<()> {
            self.visited.push(url.to_string());
            Ok(())
        }

        async fn wait_for(&mut self, _css: &str) -> ScrapeResult<()> {
            Ok(())
        }

        async fn cards(&mut self, _css: &str) -> ScrapeResult<Vec<usize>> {
            Ok((0..self.cards.len()).collect())
        }

        async fn scroll_metrics(&mut self) -> ScrapeResult<ScrollMetrics> {
            Ok(ScrollMetrics {
                position: self.position,
                height: self.height,
            })
        }

        async fn scroll_to(&mut self, position: f64) -> ScrapeResult<()> {
            self.position = position;
            self.scrolls.push(position);
            Ok(())
        }

        async fn card_inner_html(
            &mut self,
            card: &usize,
            _css: &str,
            _timeout: Duration,
        ) -> ScrapeResult<Option<String>> {
            if self.fail_on_card == Some(*card) {
                return Err(ScrapeError::Browser("stale element reference".into()));
            }
            Ok(self.cards[*card].clone())
        }

        async fn close(self) -> ScrapeResult<()> {
            Ok(())
        }
    }

    fn title(name: &str) -> String {
        format!(r#"<span class="badge">New</span><a href="/pd/sub">{name}</a>"#)
    }

    #[tokio::test(start_paused = true)]
    async fn test_extracts_names_by_position() {
        let italian = title("Italian Sub");
        let turkey = title("\n   Boar's Head   Turkey\n  Sub ");
        let mut session = FakeSession::with_cards(vec![Some(italian.as_str()), Some(turkey.as_str())]);

        let items = extract_menu_items(
            &mut session,
            "https://example.test/deli",
            &MarkupProfile::publix(),
            &ScrapePacing::default(),
        )
        .await
        .expect("extraction should succeed");

        assert_eq!(session.visited, ["https://example.test/deli"]);
        assert_eq!(items.len(), 2);
        assert_eq!(items[&0], "Italian Sub");
        assert_eq!(items[&1], "Boar's Head Turkey Sub");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_cards_is_empty() {
        let mut session = FakeSession::with_cards(vec![]);

        let items = extract_menu_items(
            &mut session,
            "https://example.test/deli",
            &MarkupProfile::publix(),
            &ScrapePacing::default(),
        )
        .await
        .expect("extraction should succeed");

        assert!(items.is_empty());
        assert!(session.scrolls.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_card_without_link_is_skipped() {
        let first = title("Chicken Tender Sub");
        let third = title("Veggie Sub");
        let mut session = FakeSession::with_cards(vec![
            Some(first.as_str()),
            Some(r#"<span class="title">Coming soon</span>"#),
            None,
            Some(third.as_str()),
        ]);

        let items = extract_menu_items(
            &mut session,
            "https://example.test/deli",
            &MarkupProfile::publix(),
            &ScrapePacing::default(),
        )
        .await
        .expect("extraction should succeed");

        assert_eq!(items.keys().copied().collect::<Vec<_>>(), [0, 3]);
        assert_eq!(items[&3], "Veggie Sub");
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_is_paced_in_equal_steps() {
        let italian = title("Italian Sub");
        let mut session = FakeSession::with_cards(vec![Some(italian.as_str())]);
        session.height = 1000.0;

        let started = tokio::time::Instant::now();
        extract_menu_items(
            &mut session,
            "https://example.test/deli",
            &MarkupProfile::publix(),
            &ScrapePacing::default(),
        )
        .await
        .expect("extraction should succeed");

        assert_eq!(session.scrolls.len(), 10);
        assert_eq!(session.scrolls[0], 100.0);
        assert_eq!(session.scrolls[9], 1000.0);
        // One second of scrolling plus the one second pause after the card.
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_browser_error_is_returned() {
        let italian = title("Italian Sub");
        let mut session =
            FakeSession::with_cards(vec![Some(italian.as_str()), Some(italian.as_str())]);
        session.fail_on_card = Some(1);

        let result = extract_menu_items(
            &mut session,
            "https://example.test/deli",
            &MarkupProfile::publix(),
            &ScrapePacing::default(),
        )
        .await;

        assert!(matches!(result, Err(ScrapeError::Browser(_))));
    }

    #[test]
    fn test_no_steps_when_already_at_bottom() {
        let metrics = ScrollMetrics {
            position: 800.0,
            height: 800.0,
        };
        assert!(metrics.steps_to_bottom(10).is_empty());
    }

    #[test]
    fn test_item_name_uses_first_link() {
        let html = r#"<a href="/a"> Ultimate <b>Sub</b> </a><a href="/b">Other</a>"#;
        let name = item_name_from_fragment(html, &MarkupProfile::publix()).expect("selector");
        assert_eq!(name.as_deref(), Some("Ultimate Sub"));
    }
}
