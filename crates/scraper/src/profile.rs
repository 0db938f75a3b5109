//! Selectors and attribute names for the retailer's markup.
//!
//! The catalogue page is not a versioned interface. When the site changes, this is the one
//! place to update.

use crate::{ScrapeError, ScrapeResult};
use scraper::Selector;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkupProfile {
    /// Container present only on search/browse result pages.
    pub header_container: String,
    /// Element inside the header carrying the breadcrumb metadata.
    pub breadcrumb_element: String,
    /// Attribute holding the JSON-encoded breadcrumb list.
    pub breadcrumb_attribute: String,
    /// Breadcrumb `Name` identifying the expected category.
    pub target_category: String,
    /// Column that holds the product grid once the page has rendered.
    pub content_column: String,
    /// One product card, relative to the content column.
    pub card: String,
    /// Title wrapper, relative to a card.
    pub title_wrapper: String,
    /// The element whose text is the item name, relative to the title wrapper.
    pub item_link: String,
}

impl MarkupProfile {
    pub fn publix() -> Self {
        Self {
            header_container: "div.search-page-header-container".into(),
            breadcrumb_element: "search-browse-page-header".into(),
            breadcrumb_attribute: ":structured-breadcrumbs".into(),
            target_category: "Deli Subs".into(),
            content_column: "div.search-content-column".into(),
            card: r#"div.p-grid-item[data-qa-automation="p-card"]"#.into(),
            title_wrapper: "div.content-wrapper div.top-section div.title-wrapper".into(),
            item_link: "a".into(),
        }
    }

    /// Cards scoped to the content column.
    pub fn card_in_column(&self) -> String {
        format!("{} {}", self.content_column, self.card)
    }
}

impl Default for MarkupProfile {
    fn default() -> Self {
        Self::publix()
    }
}

/// Compile a CSS selector for static parsing.
pub(crate) fn selector(css: &str) -> ScrapeResult<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector {
        selector: css.to_string(),
        reason: format!("{e:?}"),
    })
}
