//! # PSB Scraper
//!
//! Reads the deli-sub catalogue of the retailer's website.
//!
//! Two steps, usable independently:
//! - [`MenuScraper::confirm_search`] fetches the catalogue page without running scripts and checks
//!   its breadcrumb metadata to confirm it is the "Deli Subs" category.
//! - [`MenuScraper::menu_items`] drives a headless browser over WebDriver, scrolls each product
//!   card into view so its lazily rendered content appears, and reads the item names.
//!
//! Everything that depends on the retailer's markup lives in [`MarkupProfile`].

#![warn(rust_2018_idioms)]

pub mod confirm;
pub mod error;
pub mod extract;
pub mod menu;
pub mod profile;
pub mod webdriver;

pub use confirm::{Breadcrumb, Confirmation};
pub use error::{ScrapeError, ScrapeResult};
pub use extract::{BrowserSession, MenuItems, ScrapePacing, ScrollMetrics};
pub use menu::MenuScraper;
pub use profile::MarkupProfile;
pub use webdriver::WebDriverSession;

/// Catalogue page scraped when no URL is given.
pub const DEFAULT_MENU_URL: &str =
    "https://www.publix.com/c/deli-subs/33957951-95fa-4408-b54a-dd570a7e8648";

/// WebDriver endpoint used when none is configured.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";
