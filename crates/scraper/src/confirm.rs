//! Category confirmation from breadcrumb metadata.
//!
//! The catalogue page embeds its navigation path as a JSON list on the page-header element,
//! e.g. `[{"Name":"Home"},{"Name":"Deli Subs"}]`. A page is confirmed when one of those
//! entries names the expected category.

use crate::profile::{selector, MarkupProfile};
use crate::ScrapeResult;
use scraper::Html;
use serde::{Deserialize, Deserializer, Serialize};

/// One breadcrumb entry. Other keys are kept as-is.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Breadcrumb {
    /// `None` when `Name` is missing, null or not text. Such an entry never matches.
    #[serde(rename = "Name", default, deserialize_with = "name_if_text")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn name_if_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_string)))
}

/// Outcome of checking a page against the expected category.
#[derive(Clone, Debug, PartialEq)]
pub enum Confirmation {
    /// A breadcrumb names the expected category.
    Confirmed,
    /// The page has no usable breadcrumb metadata, or it could not be fetched or decoded.
    NotConfirmed,
    /// Breadcrumbs were read but none names the expected category. They are returned so the
    /// caller can see where the page actually sits.
    Ambiguous(Vec<Breadcrumb>),
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}

/// Decode a breadcrumb JSON list and look for the expected category.
///
/// # Errors
///
/// Returns `ScrapeError::Parse` if `raw` is not a JSON list of objects.
pub fn confirm_breadcrumbs(raw: &str, profile: &MarkupProfile) -> ScrapeResult<Confirmation> {
    let breadcrumbs: Vec<Breadcrumb> = serde_json::from_str(raw)?;

    if breadcrumbs
        .iter()
        .any(|crumb| crumb.name.as_deref() == Some(profile.target_category.as_str()))
    {
        return Ok(Confirmation::Confirmed);
    }
    Ok(Confirmation::Ambiguous(breadcrumbs))
}

/// Check statically fetched page markup.
///
/// A missing header, breadcrumb element or attribute, or undecodable breadcrumb JSON, is
/// logged and reported as [`Confirmation::NotConfirmed`].
///
/// # Errors
///
/// Returns `ScrapeError::Selector` only if the profile holds an invalid selector.
pub fn confirm_html(html: &str, profile: &MarkupProfile) -> ScrapeResult<Confirmation> {
    let header_selector = selector(&profile.header_container)?;
    let breadcrumb_selector = selector(&profile.breadcrumb_element)?;
    let document = Html::parse_document(html);

    let Some(header) = document.select(&header_selector).next() else {
        tracing::warn!("Search header not found.");
        return Ok(Confirmation::NotConfirmed);
    };

    let raw = header
        .select(&breadcrumb_selector)
        .next()
        .and_then(|element| element.value().attr(&profile.breadcrumb_attribute))
        .filter(|raw| !raw.trim().is_empty());
    let Some(raw) = raw else {
        tracing::warn!(
            element = %profile.breadcrumb_element,
            attribute = %profile.breadcrumb_attribute,
            "search header has no breadcrumb metadata"
        );
        return Ok(Confirmation::NotConfirmed);
    };

    match confirm_breadcrumbs(raw, profile) {
        Ok(confirmation) => Ok(confirmation),
        Err(e) => {
            tracing::warn!("Error decoding breadcrumbs: {e}");
            Ok(Confirmation::NotConfirmed)
        }
    }
}

/// GET `url` and return the body of a successful response.
///
/// # Errors
///
/// Returns `ScrapeError::Fetch` if the request fails or the status is not a success.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> ScrapeResult<String> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}
