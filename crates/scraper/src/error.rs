#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("failed to fetch page: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("failed to decode breadcrumbs: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("browser session error: {0}")]
    Browser(String),
    #[error("invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}

impl From<fantoccini::error::CmdError> for ScrapeError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        ScrapeError::Browser(e.to_string())
    }
}

pub type ScrapeResult<T> = std::result::Result<T, ScrapeError>;
