//! Errors raised while scraping quote pages and storing the results.
use thiserror::Error;

/// Failure of a single fetch, extraction or persistence step.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// Network failure or timeout while requesting a page.
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The page answered with a non-2xx status.
    #[error("{url} responded with {status}")]
    Status { url: String, status: u16 },

    /// The page was fetched but lacked the quote header.
    #[error("no element matching `{selector}`")]
    Mismatch { selector: &'static str },

    /// The document store could not be reached or refused the request.
    #[error("document store error: {0}")]
    Persist(#[from] anyhow::Error),
}

/// Crate-wide `Result` alias with `ScrapeError` as the default error.
pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;
