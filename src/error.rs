use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GET {url}: unexpected status {status}")]
    Status { url: Url, status: StatusCode },

    #[error("GET {url}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Status {
                status: StatusCode::NOT_FOUND,
                ..
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    #[error("product table row is missing its {0} cell")]
    IncompleteRow(&'static str),

    #[error("invalid number of reviews: {0:?}")]
    InvalidReviewCount(String),
}

/// Why a single book page produced no record.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("fetch book page")]
    Fetch(#[from] FetchError),

    #[error("parse book page")]
    Parse(#[from] ParseError),
}
