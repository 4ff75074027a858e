use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::error::FetchError;

const USER_AGENT_VALUE: &str = concat!("shelfscrape/", env!("CARGO_PKG_VERSION"));

pub fn build_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .context("build http client")
}

/// GETs `url` and returns the body, treating any non-success status as an error.
pub async fn get_html(client: &reqwest::Client, url: &Url) -> Result<String, FetchError> {
    let transport = |source| FetchError::Transport {
        url: url.clone(),
        source,
    };

    let response = client
        .get(url.clone())
        .header(USER_AGENT, USER_AGENT_VALUE)
        .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
        .send()
        .await
        .map_err(transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.clone(),
            status,
        });
    }

    response.text().await.map_err(transport)
}
