use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::BookArgs;
use crate::error::BookError;
use crate::formats::BookRecord;

pub async fn run(args: BookArgs) -> anyhow::Result<()> {
    let url = Url::parse(&args.url).context("parse --url")?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("--url must be http/https: {url}");
    }

    let client = crate::http::build_client(Duration::from_secs(args.timeout_secs.max(1)))?;
    let record = fetch_book(&client, &url)
        .await
        .with_context(|| format!("collect book: {url}"))?;

    let json = serde_json::to_string_pretty(&record).context("serialize book record")?;
    println!("{json}");
    Ok(())
}

/// Fetches one book detail page and extracts its record.
///
/// Every failure comes back as a [`BookError`]; callers decide whether to skip
/// the book or stop.
pub async fn fetch_book(client: &reqwest::Client, url: &Url) -> Result<BookRecord, BookError> {
    let html = crate::http::get_html(client, url).await?;
    let record = crate::extract::parse_book(&html)?;
    tracing::debug!(url = %url, title = %record.title, "extracted book");
    Ok(record)
}
