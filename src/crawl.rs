use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

use crate::cli::{CrawlArgs, CrawlOptions};
use crate::extract::ListingEntry;
use crate::formats::BookRecord;

pub const DEFAULT_BASE_URL: &str = "http://books.toscrape.com/catalogue/";

/// Prefix of catalog links that climb back to the catalogue root.
const PARENT_RELATIVE_PREFIX: &str = "../../../";

#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Catalogue root; always ends with `/`.
    pub base_url: Url,
    pub book_delay: Duration,
    pub page_delay: Duration,
    pub timeout: Duration,
    pub max_pages: Option<u32>,
}

impl CrawlSettings {
    pub fn from_options(options: &CrawlOptions) -> anyhow::Result<Self> {
        let base_url = Url::parse(&options.base_url).context("parse --base-url")?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("--base-url must be http/https: {base_url}");
        }

        Ok(Self {
            base_url: with_trailing_slash(base_url),
            book_delay: Duration::from_millis(options.book_delay_ms),
            page_delay: Duration::from_millis(options.page_delay_ms),
            timeout: Duration::from_secs(options.timeout_secs.max(1)),
            max_pages: options.max_pages,
        })
    }
}

pub async fn run(args: CrawlArgs) -> anyhow::Result<()> {
    let settings = CrawlSettings::from_options(&args.crawl).context("crawl settings")?;
    let walker = CatalogWalker::new(settings)?;

    let save_to = args.save.then(|| PathBuf::from(&args.out_dir));
    let books = walker.scrape_books(save_to.as_deref()).await;

    println!("collected {} books", books.len());
    Ok(())
}

/// Walks the catalog page by page and extracts every listed book.
pub struct CatalogWalker {
    client: reqwest::Client,
    settings: CrawlSettings,
}

impl CatalogWalker {
    pub fn new(settings: CrawlSettings) -> anyhow::Result<Self> {
        let client = crate::http::build_client(settings.timeout)?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Runs one walk and, when `save_to` is set, writes the report there.
    ///
    /// A failed write is logged; the collected books are returned either way.
    pub async fn scrape_books(&self, save_to: Option<&Path>) -> Vec<BookRecord> {
        let books = self.walk().await;

        if let Some(out_dir) = save_to {
            match crate::export::save_report(out_dir, &books) {
                Ok(Some(path)) => tracing::info!(path = %path.display(), "saved report"),
                Ok(None) => tracing::info!("no books collected; report not written"),
                Err(err) => tracing::error!(?err, "failed to save report"),
            }
        }

        books
    }

    pub async fn walk(&self) -> Vec<BookRecord> {
        let mut books = Vec::new();
        let mut page: u32 = 1;

        tracing::info!(base_url = %self.settings.base_url, "starting catalog walk");
        loop {
            if self.settings.max_pages.is_some_and(|max| page > max) {
                tracing::info!(page, "page limit reached");
                break;
            }

            let catalog_url = match catalog_url(&self.settings.base_url, page) {
                Ok(url) => url,
                Err(err) => {
                    tracing::error!(page, ?err, "failed to build catalog page url");
                    break;
                }
            };

            tracing::info!(page, url = %catalog_url, "processing catalog page");
            let html = match crate::http::get_html(&self.client, &catalog_url).await {
                Ok(html) => html,
                Err(err) if err.is_not_found() => {
                    tracing::info!(page, "reached the last catalog page");
                    break;
                }
                Err(err) => {
                    tracing::error!(page, ?err, "failed to load catalog page");
                    break;
                }
            };

            let entries = crate::extract::parse_listing(&html);
            if entries.is_empty() {
                tracing::info!(page, "catalog page lists no books");
                break;
            }

            let book_urls = self.book_urls(page, entries);
            let total = book_urls.len();
            for (index, book_url) in book_urls.iter().enumerate() {
                tracing::debug!(page, book = index + 1, total, url = %book_url, "fetching book");
                match crate::book::fetch_book(&self.client, book_url).await {
                    Ok(book) => {
                        tracing::info!(
                            page,
                            book = index + 1,
                            total,
                            title = %book.title,
                            "collected book"
                        );
                        books.push(book);
                    }
                    Err(err) => {
                        tracing::warn!(page, url = %book_url, ?err, "failed to collect book");
                    }
                }
                tokio::time::sleep(self.settings.book_delay).await;
            }

            page += 1;
            tokio::time::sleep(self.settings.page_delay).await;
        }

        tracing::info!(books = books.len(), "catalog walk finished");
        books
    }

    fn book_urls(&self, page: u32, entries: Vec<ListingEntry>) -> Vec<Url> {
        entries
            .into_iter()
            .filter_map(|entry| match entry {
                ListingEntry::Link(href) => {
                    let resolved = resolve_book_url(&self.settings.base_url, &href);
                    if resolved.is_none() {
                        tracing::warn!(page, href = %href, "unsupported book link shape");
                    }
                    resolved
                }
                ListingEntry::MissingLink => {
                    tracing::warn!(page, "catalog entry has no book link");
                    None
                }
            })
            .collect()
    }
}

/// Page 1 is `index.html`; every later page is `page-N.html`.
pub fn catalog_url(base_url: &Url, page: u32) -> Result<Url, url::ParseError> {
    if page <= 1 {
        base_url.join("index.html")
    } else {
        base_url.join(&format!("page-{page}.html"))
    }
}

/// Resolves a catalog link against the catalogue root.
///
/// Accepts `../../../<book>/index.html` and the sibling form
/// `<book>/index.html`; any other shape yields `None`.
pub fn resolve_book_url(base_url: &Url, href: &str) -> Option<Url> {
    let relative = href.strip_prefix(PARENT_RELATIVE_PREFIX).unwrap_or(href);
    if !is_sibling_path(relative) {
        return None;
    }
    base_url.join(relative).ok()
}

fn is_sibling_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains(':')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

fn with_trailing_slash(mut url: Url) -> Url {
    let path = url.path().to_owned();
    if !path.ends_with('/') {
        url.set_path(&format!("{path}/"));
    }
    url
}
