use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};

use crate::crawl::DEFAULT_BASE_URL;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk the whole catalog once.
    Crawl(CrawlArgs),
    /// Walk the catalog every day at a fixed time, always saving the report.
    Schedule(ScheduleArgs),
    /// Fetch a single book detail page and print it as JSON.
    Book(BookArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CrawlOptions {
    /// Catalogue root that holds `index.html` and `page-N.html`.
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Delay after each book request.
    #[arg(long, default_value_t = 300)]
    pub book_delay_ms: u64,

    /// Delay after each catalog page.
    #[arg(long, default_value_t = 500)]
    pub page_delay_ms: u64,

    /// Per-request timeout.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Stop after this many catalog pages.
    #[arg(long)]
    pub max_pages: Option<u32>,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            book_delay_ms: 300,
            page_delay_ms: 500,
            timeout_secs: 30,
            max_pages: None,
        }
    }
}

#[derive(Debug, Args)]
pub struct CrawlArgs {
    #[command(flatten)]
    pub crawl: CrawlOptions,

    /// Write `books_data.txt` after the walk.
    #[arg(long)]
    pub save: bool,

    /// Directory for `books_data.txt`.
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

#[derive(Debug, Args)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub crawl: CrawlOptions,

    /// Local wall-clock time of the daily run (HH:MM).
    #[arg(long, default_value = "19:00", value_parser = parse_time_of_day)]
    pub at: NaiveTime,

    /// How often the scheduler checks whether the run is due.
    #[arg(long, default_value_t = 60)]
    pub poll_secs: u64,

    /// Directory for `books_data.txt`.
    #[arg(long, default_value = ".")]
    pub out_dir: String,
}

#[derive(Debug, Args)]
pub struct BookArgs {
    /// Book detail page URL.
    #[arg(long)]
    pub url: String,

    /// Request timeout.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

fn parse_time_of_day(raw: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|err| format!("expected HH:MM (e.g. 19:00): {err}"))
}
