use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    shelfscrape::logging::init().context("init logging")?;

    let cli = shelfscrape::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        shelfscrape::cli::Command::Crawl(args) => {
            shelfscrape::crawl::run(args).await.context("crawl")?;
        }
        shelfscrape::cli::Command::Schedule(args) => {
            shelfscrape::schedule::run(args).await.context("schedule")?;
        }
        shelfscrape::cli::Command::Book(args) => {
            shelfscrape::book::run(args).await.context("book")?;
        }
    }

    Ok(())
}
