use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use tokio_util::sync::CancellationToken;

use crate::cli::ScheduleArgs;
use crate::crawl::{CatalogWalker, CrawlSettings};

/// Runs a saving crawl every day at `args.at` until Ctrl+C.
pub async fn run(args: ScheduleArgs) -> anyhow::Result<()> {
    let settings = CrawlSettings::from_options(&args.crawl).context("crawl settings")?;
    let walker = CatalogWalker::new(settings)?;
    let out_dir = PathBuf::from(&args.out_dir);

    let scheduler = Scheduler::new(
        DailyTrigger::new(args.at),
        Duration::from_secs(args.poll_secs.max(1)),
    );

    let stop = scheduler.stop_handle();
    tokio::spawn(async move {
        match watch_interrupts(stop.clone(), tokio::signal::ctrl_c).await {
            Ok(()) => std::process::exit(INTERRUPTED_EXIT_CODE),
            Err(err) => {
                tracing::error!(?err, "failed to listen for interrupt");
                stop.cancel();
            }
        }
    });

    let walker = &walker;
    let out_dir = out_dir.as_path();
    scheduler
        .run(move || async move {
            let books = walker.scrape_books(Some(out_dir)).await;
            tracing::info!(books = books.len(), "scheduled crawl collected books");
        })
        .await;

    Ok(())
}

/// Exit status after a second interrupt (128 + SIGINT).
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Cancels `stop` on the first interrupt and returns on the second.
///
/// A run in progress when the first interrupt arrives is finished before the
/// scheduler stops; the caller exits the process once this returns.
async fn watch_interrupts<F, Fut>(stop: CancellationToken, mut interrupt: F) -> std::io::Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    interrupt().await?;
    tracing::info!("interrupt received; stopping after the current run, interrupt again to exit now");
    stop.cancel();

    interrupt().await?;
    tracing::warn!("second interrupt received; exiting");
    Ok(())
}

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Fires once a day at a fixed local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyTrigger {
    at: NaiveTime,
}

impl DailyTrigger {
    pub fn new(at: NaiveTime) -> Self {
        Self { at }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// The first occurrence strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            return today;
        }
        now.date()
            .checked_add_days(Days::new(1))
            .map(|date| date.and_time(self.at))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// Poll-driven daily scheduler.
///
/// Runs execute inline in the poll loop, so a run never overlaps another; the
/// next due time is taken after a run finishes, which skips any occurrence
/// that passed while it was running.
pub struct Scheduler<C = SystemClock> {
    trigger: DailyTrigger,
    poll_interval: Duration,
    clock: C,
    shutdown: CancellationToken,
}

impl Scheduler<SystemClock> {
    pub fn new(trigger: DailyTrigger, poll_interval: Duration) -> Self {
        Self::with_clock(trigger, poll_interval, SystemClock)
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn with_clock(trigger: DailyTrigger, poll_interval: Duration, clock: C) -> Self {
        Self {
            trigger,
            poll_interval,
            clock,
            shutdown: CancellationToken::new(),
        }
    }

    /// A handle that stops the loop when cancelled, usable from other tasks.
    pub fn stop_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Polls until stopped, awaiting `job` each time the trigger is due.
    /// Returns the number of completed runs.
    ///
    /// Stopping ends the wait between polls; a run already in progress is
    /// finished first.
    pub async fn run<F, Fut>(&self, mut job: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut runs = 0;
        let mut next_due = self.trigger.next_after(self.clock.now());
        tracing::info!(at = %self.trigger.at(), next = %next_due, "scheduler started");

        while !self.shutdown.is_cancelled() {
            if self.clock.now() >= next_due {
                tracing::info!(due = %next_due, "scheduled run starting");
                job().await;
                runs += 1;
                next_due = self.trigger.next_after(self.clock.now());
                tracing::info!(next = %next_due, "scheduled run finished");
            }

            tokio::select! {
                () = self.shutdown.cancelled() => break,
                () = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!(runs, "scheduler stopped");
        runs
    }
}
