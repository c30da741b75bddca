use crate::schema::quote::QuoteRecord;
use crate::scrape::{QuoteSource, ScrapeCycle, Tally};
use crate::sink::Persist;
use crate::store::RecordStore;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

/// Default time between two cycles.
pub const PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scraping,
}

/// What happened to the cycle's records once scraping finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    /// No document store configured.
    Disabled,
    /// Nothing to store.
    Empty,
    /// Stored, and the record store was cleared.
    Stored(usize),
    /// The store failed; records are kept for the next cycle.
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub tally: Tally,
    pub persisted: Persisted,
    /// Records scraped by this cycle alone.
    pub records: Vec<QuoteRecord>,
}

/// Drives scrape cycles on a fixed period, forever.
///
/// The first cycle runs as soon as the scheduler starts. Should a cycle outlast the period,
/// the next one starts right after it; missed ticks are not queued up.
pub struct Scheduler<Q, P> {
    scrape: ScrapeCycle<Q>,
    sink: Option<P>,
    period: Duration,
    state: watch::Sender<SchedulerState>,
}

impl<Q, P> Scheduler<Q, P>
where
    Q: QuoteSource + Send + Sync + 'static,
    P: Persist + Send + Sync + 'static,
{
    /// Without a `sink`, each finished cycle replaces the previous cycle's records.
    ///
    /// `period` must be non-zero.
    pub fn new(scrape: ScrapeCycle<Q>, sink: Option<P>, period: Duration) -> Self {
        let (state, _) = watch::channel(SchedulerState::Idle);
        Self {
            scrape,
            sink,
            period,
            state,
        }
    }

    /// Watch the `Idle`/`Scraping` transitions.
    pub fn state(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run on a dedicated task for the rest of the process.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move { self.run().await })
    }

    pub async fn run(&self) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // first tick completes immediately
            ticker.tick().await;
            self.run_once().await;
        }
    }

    /// Scrape every ticker, then hand the records to the sink.
    ///
    /// The cycle is collected apart from the shared store and published in a single step, so
    /// readers see either the previous records or the new ones. Records are only drained from
    /// the store once the sink has accepted them.
    pub async fn run_once(&self) -> CycleReport {
        self.state.send_replace(SchedulerState::Scraping);
        let store = self.scrape.store();

        let scratch = RecordStore::new();
        let tally = self.scrape.run_into(&scratch).await;
        let records = scratch.drain_and_clear();

        let persisted = match &self.sink {
            None => {
                let stale = store.replace(records.clone());
                debug!("replaced {} records from the previous cycle", stale.len());
                Persisted::Disabled
            }
            Some(sink) => {
                store.extend(records.clone());
                let batch = store.snapshot();
                if batch.is_empty() {
                    Persisted::Empty
                } else {
                    match sink.persist(&batch).await {
                        Ok(stored) => {
                            store.drain_and_clear();
                            Persisted::Stored(stored)
                        }
                        Err(e) => {
                            error!(
                                "failed to store {} quotes, keeping them for the next cycle: {e}",
                                batch.len()
                            );
                            Persisted::Failed
                        }
                    }
                }
            }
        };

        info!(
            "Scraping and data insertion completed: {} of {} tickers scraped, {persisted:?}",
            tally.scraped, tally.attempted
        );
        self.state.send_replace(SchedulerState::Idle);

        CycleReport {
            tally,
            persisted,
            records,
        }
    }
}
