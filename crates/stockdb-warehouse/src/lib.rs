pub mod error;
pub mod scheduler;
pub mod schema;
pub mod scrape;
pub mod sink;
pub mod store;

pub use error::{Result, ScrapeError};
pub use scheduler::{CycleReport, Persisted, Scheduler, SchedulerState};
pub use schema::quote::QuoteRecord;
pub use scrape::{QuoteSource, ScrapeCycle, Tally, QUOTE_URL, TICKERS};
pub use sink::{CouchSink, Persist};
pub use store::RecordStore;
