use crate::error::Result;
use crate::schema::quote::QuoteRecord;
use std::future::Future;
use std::time::{Duration, Instant};
use stockdb_client::prelude::*;
use tracing::{debug, error, trace, warn};
use uuid::Uuid;

/// Partition holding every quote document.
pub static PARTITION: &str = "stocks";

/// Default database name.
pub static DATABASE: &str = "stockdb";

/// Durable destination for a batch of quotes.
pub trait Persist {
    /// Store every record of `batch`, returning how many are now stored.
    fn persist(&self, batch: &[QuoteRecord]) -> impl Future<Output = Result<usize>> + Send;
}

/// CouchDB database, written through `_bulk_docs`.
///
/// No connection outlives a call to [`Persist::persist`]: each batch builds its own client,
/// checks the server, creates the database if needed and drops everything on return.
#[derive(Debug, Clone)]
pub struct CouchSink {
    url: String,
    database: String,
    user_agent: String,
    timeout: Duration,
}

impl CouchSink {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            user_agent: concat!("stockdb/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Wrap `record` for insertion under the quotes partition.
///
/// The `_id` is derived from the record's content, so resubmitting a batch after a partial
/// failure hits a conflict for rows that are already stored instead of duplicating them.
pub fn document(record: &QuoteRecord) -> Result<Document<&QuoteRecord>> {
    let bytes = serde_json::to_vec(record).map_err(anyhow::Error::from)?;
    Ok(Document {
        _id: format!("{PARTITION}:{}", Uuid::new_v5(&Uuid::NAMESPACE_OID, &bytes)),
        _rev: String::new(),
        data: record,
    })
}

impl Persist for CouchSink {
    async fn persist(&self, batch: &[QuoteRecord]) -> Result<usize> {
        let time = Instant::now();
        let db = &self.database;

        trace!("opening CouchDB session for {db}");
        let client = build_client(&self.user_agent, self.timeout)?;
        client.ping(&self.url).await?;
        client.ensure_db(&self.url, db).await?;

        let docs = batch.iter().map(document).collect::<Result<Vec<_>>>()?;
        let rows = client.bulk_insert(&self.url, db, &docs).await?;

        let stored = settle(db, &rows);

        debug!(
            "{stored} quotes inserted into {db}. Elapsed time: {} ms",
            time.elapsed().as_millis()
        );
        Ok(stored)
    }
}

/// Count the rows CouchDB now holds.
///
/// A conflict means the document was stored by an earlier attempt. Any other per-document
/// error (`forbidden`, a failed validation) would fail again on every resend, so the row is
/// logged and given up on.
pub fn settle(db: &str, rows: &[BulkResult]) -> usize {
    let mut conflicts = 0;
    let mut rejected = 0;

    for row in rows {
        if row.is_conflict() {
            conflicts += 1;
        } else if let Some(reason) = &row.error {
            rejected += 1;
            error!(
                "{db} rejected {}: {reason}: {}",
                row.id.as_deref().unwrap_or("?"),
                row.reason.as_deref().unwrap_or_default()
            );
        }
    }

    if conflicts > 0 {
        warn!("{conflicts} quotes were already stored in {db}");
    }
    if rejected > 0 {
        error!("dropping {rejected} of {} quotes {db} will not accept", rows.len());
    }
    rows.len() - rejected
}
