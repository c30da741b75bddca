use crate::error::{Result, ScrapeError};
use crate::schema::quote::QuoteRecord;
use crate::store::RecordStore;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::{debug, error, info, trace, warn};

//////////////////////////////////////////////////////////////////////////////////////////////////
//
// Quote pages from Yahoo Finance, per ticker
//
//////////////////////////////////////////////////////////////////////////////////////////////////

/// Dow components scraped when no ticker list is configured.
pub static TICKERS: [&str; 19] = [
    "MSFT", "IBM", "GE", "UNP", "COST", "MCD", "V", "WMT", "DIS", "MMM", "INTC", "AXP", "AAPL",
    "BA", "CSCO", "GS", "JPM", "CRM", "VZ",
];

/// Quote page URL; `{ticker}` is replaced by the symbol.
pub static QUOTE_URL: &str = "https://finance.yahoo.com/quote/{ticker}/";

const HEADER: &str = "div#quote-header-info";
const COMPANY: &str = "h1";
const PRICE: &str = "fin-streamer[data-field='regularMarketPrice']";
const CHANGE: &str = "fin-streamer[data-field='regularMarketChangePercent']";

static HEADER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(HEADER));
static COMPANY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(COMPANY));
static PRICE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(PRICE));
static CHANGE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| selector(CHANGE));

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector `{css}`: {e:?}"))
}

/// Anything that can hand back the body of a quote page.
pub trait QuoteSource {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

impl QuoteSource for Client {
    /// GET `url`, treating any non-2xx status as a failure.
    async fn fetch(&self, url: &str) -> Result<String> {
        let fetch_error = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.get(url).send().await.map_err(fetch_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(fetch_error)
    }
}

/// Pull company, price & change out of a quote page.
///
/// Only the first quote header is read. Sub-elements that are missing leave their field
/// empty; a missing header is a [`ScrapeError::Mismatch`].
pub fn extract(page: &str) -> Result<QuoteRecord> {
    let document = Html::parse_document(page);
    let header = document
        .select(&HEADER_SELECTOR)
        .next()
        .ok_or(ScrapeError::Mismatch { selector: HEADER })?;

    Ok(QuoteRecord::new(
        child_text(header, &COMPANY_SELECTOR),
        child_text(header, &PRICE_SELECTOR),
        child_text(header, &CHANGE_SELECTOR),
    ))
}

// Text of every match, concatenated and trimmed.
fn child_text(element: ElementRef<'_>, selector: &Selector) -> String {
    element
        .select(selector)
        .flat_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Counts of one pass over the ticker list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempted: usize,
    pub scraped: usize,
    pub failed: usize,
}

/// One pass over the ticker list, appending a record per parsed page.
pub struct ScrapeCycle<Q> {
    source: Q,
    store: RecordStore,
    tickers: Vec<String>,
    url_template: String,
    concurrency: usize,
}

impl<Q: QuoteSource + Sync> ScrapeCycle<Q> {
    pub fn new(source: Q, store: RecordStore, tickers: Vec<String>) -> Self {
        Self {
            source,
            store,
            tickers,
            url_template: QUOTE_URL.to_string(),
            concurrency: 1,
        }
    }

    /// Replace the quote page template; it must contain `{ticker}`.
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Number of pages requested at once. Values below one are treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn url(&self, ticker: &str) -> String {
        self.url_template.replace("{ticker}", ticker)
    }

    /// Visit every ticker once, appending to the cycle's store.
    ///
    /// Pages may be in flight concurrently, but results are appended in ticker order.
    /// Failures are logged and skipped.
    pub async fn run(&self) -> Tally {
        self.run_into(&self.store).await
    }

    /// Same as [`ScrapeCycle::run`], appending to `store` instead.
    pub async fn run_into(&self, store: &RecordStore) -> Tally {
        let time = Instant::now();
        let mut tally = Tally::default();

        let mut pages = stream::iter(self.tickers.clone())
            .map(|ticker| async move {
                let outcome = self.scrape(&ticker).await;
                (ticker, outcome)
            })
            .buffered(self.concurrency);

        while let Some((ticker, outcome)) = pages.next().await {
            tally.attempted += 1;
            match outcome {
                Ok(record) => {
                    trace!("[{ticker}] {} {} {}", record.company, record.price, record.change);
                    store.append(record);
                    tally.scraped += 1;
                }
                Err(e @ ScrapeError::Mismatch { .. }) => {
                    warn!("[{ticker}] page did not match: {e}");
                    tally.failed += 1;
                }
                Err(e) => {
                    error!("[{ticker}] something went wrong: {e}");
                    tally.failed += 1;
                }
            }
        }

        debug!(
            "scraped {} of {} tickers. Elapsed time: {} ms",
            tally.scraped,
            tally.attempted,
            time.elapsed().as_millis()
        );
        tally
    }

    async fn scrape(&self, ticker: &str) -> Result<QuoteRecord> {
        let url = self.url(ticker);
        info!("Visiting: {url}");
        let page = self.source.fetch(&url).await?;
        extract(&page)
    }
}
