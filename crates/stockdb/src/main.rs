use anyhow::{anyhow, bail, Result};
use clap::Parser;
use cli::Cli;
use dotenv::dotenv;
use stockdb_client::prelude::build_client;
use stockdb_warehouse::{CouchSink, Persisted, QuoteRecord, RecordStore, Scheduler, ScrapeCycle};
use tracing::{info, trace, Level};

mod cli;

fn preprocess(trace_level: Level) -> Result<()> {
    // `log` records from actix-web are forwarded into the same subscriber
    tracing_subscriber::fmt()
        .with_max_level(trace_level)
        .try_init()
        .map_err(|e| anyhow!(e))
}

/// The `--once` output: the cycle's quotes, shaped like `GET /stocks`.
fn quotes_json(records: &[QuoteRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

#[actix_web::main]
async fn main() -> Result<()> {
    // .env first, so the cli can fall back on it
    dotenv().ok();
    let cli = Cli::parse();
    preprocess(cli.trace.into())?;
    trace!("Command line input recorded: {cli:#?}");

    let settings = cli.settings()?;
    let store = RecordStore::new();

    let http_client = build_client(&settings.user_agent, settings.timeout)?;
    let scrape = ScrapeCycle::new(http_client, store.clone(), settings.tickers.clone())
        .with_url_template(settings.quote_url.clone())
        .with_concurrency(settings.concurrency);

    let sink = match &settings.couchdb_url {
        Some(url) => {
            info!("persisting quotes to CouchDB database {}", settings.database);
            Some(
                CouchSink::new(url.clone(), settings.database.clone())
                    .with_user_agent(settings.user_agent.clone())
                    .with_timeout(settings.timeout),
            )
        }
        None => {
            info!("COUCHDB_URL not set; quotes will only be kept in memory");
            None
        }
    };

    let scheduler = Scheduler::new(scrape, sink, settings.interval);

    // "> stockdb --once"
    // single cycle, e.g. from cron; the quotes go to stdout as JSON
    if cli.once {
        let report = scheduler.run_once().await;
        println!("{}", quotes_json(&report.records)?);
        if report.persisted == Persisted::Failed {
            bail!("scraped {} quotes but could not store them", report.tally.scraped);
        }
        return Ok(());
    }

    info!(
        "scraping {} tickers every {} hours",
        settings.tickers.len(),
        scheduler.period().as_secs() / 3600
    );
    let _scheduler = scheduler.spawn();

    stockdb_web::serve(store, &settings.host, settings.port).await?;
    Ok(())
}
