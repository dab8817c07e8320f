//! # Conflict Newswire
//!
//! A news-aggregation pipeline for armed-conflict coverage: it searches for
//! articles on a set of topics, extracts article text, scores relevance with
//! a weighted keyword/entity heuristic, deduplicates and geo-tags results,
//! and serves them through a paginated read API.
//!
//! ## Usage
//!
//! ```sh
//! conflict_newswire run -o ./data
//! conflict_newswire serve --listen 0.0.0.0:5001
//! conflict_newswire search -i ./data/cleaned_nlp_news.csv -q "war in ukraine"
//! conflict_newswire schedule -o ./data --at 03:00
//! ```
//!
//! ## Architecture
//!
//! A `run` follows a staged pipeline:
//! 1. **Crawling**: index article URLs per search query plus the dedicated
//!    sources, then fetch and extract each article
//! 2. **Preprocessing**: normalize, score, geo-tag, and deduplicate the batch
//! 3. **Storing**: upsert the cleaned batch into the hosted datastore
//! 4. **Exporting**: CSV checkpoints between stages and a JSON feed file
//!
//! The stages run strictly serially; per-record failures are logged and
//! skipped. Only a crawl that yields nothing at all aborts the run.

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod extract;
mod index;
mod models;
mod nlp;
mod outputs;
mod preprocess;
mod schedule;
mod scrapers;
mod serve;
mod store;

use cli::{Cli, Command, RunArgs, StoreArgs};
use config::PipelineConfig;
use index::InvertedIndex;
use models::RawArticle;
use nlp::LexiconAnalyzer;
use outputs::{checkpoint, ensure_writable_dir, json as feed_json};
use preprocess::country::CountryTable;
use store::{DbArticle, SupabaseStore};

const RAW_CHECKPOINT: &str = "combined_crawled_articles.csv";
const CLEANED_CHECKPOINT: &str = "cleaned_nlp_news.csv";
const FEED_EXPORT: &str = "news_data.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Run(args) => {
            run_once(&args, &config).await?;
        }
        Command::Serve(args) => {
            let store = require_store(&args.store, &config)?;
            serve::serve(store, &args.listen)
                .await
                .map_err(|e| -> Box<dyn Error> { e })?;
        }
        Command::Search(args) => {
            run_search(&args.input, &args.query).await?;
        }
        Command::Schedule(args) => {
            let run_at = schedule::parse_run_at(&args.at)?;
            info!(at = %run_at, "scheduler started; pipeline will run daily");
            loop {
                let wait = schedule::time_until_next(run_at, chrono::Local::now().naive_local());
                info!(wait_secs = wait.as_secs(), "sleeping until next scheduled run");
                tokio::time::sleep(wait).await;
                match run_once(&args.run, &config).await {
                    Ok(()) => info!("scheduled pipeline run completed"),
                    Err(e) => error!(error = %e, "scheduled pipeline run failed"),
                }
            }
        }
    }

    Ok(())
}

/// Build a datastore client or explain what's missing.
fn require_store(args: &StoreArgs, config: &PipelineConfig) -> Result<SupabaseStore, Box<dyn Error>> {
    match (args.supabase_url.as_deref(), args.supabase_key.as_deref()) {
        (Some(url), Some(key)) => Ok(SupabaseStore::new(url, key, &config.table)
            .map_err(|e| -> Box<dyn Error> { e })?),
        _ => Err("datastore not configured: set SUPABASE_URL and SUPABASE_SERVICE_KEY".into()),
    }
}

/// One full crawl -> preprocess -> store pass.
#[instrument(level = "info", skip_all)]
async fn run_once(args: &RunArgs, config: &PipelineConfig) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("pipeline run starting");

    // Early check: the checkpoint directory must be writable.
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // The country table is built once, before any scoring, and shared
    // read-only from here on.
    let country_table = CountryTable::load_or_empty(&config.countries_geojson);
    let analyzer = LexiconAnalyzer::with_gazetteer(country_table.names());

    // ---- Stage 1: crawl ----
    let client = extract::http_client()?;
    let mut batch: Vec<RawArticle> = Vec::new();

    for (i, query) in config.queries.iter().enumerate() {
        info!(query = %query, n = i + 1, of = config.queries.len(), "crawling query");
        match scrapers::google_news::index_articles(&client, query, config.articles_per_query).await
        {
            Ok(urls) => {
                let articles = scrapers::fetch_articles(&client, urls).await;
                info!(query = %query, count = articles.len(), "crawled query");
                batch.extend(articles);
            }
            Err(e) => {
                error!(query = %query, error = %e, "query crawl failed; continuing with the rest");
            }
        }
    }

    match scrapers::aljazeera::index_articles(&client).await {
        Ok(urls) => {
            let articles = scrapers::fetch_articles(&client, urls).await;
            info!(count = articles.len(), "crawled Al Jazeera section");
            batch.extend(articles);
        }
        Err(e) => {
            error!(error = %e, "Al Jazeera crawl failed; continuing with the rest");
        }
    }

    if batch.is_empty() {
        error!("no articles were crawled from any source; aborting pipeline");
        return Err("no articles were crawled from any source".into());
    }

    // Combine and deduplicate across sources before checkpointing; the
    // preprocessing filter re-checks batch-local uniqueness.
    let batch: Vec<RawArticle> = batch
        .into_iter()
        .unique_by(|article| article.url.clone())
        .collect();
    info!(count = batch.len(), "combined crawl batch after URL deduplication");

    let raw_path = format!("{}/{}", args.output_dir, RAW_CHECKPOINT);
    if let Err(e) = checkpoint::write_raw_batch(&raw_path, &batch).await {
        warn!(path = %raw_path, error = %e, "failed to write crawl checkpoint; continuing");
    }

    // ---- Stage 2: preprocess ----
    let (cleaned, counts) = preprocess::preprocess_batch(&batch, &analyzer, &country_table, config);
    info!(
        retained = counts.retained,
        skipped = counts.skipped(),
        "preprocessing stage complete"
    );

    let cleaned_path = format!("{}/{}", args.output_dir, CLEANED_CHECKPOINT);
    checkpoint::write_cleaned_batch(&cleaned_path, &cleaned).await?;

    // ---- Stage 3: store ----
    match (
        args.store.supabase_url.as_deref(),
        args.store.supabase_key.as_deref(),
    ) {
        (Some(url), Some(key)) if !cleaned.is_empty() => {
            let store = SupabaseStore::new(url, key, &config.table)
                .map_err(|e| -> Box<dyn Error> { e })?;
            let records: Vec<DbArticle> = cleaned.iter().map(DbArticle::from).collect();
            match store.upsert(&records).await {
                Ok(count) => info!(count, "datastore upsert complete"),
                Err(e) => warn!(error = %e, "datastore save failed; crawl and preprocess results are kept"),
            }
        }
        (Some(_), Some(_)) => info!("no cleaned articles to store"),
        _ => warn!("datastore not configured; skipping save step"),
    }

    // ---- Stage 4: feed export ----
    let feed_path = format!("{}/{}", args.output_dir, FEED_EXPORT);
    if let Err(e) = feed_json::write_feed(&feed_path, &cleaned).await {
        warn!(path = %feed_path, error = %e, "failed to write feed export");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        crawled = counts.input,
        retained = counts.retained,
        "pipeline run complete"
    );
    Ok(())
}

/// Build an index over a cleaned checkpoint and answer one query.
async fn run_search(input: &str, query: &str) -> Result<(), Box<dyn Error>> {
    let documents = checkpoint::read_cleaned_batch(input).await?;
    let index = InvertedIndex::build(&documents);
    info!(
        documents = documents.len(),
        terms = index.term_count(),
        "index built"
    );

    let results = index.query(query, &documents);
    if results.is_empty() {
        println!("No results found for {query:?}.");
        return Ok(());
    }

    println!("{} result(s) for {query:?}:", results.len());
    for (i, article) in results.iter().enumerate() {
        println!("{}. {}", i + 1, article.title);
        println!("   URL: {}", article.url);
        println!(
            "   Published: {}",
            article.published_date.as_deref().unwrap_or("N/A")
        );
    }
    Ok(())
}
