//! Command-line interface definitions.
//!
//! Each subcommand is one entry point of the system: a single pipeline run,
//! the read API server, a one-shot index search over a cleaned checkpoint,
//! and the daily scheduler. Datastore credentials can come from flags or
//! from the environment.

use clap::{Args, Parser, Subcommand};

/// Command-line arguments for the conflict newswire.
///
/// # Examples
///
/// ```sh
/// # One full crawl -> preprocess -> store run
/// conflict_newswire run -o ./data
///
/// # Serve the read API
/// conflict_newswire serve --listen 0.0.0.0:5001
///
/// # Query a cleaned checkpoint
/// conflict_newswire search -i ./data/cleaned_nlp_news.csv -q "war in ukraine"
///
/// # Run the pipeline every day at 03:00 local
/// conflict_newswire schedule -o ./data --at 03:00
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a pipeline config YAML file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl, preprocess, and store one batch
    Run(RunArgs),
    /// Serve the read API over the datastore
    Serve(ServeArgs),
    /// Query a cleaned checkpoint with the inverted index
    Search(SearchArgs),
    /// Run the pipeline once a day at a fixed local time
    Schedule(ScheduleArgs),
}

/// Datastore connection settings, shared by the pipeline and the server.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Datastore project URL
    #[arg(long, env = "SUPABASE_URL")]
    pub supabase_url: Option<String>,

    /// Datastore service-role key
    #[arg(long, env = "SUPABASE_SERVICE_KEY")]
    pub supabase_key: Option<String>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output directory for checkpoints and the feed export
    #[arg(short, long, default_value = "./data")]
    pub output_dir: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen address for the read API
    #[arg(long, default_value = "0.0.0.0:5001")]
    pub listen: String,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Path to a cleaned checkpoint CSV
    #[arg(short, long)]
    pub input: String,

    /// Query text (OR-term search)
    #[arg(short, long)]
    pub query: String,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Local time of day to run at, HH:MM
    #[arg(long, default_value = crate::schedule::DEFAULT_RUN_AT)]
    pub at: String,
}
