//! tweetnet CLI: fetch tweets, analyze the mention network, verify the store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use tweetnet::commands::{self, ImageOutcome};
use tweetnet::config::Config;
use tweetnet::search::{SearchClient, ThreadSleeper, UreqTransport};
use tweetnet::store::TweetStore;

#[derive(Parser)]
#[command(name = "tweetnet", version, about = "Tweet ingestion and mention network analysis")]
struct Cli {
    /// Optional TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recent tweets matching a query and upsert them into the store.
    Fetch {
        /// Search query.
        #[arg(long, default_value = "GenAI")]
        query: String,

        /// Max tweets to fetch (the API allows 10..=100 per request).
        #[arg(long, default_value = "100")]
        max: u32,
    },

    /// Build the @mention graph from stored tweets and print top users.
    Analyze {
        /// How many top users to show.
        #[arg(long, default_value = "10")]
        top: usize,

        /// Path to save the graph (.graphml, or .dot/.gv for Graphviz).
        #[arg(long)]
        save: Option<PathBuf>,

        /// Path to save an SVG image of the graph (only with --save).
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Print the number of stored tweets.
    Verify,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let settings = &config.settings;

    match cli.command {
        Commands::Fetch { query, max } => {
            // Both are required before anything touches the network or disk.
            let token = config.credentials.search_token()?;
            let store_location = config.credentials.store_location()?;

            let client = SearchClient::new(
                UreqTransport::new(settings.request_timeout()),
                ThreadSleeper,
                &settings.search_base_url,
                token,
            )
            .with_backoff(settings.backoff_initial(), settings.backoff_max());

            let outcome =
                commands::fetch(&client, store_location, &settings.table, &query, max)?;
            if outcome.fetched > 0 {
                println!("Fetched {} tweets ({})", outcome.fetched, outcome.stats);
            } else {
                println!("No tweets to store.");
            }
        }

        Commands::Analyze { top, save, image } => {
            let store_location = config.credentials.store_location()?;
            let store = TweetStore::open_location(store_location, &settings.table)?;
            let analysis = commands::analyze(&store, top)?;
            print!("{}", analysis.report);

            if analysis.report.is_empty() {
                return Ok(());
            }

            if let Some(path) = save {
                let saved = commands::save(&analysis.graph, &path, image.as_deref())?;
                println!("Saved graph to {} ({})", saved.path.display(), saved.format);
                match saved.image {
                    ImageOutcome::NotRequested => {}
                    ImageOutcome::Rendered(image_path) => {
                        println!("Saved graph image to {}", image_path.display());
                    }
                    ImageOutcome::Failed(e) => {
                        tracing::warn!(error = %e, "graph image not written");
                    }
                }
            } else if image.is_some() {
                tracing::warn!("--image is only used together with --save");
            }
        }

        Commands::Verify => {
            let store_location = config.credentials.store_location()?;
            let store = TweetStore::open_location(store_location, &settings.table)?;
            let count = commands::verify(&store)?;
            println!("{} count: {count}", store.table_name());
        }
    }

    Ok(())
}
