mod analyze;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tweetpulse-cli")]
#[command(about = "Summarize sentiment of recent posts for a search term")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, classify and summarize posts matching TERM
    Analyze {
        term: String,

        /// Number of search pages to request (defaults to configuration)
        #[arg(long)]
        pages: Option<u32>,

        /// Posts per page, 10 to 100 (defaults to configuration)
        #[arg(long)]
        page_size: Option<u8>,

        /// Print the full report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the loaded configuration with secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = tweetpulse_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            term,
            pages,
            page_size,
            json,
        } => analyze::run_analyze(&config, &term, pages, page_size, json).await?,
        Commands::Config => println!("{config:#?}"),
    }

    Ok(())
}
