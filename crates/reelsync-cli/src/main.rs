use catalog_sync_models::{Genre, ParentalGuidance};
use clap::{ArgAction, Parser, Subcommand};
use commands::{catalog, config, daemon, sync, AppContext};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelsync")]
#[command(about = "reelsync - Keep a local movie catalog in sync with a remote feed")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the feed once and merge it into the catalog
    #[command(long_about = "Run a single sync cycle: fetch the configured feed, parse it, merge every valid movie into the local catalog and print a report. Invalid feed entries are skipped and listed in the report.")]
    Sync,
    /// Show the catalog
    List,
    /// Add a movie, or update the one with the same title and release date
    #[command(long_about = "Add a movie to the catalog. A movie with the same title and release date is replaced. Note that the next sync overwrites entries that also exist in the feed.")]
    Add {
        #[arg(long)]
        title: String,

        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        release: String,

        #[arg(long)]
        budget: String,

        /// Duration in minutes
        #[arg(long)]
        duration: u32,

        /// Absolute poster URL
        #[arg(long)]
        poster: String,

        #[arg(long, default_value_t = Genre::default())]
        genre: Genre,

        #[arg(long)]
        guidance: Option<ParentalGuidance>,

        /// Rating between 0 and 10
        #[arg(long, default_value_t = 0.0)]
        rating: f32,

        #[arg(long, action = ArgAction::SetTrue)]
        watched: bool,
    },
    /// Remove a movie by title and release date
    Delete {
        #[arg(long)]
        title: String,

        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        release: String,
    },
    /// Sync periodically until interrupted
    #[command(long_about = "Run in the foreground and sync on a fixed interval until Ctrl-C. The daemon performs an initial sync on startup unless --no-startup-sync is given or disabled in the configuration. Logs go to the configured log file with daily rotation.")]
    Daemon {
        /// Seconds between syncs (overrides scheduler.refresh_interval_secs)
        #[arg(long, value_name = "SECONDS")]
        interval_secs: Option<u64>,

        /// Skip initial sync on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_sync: bool,
    },
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        /// Feed URL to store instead of the default
        #[arg(long)]
        feed_url: Option<String>,

        /// Overwrite an existing config file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
    /// Change the feed URL
    SetFeed {
        url: String,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let ctx = AppContext::load(cli.config.clone())?;

    let log_file = match &cli.command {
        Commands::Daemon { .. } => Some(ctx.daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, &ctx.config.logging, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Sync => sync::run_sync(&ctx, &output).await,
        Commands::List => catalog::run_list(&ctx, &output).await,
        Commands::Add {
            title,
            release,
            budget,
            duration,
            poster,
            genre,
            guidance,
            rating,
            watched,
        } => {
            let draft = catalog_sync_models::MovieDraft {
                title,
                budget,
                duration_minutes: duration,
                release,
                poster,
                genre,
                guidance,
                rating,
                watched,
            };
            catalog::run_add(&ctx, draft, &output).await
        }
        Commands::Delete { title, release } => catalog::run_delete(&ctx, title, release, &output).await,
        Commands::Daemon {
            interval_secs,
            no_startup_sync,
        } => daemon::run_daemon(&ctx, interval_secs, no_startup_sync, &output).await,
        Commands::Config { cmd } => config::run_config(ctx, cmd, &output),
    }
}
