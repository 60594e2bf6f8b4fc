//! Claims Ingest - bulk loader for claims and claim details

use anyhow::{Context, Result};
use claims_common::db::{self, DatabaseConfig};
use claims_common::logging::{init_logging, LogConfig, LogLevel};
use claims_ingest::{export_claims, load_file, FileFormat, LoadMode, LoadOptions};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "claims-ingest")]
#[command(author, version, about = "Load claims and claim details from CSV or JSON files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Database connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load claims or claim details from a file
    Load {
        /// Path to the CSV or JSON file
        file_path: PathBuf,

        /// File format (inferred from the extension if omitted)
        #[arg(long, value_enum)]
        format: Option<FileFormat>,

        /// How to treat existing data
        #[arg(long, value_enum, default_value_t = LoadMode::Append)]
        mode: LoadMode,

        /// Update existing records in append mode instead of skipping them
        #[arg(long)]
        update_existing: bool,

        /// Hide the progress indicator
        #[arg(long)]
        no_progress: bool,
    },

    /// Export stored claims to a file the load command accepts
    Export {
        /// Output path (.json or .csv)
        output: PathBuf,

        /// File format (inferred from the extension if omitted)
        #[arg(long, value_enum)]
        format: Option<FileFormat>,

        /// Include claim details
        #[arg(long)]
        with_details: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = init_logging(&log_config(cli.verbose)) {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Logging for a run; environment variables take precedence over the flag.
///
/// A malformed `LOG_*` variable leaves the flag-derived settings in place.
fn log_config(verbose: bool) -> LogConfig {
    let level = if verbose { LogLevel::Debug } else { LogLevel::Warn };
    let built = LogConfig::builder()
        .level(level)
        .log_file_prefix("claims-ingest")
        .build();

    built.clone().merge_env().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring logging environment: {}", e);
        built
    })
}

async fn run(cli: Cli) -> Result<()> {
    let mut db_config = DatabaseConfig::from_env();
    if let Some(url) = cli.database_url {
        db_config.url = url;
    }

    let pool = db::connect(&db_config)
        .await
        .context("Failed to connect to database")?;
    db::migrate(&pool).await.context("Failed to apply migrations")?;

    match cli.command {
        Command::Load {
            file_path,
            format,
            mode,
            update_existing,
            no_progress,
        } => {
            let mut options = LoadOptions::new(file_path)
                .mode(mode)
                .update_existing(update_existing)
                .show_progress(!no_progress);
            if let Some(format) = format {
                options = options.format(format);
            }

            info!(path = %options.path.display(), %mode, "Loading data");
            let summary = load_file(&pool, &options).await?;

            if summary.total_errors() > 0 {
                warn!(
                    claim_errors = summary.claims.errors,
                    detail_errors = summary.details.errors,
                    "Some records could not be processed; see the log above"
                );
            }

            println!("{}", summary.to_table());
            println!("Data loaded successfully!");
        }
        Command::Export {
            output,
            format,
            with_details,
        } => {
            let summary = export_claims(&pool, &output, format, with_details).await?;
            for file in &summary.files {
                println!("Wrote {}", file.display());
            }
            println!(
                "Exported {} claims and {} details",
                summary.claims, summary.details
            );
        }
    }

    pool.close().await;
    Ok(())
}
