use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_stats::analysis::analyze;
use match_stats::config::AppConfig;
use match_stats::lookup::LookupTables;
use match_stats::storage::{open_source, ParquetMatchWriter};

#[derive(Parser)]
#[command(name = "match-stats")]
#[command(about = "Player profiles and character win rates from ranked match records")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./match-stats.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build player profiles and compute rank and win-rate statistics
    Analyze {
        /// Match table (.jsonl or .parquet)
        #[arg(long)]
        input: PathBuf,

        /// Character and rank name tables (TOML)
        #[arg(long)]
        tables: Option<PathBuf>,

        /// Use a single sequential fold instead of the worker pool
        #[arg(long)]
        sequential: bool,

        /// Number of aggregation workers
        #[arg(long)]
        workers: Option<usize>,

        /// Confidence level for win-rate intervals
        #[arg(long)]
        confidence: Option<f64>,

        /// Write the report here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Also write player profiles as JSONL
        #[arg(long)]
        profiles: Option<PathBuf>,
    },

    /// Convert a JSONL match table to Parquet
    Convert {
        /// Source table (.jsonl or .parquet)
        #[arg(long)]
        input: PathBuf,

        /// Destination Parquet file
        #[arg(long)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    // Initialize tracing
    let log_level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }

    tracing::info!("Starting match-stats v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze {
            input,
            tables,
            sequential,
            workers,
            confidence,
            output,
            profiles: profiles_out,
        } => {
            if sequential {
                config.analysis.sequential = true;
            }
            if workers.is_some() {
                config.analysis.workers = workers;
            }
            if let Some(level) = confidence {
                config.analysis.confidence_level = level;
            }
            config.validate()?;

            let Some(tables_path) = tables.or_else(|| config.tables_path.clone()) else {
                bail!("No lookup tables given. Pass --tables or set tables_path in the config.");
            };
            let tables = LookupTables::from_file(&tables_path)
                .with_context(|| format!("Failed to load lookup tables from {:?}", tables_path))?;

            let source = open_source(&input)?;
            let matches = source.read_matches()?;
            tracing::info!("Loaded {} matches from {:?}", matches.len(), input);

            let (profiles, report) = analyze(&matches, &tables, &config.analysis, &config.tiers)?;

            if let Some(path) = profiles_out {
                let mut writer = BufWriter::new(File::create(&path)?);
                for profile in profiles.values() {
                    serde_json::to_writer(&mut writer, profile)?;
                    writeln!(writer)?;
                }
                writer.flush()?;
                tracing::info!("Wrote {} profiles to {:?}", profiles.len(), path);
            }

            match output {
                Some(path) => {
                    let writer = BufWriter::new(File::create(&path)?);
                    serde_json::to_writer_pretty(writer, &report)?;
                    tracing::info!("Wrote report to {:?}", path);
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    serde_json::to_writer_pretty(&mut handle, &report)?;
                    writeln!(handle)?;
                }
            }
        }
        Commands::Convert { input, output } => {
            let source = open_source(&input)?;
            let matches = source.read_matches()?;
            let written = ParquetMatchWriter::new(output.clone()).write_matches(&matches)?;
            println!("Converted {} matches to {}", written, output.display());
        }
    }

    Ok(())
}
