//! `study`: daily spaced-repetition reviews from the terminal.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use study_srs::app::{App, CramOptions, SessionKind};
use study_srs::clock::{Clock, FixedClock, LocalClock, parse_iso_date};
use study_srs::config::load_config_from;
use study_srs::models::ContentType;
use study_srs::queue::CramFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "study", version, about = "Spaced-repetition study queues")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database (overrides config and STUDY_SRS_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Catalog directory (overrides config and STUDY_SRS_CATALOG)
    #[arg(long, global = true)]
    catalog_dir: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD)
    #[arg(long, global = true, value_parser = parse_iso_date)]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what is due today
    Due,

    /// Review due cards and today's new items
    Review {
        /// vocabulary, grammar, listening or mixed
        module: SessionKind,
    },

    /// Drill random items without touching the schedule
    Cram {
        /// Content types to draw from
        #[arg(long, value_delimiter = ',', default_value = "vocabulary,grammar,listening")]
        types: Vec<ContentType>,

        /// all, struggling or mature
        #[arg(long, default_value = "all")]
        filter: CramFilter,

        /// Number of items, or "all"
        #[arg(long, default_value = "20")]
        count: CramCount,

        /// Seed for a reproducible order
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Put a catalog item on the review list
    Add {
        content_type: ContentType,
        content_id: String,
    },

    /// Show a card and its next intervals per rating
    Preview {
        /// Card id, e.g. vocabulary-v001
        card_id: String,
    },

    /// Progress overview
    Stats,

    /// Write all progress to a JSON file
    Export { path: PathBuf },

    /// Replace all progress with a JSON export
    Import { path: PathBuf },

    /// Delete all progress
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug)]
struct CramCount(Option<usize>);

impl FromStr for CramCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CramCount(None));
        }
        s.parse()
            .map(|n| CramCount(Some(n)))
            .map_err(|_| format!("expected a number or \"all\", got {s:?}"))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("study_srs=warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config_from(cli.config.as_deref()).context("failed to load config")?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(dir) = cli.catalog_dir {
        config.catalog_dir = dir;
    }
    let clock: Box<dyn Clock> = match cli.today {
        Some(day) => Box::new(FixedClock(day)),
        None => Box::new(LocalClock),
    };

    let db_path = config.database_path.clone();
    let mut app = App::open(config, clock)
        .with_context(|| format!("failed to open {}", db_path.display()))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Due => app.print_due(&mut out)?,
        Commands::Review { module } => {
            app.run_review(module, &mut input, &mut out)?;
        }
        Commands::Cram { types, filter, count, seed } => {
            let options = CramOptions { types, filter, limit: count.0 };
            match seed {
                Some(seed) => {
                    app.run_cram(&options, &mut ChaCha8Rng::seed_from_u64(seed), &mut input, &mut out)?
                }
                None => app.run_cram(&options, &mut rand::thread_rng(), &mut input, &mut out)?,
            };
        }
        Commands::Add { content_type, content_id } => {
            let card = app.add_to_review_list(content_type, &content_id)?;
            writeln!(out, "{} due {}", card.id, card.due_date)?;
        }
        Commands::Preview { card_id } => app.print_preview(&card_id, &mut out)?,
        Commands::Stats => app.print_stats(&mut out)?,
        Commands::Export { path } => {
            let data = app
                .export(&path)
                .with_context(|| format!("failed to export to {}", path.display()))?;
            writeln!(out, "Exported {} cards to {}", data.review_cards.len(), path.display())?;
        }
        Commands::Import { path } => {
            let data = app
                .import(&path)
                .with_context(|| format!("failed to import {}", path.display()))?;
            writeln!(out, "Imported {} cards from {}", data.review_cards.len(), path.display())?;
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("reset deletes all progress; pass --yes to confirm");
            }
            app.reset()?;
            writeln!(out, "All progress deleted.")?;
        }
    }
    Ok(())
}
