use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{error, warn};

use moodrs::{
    error::ErrorSeverity, init_logging, AppConfig, DateRange, ImportManager, ItemKind, MoodRsError, MoodService,
    Recommendation, RecommendationEngine, SnapshotStore, Statistics,
};

/// moodrs - Mood Analytics & Recommendation CLI
///
/// Summarizes mood history, correlates lifestyle factors with mood and
/// suggests exercises and resources suited to how a user has been feeling.
#[derive(Parser)]
#[command(name = "moodrs")]
#[command(version)]
#[command(about = "Mood analytics and recommendation CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Snapshot file to read mood data from (overrides config)
    #[arg(short, long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mood statistics and factor correlations for a user
    Stats {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// Date range start (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// Date range end (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Recommend exercises or resources for a user
    Recommend {
        /// User ID
        #[arg(short, long)]
        user: String,

        /// exercise or resource
        #[arg(short, long, default_value = "exercise")]
        kind: ItemKind,

        /// Number of recommendations (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Import mood entries into the snapshot
    Import {
        /// Input file path (CSV, JSON)
        #[arg(short, long)]
        file: PathBuf,

        /// User the entries belong to
        #[arg(short, long)]
        user: String,
    },

    /// Show or create the configuration file
    Config {
        /// Print the effective configuration
        #[arg(long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Tabled)]
struct FactorRow {
    #[tabled(rename = "Factor")]
    factor: String,
    #[tabled(rename = "Correlation")]
    correlation: String,
    #[tabled(rename = "Strength")]
    strength: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(AppConfig::default_config_path);
    let config = AppConfig::load_or_default_from(&config_path)?;

    init_logging(&config.logging.clone().with_verbosity(cli.verbose))?;

    let snapshot_path = cli
        .snapshot
        .clone()
        .unwrap_or_else(|| config.data.snapshot_path.clone());

    match cli.command {
        Commands::Stats { user, from, to, json } => {
            let range = DateRange::from_dates(from, to);
            if range.is_inverted() {
                bail!("--from must not be after --to");
            }

            let service = open_service(&snapshot_path, &config)?;
            let range = (from.is_some() || to.is_some()).then_some(range);
            let stats = service
                .statistics(&user, range.as_ref())
                .map_err(report)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print_statistics(&user, &stats);
            }
        }

        Commands::Recommend { user, kind, limit, json } => {
            let service = open_service(&snapshot_path, &config)?;
            let recommendations = service.recommend(&user, kind, limit).map_err(report)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&recommendations)?);
            } else {
                print_recommendations(&user, kind, &recommendations);
            }
        }

        Commands::Import { file, user } => {
            println!("{}", "Importing mood entries...".green().bold());

            let entries = ImportManager::new().import_file(&file).map_err(report)?;
            let count = entries.len();

            let mut store = SnapshotStore::load_or_empty(&snapshot_path).map_err(report)?;
            store.add_entries(&user, entries);
            store.save(&snapshot_path).map_err(report)?;

            println!("  File: {}", file.display());
            println!("  User: {}", user);
            println!("  Snapshot: {}", snapshot_path.display());
            println!("{}", format!("✓ Imported {} entries", count).green());
        }

        Commands::Config { show, init } => {
            if init {
                if config_path.exists() {
                    bail!("Config file already exists: {}", config_path.display());
                }
                let mut fresh = AppConfig::default();
                fresh.save_to_file(&config_path)?;
                println!(
                    "{}",
                    format!("✓ Wrote default configuration to {}", config_path.display()).green()
                );
            }

            if show || !init {
                println!("{}", format!("# {}", config_path.display()).dimmed());
                println!(
                    "{}",
                    toml::to_string_pretty(&config).context("Failed to render configuration")?
                );
            }
        }
    }

    Ok(())
}

fn parse_date(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got '{}'", value))
}

fn open_service(snapshot_path: &Path, config: &AppConfig) -> Result<MoodService<SnapshotStore>> {
    let store = SnapshotStore::load(snapshot_path).map_err(report)?;
    Ok(MoodService::new(
        store,
        RecommendationEngine::with_config(config.engine.clone()),
    ))
}

/// Log a library error at its severity and turn it into a user-facing message
fn report(err: MoodRsError) -> anyhow::Error {
    match err.severity() {
        ErrorSeverity::Warning => warn!(error = %err, "Command failed"),
        ErrorSeverity::Error => error!(error = %err, "Command failed"),
    }
    anyhow::anyhow!(err.user_message())
}

fn correlation_strength(r: f64) -> ColoredString {
    let label = match r.abs() {
        a if a >= 0.7 => "strong",
        a if a >= 0.4 => "moderate",
        a if a >= 0.2 => "weak",
        _ => "negligible",
    };

    if r >= 0.4 {
        label.green()
    } else if r <= -0.4 {
        label.red()
    } else {
        label.normal()
    }
}

fn print_statistics(user: &str, stats: &Statistics) {
    println!("{}", format!("Mood statistics for {}", user).cyan().bold());

    if stats.mood_trend.is_empty() {
        println!("{}", "  No mood entries in this period".yellow());
        return;
    }

    println!("  Entries: {}", stats.mood_trend.len());
    println!("  Average mood: {:.2}", stats.average_mood);
    println!(
        "  Trend: {}",
        stats
            .mood_trend
            .iter()
            .map(|m| format!("{}", m))
            .collect::<Vec<_>>()
            .join(" → ")
    );

    if stats.factor_correlations.is_empty() {
        println!("{}", "  Not enough factor ratings for correlations".dimmed());
        return;
    }

    let rows: Vec<FactorRow> = stats
        .factor_correlations
        .iter()
        .map(|c| FactorRow {
            factor: c.factor.to_string(),
            correlation: format!("{:+.3}", c.correlation),
            strength: correlation_strength(c.correlation).to_string(),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}

fn print_recommendations(user: &str, kind: ItemKind, recommendations: &[Recommendation]) {
    println!(
        "{}",
        format!("Recommended {}s for {}", kind, user).magenta().bold()
    );

    if recommendations.is_empty() {
        println!("{}", format!("  No {}s available", kind).yellow());
        return;
    }

    let rows: Vec<RecommendationRow> = recommendations
        .iter()
        .enumerate()
        .map(|(i, r)| RecommendationRow {
            rank: i + 1,
            title: r.item.title.clone(),
            score: format!("{:.2}", r.score),
            tags: r.item.tags.join(", "),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
}
