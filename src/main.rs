//! Entry point for the `codemetal-airquality` snapshot generator.
//!
//! This binary runs one full generation pass:
//! - Loading configuration from environment variables or `.env`
//! - Initializing structured logging/tracing
//! - Establishing a PostgreSQL connection pool
//! - Generating sensors, readings and hourly aggregates in memory
//! - Replacing the `air_quality` / `air_quality_hourly` tables atomically
//! - Optionally writing the raw readings as a CSV time series
//! - Reading the hourly table back and logging a summary of the snapshot
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – PostgreSQL connection string
//! - `DB_POOL_MAX` (optional) – maximum number of DB connections (default: 5)
//! - `SENSOR_COUNT`, `HORIZON_DAYS`, `INTERVAL_MINUTES`, `RNG_SEED`,
//!   `ZONE_TABLE_FILE` (optional) – generation parameters, see `config`
//! - `CSV_EXPORT_PATH` (optional) – CSV file for the raw readings
//! - `AQ_LOG_LEVEL` (optional) – log verbosity (default: `debug`)
//! - `AQ_SPAN_EVENTS` (optional) – span event mode for tracing
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::Utc;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use airquality::summary::{self, HourlyFilter};
use airquality::{config, export, pipeline, store};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to connect to database");

    let pool = PgPoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .connect(&cfg.db_url)
        .await
        .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

    tracing::info!("Successfully connected to database");

    // Generation is CPU-bound; keep it off the async workers.
    let generator = cfg.generator.clone();
    let seed = cfg.rng_seed;
    let snapshot = tokio::task::spawn_blocking(move || {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        pipeline::generate(&generator, Utc::now(), &mut rng)
    })
    .await
    .map_err(|e| anyhow!("Generation task failed: {}", e))??;

    store::write_snapshot(&pool, &snapshot.readings, &snapshot.hourly).await?;

    if let Some(path) = cfg.csv_export_path.as_deref().map(PathBuf::from) {
        let readings = snapshot.readings;
        tokio::task::spawn_blocking(move || export::export_timeseries(&path, &readings))
            .await
            .map_err(|e| anyhow!("CSV export task failed: {}", e))??;
    }

    let stored = store::load_hourly(&pool, &HourlyFilter::default()).await?;
    if stored.len() != snapshot.hourly.len() {
        return Err(anyhow!(
            "Hourly table has {} rows after commit, expected {}",
            stored.len(),
            snapshot.hourly.len()
        ));
    }

    let report = summary::summarize(&stored, &HourlyFilter::default());
    tracing::info!("Snapshot summary: {}", serde_json::to_string(&report)?);

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// This function configures the [`tracing_subscriber`] with:
/// - Log target, file, and line number output enabled
/// - Color output controlled by TTY detection and `FORCE_COLOR` env var:
///   - `FORCE_COLOR=1|true|yes`: force colors on
///   - `FORCE_COLOR=0|false|no`: force colors off
///   - unset or other values: auto-detect TTY
/// - Span event emission mode controlled by the `AQ_SPAN_EVENTS` env var:
///   - `"full"`       : emit ENTER, EXIT, and CLOSE events with timing
///   - `"enter_exit"` : emit ENTER and EXIT only
///   - unset or other values: emit CLOSE events only (default)
/// - Log level controlled by the `AQ_LOG_LEVEL` env var
///
/// This should be called once at startup before any logging or tracing
/// macros are invoked. It installs the subscriber globally for the lifetime
/// of the process.
fn init_tracing() {
    // ---
    let span_events = match env::var("AQ_SPAN_EVENTS").as_deref() {
        Ok("full") => FmtSpan::FULL,
        Ok("enter_exit") => FmtSpan::ENTER | FmtSpan::EXIT,
        _ => FmtSpan::CLOSE,
    };

    // Determine if we should use colors
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stdout().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to AQ_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("AQ_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "debug",
        };
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(span_events)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .compact()
        .init();
}
