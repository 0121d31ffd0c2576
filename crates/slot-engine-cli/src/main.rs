//! `slots` CLI — query availability and book events against a JSON events file.
//!
//! ## Usage
//!
//! ```sh
//! # Bookable slots on one day
//! slots day --events events.json --date 2014-08-10
//!
//! # Seven days of availability starting at a date
//! slots availability --events events.json --from 2014-08-10
//!
//! # Check whether an appointment could be booked (exit code 1 if not)
//! slots validate --events events.json --kind appointment \
//!   --starts-at "2014-08-11 09:30" --ends-at "2014-08-11 10:00"
//!
//! # Validate and append to the events file
//! slots book --events events.json --kind opening --weekly \
//!   --starts-at "2014-08-04 09:30" --ends-at "2014-08-04 12:30"
//!
//! # Render in another timezone (also: SLOT_ENGINE_TZ, or "timezone" in --config)
//! slots --timezone Europe/Paris availability --events events.json --from 2014-08-10
//! ```
//!
//! Events files are JSON arrays of
//! `{"kind": "opening"|"appointment", "starts_at": ..., "ends_at": ..., "weekly_recurring": bool}`.
//! Timestamps without an offset are wall-clock times in the configured timezone.
//! Logs go to stderr, filtered by `RUST_LOG` (default `warn`).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use slot_engine::config::parse_timezone;
use slot_engine::{
    parse_timestamp, EngineConfig, EventDraft, EventRecord, EventStore, MemoryStore, Scheduler,
};
use tempfile::NamedTempFile;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slots",
    version,
    about = "Appointment slot availability and booking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON config file (timezone, slot_minutes, horizon_days)
    #[arg(long, global = true)]
    config: Option<String>,

    /// IANA timezone for dates and slot labels (overrides config and SLOT_ENGINE_TZ)
    #[arg(long, global = true)]
    timezone: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the bookable slots of one day as a JSON array
    Day {
        /// Events file
        #[arg(short, long)]
        events: String,
        /// Date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
    },
    /// Print availability for the configured horizon (7 days by default)
    Availability {
        /// Events file
        #[arg(short, long)]
        events: String,
        /// First date (YYYY-MM-DD)
        #[arg(short, long)]
        from: String,
    },
    /// Validate a candidate event without writing it
    Validate(CandidateArgs),
    /// Validate a candidate event and append it to the events file
    Book(CandidateArgs),
}

#[derive(Args)]
struct CandidateArgs {
    /// Events file
    #[arg(short, long)]
    events: String,
    /// Event kind: "opening" or "appointment"
    #[arg(long)]
    kind: Option<String>,
    /// Start timestamp (RFC 3339, or local "YYYY-MM-DD HH:MM")
    #[arg(long)]
    starts_at: Option<String>,
    /// End timestamp (RFC 3339, or local "YYYY-MM-DD HH:MM")
    #[arg(long)]
    ends_at: Option<String>,
    /// Repeat every week on the same weekday
    #[arg(long)]
    weekly: bool,
}

/// Output of `validate` and `book`.
#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<String>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.timezone.as_deref())?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Day { events, date } => {
            let scheduler = load_scheduler(&events, config)?;
            let date = parse_date(&date)?;
            let slots = scheduler
                .available_slots(date)
                .context("Failed to compute available slots")?;
            println!("{}", serde_json::to_string(&slots)?);
        }
        Commands::Availability { events, from } => {
            let scheduler = load_scheduler(&events, config)?;
            let from = parse_date(&from)?;
            let week = scheduler
                .availabilities(from)
                .context("Failed to compute availabilities")?;
            println!("{}", serde_json::to_string_pretty(&week)?);
        }
        Commands::Validate(args) => {
            let scheduler = load_scheduler(&args.events, config)?;
            let draft = build_draft(&args, &config)?;
            let report = scheduler
                .validate(&draft)
                .context("Failed to validate event")?;
            let valid = report.is_valid();
            print_report(valid, report.messages())?;
            if !valid {
                process::exit(1);
            }
        }
        Commands::Book(args) => {
            // Held until the end of this arm: load, validate and write happen
            // under one lock so concurrent `book` runs cannot lose updates.
            let _lock = lock_events(&args.events)?;
            let scheduler = load_scheduler(&args.events, config)?;
            let draft = build_draft(&args, &config)?;
            match scheduler
                .create_event(&draft)
                .context("Failed to create event")?
            {
                Ok(_) => {
                    let store = scheduler.into_store()?;
                    save_events(&args.events, &store, &config)?;
                    print_report(true, Vec::new())?;
                }
                Err(report) => {
                    print_report(false, report.messages())?;
                    process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or defaults), then `SLOT_ENGINE_TZ`, then `--timezone`.
fn load_config(path: Option<&str>, timezone: Option<&str>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config: {}", path))?,
        None => EngineConfig::default(),
    };
    let mut config = config
        .with_env_overrides()
        .context("Invalid SLOT_ENGINE_TZ")?;

    if let Some(name) = timezone {
        config.timezone = parse_timezone(name)?;
    }
    Ok(config)
}

/// Load every record of an events file into a scheduler. A missing file is an
/// empty calendar.
fn load_scheduler(path: &str, config: EngineConfig) -> Result<Scheduler<MemoryStore>> {
    let mut store = MemoryStore::new();

    if Path::new(path).exists() {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path))?;
        let records: Vec<EventRecord> = serde_json::from_str(&json)
            .with_context(|| format!("Invalid events file: {}", path))?;

        for (index, record) in records.iter().enumerate() {
            let draft = record
                .to_draft(config.timezone)
                .with_context(|| format!("Invalid event #{} in {}", index, path))?;
            store
                .insert(&draft)
                .with_context(|| format!("Failed to load event #{} from {}", index, path))?;
        }
        debug!(path, events = store.len(), "loaded events");
    }

    Ok(Scheduler::new(store, config))
}

fn save_events(path: &str, store: &MemoryStore, config: &EngineConfig) -> Result<()> {
    let records: Vec<EventRecord> = store
        .events()
        .iter()
        .map(|event| EventRecord::from_event(event, config.timezone))
        .collect();
    let json = serde_json::to_string_pretty(&records)?;

    // Readers see either the old file or the new one, never a partial write.
    let target = Path::new(path);
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file next to {}", path))?;
    tmp.write_all(json.as_bytes())
        .with_context(|| format!("Failed to write file: {}", path))?;
    tmp.persist(target)
        .with_context(|| format!("Failed to replace file: {}", path))?;
    Ok(())
}

/// Exclusive advisory lock on `<events>.lock`, released when the returned
/// file is dropped or the process exits.
fn lock_events(path: &str) -> Result<File> {
    let lock_path = format!("{}.lock", path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file: {}", lock_path))?;
    file.lock()
        .with_context(|| format!("Failed to lock {}", lock_path))?;
    debug!(lock = %lock_path, "acquired events lock");
    Ok(file)
}

/// Candidate draft from CLI arguments. Missing fields stay missing so that
/// validation reports them.
fn build_draft(args: &CandidateArgs, config: &EngineConfig) -> Result<EventDraft> {
    let timestamp = |value: Option<&str>, flag: &str| -> Result<_> {
        value
            .map(|s| parse_timestamp(s, config.timezone))
            .transpose()
            .with_context(|| format!("Invalid --{}", flag))
    };

    Ok(EventDraft {
        kind: args.kind.clone(),
        starts_at: timestamp(args.starts_at.as_deref(), "starts-at")?,
        ends_at: timestamp(args.ends_at.as_deref(), "ends-at")?,
        weekly_recurring: args.weekly,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

fn print_report(valid: bool, errors: Vec<String>) -> Result<()> {
    let report = ValidationReport { valid, errors };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
