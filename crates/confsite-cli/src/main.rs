//! confsite - loads the conference site's data and prints what the site
//! would render.
//!
//! Reads credentials from the environment (or a `.env` file), fetches every
//! collection and page once, then either prints a summary, dumps one derived
//! view as JSON, or runs the event countdown.

use std::io;
use std::time::Duration;

use anyhow::{bail, Result};
use confsite_core::utils::format_age;
use confsite_core::{Config, ConferenceStore};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Views that `--dump` can print
const DUMP_VIEWS: [&str; 6] = ["premier", "sponsors", "supporters", "directory", "schedule", "pages"];

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: confsite [--dump <view> | --countdown <YYYY-M-D H:mm>]");
    eprintln!();
    eprintln!("  (no flags)          load all data and print a summary");
    eprintln!("  --dump <view>       print a view as JSON: {}", DUMP_VIEWS.join(", "));
    eprintln!("  --countdown <time>  print the countdown every second until Ctrl+C");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.first().map(String::as_str) == Some("--help") {
        print_usage();
        return Ok(());
    }

    let config = Config::load()?;
    let store = ConferenceStore::from_config(config)?;

    info!("Loading conference data");
    if let Err(e) = store.init().await {
        // Partial data is still usable
        warn!(error = %e, "Some data failed to load");
        eprintln!("Warning: {}", e);
    }

    match args.first().map(String::as_str) {
        None => print_summary(&store).await,
        Some("--dump") => match args.get(1) {
            Some(view) => dump_view(&store, view).await,
            None => {
                print_usage();
                bail!("--dump needs a view name")
            }
        },
        Some("--countdown") => match args.get(1) {
            Some(event_time) => run_countdown(&store, event_time).await,
            None => {
                print_usage();
                bail!("--countdown needs an event time")
            }
        },
        Some(other) => {
            print_usage();
            bail!("Unknown argument: {}", other)
        }
    }
}

async fn print_summary(store: &ConferenceStore) -> Result<()> {
    let state = store.snapshot().await;

    println!("Pages:      {}", state.pages().keys().cloned().collect::<Vec<_>>().join(", "));
    println!(
        "Sponsors:   {} confirmed ({} premier, {} sponsors, {} supporters)",
        state.sponsors().len(),
        store.premier_sponsors().await.len(),
        store.sponsors().await.len(),
        store.supporters().await.len(),
    );
    println!(
        "Attendees:  {} ({} in directory)",
        state.attendees().len(),
        store.directory_attendees().await.len(),
    );
    println!(
        "Schedule:   {} items in {} time slots",
        state.schedule().len(),
        store.schedule_by_time().await.len(),
    );
    let age = state
        .load_age_minutes()
        .map(format_age)
        .unwrap_or_else(|| "never".to_string());
    println!("Loaded:     {}", age);
    Ok(())
}

async fn dump_view(store: &ConferenceStore, view: &str) -> Result<()> {
    let json = match view {
        "premier" => serde_json::to_string_pretty(&store.premier_sponsors().await)?,
        "sponsors" => serde_json::to_string_pretty(&store.sponsors().await)?,
        "supporters" => serde_json::to_string_pretty(&store.supporters().await)?,
        "directory" => serde_json::to_string_pretty(&store.directory_attendees().await)?,
        "schedule" => serde_json::to_string_pretty(&store.schedule_by_time().await)?,
        "pages" => serde_json::to_string_pretty(&store.pages().await)?,
        other => bail!("Unknown view '{}', expected one of: {}", other, DUMP_VIEWS.join(", ")),
    };
    println!("{}", json);
    Ok(())
}

async fn run_countdown(store: &ConferenceStore, event_time: &str) -> Result<()> {
    let Some(handle) = store.set_event_time(event_time).await? else {
        bail!("Countdown already running");
    };

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                if let Some(t) = store.event_time_object().await {
                    println!("{}mo {}d {}h {}m {}s", t.months, t.days, t.hours, t.minutes, t.seconds);
                }
            }
        }
    }

    handle.cancel().await;
    info!("Countdown stopped");
    Ok(())
}
