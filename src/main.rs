//! status-tracker — logs new incidents from RSS/Atom status feeds.
//!
//! ## Architecture overview
//!
//! ```text
//!                 ┌───────────────┐
//!                 │ supervisor.rs │  one task per feed, shared cancellation
//!                 └───────┬───────┘
//!             ┌───────────┴───────────┐
//!       ┌─────▼──────┐          ┌─────▼──────┐
//!       │ tracker.rs │   ...    │ tracker.rs │  fetch → parse → normalize
//!       └─────┬──────┘          └────────────┘  → filter → sort → emit
//!             │
//!   fetch.rs ─┼─ source/parse.rs ─ normalize.rs ─ ledger.rs
//! ```
//!
//! * **`config`** — feed list and limits, read from the environment.
//! * **`source/`** — feed and entry types, RSS/Atom parsing.
//! * **`normalize`** — raw entry → id, timestamp, title, plain-text summary.
//! * **`fetch`** — conditional GET with `ETag` / `Last-Modified`.
//! * **`ledger`** — bounded set of ids already reported.
//! * **`tracker`** — the per-feed polling loop.
//! * **`supervisor`** — runs every tracker until shutdown.
//! * **`main`** — wires everything together: logging, config, Ctrl-C.

mod config;
mod fetch;
mod ledger;
mod normalize;
mod source;
mod supervisor;
mod tracker;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // -- logging -------------------------------------------------------------
    // HTTP client internals are noisy at info; keep them to warnings.
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("info,reqwest=warn,hyper=warn,hyper_util=warn")
            }),
        )
        .init();

    // -- configuration -------------------------------------------------------
    let config = Config::from_env().context("invalid configuration")?;
    info!(
        feeds = config.feeds.len(),
        interval_secs = config.poll_interval.as_secs(),
        max_tracked_ids = config.max_tracked_ids,
        "Starting status tracker"
    );

    // -- shutdown signal -----------------------------------------------------
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Service stopped by user."),
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            }
            cancel.cancel();
        });
    }

    // -- run until cancelled -------------------------------------------------
    supervisor::run(&config, cancel)
        .await
        .context("failed to start feed trackers")?;

    Ok(())
}
