//! Per-feed polling loop.
//!
//! A [`Tracker`] owns everything about one feed: its fetcher, its cache
//! validators and its [`SeenIds`] ledger.  Nothing is shared between
//! trackers, so no locking is needed.
//!
//! Each cycle runs fetch → parse → normalize → filter-new → sort → emit →
//! record, then sleeps for the feed's poll interval.  Cycles never overlap.
//! Every failure inside a cycle is logged and the loop carries on; only
//! cancellation ends it.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::fetch::{CacheValidators, Fetch, FetchOutcome};
use crate::ledger::SeenIds;
use crate::normalize::normalize;
use crate::source::{parse, FeedEntry, FeedSource};

/// The sink refused an incident record.
#[derive(Debug, Error)]
#[error("failed to emit entry {id}: {reason}")]
pub struct EmitError {
    pub id: String,
    pub reason: String,
}

/// Where new incidents are reported.
///
/// An entry only counts as reported (and is recorded in the ledger) once
/// `emit` returns `Ok`.
pub trait IncidentSink: Send {
    fn emit(&mut self, feed_url: &str, entry: &FeedEntry) -> Result<(), EmitError>;
}

/// Reports each incident as a single `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl IncidentSink for LogSink {
    fn emit(&mut self, feed_url: &str, entry: &FeedEntry) -> Result<(), EmitError> {
        info!(
            feed = %feed_url,
            service = %entry.title,
            time = %entry.formatted_time(),
            details = %entry.summary,
            "New incident detected"
        );
        Ok(())
    }
}

/// What a single poll cycle did.  Used by tests and debug logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleReport {
    /// `304`, nothing to do.
    Unchanged,
    /// Fetch failed; already logged.
    FetchFailed,
    /// Document processed; `emitted` new entries reported.
    Processed { emitted: usize },
    /// Emission failed part-way; entries before the failure were recorded.
    Aborted { emitted: usize },
}

/// Polls one feed until cancelled.
pub struct Tracker<F, S> {
    source: FeedSource,
    fetcher: F,
    sink: S,
    validators: CacheValidators,
    seen: SeenIds,
}

impl<F, S> Tracker<F, S>
where
    F: Fetch,
    S: IncidentSink,
{
    /// Fresh tracker: empty validators, empty ledger.
    pub fn new(source: FeedSource, fetcher: F, sink: S, max_tracked_ids: usize) -> Self {
        Self {
            source,
            fetcher,
            sink,
            validators: CacheValidators::default(),
            seen: SeenIds::new(max_tracked_ids),
        }
    }

    pub fn source(&self) -> &FeedSource {
        &self.source
    }

    #[cfg(test)]
    pub fn validators(&self) -> &CacheValidators {
        &self.validators
    }

    pub fn seen(&self) -> &SeenIds {
        &self.seen
    }

    /// Run cycles until `cancel` fires, then release the fetcher.
    ///
    /// Cancellation is observed both while fetching and while sleeping.
    pub async fn run(mut self, cancel: CancellationToken) {
        let url = self.source.url.clone();
        info!(
            "Tracking started: {} (remembering up to {} entries)",
            url,
            self.seen.capacity()
        );

        loop {
            // Processing after the fetch is synchronous, so cancellation can
            // only interrupt the network part of a cycle.
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = AssertUnwindSafe(self.poll_once()).catch_unwind() => result,
            };

            match result {
                Ok(report) => {
                    debug!(feed = %url, ?report, tracked = self.seen.len(), "Cycle finished")
                }
                Err(panic) => {
                    error!("[{}] Cycle aborted: {}", url, panic_message(panic.as_ref()));
                    // The cycle may have stopped half way; refetch in full.
                    self.validators = CacheValidators::default();
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.source.poll_interval) => {}
            }
        }

        info!("Tracker cancelled: {}", url);
        // Drops the fetcher and with it the HTTP connection pool.
        drop(self);
        info!("Tracker stopped: {}", url);
    }

    /// One fetch + process cycle, without the sleep.
    pub async fn poll_once(&mut self) -> CycleReport {
        let outcome = self
            .fetcher
            .fetch(&self.source.url, &self.validators)
            .await;
        self.handle(outcome)
    }

    fn handle(&mut self, outcome: FetchOutcome) -> CycleReport {
        match outcome {
            FetchOutcome::Unchanged => {
                debug!("Feed unchanged: {}", self.source.url);
                CycleReport::Unchanged
            }
            FetchOutcome::Failed(e) => {
                error!("[{}] {}", self.source.url, e);
                CycleReport::FetchFailed
            }
            FetchOutcome::Content { body, validators } => {
                self.validators = validators;
                match self.process(&body) {
                    Ok(emitted) => CycleReport::Processed { emitted },
                    Err((emitted, e)) => {
                        error!("[{}] Processing error: {}", self.source.url, e);
                        // Force a full refetch so the unrecorded entries are
                        // looked at again next cycle.
                        self.validators = CacheValidators::default();
                        CycleReport::Aborted { emitted }
                    }
                }
            }
        }
    }

    /// Report every new entry in `body`, oldest first, recording each one
    /// right after it is emitted.
    ///
    /// Returns the number of entries emitted.  On a sink failure the count
    /// emitted so far is returned alongside the error.
    fn process(&mut self, body: &[u8]) -> Result<usize, (usize, EmitError)> {
        let raw_entries = match parse::parse_feed(body) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("[{}] Failed to parse feed: {}", self.source.url, e);
                Vec::new()
            }
        };

        let mut fresh: Vec<FeedEntry> = raw_entries
            .into_iter()
            .filter_map(|raw| {
                let entry = normalize(raw);
                if entry.is_none() {
                    debug!("[{}] Skipping entry without id or timestamp", self.source.url);
                }
                entry
            })
            .filter(|entry| self.seen.is_new(&entry.id))
            .collect();

        // Stable: ties keep document order.
        fresh.sort_by_key(|entry| entry.timestamp);

        let mut emitted = 0;
        for entry in &fresh {
            self.sink
                .emit(&self.source.url, entry)
                .map_err(|e| (emitted, e))?;
            self.seen.record(&entry.id);
            emitted += 1;
        }

        Ok(emitted)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
