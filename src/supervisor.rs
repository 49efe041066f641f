//! Runs one [`Tracker`] per feed and waits for all of them.
//!
//! Trackers share nothing, so they run as independent tasks in a
//! [`JoinSet`].  They all listen to one group [`CancellationToken`] derived
//! from the caller's: cancelling the caller's token (Ctrl-C) stops every
//! tracker.  Trackers contain failures within a cycle themselves; a tracker
//! task that still dies abnormally cancels its siblings too.

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::fetch::{Fetch, FetchError, HttpFetcher};
use crate::tracker::{IncidentSink, LogSink, Tracker};

/// Build an HTTP-backed, log-reporting tracker for every configured feed and
/// run them until `cancel` fires.
pub async fn run(config: &Config, cancel: CancellationToken) -> Result<(), FetchError> {
    let mut trackers = Vec::with_capacity(config.feeds.len());
    for source in config.sources() {
        let fetcher = HttpFetcher::new(config.request_timeout)?;
        trackers.push(Tracker::new(source, fetcher, LogSink, config.max_tracked_ids));
    }

    run_trackers(trackers, cancel).await;
    Ok(())
}

/// Run the given trackers concurrently.  Returns once every tracker has
/// finished its cleanup.
pub async fn run_trackers<F, S>(trackers: Vec<Tracker<F, S>>, cancel: CancellationToken)
where
    F: Fetch + 'static,
    S: IncidentSink + 'static,
{
    let group = cancel.child_token();
    let mut tasks = JoinSet::new();

    for tracker in trackers {
        let url = tracker.source().url.clone();
        let token = group.clone();
        tasks.spawn(async move {
            tracker.run(token).await;
            url
        });
    }

    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(url) => debug!("Tracker task joined: {}", url),
            Err(e) => {
                error!("Tracker task ended abnormally: {}; cancelling remaining trackers", e);
                group.cancel();
            }
        }
    }

    info!("All trackers stopped.");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use super::*;
    use crate::tracker::test_support::*;

    #[tokio::test]
    async fn cancellation_stops_every_tracker() {
        let fetchers = [ScriptedFetcher::default(), ScriptedFetcher::hanging()];
        let started: Vec<_> = fetchers.iter().map(|f| f.started.clone()).collect();
        let drops: Vec<_> = fetchers.iter().map(|f| f.drops.clone()).collect();
        let trackers = fetchers
            .into_iter()
            .map(|f| Tracker::new(source(), f, CollectingSink::default(), 10))
            .collect();

        let cancel = CancellationToken::new();
        let supervisor = tokio::spawn(run_trackers(trackers, cancel.clone()));

        for s in &started {
            s.notified().await;
        }
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), supervisor)
            .await
            .expect("supervisor returns after all trackers stop")
            .unwrap();
        for d in &drops {
            assert_eq!(d.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn a_failing_cycle_does_not_stop_other_trackers() {
        let flaky = ScriptedFetcher::panicking();
        let healthy = ScriptedFetcher::default();
        let flaky_requests = flaky.requests.clone();
        let healthy_requests = healthy.requests.clone();
        let interval = Duration::from_millis(10);
        let trackers = vec![
            Tracker::new(source_every(interval), flaky, CollectingSink::default(), 10),
            Tracker::new(source_every(interval), healthy, CollectingSink::default(), 10),
        ];

        let cancel = CancellationToken::new();
        let supervisor = tokio::spawn(run_trackers(trackers, cancel.clone()));

        tokio::time::timeout(Duration::from_secs(5), async {
            wait_for_fetches(&flaky_requests, 3).await;
            wait_for_fetches(&healthy_requests, 3).await;
        })
        .await
        .expect("both trackers keep polling");
        assert!(!supervisor.is_finished());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), supervisor)
            .await
            .expect("supervisor returns after all trackers stop")
            .unwrap();
    }

    #[tokio::test]
    async fn empty_feed_list_returns_immediately() {
        let trackers: Vec<Tracker<ScriptedFetcher, CollectingSink>> = Vec::new();
        run_trackers(trackers, CancellationToken::new()).await;
    }
}
