//! Feed sources and the entry types that flow out of them.
//!
//! A [`FeedSource`] names one polled feed.  Fetched bytes are turned into
//! [`RawEntry`] values by [`parse::parse_feed`], which understands both RSS
//! 2.0 and Atom 1.0.  Raw entries are transient: the normalizer converts the
//! usable ones into [`FeedEntry`] values and the rest are dropped.
//!
//! ## For contributors — supporting another feed format
//!
//! 1. Add a mapping function to [`parse`] that turns the format's items into
//!    [`RawEntry`] values.
//! 2. Try it in [`parse::parse_feed`] after the existing formats.
//!
//! Nothing downstream (normalizer, ledger, tracker) needs to change.

mod feed_entry;
pub mod parse;

pub use feed_entry::{FeedEntry, RawEntry};

use std::time::Duration;

/// One configured feed.  Immutable for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    /// The feed URL to poll.
    pub url: String,
    /// Delay between the end of one poll cycle and the start of the next.
    pub poll_interval: Duration,
}

impl FeedSource {
    pub fn new(url: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            url: url.into(),
            poll_interval,
        }
    }
}
