//! Entry types shared by the parser, normalizer and tracker.
//!
//! [`RawEntry`] is what the parser extracts from a document, with every field
//! optional.  [`FeedEntry`] is the normalized form: it always has an id and a
//! timestamp, so it can be deduplicated and ordered safely.

use chrono::{DateTime, Utc};

/// An entry as it came out of the feed document.
///
/// Lives for one processing cycle only.  Blank strings and unparseable
/// timestamps are already mapped to `None` by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// Feed-provided unique id (`<guid>` / `<id>`).
    pub id: Option<String>,
    /// Link to the entry, used as the id fallback.
    pub link: Option<String>,
    pub title: Option<String>,
    /// Summary text, possibly containing HTML markup.
    pub summary: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub published: Option<DateTime<Utc>>,
}

/// A normalized entry, ready to be deduplicated, sorted and reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Stable, non-empty identifier used by the dedup ledger.
    pub id: String,
    /// Timestamp used for chronological ordering.
    pub timestamp: DateTime<Utc>,
    /// Service name / incident title.
    pub title: String,
    /// Summary with markup stripped.  Empty when the feed has none.
    pub summary: String,
}

impl FeedEntry {
    /// The timestamp as it appears in log output (`YYYY-MM-DD HH:MM:SS`, UTC).
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formatted_time_uses_log_layout() {
        let entry = FeedEntry {
            id: "1".into(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap(),
            title: "API".into(),
            summary: String::new(),
        };
        assert_eq!(entry.formatted_time(), "2025-03-07 09:05:01");
    }
}
