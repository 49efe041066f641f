//! Raw entry → [`FeedEntry`] normalization.
//!
//! An entry is only usable if it has a stable id (feed id, else link) and a
//! timestamp (updated, else published).  Entries missing either are rejected:
//! they can't be deduplicated or ordered.

use std::sync::LazyLock;

use regex::Regex;

use crate::source::{FeedEntry, RawEntry};

/// Title used when the feed gives none.
pub const UNKNOWN_SERVICE: &str = "Unknown Service";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<.*?>").expect("valid regex"));

/// Normalize a raw entry, or `None` if it lacks an id or a timestamp.
pub fn normalize(raw: RawEntry) -> Option<FeedEntry> {
    let id = raw.id.or(raw.link)?;
    let timestamp = raw.updated.or(raw.published)?;

    Some(FeedEntry {
        id,
        timestamp,
        title: raw.title.unwrap_or_else(|| UNKNOWN_SERVICE.to_string()),
        summary: raw.summary.as_deref().map(strip_tags).unwrap_or_default(),
    })
}

/// Remove every `<...>` sequence and trim surrounding whitespace.
pub fn strip_tags(html: &str) -> String {
    TAG.replace_all(html, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dated(id: Option<&str>, link: Option<&str>) -> RawEntry {
        RawEntry {
            id: id.map(String::from),
            link: link.map(String::from),
            published: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn strips_markup() {
        assert_eq!(
            strip_tags("<p>Service <b>X</b> degraded</p>"),
            "Service X degraded"
        );
        assert_eq!(strip_tags("  \n<br/>plain\t"), "plain");
        assert_eq!(strip_tags("<a\nhref=\"x\">link</a>"), "link");
    }

    #[test]
    fn prefers_feed_id_over_link() {
        let entry = normalize(dated(Some("guid"), Some("https://x/1"))).unwrap();
        assert_eq!(entry.id, "guid");
    }

    #[test]
    fn falls_back_to_link() {
        let entry = normalize(dated(None, Some("https://x/1"))).unwrap();
        assert_eq!(entry.id, "https://x/1");
    }

    #[test]
    fn rejects_entry_without_id_or_link() {
        assert!(normalize(dated(None, None)).is_none());
    }

    #[test]
    fn rejects_undated_entry() {
        let raw = RawEntry {
            id: Some("g".into()),
            title: Some("Outage".into()),
            summary: Some("<p>details</p>".into()),
            ..Default::default()
        };
        assert!(normalize(raw).is_none());
    }

    #[test]
    fn prefers_updated_over_published() {
        let updated = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let raw = RawEntry {
            id: Some("g".into()),
            updated: Some(updated),
            published: Some(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(normalize(raw).unwrap().timestamp, updated);
    }

    #[test]
    fn fills_missing_title_and_summary() {
        let entry = normalize(dated(Some("g"), None)).unwrap();
        assert_eq!(entry.title, UNKNOWN_SERVICE);
        assert_eq!(entry.summary, "");
    }
}
