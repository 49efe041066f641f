//! RSS and Atom document parsing.
//!
//! Converts raw feed bytes into [`RawEntry`] values.  RSS 2.0 is handled by the
//! [`rss`] crate and Atom 1.0 by [`atom_syndication`]; the document is offered
//! to RSS first and to Atom second.
//!
//! Everything here is pure (no I/O) so tests can feed XML strings directly.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::RawEntry;

/// The bytes were not a document either parser accepts.
#[derive(Debug, Error)]
#[error("not a valid RSS or Atom document (rss: {rss}; atom: {atom})")]
pub struct ParseError {
    pub rss: rss::Error,
    pub atom: atom_syndication::Error,
}

/// Parse a feed document into its entries, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawEntry>, ParseError> {
    let rss = match rss::Channel::read_from(bytes) {
        Ok(channel) => return Ok(entries_from_channel(&channel)),
        Err(e) => e,
    };

    match atom_syndication::Feed::read_from(bytes) {
        Ok(feed) => Ok(entries_from_atom(&feed)),
        Err(atom) => Err(ParseError { rss, atom }),
    }
}

/// Map RSS `<item>`s into raw entries.
pub fn entries_from_channel(channel: &rss::Channel) -> Vec<RawEntry> {
    channel
        .items()
        .iter()
        .map(|item| {
            // RSS has no native "updated" field; Dublin Core's dc:date plays
            // that role when present.
            let updated = item
                .dublin_core_ext()
                .and_then(|dc| dc.dates().first())
                .and_then(|d| parse_timestamp(d));

            RawEntry {
                id: item.guid().and_then(|g| non_blank(g.value())),
                link: item.link().and_then(non_blank),
                title: item.title().and_then(non_blank),
                summary: item
                    .description()
                    .and_then(non_blank)
                    .or_else(|| item.content().and_then(non_blank)),
                updated,
                published: item.pub_date().and_then(parse_timestamp),
            }
        })
        .collect()
}

/// Map Atom `<entry>`s into raw entries.
pub fn entries_from_atom(feed: &atom_syndication::Feed) -> Vec<RawEntry> {
    feed.entries()
        .iter()
        .map(|entry| {
            let link = entry
                .links()
                .iter()
                .find(|l| l.rel() == "alternate")
                .or_else(|| entry.links().first())
                .and_then(|l| non_blank(l.href()));

            // atom_syndication fills a missing <updated> with the Unix epoch.
            let updated = Some(entry.updated())
                .filter(|d| d.timestamp() != 0)
                .map(|d| d.with_timezone(&Utc));

            RawEntry {
                id: non_blank(entry.id()),
                link,
                title: non_blank(entry.title().as_str()),
                summary: entry
                    .summary()
                    .and_then(|s| non_blank(s.as_str()))
                    .or_else(|| entry.content().and_then(|c| c.value()).and_then(non_blank)),
                updated,
                published: entry.published().map(|d| d.with_timezone(&Utc)),
            }
        })
        .collect()
}

/// Parse an RFC 2822 or RFC 3339 timestamp into UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
