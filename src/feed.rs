//! Feed retrieval, parsing and the freshness filter.
//!
//! This module turns a feed URL into an ordered list of [`FeedEntry`] values
//! and decides which of them are new enough to be posted in this run.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use feed_rs::model::FeedType;
use log::{debug, info, warn};
use reqwest::Client;
use url::Url;

use crate::error::FeedError;

/// Only this many entries from the top of the feed are ever posted in one run.
pub const MAX_CANDIDATES: usize = 4;

/// A link attached to a feed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLink {
    pub title: Option<String>,
    pub href: String,
}

/// One syndicated item, reduced to the fields needed to compose a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    /// Last update time. Offsets are normalized to UTC and dropped.
    pub updated_at: NaiveDateTime,
    pub links: Vec<EntryLink>,
    /// Raw category terms in document order.
    pub categories: Vec<String>,
}

/// Lookback window selector for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Minute,
    Hour,
    Day,
    Week,
}

impl Frequency {
    /// Parses a frequency code (`m`, `h`, `d`, `w`) or its long name.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidArgument`] for anything else. No default is
    /// substituted.
    pub fn from_code(code: &str) -> Result<Self, FeedError> {
        match code.trim().to_ascii_lowercase().as_str() {
            "m" | "minute" => Ok(Frequency::Minute),
            "h" | "hour" => Ok(Frequency::Hour),
            "d" | "day" => Ok(Frequency::Day),
            "w" | "week" => Ok(Frequency::Week),
            other => Err(FeedError::InvalidArgument(format!(
                "unknown frequency '{}', expected one of m, h, d, w",
                other
            ))),
        }
    }

    /// Length of the lookback window in minutes.
    pub fn lookback_minutes(self) -> i64 {
        match self {
            Frequency::Minute => 1,
            Frequency::Hour => 60,
            Frequency::Day => 24 * 60,
            Frequency::Week => 24 * 60 * 7,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Frequency::Minute => "m",
            Frequency::Hour => "h",
            Frequency::Day => "d",
            Frequency::Week => "w",
        }
    }
}

impl FromStr for Frequency {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::from_code(s)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Returns the lookback window in minutes for a raw frequency code.
///
/// # Examples
///
/// ```rust
/// use feedposter::feed::lookback_minutes;
///
/// assert_eq!(lookback_minutes("h").unwrap(), 60);
/// assert!(lookback_minutes("y").is_err());
/// ```
pub fn lookback_minutes(code: &str) -> Result<i64, FeedError> {
    Frequency::from_code(code).map(Frequency::lookback_minutes)
}

/// Entries updated strictly after this time count as new.
pub fn threshold_time(frequency: Frequency, now: NaiveDateTime) -> NaiveDateTime {
    now - Duration::minutes(frequency.lookback_minutes())
}

/// Selects the entries that are new for this run.
///
/// `entries` must be ordered newest first, the way feeds list them. Only the
/// first [`MAX_CANDIDATES`] entries are considered, and the scan stops at the
/// first entry that is not newer than the threshold, so the result is always
/// a prefix of the input.
///
/// # Parameters
///
/// - `entries`: Parsed feed entries, newest first
/// - `frequency`: Lookback window for this run
/// - `now`: Current time on the same (UTC) wall clock as the entries
///
/// # Returns
///
/// A prefix of `entries` holding at most [`MAX_CANDIDATES`] entries.
pub fn select_recent(
    entries: &[FeedEntry],
    frequency: Frequency,
    now: NaiveDateTime,
) -> &[FeedEntry] {
    let threshold = threshold_time(frequency, now);
    debug!("Threshold for new entries: {}", threshold);

    let candidates = &entries[..entries.len().min(MAX_CANDIDATES)];
    let fresh = candidates
        .iter()
        .take_while(|entry| entry.updated_at > threshold)
        .count();

    info!(
        "{} of {} candidate entries are newer than {}",
        fresh,
        candidates.len(),
        threshold
    );
    &candidates[..fresh]
}

/// Downloads the raw feed document.
///
/// # Errors
///
/// - [`FeedError::Fetch`] on network failure
/// - [`FeedError::Status`] when the server answers with a non-success status
pub async fn fetch_feed(client: &Client, url: &Url) -> Result<Vec<u8>, FeedError> {
    info!("Fetching feed from {}", url);

    let response = client.get(url.as_str()).send().await?;
    let status = response.status();
    if !status.is_success() {
        warn!("Feed request to {} returned {}", url, status);
        return Err(FeedError::Status(status.as_u16()));
    }

    let bytes = response.bytes().await?;
    debug!("Received {} bytes of feed data", bytes.len());
    Ok(bytes.to_vec())
}

/// Parses a feed document into entries, keeping document order.
///
/// Atom, RSS and JSON Feed are accepted. Atom links carry their own titles;
/// RSS items and JSON Feed items only have an untitled item link, so the first
/// untitled link of such an item takes the item's title and becomes its
/// canonical link. An entry without a title gets an empty one; an entry with
/// neither an updated nor a published time makes the whole feed malformed,
/// since freshness cannot be decided for it.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed =
        feed_rs::parser::parse(bytes).map_err(|e| FeedError::MalformedFeed(e.to_string()))?;
    let titled_links = matches!(feed.feed_type, FeedType::Atom);
    debug!("Parsing {:?} feed", feed.feed_type);

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| -> Result<FeedEntry, FeedError> {
            let updated_at = entry
                .updated
                .or(entry.published)
                .map(|ts| ts.naive_utc())
                .ok_or_else(|| {
                    FeedError::MalformedFeed(format!("entry '{}' has no timestamp", entry.id))
                })?;

            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let mut links: Vec<EntryLink> = entry
                .links
                .into_iter()
                .map(|link| EntryLink {
                    title: link.title,
                    href: link.href,
                })
                .collect();

            if !titled_links {
                if let Some(item_link) = links.iter_mut().find(|link| link.title.is_none()) {
                    item_link.title = Some(title.clone());
                }
            }

            Ok(FeedEntry {
                title,
                updated_at,
                links,
                categories: entry.categories.into_iter().map(|c| c.term).collect(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Parsed {} entries from feed", entries.len());
    Ok(entries)
}
