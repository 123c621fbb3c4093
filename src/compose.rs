//! Post composition.
//!
//! Turns a feed entry into a single post of at most [`LENGTH_LIMIT`]
//! characters: the title, the entry's canonical link and as many hashtags as
//! fit. Lengths are counted in chars, and truncation never splits one.

use log::debug;

use crate::feed::FeedEntry;

/// Maximum allowable length of a post.
pub const LENGTH_LIMIT: usize = 280;

const TOO_LARGE_SUFFIX: &str = "; too large for tweet";
const ELLIPSIS: &str = "...";

/// Builds posts from feed entries.
///
/// The default composer adds no canonical hashtag, only category hashtags.
#[derive(Debug, Clone, Default)]
pub struct TweetComposer {
    canonical_hashtag: Option<String>,
}

impl TweetComposer {
    /// Creates a composer with the given canonical hashtag, or none.
    ///
    /// A tag given without a leading `#` gets one.
    pub fn new(canonical_hashtag: Option<String>) -> Self {
        let canonical_hashtag = canonical_hashtag
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .map(|tag| {
                if tag.starts_with('#') {
                    tag
                } else {
                    format!("#{}", tag)
                }
            });
        TweetComposer { canonical_hashtag }
    }

    pub fn canonical_hashtag(&self) -> Option<&str> {
        self.canonical_hashtag.as_deref()
    }

    /// Composes the post for one entry.
    ///
    /// The options are tried in order, richest first:
    ///
    /// 1. Link longer than the limit: the title with a "too large" note,
    ///    truncated with an ellipsis if needed. The link is dropped.
    /// 2. Title and link do not fit together: the title is truncated with an
    ///    ellipsis, then a newline and the link.
    /// 3. Otherwise the title, the canonical hashtag if it fits, then category
    ///    hashtags in order until the first one that does not fit, then a
    ///    newline and the link.
    ///
    /// The result never exceeds [`LENGTH_LIMIT`] characters.
    pub fn compose(&self, entry: &FeedEntry) -> String {
        let title = entry.title.as_str();
        let link = canonical_link(entry);
        let title_len = char_len(title);
        let link_len = char_len(link);

        if link_len > LENGTH_LIMIT {
            debug!("Link is {} chars, posting title only", link_len);
            return too_large_note(title);
        }

        if title_len + 1 + link_len > LENGTH_LIMIT {
            // Room left for the title once "...\n" and the link are placed.
            let Some(acceptable_len) = LENGTH_LIMIT.checked_sub(link_len + ELLIPSIS.len() + 1)
            else {
                debug!("Link is {} chars, no room for a truncated title", link_len);
                return too_large_note(title);
            };
            debug!("Truncating title from {} to {} chars", title_len, acceptable_len);
            return format!("{}{}\n{}", take_chars(title, acceptable_len), ELLIPSIS, link);
        }

        let fits = |body_len: usize, tag: &str| {
            body_len + 1 + char_len(tag) + 1 + link_len <= LENGTH_LIMIT
        };

        let mut body = title.to_string();
        let mut body_len = title_len;

        if let Some(tag) = self.canonical_hashtag.as_deref() {
            if fits(body_len, tag) {
                body.push(' ');
                body.push_str(tag);
                body_len += 1 + char_len(tag);
            }
        }

        for category in &entry.categories {
            let tag = hashtagify(category);
            if !fits(body_len, &tag) {
                debug!("Hashtag {} does not fit, dropping remaining categories", tag);
                break;
            }
            body.push(' ');
            body.push_str(&tag);
            body_len += 1 + char_len(&tag);
        }

        format!("{}\n{}", body, link)
    }
}

/// Composes a post without a canonical hashtag.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use feedposter::compose::compose;
/// use feedposter::feed::{EntryLink, FeedEntry};
///
/// let entry = FeedEntry {
///     title: "Short Title".to_string(),
///     updated_at: NaiveDate::from_ymd_opt(2024, 1, 1)
///         .unwrap()
///         .and_hms_opt(0, 0, 0)
///         .unwrap(),
///     links: vec![EntryLink {
///         title: Some("Short Title".to_string()),
///         href: "http://x.co/a".to_string(),
///     }],
///     categories: vec!["Market Design".to_string()],
/// };
///
/// assert_eq!(
///     compose(&entry),
///     "Short Title #marketdesign\nhttp://x.co/a"
/// );
/// ```
pub fn compose(entry: &FeedEntry) -> String {
    TweetComposer::default().compose(entry)
}

/// Returns the href of the first link whose title equals the entry title, or
/// an empty string when there is none.
pub fn canonical_link(entry: &FeedEntry) -> &str {
    entry
        .links
        .iter()
        .find(|link| link.title.as_deref() == Some(entry.title.as_str()))
        .map(|link| link.href.as_str())
        .unwrap_or("")
}

/// Turns a category label into a hashtag.
///
/// Spaces and hyphens are removed and the rest is lowercased, so
/// `"Market Design"` becomes `#marketdesign` and `"pre-K"` becomes `#prek`.
pub fn hashtagify(label: &str) -> String {
    let compact: String = label
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    format!("#{}", compact.to_lowercase())
}

fn too_large_note(title: &str) -> String {
    let text = format!("{}{}", title, TOO_LARGE_SUFFIX);
    if char_len(&text) <= LENGTH_LIMIT {
        return text;
    }
    let keep = LENGTH_LIMIT - TOO_LARGE_SUFFIX.len() - ELLIPSIS.len();
    format!("{}{}{}", take_chars(title, keep), ELLIPSIS, TOO_LARGE_SUFFIX)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
