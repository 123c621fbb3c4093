//! # feedposter Library
//!
//! Polls a web syndication feed, selects the entries published since a time
//! threshold and turns each into a post of at most 280 characters (title,
//! canonical link and as many hashtags as fit) for Twitter/X and Mastodon.
//!
//! ## Features
//!
//! - Atom, RSS and JSON Feed parsing
//! - Freshness filter over the newest entries with minute/hour/day/week windows
//! - Length-bounded post composition with graceful degradation
//! - Twitter/X publishing with OAuth 2.0 User Context and automatic token refresh
//! - Mastodon publishing
//! - Dry-run mode and scheduled polling
//! - Structured logging
//!
//! ## Configuration
//!
//! Credentials are read from the environment by [`TwitterConfig::from_env`]
//! and [`MastodonConfig::from_env`] and passed to the publishers when they
//! are built.

pub mod compose;
pub mod config;
pub mod cronjob;
pub mod error;
pub mod feed;
pub mod oauth;
pub mod publish;
pub mod runner;

// Re-export commonly used types and functions
pub use compose::{compose, hashtagify, TweetComposer, LENGTH_LIMIT};
pub use config::{MastodonConfig, TwitterConfig};
pub use cronjob::{run_feed_cronjob, start_feed_cronjob};
pub use error::{FeedError, PublishError};
pub use feed::{select_recent, FeedEntry, Frequency};
pub use oauth::build_bearer_auth_header;
pub use runner::{FeedPoster, RunReport};
