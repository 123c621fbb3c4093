//! One polling run: fetch the feed, pick the new entries, compose and publish.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use log::{error, info, warn};
use reqwest::Client;
use url::Url;

use crate::compose::TweetComposer;
use crate::feed::{fetch_feed, parse_feed, select_recent, FeedEntry, Frequency};
use crate::publish::{Publisher, StdoutPublisher};

/// Outcome of a single run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Posts composed from new entries.
    pub posts: Vec<String>,
    /// Successful (post, service) deliveries.
    pub published: usize,
    /// Failed (post, service) deliveries.
    pub failed: usize,
}

/// Composes the posts for the entries that are new at `now`, newest first.
pub fn build_posts(
    entries: &[FeedEntry],
    frequency: Frequency,
    now: NaiveDateTime,
    composer: &TweetComposer,
) -> Vec<String> {
    select_recent(entries, frequency, now)
        .iter()
        .map(|entry| composer.compose(entry))
        .collect()
}

/// Everything a run needs, built once and shared by scheduled runs.
pub struct FeedPoster {
    client: Client,
    source: Url,
    frequency: Frequency,
    composer: TweetComposer,
    publishers: Vec<Arc<dyn Publisher>>,
}

impl FeedPoster {
    /// Creates a poster. With no publishers the posts are printed instead.
    pub fn new(
        client: Client,
        source: Url,
        frequency: Frequency,
        composer: TweetComposer,
        publishers: Vec<Arc<dyn Publisher>>,
    ) -> Self {
        let publishers = if publishers.is_empty() {
            info!("No posting service enabled, running in dry-run mode");
            vec![Arc::new(StdoutPublisher) as Arc<dyn Publisher>]
        } else {
            publishers
        };

        FeedPoster {
            client,
            source,
            frequency,
            composer,
            publishers,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Runs against the current UTC time.
    pub async fn run_once(&self) -> Result<RunReport, Box<dyn std::error::Error + Send + Sync>> {
        self.run_at(Utc::now().naive_utc()).await
    }

    /// Runs with an explicit notion of "now".
    ///
    /// Fetch and parse failures abort the run before anything is published.
    /// Publish failures are logged and counted; the remaining posts and
    /// services are still attempted.
    pub async fn run_at(
        &self,
        now: NaiveDateTime,
    ) -> Result<RunReport, Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Checking {} for entries from the last {} minutes",
            self.source,
            self.frequency.lookback_minutes()
        );

        let bytes = fetch_feed(&self.client, &self.source).await?;
        let entries = parse_feed(&bytes)?;
        let posts = build_posts(&entries, self.frequency, now, &self.composer);

        if posts.is_empty() {
            info!("No new entries to post");
            return Ok(RunReport::default());
        }
        info!("Composed {} posts", posts.len());

        let (published, failed) = self.publish_all(&posts).await;
        Ok(RunReport {
            posts,
            published,
            failed,
        })
    }

    /// Sends every post to every publisher and returns (succeeded, failed).
    pub async fn publish_all(&self, posts: &[String]) -> (usize, usize) {
        let mut published = 0;
        let mut failed = 0;

        for post in posts {
            for publisher in &self.publishers {
                match publisher.publish(post).await {
                    Ok(_) => {
                        info!("Published post to {}", publisher.name());
                        published += 1;
                    }
                    Err(e) => {
                        error!("Failed to publish post to {}: {}", publisher.name(), e);
                        failed += 1;
                    }
                }
            }
        }

        if failed > 0 {
            warn!("{} of {} deliveries failed", failed, published + failed);
        }
        (published, failed)
    }
}
