//! # feedposter
//!
//! Polls a syndication feed and posts the entries published since the last
//! window to Twitter/X and/or Mastodon.
//!
//! ## Environment Variables
//!
//! - `xapi_access_token`: Twitter API access token (required with `--twitter`)
//! - `xapi_refresh_token`, `xapi_client_id`, `xapi_client_secret`: enable automatic token refresh
//! - `MASTODON_INSTANCE_URL`, `MASTODON_ACCESS_TOKEN`: required with `--mastodon`
//! - `RUST_LOG`: log level filter for `env_logger`
//!
//! ## Example Usage
//!
//! ```bash
//! # Preview the posts for entries from the last day
//! feedposter --source https://example.com/feed.atom
//!
//! # Post last hour's entries to both services
//! RUST_LOG=info feedposter -s https://example.com/feed.atom -f h -t -m
//!
//! # Keep running and check once an hour
//! feedposter -s https://example.com/feed.atom -f h -t --watch
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use url::Url;

use feedposter::compose::TweetComposer;
use feedposter::config::{MastodonConfig, TwitterConfig};
use feedposter::cronjob::run_feed_cronjob;
use feedposter::feed::Frequency;
use feedposter::publish::{MastodonPublisher, Publisher, TwitterPublisher};
use feedposter::runner::FeedPoster;

/// Post new feed entries to social media.
#[derive(Debug, Parser)]
#[command(name = "feedposter", version, about)]
struct Cli {
    /// The source feed to post from
    #[arg(short = 's', long)]
    source: Url,

    /// The timeframe to check for posts: 'm', 'h', 'd' or 'w' for minute,
    /// hour, day and week
    #[arg(short = 'f', long, default_value = "d")]
    frequency: Frequency,

    /// Publish to the Twitter/X account configured in the environment
    #[arg(short = 't', long)]
    twitter: bool,

    /// Publish to the Mastodon account configured in the environment
    #[arg(short = 'm', long)]
    mastodon: bool,

    /// Domain hashtag added to every post that has room for it, e.g. EconTwitter
    #[arg(long)]
    hashtag: Option<String>,

    /// Keep running and check the feed once per frequency window
    #[arg(long)]
    watch: bool,
}

fn build_publishers(
    cli: &Cli,
    client: &reqwest::Client,
) -> Result<Vec<Arc<dyn Publisher>>, Box<dyn std::error::Error + Send + Sync>> {
    let mut publishers: Vec<Arc<dyn Publisher>> = Vec::new();

    if cli.twitter {
        let config = TwitterConfig::from_env()?;
        publishers.push(Arc::new(TwitterPublisher::new(client.clone(), config)));
    }
    if cli.mastodon {
        let config = MastodonConfig::from_env()?;
        publishers.push(Arc::new(MastodonPublisher::new(client.clone(), config)));
    }

    Ok(publishers)
}

async fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("feedposter/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let publishers = build_publishers(&cli, &client)?;
    let composer = TweetComposer::new(cli.hashtag.clone());
    let poster = Arc::new(FeedPoster::new(
        client,
        cli.source.clone(),
        cli.frequency,
        composer,
        publishers,
    ));

    if cli.watch {
        info!("Watching {} with frequency '{}'", cli.source, cli.frequency);
        run_feed_cronjob(poster).await?;
        return Ok(true);
    }

    let report = poster.run_once().await?;
    info!(
        "Run finished: {} posts, {} published, {} failed",
        report.posts.len(),
        report.published,
        report.failed
    );
    Ok(report.failed == 0)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logging system
    env_logger::init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("feedposter failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
