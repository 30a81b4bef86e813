mod fetch;
mod model;

use crate::config::SkillConfig;
use crate::util::speech::compose_utterance;
use anyhow::Result;
use reqwest::Client;
use tracing::{debug, error, info};

pub use model::{FeedError, FeedItem, FetchOutcome, first_item, parse_items};

/// Fetches a feed and turns its newest item into a single utterance.
#[derive(Debug, Clone)]
pub struct FeedHighlightFetcher {
    client: Client,
    max_feed_bytes: usize,
}

impl FeedHighlightFetcher {
    pub fn new(cfg: &SkillConfig) -> Result<Self> {
        Ok(FeedHighlightFetcher {
            client: fetch::build_client(cfg)?,
            max_feed_bytes: cfg.max_feed_bytes,
        })
    }

    pub async fn fetch(&self, feed_url: &str) -> FetchOutcome {
        match self.highlight(feed_url).await {
            Ok(utterance) => {
                info!(url = feed_url, "composed new-article utterance");
                FetchOutcome::Success(utterance)
            }
            Err(err) => {
                error!(url = feed_url, cause = err.cause(), "feed fetch failed: {}", err);
                FetchOutcome::Failure(err)
            }
        }
    }

    async fn highlight(&self, feed_url: &str) -> Result<String, FeedError> {
        let body = fetch::fetch_body(&self.client, feed_url, self.max_feed_bytes).await?;
        debug!(url = feed_url, bytes = body.len(), "feed body received");
        let item = first_item(parse_items(&body))?;
        Ok(compose_utterance(&item))
    }
}
