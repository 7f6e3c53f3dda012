use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::Config,
    error::FetchError,
    models::{leaderboard::LeaderboardEntry, track::Track},
};

/// Source of leaderboard snapshots. The HTTP client is the production impl.
pub trait LeaderboardSource: Send + Sync {
    fn fetch<'a>(&'a self, track: &'a Track) -> BoxFuture<'a, Result<Vec<LeaderboardEntry>, FetchError>>;
}

#[derive(Clone)]
pub struct LeaderboardClient {
    client: Client,
    base_url: String,
    version: String,
    user_token_hash: String,
    amount: u32,
    retries: u32,
    retry_base_delay: Duration,
}

impl LeaderboardClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            version: config.api_version.clone(),
            user_token_hash: config.user_token_hash.clone(),
            amount: config.fetch_amount,
            retries: config.fetch_retries.max(1),
            retry_base_delay: config.retry_base_delay,
        })
    }

    async fn fetch_once(&self, track_id: &str) -> Result<Vec<LeaderboardEntry>, FetchError> {
        let url = format!("{}/leaderboard", self.base_url);
        let amount = self.amount.to_string();

        let res = self
            .client
            .get(&url)
            .query(&[
                ("version", self.version.as_str()),
                ("trackId", track_id),
                ("skip", "0"),
                ("amount", amount.as_str()),
                ("onlyVerified", "false"),
                ("userTokenHash", self.user_token_hash.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let v: Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::Decode(format!("parse json error: {e}")))?;
        Ok(parse_entries(&v))
    }

    async fn fetch_with_retry(&self, track: &Track) -> Result<Vec<LeaderboardEntry>, FetchError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(&track.id).await {
                Ok(entries) => return Ok(entries),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    let delay = self.retry_base_delay * 2u32.saturating_pow(attempt - 1);
                    tracing::warn!(
                        track = %track.name,
                        attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        "leaderboard fetch failed: {e}"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl LeaderboardSource for LeaderboardClient {
    fn fetch<'a>(&'a self, track: &'a Track) -> BoxFuture<'a, Result<Vec<LeaderboardEntry>, FetchError>> {
        Box::pin(self.fetch_with_retry(track))
    }
}

/// Pulls the usable rows out of a leaderboard response. Rows missing a field
/// or carrying the wrong type are skipped; a body without `entries` is empty.
pub fn parse_entries(body: &Value) -> Vec<LeaderboardEntry> {
    let Some(rows) = body.get("entries").and_then(|e| e.as_array()) else {
        tracing::warn!("leaderboard response has no entries array");
        return Vec::new();
    };

    rows.iter()
        .enumerate()
        .filter_map(|(i, row)| match serde_json::from_value::<LeaderboardEntry>(row.clone()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(row = i, "skipping malformed leaderboard entry: {e}");
                None
            }
        })
        .collect()
}
