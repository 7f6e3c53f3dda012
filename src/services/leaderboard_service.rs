use std::sync::Arc;

use crate::{
    config::Config,
    error::StoreError,
    models::{
        history::HistoryDocument,
        leaderboard::{OverallStanding, TrackStanding},
    },
    services::{
        history_service::HistoryService,
        ranking::{aggregate_overall, rank_track},
    },
};

/// Read side: leaderboards derived from persisted history.
pub struct LeaderboardService {
    config: Arc<Config>,
    history: Arc<HistoryService>,
}

impl LeaderboardService {
    pub fn new(config: Arc<Config>, history: Arc<HistoryService>) -> Self {
        Self { config, history }
    }

    pub async fn get_history(&self, index: usize) -> Result<Option<HistoryDocument>, StoreError> {
        self.history.read(index).await
    }

    /// A corrupt document reads as an empty leaderboard.
    pub async fn get_leaderboard(&self, index: usize) -> Result<Vec<TrackStanding>, StoreError> {
        match self.history.read(index).await {
            Ok(history) => Ok(history.map(|h| rank_track(&h)).unwrap_or_default()),
            Err(e @ StoreError::Corrupt { .. }) => {
                tracing::warn!(index, "showing empty leaderboard: {e}");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Tracks whose document is missing or unreadable are left out.
    pub async fn get_overall(&self) -> Vec<OverallStanding> {
        let mut documents = Vec::with_capacity(self.config.tracks.len());
        for index in 0..self.config.tracks.len() {
            match self.history.read(index).await {
                Ok(Some(history)) => documents.push((index, history)),
                Ok(None) => {}
                Err(e) => tracing::warn!(index, "skipping track in overall ranking: {e}"),
            }
        }
        aggregate_overall(documents.iter().map(|(index, history)| (*index, history)))
    }
}
