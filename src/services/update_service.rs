use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::{
    config::Config,
    error::UpdateError,
    services::{
        chart_service::ChartService,
        history_service::{merge_snapshot, HistoryService},
        leaderboard_client::LeaderboardSource,
    },
};

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct TrackOutcome {
    pub index: usize,
    pub name: String,
    /// Entries in the fetched snapshot, 0 on failure.
    pub entries: usize,
    /// Users in the history document after the merge.
    pub users: usize,
    pub error: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub tracks: Vec<TrackOutcome>,
}

impl CycleReport {
    pub fn failed(&self) -> usize {
        self.tracks.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Runs fetch, merge and chart rendering for the configured tracks.
pub struct UpdateService {
    config: Arc<Config>,
    source: Arc<dyn LeaderboardSource>,
    history: Arc<HistoryService>,
    charts: Arc<ChartService>,
    // poller and manual triggers take turns
    cycle: Mutex<()>,
}

impl UpdateService {
    pub fn new(
        config: Arc<Config>,
        source: Arc<dyn LeaderboardSource>,
        history: Arc<HistoryService>,
        charts: Arc<ChartService>,
    ) -> Self {
        Self {
            config,
            source,
            history,
            charts,
            cycle: Mutex::new(()),
        }
    }

    /// Refreshes every track in order. A failing track is recorded in the
    /// report and does not stop the others.
    pub async fn run_cycle(&self) -> CycleReport {
        let _turn = self.cycle.lock().await;
        let started_at = Utc::now();
        let mut tracks = Vec::with_capacity(self.config.tracks.len());

        for (index, track) in self.config.tracks.iter().enumerate() {
            let outcome = match self.refresh_track(index).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(track = %track.name, index, "track update failed: {e}");
                    TrackOutcome {
                        index,
                        name: track.name.clone(),
                        entries: 0,
                        users: 0,
                        error: Some(e.to_string()),
                    }
                }
            };
            tracks.push(outcome);
        }

        let report = CycleReport { started_at, tracks };
        tracing::info!(
            tracks = report.tracks.len(),
            failed = report.failed(),
            "update cycle finished"
        );
        report
    }

    /// Refreshes a single track if it has no history document yet.
    pub async fn ensure_history(&self, index: usize) -> Result<(), UpdateError> {
        if self.history.exists(index).await {
            return Ok(());
        }
        let _turn = self.cycle.lock().await;
        if self.history.exists(index).await {
            return Ok(());
        }
        self.refresh_track(index).await.map(|_| ())
    }

    async fn refresh_track(&self, index: usize) -> Result<TrackOutcome, UpdateError> {
        let track = self
            .config
            .track(index)
            .ok_or(UpdateError::UnknownTrack(index))?;

        let entries = self.source.fetch(track).await?;
        let at = Utc::now();
        let history = self
            .history
            .update(index, |current| merge_snapshot(current, &entries, at))
            .await?;
        let users = history.len();

        tracing::info!(track = %track.name, index, entries = entries.len(), users, "history updated");

        // chart failures leave the previous image in place
        if let Err(e) = self.charts.render(index, track.name.clone(), history).await {
            tracing::warn!(track = %track.name, index, "chart rendering failed: {e}");
        }

        Ok(TrackOutcome {
            index,
            name: track.name.clone(),
            entries: entries.len(),
            users,
            error: None,
        })
    }
}
