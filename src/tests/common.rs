use axum::{body::Body, Router};
use chrono::{TimeZone, Utc};
use futures::future::BoxFuture;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tempfile::TempDir;

use crate::{
    config::Config,
    error::FetchError,
    models::{
        history::{HistoryDocument, HistoryRecord, Sample},
        leaderboard::LeaderboardEntry,
        track::Track,
    },
    routes,
    services::{
        chart_service::ChartService,
        history_service::HistoryService,
        leaderboard_client::LeaderboardSource,
        leaderboard_service::LeaderboardService,
        update_service::UpdateService,
    },
};

/// In-memory stand-in for the remote leaderboard API.
#[derive(Default)]
pub struct StubSource {
    snapshots: Mutex<HashMap<String, Vec<LeaderboardEntry>>>,
    failing: Mutex<HashSet<String>>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn set(&self, track_id: &str, entries: Vec<LeaderboardEntry>) {
        self.snapshots
            .lock()
            .unwrap()
            .insert(track_id.to_string(), entries);
    }

    pub fn fail(&self, track_id: &str) {
        self.failing.lock().unwrap().insert(track_id.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LeaderboardSource for StubSource {
    fn fetch<'a>(&'a self, track: &'a Track) -> BoxFuture<'a, Result<Vec<LeaderboardEntry>, FetchError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().contains(&track.id) {
                return Err(FetchError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(self
                .snapshots
                .lock()
                .unwrap()
                .get(&track.id)
                .cloned()
                .unwrap_or_default())
        })
    }
}

pub fn entry(user_id: &str, name: &str, frames: u64) -> LeaderboardEntry {
    LeaderboardEntry {
        user_id: user_id.to_string(),
        name: name.to_string(),
        frames,
    }
}

/// Builds a document where each user's samples are one minute apart.
pub fn document(rows: &[(&str, &str, &[f64])]) -> HistoryDocument {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    rows.iter()
        .map(|(user_id, name, times)| {
            let mut record = HistoryRecord::new(*name);
            for (i, seconds) in times.iter().enumerate() {
                record
                    .data
                    .push(Sample(start + chrono::Duration::minutes(i as i64), *seconds));
            }
            (user_id.to_string(), record)
        })
        .collect()
}

pub fn test_tracks(count: usize) -> Vec<Track> {
    (0..count)
        .map(|i| Track {
            name: format!("Test Track #{}", i + 1),
            id: format!("track-{i}"),
            code: format!("PolyTrackCode{i}"),
        })
        .collect()
}

pub fn test_config(root: &Path, tracks: Vec<Track>) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        history_dir: root.join("history"),
        static_dir: root.join("static"),
        api_base_url: "http://127.0.0.1:9".to_string(),
        api_version: "0.5.0".to_string(),
        user_token_hash: "test".to_string(),
        fetch_amount: 500,
        poll_interval: Duration::from_secs(3600),
        request_timeout: Duration::from_secs(1),
        fetch_retries: 1,
        retry_base_delay: Duration::from_millis(1),
        tracks,
    }
}

pub struct TestContext {
    pub app: Router,
    pub config: Arc<Config>,
    pub source: Arc<StubSource>,
    pub history: Arc<HistoryService>,
    pub update_service: Arc<UpdateService>,
    // keeps the temp directory alive for the test's duration
    _dir: TempDir,
}

pub fn setup(track_count: usize) -> TestContext {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = Arc::new(test_config(dir.path(), test_tracks(track_count)));

    let source = Arc::new(StubSource::default());
    let history = Arc::new(HistoryService::new(&config.history_dir, config.tracks.len()));
    let charts = Arc::new(ChartService::new(&config.static_dir));
    let update_service = Arc::new(UpdateService::new(
        config.clone(),
        source.clone(),
        history.clone(),
        charts,
    ));
    let leaderboard_service = Arc::new(LeaderboardService::new(config.clone(), history.clone()));

    let app = routes::init_routes(config.clone(), leaderboard_service, update_service.clone());

    TestContext {
        app,
        config,
        source,
        history,
        update_service,
        _dir: dir,
    }
}

/// Writes `history` as the document of track `index`.
pub async fn seed(history: &HistoryService, index: usize, document: HistoryDocument) {
    history
        .update(index, move |_| document)
        .await
        .expect("seed history");
}

pub async fn body_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
