use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, Redirect},
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::{
    config::Config,
    services::{
        chart_service::chart_file_name, leaderboard_service::LeaderboardService,
        update_service::UpdateService,
    },
    views::{self, HomePage, OverallPage, TrackPage},
};

type PageState = (Arc<Config>, Arc<LeaderboardService>, Arc<UpdateService>);

pub async fn home(
    State((config, _leaderboard_service, _update_service)): State<PageState>,
) -> Result<Html<String>, (StatusCode, String)> {
    views::render(&HomePage {
        tracks: &config.tracks,
    })
}

pub async fn track_page(
    State((config, leaderboard_service, update_service)): State<PageState>,
    Path(index): Path<usize>,
) -> Result<Html<String>, (StatusCode, String)> {
    let track = config
        .track(index)
        .ok_or((StatusCode::NOT_FOUND, "Invalid track".to_string()))?;

    // first visit before the poller has written anything
    if let Err(e) = update_service.ensure_history(index).await {
        tracing::warn!(index, "on-demand refresh failed: {e}");
    }

    let leaderboard = leaderboard_service
        .get_leaderboard(index)
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    views::render(&TrackPage {
        track,
        leaderboard: &leaderboard,
        chart_file: chart_file_name(index),
    })
}

pub async fn overall_page(
    State((_config, leaderboard_service, _update_service)): State<PageState>,
) -> Result<Html<String>, (StatusCode, String)> {
    let leaderboard = leaderboard_service.get_overall().await;
    views::render(&OverallPage {
        leaderboard: &leaderboard,
    })
}

/// Runs one full update cycle, then goes back home.
pub async fn ping(
    State((_config, _leaderboard_service, update_service)): State<PageState>,
) -> Redirect {
    update_service.run_cycle().await;
    Redirect::to("/")
}

pub fn page_routes(
    config: Arc<Config>,
    leaderboard_service: Arc<LeaderboardService>,
    update_service: Arc<UpdateService>,
) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/track/{index}", get(track_page))
        .route("/overall", get(overall_page))
        .route("/ping", get(ping))
        .with_state((config, leaderboard_service, update_service))
}
