use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use crate::{
    config::Config,
    models::{
        history::HistoryDocument,
        leaderboard::{OverallStanding, TrackStanding},
        track::TrackResponse,
    },
    services::{
        leaderboard_service::LeaderboardService,
        update_service::{CycleReport, UpdateService},
    },
};

type ApiState = (Arc<Config>, Arc<LeaderboardService>, Arc<UpdateService>);

fn check_index(config: &Config, index: usize) -> Result<(), (StatusCode, String)> {
    config
        .track(index)
        .map(|_| ())
        .ok_or((StatusCode::NOT_FOUND, "Invalid track".to_string()))
}

#[utoipa::path(
    get,
    path = "/api/tracks",
    responses(
        (status = 200, description = "Configured tracks", body = [TrackResponse])
    )
)]
pub async fn list_tracks(
    State((config, _leaderboard_service, _update_service)): State<ApiState>,
) -> Json<Vec<TrackResponse>> {
    Json(
        config
            .tracks
            .iter()
            .enumerate()
            .map(TrackResponse::from)
            .collect(),
    )
}

#[utoipa::path(
    get,
    path = "/api/tracks/{index}/leaderboard",
    params(
        ("index" = usize, Path, description = "Track index")
    ),
    responses(
        (status = 200, description = "Current standings, fastest first", body = [TrackStanding]),
        (status = 404, description = "Invalid track")
    )
)]
pub async fn get_track_leaderboard(
    State((config, leaderboard_service, _update_service)): State<ApiState>,
    Path(index): Path<usize>,
) -> Result<Json<Vec<TrackStanding>>, (StatusCode, String)> {
    check_index(&config, index)?;

    leaderboard_service
        .get_leaderboard(index)
        .await
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/tracks/{index}/history",
    params(
        ("index" = usize, Path, description = "Track index")
    ),
    responses(
        (status = 200, description = "Raw history document keyed by user id"),
        (status = 404, description = "Invalid track"),
        (status = 500, description = "History document unreadable")
    )
)]
pub async fn get_track_history(
    State((config, leaderboard_service, _update_service)): State<ApiState>,
    Path(index): Path<usize>,
) -> Result<Json<HistoryDocument>, (StatusCode, String)> {
    check_index(&config, index)?;

    leaderboard_service
        .get_history(index)
        .await
        .map(|history| Json(history.unwrap_or_default()))
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/overall",
    responses(
        (status = 200, description = "Cross-track ranking", body = [OverallStanding])
    )
)]
pub async fn get_overall(
    State((_config, leaderboard_service, _update_service)): State<ApiState>,
) -> Json<Vec<OverallStanding>> {
    Json(leaderboard_service.get_overall().await)
}

#[utoipa::path(
    post,
    path = "/api/refresh",
    responses(
        (status = 200, description = "Update cycle finished", body = CycleReport)
    )
)]
pub async fn refresh(
    State((_config, _leaderboard_service, update_service)): State<ApiState>,
) -> Json<CycleReport> {
    Json(update_service.run_cycle().await)
}

pub fn api_routes(
    config: Arc<Config>,
    leaderboard_service: Arc<LeaderboardService>,
    update_service: Arc<UpdateService>,
) -> Router {
    Router::new()
        .route("/api/tracks", get(list_tracks))
        .route("/api/tracks/{index}/leaderboard", get(get_track_leaderboard))
        .route("/api/tracks/{index}/history", get(get_track_history))
        .route("/api/overall", get(get_overall))
        .route("/api/refresh", post(refresh))
        .with_state((config, leaderboard_service, update_service))
}
