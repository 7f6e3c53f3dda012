use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::{
    config::Config,
    services::{leaderboard_service::LeaderboardService, update_service::UpdateService},
};

pub mod api;
pub mod pages;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check OK")
    )
)]
pub async fn health_check() -> &'static str {
    "OK"
}

pub fn init_routes(
    config: Arc<Config>,
    leaderboard_service: Arc<LeaderboardService>,
    update_service: Arc<UpdateService>,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(pages::page_routes(
            config.clone(),
            leaderboard_service.clone(),
            update_service.clone(),
        ))
        .merge(api::api_routes(config.clone(), leaderboard_service, update_service))
        .nest_service("/static", ServeDir::new(&config.static_dir))
}
