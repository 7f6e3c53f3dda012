use axum::{routing::get, Json, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

use crate::{
    config::Config,
    routes::init_routes,
    services::{
        chart_service::ChartService, history_service::HistoryService,
        leaderboard_client::LeaderboardClient, leaderboard_service::LeaderboardService,
        scheduler::Poller, update_service::UpdateService,
    },
};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod views;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        routes::api::list_tracks,
        routes::api::get_track_leaderboard,
        routes::api::get_track_history,
        routes::api::get_overall,
        routes::api::refresh,
    ),
    components(
        schemas(
            models::track::TrackResponse,
            models::leaderboard::TrackStanding,
            models::leaderboard::OverallStanding,
            models::leaderboard::Placement,
            services::update_service::CycleReport,
            services::update_service::TrackOutcome,
        )
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = Arc::new(Config::from_env()?);
    tokio::fs::create_dir_all(&config.history_dir).await?;
    tokio::fs::create_dir_all(&config.static_dir).await?;
    tracing::info!(
        tracks = config.tracks.len(),
        history_dir = %config.history_dir.display(),
        "configuration loaded"
    );

    let history = Arc::new(HistoryService::new(&config.history_dir, config.tracks.len()));
    let charts = Arc::new(ChartService::new(&config.static_dir));
    let client = Arc::new(LeaderboardClient::new(&config)?);

    let update_service = Arc::new(UpdateService::new(
        config.clone(),
        client,
        history.clone(),
        charts,
    ));
    let leaderboard_service = Arc::new(LeaderboardService::new(config.clone(), history));

    let poller = Poller::spawn(update_service.clone(), config.poll_interval);

    let app = Router::new()
        .merge(init_routes(config.clone(), leaderboard_service, update_service))
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    poller.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests;
