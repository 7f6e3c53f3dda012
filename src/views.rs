//! Server-rendered HTML pages. Templates live under `templates/` and escape
//! every interpolated value.

use askama::Template;
use axum::{http::StatusCode, response::Html};

use crate::models::{
    leaderboard::{OverallStanding, TrackStanding},
    track::Track,
};

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage<'a> {
    pub tracks: &'a [Track],
}

#[derive(Template)]
#[template(path = "track.html")]
pub struct TrackPage<'a> {
    pub track: &'a Track,
    pub leaderboard: &'a [TrackStanding],
    /// File name under `/static/`.
    pub chart_file: String,
}

#[derive(Template)]
#[template(path = "overall.html")]
pub struct OverallPage<'a> {
    pub leaderboard: &'a [OverallStanding],
}

pub fn render<T: Template>(page: &T) -> Result<Html<String>, (StatusCode, String)> {
    page.render().map(Html).map_err(|e| {
        tracing::error!("page rendering failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Page rendering failed".to_string(),
        )
    })
}
