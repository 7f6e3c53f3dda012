use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A leaderboard tracked by the service. Loaded once at startup.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Track {
    pub name: String,
    /// Remote track id used by the leaderboard API.
    pub id: String,
    /// Share code players paste into the game to load the track.
    pub code: String,
}

/// Response DTO for `/api/tracks`
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct TrackResponse {
    pub index: usize,
    pub name: String,
    pub id: String,
    pub code: String,
}

impl From<(usize, &Track)> for TrackResponse {
    fn from((index, track): (usize, &Track)) -> Self {
        TrackResponse {
            index,
            name: track.name.clone(),
            id: track.id.clone(),
            code: track.code.clone(),
        }
    }
}
