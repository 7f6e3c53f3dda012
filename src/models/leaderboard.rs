use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of a remote leaderboard snapshot.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    /// Finish time in milliseconds.
    pub frames: u64,
}

impl LeaderboardEntry {
    pub fn seconds(&self) -> f64 {
        self.frames as f64 / 1000.0
    }
}

/// A user's current position on one track.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct TrackStanding {
    pub place: usize,
    pub user_id: String,
    pub name: String,
    /// Latest recorded time in seconds.
    pub time: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Placement {
    pub track_index: usize,
    pub place: usize,
}

/// A user's cross-track ranking entry.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct OverallStanding {
    pub user_id: String,
    pub name: String,
    pub maps_completed: usize,
    pub avg_place: f64,
    pub places: Vec<Placement>,
}
