use std::{cmp::Reverse, collections::HashMap};

use chrono::{DateTime, Utc};

use crate::models::{
    history::HistoryDocument,
    leaderboard::{OverallStanding, Placement, TrackStanding},
};

/// Ranks one track by each user's latest time, fastest first.
///
/// Users without samples are left out. Equal times are ordered by user id so
/// the result is reproducible regardless of document order.
pub fn rank_track(history: &HistoryDocument) -> Vec<TrackStanding> {
    let mut rows: Vec<(&str, &str, f64)> = history
        .iter()
        .filter_map(|(user_id, record)| {
            record
                .latest()
                .map(|sample| (user_id.as_str(), record.name.as_str(), sample.seconds()))
        })
        .collect();

    rows.sort_by(|a, b| a.2.total_cmp(&b.2).then_with(|| a.0.cmp(b.0)));

    rows.into_iter()
        .enumerate()
        .map(|(i, (user_id, name, time))| TrackStanding {
            place: i + 1,
            user_id: user_id.to_string(),
            name: name.to_string(),
            time,
        })
        .collect()
}

struct OverallAcc {
    name: String,
    // (latest sample time, track index) the name was taken from
    name_source: (DateTime<Utc>, Reverse<usize>),
    places: Vec<Placement>,
}

/// Builds the cross-track leaderboard.
///
/// Users are ordered by number of tracks appeared on (most first), then by
/// average place (lowest first), then by user id. Placements are listed by
/// track index and the display name comes from the user's most recent sample,
/// so feeding the tracks in a different order gives the same result.
pub fn aggregate_overall<'a, I>(tracks: I) -> Vec<OverallStanding>
where
    I: IntoIterator<Item = (usize, &'a HistoryDocument)>,
{
    let mut overall: HashMap<String, OverallAcc> = HashMap::new();

    for (track_index, history) in tracks {
        for standing in rank_track(history) {
            let latest_at = history
                .get(&standing.user_id)
                .and_then(|record| record.latest())
                .map(|sample| sample.recorded_at())
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            let source = (latest_at, Reverse(track_index));

            let acc = overall
                .entry(standing.user_id.clone())
                .or_insert_with(|| OverallAcc {
                    name: standing.name.clone(),
                    name_source: source,
                    places: Vec::new(),
                });
            if source > acc.name_source {
                acc.name = standing.name.clone();
                acc.name_source = source;
            }
            acc.places.push(Placement {
                track_index,
                place: standing.place,
            });
        }
    }

    let mut leaderboard: Vec<OverallStanding> = overall
        .into_iter()
        .map(|(user_id, mut acc)| {
            acc.places.sort_by_key(|p| p.track_index);
            let total: usize = acc.places.iter().map(|p| p.place).sum();
            OverallStanding {
                user_id,
                name: acc.name,
                maps_completed: acc.places.len(),
                avg_place: total as f64 / acc.places.len() as f64,
                places: acc.places,
            }
        })
        .collect();

    leaderboard.sort_by(|a, b| {
        b.maps_completed
            .cmp(&a.maps_completed)
            .then_with(|| a.avg_place.total_cmp(&b.avg_place))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    leaderboard
}
