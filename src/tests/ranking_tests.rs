#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::{
        models::history::{HistoryDocument, HistoryRecord},
        services::{
            history_service::merge_snapshot,
            ranking::{aggregate_overall, rank_track},
        },
        tests::common::{document, entry},
    };

    fn ids(history: &HistoryDocument) -> Vec<String> {
        rank_track(history).into_iter().map(|s| s.user_id).collect()
    }

    #[test]
    fn first_snapshot_ranks_fastest_first() {
        // Arrange
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = vec![entry("uidA", "Ann", 12345), entry("uidB", "Bob", 9000)];

        // Act
        let history = merge_snapshot(HistoryDocument::new(), &snapshot, at);
        let ranked = rank_track(&history);

        // Assert
        let rows: Vec<(&str, f64)> = ranked.iter().map(|s| (s.name.as_str(), s.time)).collect();
        assert_eq!(rows, vec![("Bob", 9.0), ("Ann", 12.345)]);
        assert_eq!(ranked[0].place, 1);
        assert_eq!(ranked[1].place, 2);
    }

    #[test]
    fn ranks_by_latest_sample_and_skips_empty_series() {
        let mut history = document(&[
            ("a", "Ann", &[20.0, 8.0]),
            ("b", "Bob", &[5.0, 10.0]),
            ("c", "Cid", &[9.5]),
        ]);
        history.insert("d".to_string(), HistoryRecord::new("Dee"));

        let ranked = rank_track(&history);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(
            ranked.iter().map(|s| s.user_id.as_str()).collect::<Vec<_>>(),
            vec!["a", "c", "b"]
        );
        assert_eq!(ranked[0].time, 8.0);
    }

    #[test]
    fn equal_times_are_ordered_by_user_id() {
        let history = document(&[("zed", "Zed", &[10.0]), ("amy", "Amy", &[10.0]), ("kim", "Kim", &[10.0])]);

        assert_eq!(ids(&history), vec!["amy", "kim", "zed"]);
    }

    #[test]
    fn merge_appends_exactly_one_sample_per_entry() {
        // Arrange
        let before = document(&[("a", "Ann", &[12.0, 11.5]), ("b", "Bob", &[9.0])]);
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let snapshot = vec![entry("a", "Annie", 11000), entry("c", "Cid", 15000)];

        // Act
        let after = merge_snapshot(before.clone(), &snapshot, at);

        // Assert
        assert_eq!(after["a"].data.len(), 3);
        assert_eq!(after["a"].data[..2], before["a"].data[..]);
        assert_eq!(after["a"].latest().unwrap().seconds(), 11.0);
        assert_eq!(after["a"].latest().unwrap().recorded_at(), at);
        assert_eq!(after["a"].name, "Annie");
        assert_eq!(after["b"], before["b"]);
        assert_eq!(after["c"].data.len(), 1);
        assert_eq!(after["c"].name, "Cid");
    }

    #[test]
    fn unchanged_times_still_add_samples() {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let snapshot = vec![entry("a", "Ann", 9000)];

        let once = merge_snapshot(HistoryDocument::new(), &snapshot, at);
        let twice = merge_snapshot(once, &snapshot, at + chrono::Duration::minutes(5));

        assert_eq!(twice["a"].data.len(), 2);
        assert_eq!(twice["a"].data[0].seconds(), twice["a"].data[1].seconds());
    }

    #[test]
    fn more_tracks_beats_better_average() {
        // Arrange: x is 1st on track 0 and 3rd on track 1, y is 2nd on track 0 only
        let track0 = document(&[("x", "X", &[10.0]), ("y", "Y", &[11.0])]);
        let track1 = document(&[("a", "A", &[5.0]), ("b", "B", &[6.0]), ("x", "X", &[7.0])]);

        // Act
        let overall = aggregate_overall([(0, &track0), (1, &track1)]);

        // Assert
        let order: Vec<&str> = overall.iter().map(|s| s.user_id.as_str()).collect();
        assert_eq!(order, vec!["x", "a", "b", "y"]);

        let x = &overall[0];
        assert_eq!(x.maps_completed, 2);
        assert_eq!(x.avg_place, 2.0);
        assert_eq!(x.places.iter().map(|p| (p.track_index, p.place)).collect::<Vec<_>>(), vec![(0, 1), (1, 3)]);

        let y = overall.iter().find(|s| s.user_id == "y").unwrap();
        assert_eq!(y.maps_completed, 1);
        assert_eq!(y.avg_place, 2.0);
    }

    #[test]
    fn overall_is_ordered_by_breadth_then_average() {
        let track0 = document(&[("a", "A", &[1.0]), ("b", "B", &[2.0]), ("c", "C", &[3.0])]);
        let track1 = document(&[("c", "C", &[1.0]), ("b", "B", &[2.0])]);
        let track2 = document(&[("b", "B", &[1.0]), ("d", "D", &[2.0])]);

        let overall = aggregate_overall([(0, &track0), (1, &track1), (2, &track2)]);

        for pair in overall.windows(2) {
            let (hi, lo) = (&pair[0], &pair[1]);
            assert!(
                hi.maps_completed > lo.maps_completed
                    || (hi.maps_completed == lo.maps_completed && hi.avg_place <= lo.avg_place)
            );
        }
        assert_eq!(overall[0].user_id, "b");
    }

    #[test]
    fn overall_does_not_depend_on_track_order() {
        let track0 = document(&[("a", "Ann", &[10.0]), ("b", "Bob", &[12.0]), ("c", "Cid", &[11.0])]);
        let track1 = document(&[("b", "Bobby", &[4.0, 3.0]), ("a", "Ann", &[6.0])]);
        let track2 = document(&[("c", "Cid", &[30.0]), ("a", "Ann", &[31.0]), ("d", "Dee", &[29.0])]);

        let forward = aggregate_overall([(0, &track0), (1, &track1), (2, &track2)]);
        let backward = aggregate_overall([(2, &track2), (1, &track1), (0, &track0)]);
        let shuffled = aggregate_overall([(1, &track1), (0, &track0), (2, &track2)]);

        assert_eq!(forward, backward);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn overall_name_comes_from_most_recent_sample() {
        // Bob was renamed; track 1 has the later sample
        let track0 = document(&[("b", "Bob", &[12.0])]);
        let track1 = document(&[("b", "Bobby", &[4.0, 3.0])]);

        let overall = aggregate_overall([(0, &track0), (1, &track1)]);

        assert_eq!(overall[0].name, "Bobby");
    }

    #[test]
    fn overall_of_nothing_is_empty() {
        let empty = HistoryDocument::new();
        assert!(aggregate_overall([(0, &empty)]).is_empty());
    }
}
