//! Time alignment of per-server sample streams onto a shared axis.
//!
//! Servers report samples on independent clocks; to chart them together
//! the samples are merged onto one shared time axis. [`align`] builds the
//! axis as the sorted, deduplicated union of every sample instant and
//! gives each server a positionally aligned value sequence, with explicit
//! gaps where a server has no sample (or was offline) at an axis slot.
//!
//! The result is rebuilt from scratch on every applied refresh and
//! replaced wholesale, never patched in place: the server set and sample
//! counts can change between refreshes, and incremental updates would
//! invite stale-index bugs.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use super::record::{ActivityRecord, ActivitySnapshot};

/// Sample streams aligned onto a shared time axis.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    axis: Vec<NaiveDateTime>,
    axis_millis: Vec<i64>,
    series: Vec<EntitySeries>,
}

/// One server's aligned values plus its original records for inspection.
#[derive(Debug, Clone)]
pub struct EntitySeries {
    server: String,
    /// One slot per axis position; `None` is a gap, distinct from zero.
    points: Vec<Option<u32>>,
    /// Records sorted ascending by creation time, ties in input order.
    records: Vec<ActivityRecord>,
    /// Normalized instant -> index into `records`; duplicates overwrite,
    /// so the last record for an instant wins.
    by_instant: HashMap<i64, usize>,
}

impl EntitySeries {
    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn points(&self) -> &[Option<u32>] {
        &self.points
    }

    /// The record backing a given normalized instant, if any.
    pub fn record_at_instant(&self, instant_millis: i64) -> Option<&ActivityRecord> {
        self.by_instant.get(&instant_millis).map(|&i| &self.records[i])
    }
}

impl AlignedSeries {
    /// The shared axis: sorted, deduplicated sample instants.
    pub fn axis(&self) -> &[NaiveDateTime] {
        &self.axis
    }

    /// Per-server series in first-seen input order.
    pub fn series(&self) -> &[EntitySeries] {
        &self.series
    }

    pub fn is_empty(&self) -> bool {
        self.axis.is_empty()
    }

    /// Resolve the original record rendered at an axis slot for a series.
    ///
    /// Returns `None` for a gap, including offline samples: inspection of
    /// offline slots goes through [`EntitySeries::record_at_instant`],
    /// which still resolves the record.
    pub fn record_at(&self, series_idx: usize, axis_idx: usize) -> Option<&ActivityRecord> {
        let instant = *self.axis_millis.get(axis_idx)?;
        self.series.get(series_idx)?.record_at_instant(instant)
    }

    /// Largest aligned value across all series, if any value exists.
    pub fn max_value(&self) -> Option<u32> {
        self.series.iter().flat_map(|s| s.points.iter().flatten().copied()).max()
    }
}

/// Merge per-server sample lists onto a shared time axis.
///
/// Each server's samples are stably sorted by creation time, the axis is
/// built as the sorted union of normalized instants across all servers,
/// and each server gets one value per axis slot: the player count where
/// an online sample exists at that exact instant, a gap otherwise. Gaps
/// are never interpolated here; bridging them visually is the chart's
/// concern. Servers come back in first-seen input order so that color
/// assignment is reproducible for an unchanged server set.
pub fn align(snapshot: &ActivitySnapshot) -> AlignedSeries {
    // Axis keys map to the first datetime seen for that millisecond, so
    // sub-millisecond stragglers collapse onto one slot.
    let mut axis_by_millis: BTreeMap<i64, NaiveDateTime> = BTreeMap::new();
    let mut per_server: Vec<(String, Vec<ActivityRecord>)> = Vec::with_capacity(snapshot.len());

    for (server, records) in snapshot {
        let mut records = records.clone();
        records.sort_by_key(ActivityRecord::instant_millis);
        for record in &records {
            axis_by_millis
                .entry(record.instant_millis())
                .or_insert(record.record_creation_time);
        }
        per_server.push((server.clone(), records));
    }

    let axis_millis: Vec<i64> = axis_by_millis.keys().copied().collect();
    let axis: Vec<NaiveDateTime> = axis_by_millis.into_values().collect();

    let series = per_server
        .into_iter()
        .map(|(server, records)| {
            let mut by_instant = HashMap::with_capacity(records.len());
            for (i, record) in records.iter().enumerate() {
                by_instant.insert(record.instant_millis(), i);
            }
            let points = axis_millis
                .iter()
                .map(|instant| {
                    by_instant.get(instant).and_then(|&i| {
                        let record: &ActivityRecord = &records[i];
                        record.online.then_some(record.player_count)
                    })
                })
                .collect();
            EntitySeries { server, points, records, by_instant }
        })
        .collect();

    AlignedSeries { axis, axis_millis, series }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(server: &str, time: &str, online: bool, player_count: u32) -> ActivityRecord {
        ActivityRecord {
            server: server.to_string(),
            record_creation_time: time.parse().unwrap(),
            data_retrieval_time: None,
            online,
            player_count,
        }
    }

    fn snapshot(entries: Vec<(&str, Vec<ActivityRecord>)>) -> ActivitySnapshot {
        entries.into_iter().map(|(s, r)| (s.to_string(), r)).collect()
    }

    #[test]
    fn test_two_servers_two_instants() {
        let input = snapshot(vec![
            ("A", vec![record("A", "2025-01-10T12:00:00", true, 5)]),
            ("B", vec![record("B", "2025-01-10T12:01:00", true, 3)]),
        ]);
        let aligned = align(&input);

        assert_eq!(aligned.axis().len(), 2);
        assert_eq!(aligned.series()[0].points(), &[Some(5), None]);
        assert_eq!(aligned.series()[1].points(), &[None, Some(3)]);
    }

    #[test]
    fn test_axis_dedups_across_servers() {
        let input = snapshot(vec![
            (
                "A",
                vec![
                    record("A", "2025-01-10T12:00:00", true, 1),
                    record("A", "2025-01-10T12:01:00", true, 2),
                ],
            ),
            (
                "B",
                vec![
                    record("B", "2025-01-10T12:01:00", true, 7),
                    record("B", "2025-01-10T12:02:00", true, 8),
                ],
            ),
        ]);
        let aligned = align(&input);

        // 4 records, 3 distinct instants
        assert_eq!(aligned.axis().len(), 3);
        assert_eq!(aligned.series()[0].points(), &[Some(1), Some(2), None]);
        assert_eq!(aligned.series()[1].points(), &[None, Some(7), Some(8)]);
    }

    #[test]
    fn test_offline_record_is_a_gap_not_a_count() {
        let input = snapshot(vec![(
            "A",
            vec![
                record("A", "2025-01-10T12:00:00", false, 7),
                record("A", "2025-01-10T12:01:00", true, 0),
            ],
        )]);
        let aligned = align(&input);

        // Offline never yields its carried count, and a genuine zero is
        // not a gap.
        assert_eq!(aligned.series()[0].points(), &[None, Some(0)]);

        // The offline record is still reachable for inspection.
        let instant = aligned.axis()[0].and_utc().timestamp_millis();
        let rec = aligned.series()[0].record_at_instant(instant).unwrap();
        assert!(!rec.online);
        assert_eq!(rec.player_count, 7);
    }

    #[test]
    fn test_server_with_no_samples_is_all_gaps() {
        let input = snapshot(vec![
            ("A", vec![record("A", "2025-01-10T12:00:00", true, 5)]),
            ("B", vec![]),
        ]);
        let aligned = align(&input);

        assert_eq!(aligned.series().len(), 2);
        assert_eq!(aligned.series()[1].points().len(), aligned.axis().len());
        assert!(aligned.series()[1].points().iter().all(Option::is_none));
    }

    #[test]
    fn test_empty_input() {
        let aligned = align(&ActivitySnapshot::new());
        assert!(aligned.is_empty());
        assert!(aligned.series().is_empty());
        assert!(aligned.max_value().is_none());
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let input = snapshot(vec![(
            "A",
            vec![
                record("A", "2025-01-10T12:02:00", true, 3),
                record("A", "2025-01-10T12:00:00", true, 1),
                record("A", "2025-01-10T12:01:00", true, 2),
            ],
        )]);
        let aligned = align(&input);
        assert_eq!(aligned.series()[0].points(), &[Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_duplicate_instant_last_write_wins() {
        let input = snapshot(vec![(
            "A",
            vec![
                record("A", "2025-01-10T12:00:00", true, 1),
                record("A", "2025-01-10T12:00:00", true, 9),
            ],
        )]);
        let aligned = align(&input);
        assert_eq!(aligned.axis().len(), 1);
        assert_eq!(aligned.series()[0].points(), &[Some(9)]);
    }

    #[test]
    fn test_first_seen_order_is_preserved() {
        let input = snapshot(vec![
            ("zeta", vec![record("zeta", "2025-01-10T12:00:00", true, 1)]),
            ("alpha", vec![record("alpha", "2025-01-10T12:00:00", true, 2)]),
        ]);
        let aligned = align(&input);
        assert_eq!(aligned.series()[0].server(), "zeta");
        assert_eq!(aligned.series()[1].server(), "alpha");
    }

    #[test]
    fn test_align_is_deterministic() {
        let input = snapshot(vec![
            (
                "A",
                vec![
                    record("A", "2025-01-10T12:00:00", true, 5),
                    record("A", "2025-01-10T12:05:00", false, 0),
                ],
            ),
            ("B", vec![record("B", "2025-01-10T12:03:00", true, 3)]),
        ]);
        let first = align(&input);
        let second = align(&input);

        assert_eq!(first.axis(), second.axis());
        assert_eq!(first.series().len(), second.series().len());
        for (a, b) in first.series().iter().zip(second.series()) {
            assert_eq!(a.server(), b.server());
            assert_eq!(a.points(), b.points());
        }
    }

    #[test]
    fn test_record_at_resolves_metadata() {
        let mut rec = record("A", "2025-01-10T12:00:00", true, 5);
        rec.data_retrieval_time = Some("2025-01-10T11:59:58".parse().unwrap());
        let input = snapshot(vec![
            ("A", vec![rec]),
            ("B", vec![record("B", "2025-01-10T12:01:00", true, 3)]),
        ]);
        let aligned = align(&input);

        let found = aligned.record_at(0, 0).unwrap();
        assert_eq!(found.player_count, 5);
        assert!(found.data_retrieval_time.is_some());

        // B has no sample at the first slot
        assert!(aligned.record_at(1, 0).is_none());
        // Out-of-range indices are not an error
        assert!(aligned.record_at(5, 0).is_none());
        assert!(aligned.record_at(0, 9).is_none());
    }

    #[test]
    fn test_max_value_spans_all_series() {
        let input = snapshot(vec![
            ("A", vec![record("A", "2025-01-10T12:00:00", true, 5)]),
            ("B", vec![record("B", "2025-01-10T12:01:00", true, 12)]),
        ]);
        assert_eq!(align(&input).max_value(), Some(12));
    }
}
