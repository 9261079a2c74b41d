//! Wire types for backend activity payloads.
//!
//! These types match the JSON produced by the activity backend's REST API.
//! The backend sends zone-less ISO-8601 timestamps (e.g.
//! `2025-01-10T12:34:56`), so timestamps are carried as [`NaiveDateTime`]
//! and normalized to millisecond-precision epoch values for alignment.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Activity samples keyed by server, in backend document order.
///
/// Insertion order matters: it defines the first-seen order of servers,
/// which drives series ordering and color assignment in the chart.
pub type ActivitySnapshot = IndexMap<String, Vec<ActivityRecord>>;

/// One observation of a server's status at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Server hostname; stable key.
    pub server: String,

    /// When the underlying state was true (source-side creation time).
    /// This is the only field used for time alignment.
    pub record_creation_time: NaiveDateTime,

    /// When the sample was fetched from the upstream provider.
    /// Diagnostic only, shown on point inspection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_retrieval_time: Option<NaiveDateTime>,

    /// Whether the server was reachable at that time.
    pub online: bool,

    /// Number of players online. Meaningful only when `online`; an
    /// offline record aligns to a gap regardless of this value.
    pub player_count: u32,
}

impl ActivityRecord {
    /// Millisecond-precision epoch value of the creation time.
    ///
    /// This is the normalized key used for axis dedup and point lookup;
    /// two records whose instants are equal at millisecond precision
    /// share one axis slot.
    pub fn instant_millis(&self) -> i64 {
        self.record_creation_time.and_utc().timestamp_millis()
    }
}

/// Decode a summary payload leniently.
///
/// The payload maps server names to arrays of records; the map is taken
/// as an [`IndexMap`] so backend document order survives decoding.
/// Records that fail to decode (e.g. missing `recordCreationTime`) are
/// dropped individually; a non-array entity value yields that server
/// with zero records, so the server is still discovered and renders as
/// an all-gap series. A payload with zero valid records decodes to an
/// empty snapshot, not an error.
pub fn decode_snapshot(entries: IndexMap<String, Value>) -> ActivitySnapshot {
    let mut snapshot = ActivitySnapshot::with_capacity(entries.len());
    for (server, entry) in entries {
        let records = match entry {
            Value::Array(items) => {
                let total = items.len();
                let records: Vec<ActivityRecord> = items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect();
                if records.len() < total {
                    tracing::debug!(
                        server = %server,
                        dropped = total - records.len(),
                        "dropped malformed activity records"
                    );
                }
                records
            }
            _ => {
                tracing::debug!(server = %server, "activity entry is not an array");
                Vec::new()
            }
        };
        snapshot.insert(server, records);
    }
    snapshot
}

/// Flatten a snapshot into rows for the activity table, newest first.
pub fn flatten_recent(snapshot: ActivitySnapshot) -> Vec<ActivityRecord> {
    let mut rows: Vec<ActivityRecord> =
        snapshot.into_iter().flat_map(|(_, records)| records).collect();
    rows.sort_by_key(|r| std::cmp::Reverse(r.instant_millis()));
    rows
}

/// The most recent record in a server's sample list, if any.
///
/// Ties on the aligned instant resolve to the later record in input
/// order, consistent with the aligner's last-write-wins rule.
pub fn latest(records: &[ActivityRecord]) -> Option<&ActivityRecord> {
    records.iter().max_by_key(|r| r.instant_millis())
}
