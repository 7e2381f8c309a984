use std::collections::HashSet;
use tracing::{debug, info};

use crate::models::EpisodeRecord;

/// Collapse exact-title duplicates in a single-source record list.
///
/// Grouping is by exact, case-sensitive title equality. The first record
/// encountered for a title survives; later ones are dropped along with
/// their auxiliary payloads. Deletion is destructive within the run —
/// callers snapshot first if they need rollback.
///
/// Returns the collapsed list and the number of records removed.
pub fn collapse_duplicates(records: Vec<EpisodeRecord>) -> (Vec<EpisodeRecord>, usize) {
    let before = records.len();

    let mut seen: HashSet<String> = HashSet::with_capacity(before);
    let mut out = Vec::with_capacity(before);
    for rec in records {
        if seen.insert(rec.title.clone()) {
            out.push(rec);
        } else {
            debug!("Dropping duplicate - id={}, title={:?}", rec.id, rec.title);
        }
    }

    let removed = before - out.len();
    if removed > 0 {
        info!(
            "Duplicate collapse - removed={}, retained={}",
            removed,
            out.len()
        );
    } else {
        debug!("Duplicate collapse - no duplicates, retained={}", out.len());
    }

    (out, removed)
}
