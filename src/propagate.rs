use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

use crate::models::{EpisodeRecord, Match};

/// Write each accepted match's link onto its primary record.
///
/// The link is the matched secondary record's own URL, id and title, with
/// the combined score as confidence.
pub fn apply_matches(
    mut primary: Vec<EpisodeRecord>,
    secondary: &[EpisodeRecord],
    matches: &[Match],
) -> Vec<EpisodeRecord> {
    let by_id: HashMap<&str, &EpisodeRecord> =
        secondary.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut index: HashMap<String, usize> = HashMap::with_capacity(primary.len());
    for (i, p) in primary.iter().enumerate() {
        index.insert(p.id.clone(), i);
    }

    let mut applied = 0usize;
    for m in matches {
        let (Some(&i), Some(sec)) = (index.get(&m.primary_id), by_id.get(m.secondary_id.as_str()))
        else {
            continue;
        };
        let target = &mut primary[i];
        target.external_link = sec.media_url.clone();
        target.linked_id = Some(sec.id.clone());
        target.linked_title = Some(sec.title.clone());
        target.link_confidence = Some(m.combined_score);
        applied += 1;
    }

    debug!("Link application - matches={}, applied={}", matches.len(), applied);
    primary
}

/// Stable identifier for a (title, duration) sibling group.
fn group_id(title: &str, duration: Option<u32>) -> String {
    let seed = format!("{}|{}", title, duration.map_or(-1i64, i64::from));
    format!("{:016x}", xxh3_64(seed.as_bytes()))
}

/// Spread links across duplicate groups that survived collapsing.
///
/// Groups the whole merged view by the `(title, duration_seconds)` identity
/// key; wherever at least one sibling carries a link, every sibling without
/// one receives a copy. Groups with no linked member are left alone.
///
/// Returns the records and the number of links copied.
pub fn propagate_links(mut records: Vec<EpisodeRecord>) -> (Vec<EpisodeRecord>, usize) {
    let groups: HashMap<(String, Option<u32>), Vec<usize>> = records
        .iter()
        .enumerate()
        .map(|(i, r)| ((r.title.clone(), r.duration_seconds), i))
        .into_group_map();

    let mut copied = 0usize;
    for ((title, duration), members) in groups {
        if members.len() < 2 {
            continue;
        }

        // Donor: the first sibling in encounter order that has a link.
        let Some(&donor) = members.iter().find(|&&i| records[i].has_link()) else {
            continue;
        };

        let link = (
            records[donor].external_link.clone(),
            records[donor].linked_id.clone(),
            records[donor].linked_title.clone(),
            records[donor].link_confidence,
        );

        let mut group_copied = 0usize;
        for &i in &members {
            if records[i].has_link() {
                continue;
            }
            records[i].external_link = link.0.clone();
            records[i].linked_id = link.1.clone();
            records[i].linked_title = link.2.clone();
            records[i].link_confidence = link.3;
            group_copied += 1;
        }

        if group_copied > 0 {
            debug!(
                "Propagated link - group={}, siblings={}, copied={}",
                group_id(&title, duration),
                members.len(),
                group_copied
            );
            copied += group_copied;
        }
    }

    if copied > 0 {
        info!("Link propagation - copied={}", copied);
    } else {
        debug!("Link propagation - nothing to copy");
    }

    (records, copied)
}
