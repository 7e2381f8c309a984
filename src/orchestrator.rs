use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::collapse::collapse_duplicates;
use crate::consolidate::{absorb_cross_listed, ConsolidateParams};
use crate::dates::{infer_missing_dates, normalize_timestamps, SeasonTable};
use crate::errors::{ReconcileError, Result};
use crate::matching::{greedy_match, rank_candidates, MatchParams};
use crate::models::{EpisodeRecord, Match, Source};
use crate::propagate::{apply_matches, propagate_links};
use crate::report::{summarize_top_matches, MatchReport};

#[derive(Debug, Clone)]
pub struct ReconcileParams {
    pub matching: MatchParams,
    pub consolidate: ConsolidateParams,
    /// How many matches to detail in the report.
    pub report_top_n: usize,
}

impl Default for ReconcileParams {
    fn default() -> Self {
        Self {
            matching: MatchParams::default(),
            consolidate: ConsolidateParams::default(),
            report_top_n: 20,
        }
    }
}

/// Everything a run produces: the merged record set, the accepted matches
/// (best score first) and the structured report.
#[derive(Debug, Clone)]
pub struct ReconcileOutput {
    pub records: Vec<EpisodeRecord>,
    pub matches: Vec<Match>,
    pub report: MatchReport,
}

fn validate_source(records: &[EpisodeRecord], expected: Source, label: &str) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    for rec in records {
        if rec.id.trim().is_empty() {
            return Err(ReconcileError::Validation(format!(
                "{} record with empty id (title {:?})",
                label, rec.title
            )));
        }
        if rec.source != expected {
            return Err(ReconcileError::Validation(format!(
                "record {} tagged {:?} supplied in the {} collection",
                rec.id, rec.source, label
            )));
        }
        if !seen.insert(&rec.id) {
            return Err(ReconcileError::Validation(format!(
                "duplicate {} id: {}",
                label, rec.id
            )));
        }
    }
    Ok(())
}

/// Run the full reconciliation pipeline over two in-memory collections.
///
/// Stages, in order: validate → collapse primary duplicates → rank and
/// greedily match primary × secondary → apply links → absorb cross-listed
/// secondaries → propagate links across (title, duration) siblings →
/// normalize raw timestamps → infer missing dates from titles.
///
/// Season tables are caller-supplied configuration; the engine performs no
/// I/O. Per-record defects degrade to missing signals and are reflected in
/// the report counts; the only fatal error is invalid input shape.
pub fn reconcile(
    primary: Vec<EpisodeRecord>,
    secondary: Vec<EpisodeRecord>,
    tables: &[SeasonTable],
    params: &ReconcileParams,
) -> Result<ReconcileOutput> {
    info!(
        "Reconciliation started - primary={}, secondary={}, season_tables={}",
        primary.len(),
        secondary.len(),
        tables.len()
    );

    validate_source(&primary, Source::Primary, "primary")?;
    validate_source(&secondary, Source::Secondary, "secondary")?;

    let primary_total = primary.len();
    let secondary_total = secondary.len();

    // Titles for the report, captured before any stage rewrites the sets.
    let primary_titles: HashMap<String, String> = primary
        .iter()
        .map(|r| (r.id.clone(), r.title.clone()))
        .collect();
    let secondary_titles: HashMap<String, String> = secondary
        .iter()
        .map(|r| (r.id.clone(), r.title.clone()))
        .collect();

    // 1) collapse exact-title duplicates in the primary feed
    let (primary, duplicates_collapsed) = collapse_duplicates(primary);

    // 2) score, hard-filter, rank, assign
    let candidates = rank_candidates(&primary, &secondary, &params.matching);
    let outcome = greedy_match(&primary, &secondary, candidates);

    // 3) write accepted links onto the primaries
    let primary = apply_matches(primary, &secondary, &outcome.matches);

    // 4) absorb secondary records that duplicate a primary episode
    let (primary, remaining_secondary, consolidated) =
        absorb_cross_listed(primary, secondary, &params.consolidate);

    // 5) merged view: surviving primaries then surviving secondaries
    let mut records = primary;
    records.extend(remaining_secondary);
    debug!("Merged view - records={}", records.len());

    // 6) spread links across (title, duration) sibling groups
    let (records, links_propagated) = propagate_links(records);

    // 7) recover dates from malformed raw timestamps, then from title text
    let (records, timestamps_normalized, timestamps_unparseable) = normalize_timestamps(records);
    let (records, dates_inferred, still_dateless) = infer_missing_dates(records, tables);

    let report = MatchReport {
        primary_total,
        secondary_total,
        duplicates_collapsed,
        matched: outcome.matches.len(),
        unmatched_primary: outcome.unmatched_primary.len(),
        unmatched_secondary: outcome.unmatched_secondary.len(),
        consolidated,
        links_propagated,
        timestamps_normalized,
        timestamps_unparseable,
        dates_inferred,
        still_dateless,
        top_matches: summarize_top_matches(
            &outcome.matches,
            &primary_titles,
            &secondary_titles,
            params.report_top_n,
        ),
    };

    info!(
        "Reconciliation completed - records={}, matched={}, consolidated={}, propagated={}",
        records.len(),
        report.matched,
        report.consolidated,
        report.links_propagated
    );

    Ok(ReconcileOutput {
        records,
        matches: outcome.matches,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, source: Source, title: &str) -> EpisodeRecord {
        EpisodeRecord::new(id, source, title)
    }

    #[test]
    fn test_empty_id_is_fatal() {
        let primary = vec![rec("", Source::Primary, "t")];
        let err = reconcile(primary, vec![], &[], &ReconcileParams::default()).unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(_)));
    }

    #[test]
    fn test_duplicate_id_is_fatal() {
        let primary = vec![
            rec("p1", Source::Primary, "a"),
            rec("p1", Source::Primary, "b"),
        ];
        let err = reconcile(primary, vec![], &[], &ReconcileParams::default()).unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(_)));
    }

    #[test]
    fn test_mis_tagged_source_is_fatal() {
        let primary = vec![rec("p1", Source::Secondary, "a")];
        let err = reconcile(primary, vec![], &[], &ReconcileParams::default()).unwrap_err();
        assert!(matches!(err, ReconcileError::Validation(_)));
    }

    #[test]
    fn test_empty_inputs_produce_empty_output() {
        let out = reconcile(vec![], vec![], &[], &ReconcileParams::default()).unwrap();
        assert!(out.records.is_empty());
        assert!(out.matches.is_empty());
        assert_eq!(out.report.matched, 0);
    }
}
