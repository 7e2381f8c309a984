use std::collections::HashSet;
use tracing::{debug, info};

use crate::models::{EpisodeRecord, Match, MatchCandidate};
use crate::similarity::{combined_score, date_score, day_diff, duration_score, SignalWeights};

#[derive(Debug, Clone)]
pub struct MatchParams {
    pub weights: SignalWeights,
    /// Candidates scoring below this are never considered.
    pub min_combined_score: f32, // 0.5
    /// Hard filter: pairs with both dates known and a gap beyond this many
    /// days are discarded outright, whatever the duration signal says.
    pub max_date_gap_days: i64, // 14
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            weights: SignalWeights::default(),
            min_combined_score: 0.5,
            max_date_gap_days: 14,
        }
    }
}

/// Result of the greedy assignment pass.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub matches: Vec<Match>,
    pub unmatched_primary: Vec<String>,
    pub unmatched_secondary: Vec<String>,
}

/// Enumerate the primary × secondary cross product, hard-filter implausible
/// date gaps, score the survivors, drop sub-threshold candidates and sort
/// by combined score descending.
///
/// The sort is stable, so ties keep enumeration order — identical inputs
/// always produce the identical ranking.
pub fn rank_candidates(
    primary: &[EpisodeRecord],
    secondary: &[EpisodeRecord],
    params: &MatchParams,
) -> Vec<MatchCandidate> {
    let mut candidates = Vec::new();

    for p in primary {
        for s in secondary {
            let date_diff = day_diff(p.published_at, s.published_at);

            // Hard filter: duration similarity alone must never override an
            // implausible date gap. Unknown dates pass through to scoring.
            if let Some(diff) = date_diff {
                if diff > params.max_date_gap_days {
                    continue;
                }
            }

            let dur = duration_score(p.duration_seconds, s.duration_seconds);
            let dt = date_score(p.published_at, s.published_at);
            let combined = combined_score(dur, dt, params.weights);

            if combined < params.min_combined_score {
                continue;
            }

            candidates.push(MatchCandidate {
                primary_id: p.id.clone(),
                secondary_id: s.id.clone(),
                duration_score: dur,
                date_score: dt,
                combined_score: combined,
                duration_diff_seconds: p
                    .duration_seconds
                    .unwrap_or(0)
                    .abs_diff(s.duration_seconds.unwrap_or(0)),
                date_diff_days: date_diff,
            });
        }
    }

    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));

    debug!(
        "Candidate ranking - pairs_considered={}, survivors={}",
        primary.len() * secondary.len(),
        candidates.len()
    );

    candidates
}

/// Walk the ranked candidates once, accepting each pair whose ids are both
/// still unclaimed. A greedy approximation of maximum-weight bipartite
/// matching: deterministic, linear after sorting, not globally optimal.
pub fn greedy_match(
    primary: &[EpisodeRecord],
    secondary: &[EpisodeRecord],
    candidates: Vec<MatchCandidate>,
) -> MatchOutcome {
    let mut matches = Vec::new();
    let mut claimed_primary: HashSet<String> = HashSet::new();
    let mut claimed_secondary: HashSet<String> = HashSet::new();

    for cand in candidates {
        if claimed_primary.contains(&cand.primary_id)
            || claimed_secondary.contains(&cand.secondary_id)
        {
            continue;
        }
        claimed_primary.insert(cand.primary_id.clone());
        claimed_secondary.insert(cand.secondary_id.clone());
        matches.push(Match::from(cand));
    }

    let unmatched_primary: Vec<String> = primary
        .iter()
        .filter(|r| !claimed_primary.contains(&r.id))
        .map(|r| r.id.clone())
        .collect();
    let unmatched_secondary: Vec<String> = secondary
        .iter()
        .filter(|r| !claimed_secondary.contains(&r.id))
        .map(|r| r.id.clone())
        .collect();

    info!(
        "Greedy matching - matched={}, unmatched_primary={}, unmatched_secondary={}",
        matches.len(),
        unmatched_primary.len(),
        unmatched_secondary.len()
    );

    MatchOutcome {
        matches,
        unmatched_primary,
        unmatched_secondary,
    }
}
