use tracing::{debug, info};

use crate::models::EpisodeRecord;
use crate::similarity::{
    consolidation_score, period_ordinal, period_regex, title_similarity, ConsolidationBoosts,
};

#[derive(Debug, Clone)]
pub struct ConsolidateParams {
    /// A secondary record is absorbed only when its best primary scores
    /// strictly above this.
    pub threshold: f32, // 0.6
    pub boosts: ConsolidationBoosts,
    /// Keyword whose trailing cardinal identifies a recurring period,
    /// e.g. "week" in "Week 5 Recap".
    pub period_keyword: String,
}

impl Default for ConsolidateParams {
    fn default() -> Self {
        Self {
            threshold: 0.6,
            boosts: ConsolidationBoosts::default(),
            period_keyword: "week".to_string(),
        }
    }
}

/// Absorb secondary-catalog records that describe an episode already present
/// in the primary feed.
///
/// Each secondary record is scored against every primary by title
/// similarity, boosted for same-day dates and a shared period ordinal. The
/// best primary above the threshold receives the secondary's link (only if
/// it has none yet — link fields are write-once) and the secondary record
/// is dropped from the merged output.
///
/// Ties keep the first primary in enumeration order, so identical inputs
/// absorb identically.
///
/// Returns the updated primaries, the surviving secondaries, and the number
/// absorbed.
pub fn absorb_cross_listed(
    mut primary: Vec<EpisodeRecord>,
    secondary: Vec<EpisodeRecord>,
    params: &ConsolidateParams,
) -> (Vec<EpisodeRecord>, Vec<EpisodeRecord>, usize) {
    let re = period_regex(&params.period_keyword);

    // Extract ordinals once per primary, not per pair.
    let primary_ordinals: Vec<Option<u32>> =
        primary.iter().map(|p| period_ordinal(&p.title, &re)).collect();

    let mut remaining = Vec::new();
    let mut absorbed = 0usize;

    for sec in secondary {
        let sec_ordinal = period_ordinal(&sec.title, &re);

        let mut best: Option<(usize, f32)> = None;
        for (i, p) in primary.iter().enumerate() {
            let sim = title_similarity(&p.title, &sec.title);
            let same_day = match (p.published_at, sec.published_at) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            let same_ordinal =
                matches!((primary_ordinals[i], sec_ordinal), (Some(a), Some(b)) if a == b);
            let score = consolidation_score(sim, same_day, same_ordinal, params.boosts);

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((i, score));
            }
        }

        match best {
            Some((i, score)) if score > params.threshold => {
                let target = &mut primary[i];
                if !target.has_link() {
                    target.external_link = sec.media_url.clone();
                    target.linked_id = Some(sec.id.clone());
                    target.linked_title = Some(sec.title.clone());
                    target.link_confidence = Some(score.min(1.0));
                }
                debug!(
                    "Absorbed cross-listed record - secondary={}, primary={}, score={:.2}",
                    sec.id, target.id, score
                );
                absorbed += 1;
            }
            _ => remaining.push(sec),
        }
    }

    if absorbed > 0 {
        info!(
            "Consolidation - absorbed={}, remaining_secondary={}",
            absorbed,
            remaining.len()
        );
    } else {
        debug!("Consolidation - nothing absorbed");
    }

    (primary, remaining, absorbed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Source;
    use chrono::NaiveDate;

    fn primary(id: &str, title: &str) -> EpisodeRecord {
        EpisodeRecord::new(id, Source::Primary, title)
    }

    fn secondary(id: &str, title: &str, url: &str) -> EpisodeRecord {
        let mut r = EpisodeRecord::new(id, Source::Secondary, title);
        r.media_url = Some(url.to_string());
        r
    }

    #[test]
    fn test_absorbs_near_identical_title() {
        let p = vec![primary("p1", "Week 5 Recap")];
        let s = vec![secondary("s1", "Week 5 Recap LIVE", "https://example.test/v1")];
        let (p, rest, absorbed) = absorb_cross_listed(p, s, &ConsolidateParams::default());

        assert_eq!(absorbed, 1);
        assert!(rest.is_empty());
        assert_eq!(p[0].external_link.as_deref(), Some("https://example.test/v1"));
        assert_eq!(p[0].linked_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_ordinal_boost_carries_a_weak_title() {
        // Dissimilar wording but the same week number plus same day.
        let mut p = primary("p1", "Week 12: full slate breakdown and picks");
        p.published_at = NaiveDate::from_ymd_opt(2024, 11, 21);
        let mut s = secondary("s1", "WEEK 12 DFS MEGASHOW", "https://example.test/v2");
        s.published_at = NaiveDate::from_ymd_opt(2024, 11, 21);

        let (p, rest, absorbed) = absorb_cross_listed(vec![p], vec![s], &ConsolidateParams::default());
        assert_eq!(absorbed, 1);
        assert!(rest.is_empty());
        assert!(p[0].link_confidence.unwrap() <= 1.0);
    }

    #[test]
    fn test_unrelated_secondary_survives() {
        let p = vec![primary("p1", "Week 5 Recap")];
        let s = vec![secondary("s1", "Offseason gardening tips", "https://example.test/v3")];
        let (p, rest, absorbed) = absorb_cross_listed(p, s, &ConsolidateParams::default());

        assert_eq!(absorbed, 0);
        assert_eq!(rest.len(), 1);
        assert!(!p[0].has_link());
    }

    #[test]
    fn test_existing_link_is_never_overwritten() {
        let mut p = primary("p1", "Week 5 Recap");
        p.external_link = Some("https://example.test/original".to_string());
        p.linked_id = Some("s0".to_string());
        let s = vec![secondary("s1", "Week 5 Recap", "https://example.test/other")];

        let (p, _, absorbed) = absorb_cross_listed(vec![p], s, &ConsolidateParams::default());
        assert_eq!(absorbed, 1);
        assert_eq!(p[0].external_link.as_deref(), Some("https://example.test/original"));
        assert_eq!(p[0].linked_id.as_deref(), Some("s0"));
    }
}
