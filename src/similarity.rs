use chrono::NaiveDate;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Weights for the cross-source combined score. Duration is the more
/// reliable signal between the two catalogs, hence the heavier weight.
#[derive(Debug, Clone, Copy)]
pub struct SignalWeights {
    pub duration: f32, // 0.7
    pub date: f32,     // 0.3
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            duration: 0.7,
            date: 0.3,
        }
    }
}

/// Boosts layered on top of title similarity when consolidating records
/// within one normalized set.
#[derive(Debug, Clone, Copy)]
pub struct ConsolidationBoosts {
    pub same_day: f32,     // 0.3
    pub same_ordinal: f32, // 0.2
}

impl Default for ConsolidationBoosts {
    fn default() -> Self {
        Self {
            same_day: 0.3,
            same_ordinal: 0.2,
        }
    }
}

/// NFC-normalize and case-fold a title for comparison.
pub fn fold_title(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

/// Duration match score in [0, 1].
///
/// Step function over the absolute and relative difference: within 10
/// seconds is a perfect match, then 1% / 3% / 5% / 10% relative bands.
/// Missing or zero durations carry no signal and score 0.0.
pub fn duration_score(a: Option<u32>, b: Option<u32>) -> f32 {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) if a > 0 && b > 0 => (a, b),
        _ => return 0.0,
    };

    let diff = a.abs_diff(b);
    if diff <= 10 {
        return 1.0;
    }

    let rel = diff as f32 / a.max(b) as f32;
    if rel <= 0.01 {
        0.95
    } else if rel <= 0.03 {
        0.8
    } else if rel <= 0.05 {
        0.6
    } else if rel <= 0.10 {
        0.3
    } else {
        0.0
    }
}

/// Date proximity score in [0, 1], stepped on the whole-day gap.
/// Missing dates carry no signal and score 0.0.
pub fn date_score(a: Option<NaiveDate>, b: Option<NaiveDate>) -> f32 {
    let diff = match day_diff(a, b) {
        Some(d) => d,
        None => return 0.0,
    };

    if diff == 0 {
        1.0
    } else if diff <= 3 {
        0.9
    } else if diff <= 7 {
        0.7
    } else if diff <= 14 {
        0.4
    } else if diff <= 30 {
        0.2
    } else {
        0.0
    }
}

/// Absolute gap in whole days, when both dates are known.
pub fn day_diff(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a - b).num_days().abs()),
        _ => None,
    }
}

pub fn combined_score(duration: f32, date: f32, w: SignalWeights) -> f32 {
    duration * w.duration + date * w.date
}

/// Ratcliff/Obershelp similarity over case-folded titles: twice the total
/// length of recursively matched common substrings over the summed lengths.
/// 1.0 for identical strings, 0.0 when no characters line up.
pub fn title_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = fold_title(a).chars().collect();
    let b: Vec<char> = fold_title(b).chars().collect();

    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    2.0 * matched_len(&a, &b) as f32 / (a.len() + b.len()) as f32
}

/// Total length of matching blocks: find the longest common substring,
/// then recurse on the pieces left and right of it.
fn matched_len(a: &[char], b: &[char]) -> usize {
    let (ai, bi, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_len(&a[..ai], &b[..bi]) + matched_len(&a[ai + len..], &b[bi + len..])
}

/// Longest common substring as (start_a, start_b, length), earliest
/// occurrence winning ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0usize, 0usize, 0usize);
    // row[j+1] = length of the common suffix ending at a[i], b[j]
    let mut row = vec![0usize; b.len() + 1];

    for i in 0..a.len() {
        let mut prev = 0usize;
        for j in 0..b.len() {
            let up = row[j + 1];
            row[j + 1] = if a[i] == b[j] { prev + 1 } else { 0 };
            if row[j + 1] > best.2 {
                best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
            }
            prev = up;
        }
    }

    best
}

/// Compile the recurring-period ordinal pattern for a keyword,
/// e.g. "week" → matches "week 5" / "Week5".
pub fn period_regex(keyword: &str) -> Regex {
    Regex::new(&format!(r"(?i){}\s*(\d+)", regex::escape(keyword)))
        .expect("escaped keyword pattern is valid")
}

/// Extract the cardinal following the period keyword, if any.
pub fn period_ordinal(title: &str, re: &Regex) -> Option<u32> {
    re.captures(title)?.get(1)?.as_str().parse().ok()
}

/// Combined score for the within-set consolidation variant: title
/// similarity, boosted when both records fall on the same calendar day and
/// when both titles carry the same period ordinal.
pub fn consolidation_score(
    title_sim: f32,
    same_day: bool,
    same_ordinal: bool,
    boosts: ConsolidationBoosts,
) -> f32 {
    let mut score = title_sim;
    if same_day {
        score += boosts.same_day;
    }
    if same_ordinal {
        score += boosts.same_ordinal;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_duration_within_ten_seconds_is_perfect() {
        assert_eq!(duration_score(Some(3600), Some(3605)), 1.0);
    }

    #[test]
    fn test_duration_bands() {
        // diff 60s on 3660s max -> rel ~1.6% -> 0.8
        assert_eq!(duration_score(Some(3600), Some(3660)), 0.8);
        // rel exactly 1% -> 0.95 (7200 vs 7128: diff 72, max 7200)
        assert_eq!(duration_score(Some(7200), Some(7128)), 0.95);
        // rel ~8% -> 0.3
        assert_eq!(duration_score(Some(3600), Some(3900)), 0.3);
        // rel > 10% -> no signal
        assert_eq!(duration_score(Some(3600), Some(7200)), 0.0);
    }

    #[test]
    fn test_duration_missing_or_zero() {
        assert_eq!(duration_score(None, Some(3600)), 0.0);
        assert_eq!(duration_score(Some(3600), None), 0.0);
        assert_eq!(duration_score(Some(0), Some(3600)), 0.0);
    }

    #[test]
    fn test_duration_monotone_in_diff() {
        // For a fixed max, the score never increases as the gap grows.
        let base = 10_000u32;
        let mut last = f32::INFINITY;
        for diff in 0..1500 {
            let s = duration_score(Some(base), Some(base - diff));
            assert!(s <= last, "score rose at diff={}", diff);
            last = s;
        }
    }

    #[test]
    fn test_date_bands() {
        assert_eq!(date_score(date(2024, 9, 5), date(2024, 9, 5)), 1.0);
        assert_eq!(date_score(date(2024, 9, 5), date(2024, 9, 7)), 0.9);
        assert_eq!(date_score(date(2024, 9, 5), date(2024, 9, 12)), 0.7);
        assert_eq!(date_score(date(2024, 9, 5), date(2024, 9, 19)), 0.4);
        assert_eq!(date_score(date(2024, 9, 5), date(2024, 10, 4)), 0.2);
        assert_eq!(date_score(date(2024, 9, 5), date(2024, 11, 1)), 0.0);
    }

    #[test]
    fn test_date_missing() {
        assert_eq!(date_score(None, date(2024, 9, 5)), 0.0);
        assert_eq!(date_score(date(2024, 9, 5), None), 0.0);
    }

    #[test]
    fn test_combined_scenario_b() {
        // durations 3600 vs 3660 -> 0.8; dates 2 days apart -> 0.9
        let dur = duration_score(Some(3600), Some(3660));
        let dt = date_score(date(2024, 9, 5), date(2024, 9, 7));
        let combined = combined_score(dur, dt, SignalWeights::default());
        assert!((combined - 0.83).abs() < 1e-6);
    }

    #[test]
    fn test_title_similarity_identical() {
        assert_eq!(title_similarity("Week 5 Recap", "Week 5 Recap"), 1.0);
        // case folding
        assert_eq!(title_similarity("WEEK 5 RECAP", "week 5 recap"), 1.0);
    }

    #[test]
    fn test_title_similarity_disjoint() {
        assert_eq!(title_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_title_similarity_partial() {
        let s = title_similarity("Week 5 Recap", "Week 5 Recap LIVE");
        assert!(s > 0.8 && s < 1.0);
        // symmetric
        assert_eq!(s, title_similarity("Week 5 Recap LIVE", "Week 5 Recap"));
    }

    #[test]
    fn test_title_similarity_known_ratio() {
        // "abcd" vs "bcde": common block "bcd" -> 2*3 / 8 = 0.75
        assert!((title_similarity("abcd", "bcde") - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_period_ordinal() {
        let re = period_regex("week");
        assert_eq!(period_ordinal("Week 5 Recap", &re), Some(5));
        assert_eq!(period_ordinal("week12 preview", &re), Some(12));
        assert_eq!(period_ordinal("Draft special", &re), None);
    }

    #[test]
    fn test_consolidation_score_boosts() {
        let b = ConsolidationBoosts::default();
        assert_eq!(consolidation_score(0.5, false, false, b), 0.5);
        assert!((consolidation_score(0.5, true, false, b) - 0.8).abs() < 1e-6);
        assert!((consolidation_score(0.5, true, true, b) - 1.0).abs() < 1e-6);
    }
}
