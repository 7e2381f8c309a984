use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::Result;
use crate::models::Match;

/// One accepted match with its full score breakdown, for the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub primary_id: String,
    pub primary_title: String,
    pub secondary_id: String,
    pub secondary_title: String,
    pub combined_score: f32,
    pub duration_score: f32,
    pub date_score: f32,
    pub duration_diff_seconds: u32,
    pub date_diff_days: Option<i64>,
}

/// Structured summary of a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    pub primary_total: usize,
    pub secondary_total: usize,
    pub duplicates_collapsed: usize,
    pub matched: usize,
    pub unmatched_primary: usize,
    pub unmatched_secondary: usize,
    pub consolidated: usize,
    pub links_propagated: usize,
    pub timestamps_normalized: usize,
    pub timestamps_unparseable: usize,
    pub dates_inferred: usize,
    pub still_dateless: usize,
    /// Top matches by combined score, best first.
    pub top_matches: Vec<MatchSummary>,
}

impl MatchReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Summarize the best `n` matches. `matches` is already in descending score
/// order out of the greedy pass; titles come from the pre-pipeline inputs.
pub fn summarize_top_matches(
    matches: &[Match],
    primary_titles: &HashMap<String, String>,
    secondary_titles: &HashMap<String, String>,
    n: usize,
) -> Vec<MatchSummary> {
    matches
        .iter()
        .take(n)
        .map(|m| MatchSummary {
            primary_id: m.primary_id.clone(),
            primary_title: primary_titles.get(&m.primary_id).cloned().unwrap_or_default(),
            secondary_id: m.secondary_id.clone(),
            secondary_title: secondary_titles
                .get(&m.secondary_id)
                .cloned()
                .unwrap_or_default(),
            combined_score: m.combined_score,
            duration_score: m.duration_score,
            date_score: m.date_score,
            duration_diff_seconds: m.duration_diff_seconds,
            date_diff_days: m.date_diff_days,
        })
        .collect()
}

/// Human-readable rendering of a report.
pub fn render_report_text(r: &MatchReport) -> String {
    let mut out = String::new();
    out.push_str("RECONCILIATION REPORT\n");
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!("Primary records:      {}\n", r.primary_total));
    out.push_str(&format!("Secondary records:    {}\n", r.secondary_total));
    out.push_str(&format!("Duplicates collapsed: {}\n", r.duplicates_collapsed));
    out.push_str(&format!("Matched:              {}\n", r.matched));
    out.push_str(&format!("Unmatched primary:    {}\n", r.unmatched_primary));
    out.push_str(&format!("Unmatched secondary:  {}\n", r.unmatched_secondary));
    out.push_str(&format!("Consolidated:         {}\n", r.consolidated));
    out.push_str(&format!("Links propagated:     {}\n", r.links_propagated));
    out.push_str(&format!(
        "Timestamps normalized: {} ({} unparseable)\n",
        r.timestamps_normalized, r.timestamps_unparseable
    ));
    out.push_str(&format!(
        "Dates inferred:       {} ({} still dateless)\n",
        r.dates_inferred, r.still_dateless
    ));

    if !r.top_matches.is_empty() {
        out.push('\n');
        out.push_str(&"-".repeat(60));
        out.push_str("\nTOP MATCHES\n");
        out.push_str(&"-".repeat(60));
        out.push('\n');
        for m in &r.top_matches {
            let date_diff = m
                .date_diff_days
                .map_or("n/a".to_string(), |d| format!("{} days", d));
            out.push_str(&format!("\n{}\n", m.secondary_title));
            out.push_str(&format!("   -> {}\n", m.primary_title));
            out.push_str(&format!(
                "   Score: {:.2} (dur: {:.2}, date: {:.2}) | Duration diff: {}s | Date diff: {}\n",
                m.combined_score, m.duration_score, m.date_score, m.duration_diff_seconds, date_diff
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> MatchReport {
        MatchReport {
            primary_total: 10,
            secondary_total: 8,
            duplicates_collapsed: 2,
            matched: 5,
            unmatched_primary: 3,
            unmatched_secondary: 3,
            consolidated: 1,
            links_propagated: 2,
            timestamps_normalized: 1,
            timestamps_unparseable: 1,
            dates_inferred: 2,
            still_dateless: 1,
            top_matches: vec![MatchSummary {
                primary_id: "p1".into(),
                primary_title: "Week 5 Recap".into(),
                secondary_id: "s1".into(),
                secondary_title: "Week 5 Recap LIVE".into(),
                combined_score: 0.83,
                duration_score: 0.8,
                date_score: 0.9,
                duration_diff_seconds: 60,
                date_diff_days: Some(2),
            }],
        }
    }

    #[test]
    fn test_render_contains_counts_and_breakdown() {
        let text = render_report_text(&sample_report());
        assert!(text.contains("Matched:              5"));
        assert!(text.contains("Week 5 Recap LIVE"));
        assert!(text.contains("Duration diff: 60s"));
        assert!(text.contains("Date diff: 2 days"));
    }

    #[test]
    fn test_missing_date_diff_renders_na() {
        let mut r = sample_report();
        r.top_matches[0].date_diff_days = None;
        let text = render_report_text(&r);
        assert!(text.contains("Date diff: n/a"));
    }

    #[test]
    fn test_json_round_trip() {
        let r = sample_report();
        let json = r.to_json().unwrap();
        let back: MatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.matched, r.matched);
        assert_eq!(back.top_matches.len(), 1);
    }
}
