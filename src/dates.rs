//! Date backfill for records with no timestamp.
//!
//! The cascade is an ordered list of pure `&str -> Option<NaiveDate>` rules
//! tried against the title; the first hit wins:
//! 1. explicit "Month D, YYYY" text
//! 2. an embedded ISO `YYYY-MM-DD` substring
//! 3. a recurring-period lookup against an externally supplied season table
//! 4. a coarse category keyword fallback from the same table
//!
//! A separate normalization pass recovers calendar dates from malformed
//! RFC-822-style timestamp strings with a trailing zone label.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, info};

use crate::models::EpisodeRecord;

/// A recurring named period ("week 5", "wild card") and its calendar date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub label: String,
    pub date: NaiveDate,
}

/// A broad category keyword ("draft", "free agency") and the single
/// representative date used when nothing more specific matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub keyword: String,
    pub date: NaiveDate,
}

/// One version of the caller-supplied period→date configuration.
///
/// The engine embeds no tables of its own; callers load these and pass them
/// in. `season` is the version key (a year); `hint_keywords` are title
/// fragments that imply this table when no explicit year appears.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonTable {
    pub season: i32,
    #[serde(default)]
    pub hint_keywords: Vec<String>,
    pub periods: Vec<PeriodEntry>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
}

static MONTH_DAY_YEAR_RE: OnceLock<Regex> = OnceLock::new();
static ISO_DATE_RE: OnceLock<Regex> = OnceLock::new();

fn month_day_year_re() -> &'static Regex {
    MONTH_DAY_YEAR_RE.get_or_init(|| {
        // Longest alternatives first so "sept" is not eaten by "sep".
        Regex::new(
            r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec)\.?\s+(\d{1,2}),?\s+(\d{4})",
        )
        .expect("static regex is valid")
    })
}

fn iso_date_re() -> &'static Regex {
    ISO_DATE_RE.get_or_init(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").expect("static regex is valid"))
}

fn month_number(name: &str) -> Option<u32> {
    let n = match name.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// Rule 1: explicit "Month D, YYYY" (full or abbreviated month name).
pub fn from_month_day_year(title: &str) -> Option<NaiveDate> {
    let caps = month_day_year_re().captures(title)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Rule 2: an embedded ISO `YYYY-MM-DD` substring, used verbatim when it is
/// a real calendar date.
pub fn from_iso_substring(title: &str) -> Option<NaiveDate> {
    let caps = iso_date_re().captures(title)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    let day: u32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Pick the applicable table version for a title.
///
/// An explicit season year substring wins; otherwise a hint keyword implies
/// the most recent table carrying it; otherwise the earliest table is the
/// default.
pub fn select_table<'a>(tables: &'a [SeasonTable], title_lower: &str) -> Option<&'a SeasonTable> {
    let mut by_season: Vec<&SeasonTable> = tables.iter().collect();
    by_season.sort_by_key(|t| t.season);

    for &t in &by_season {
        if title_lower.contains(&t.season.to_string()) {
            return Some(t);
        }
    }

    // Most recent hinted table wins over older ones.
    if let Some(&t) = by_season
        .iter()
        .rev()
        .find(|t| t.hint_keywords.iter().any(|k| title_lower.contains(&k.to_lowercase())))
    {
        return Some(t);
    }

    by_season.first().copied()
}

/// Rule 3: first period label contained in the title, from the chosen table.
pub fn from_period_table(title_lower: &str, table: &SeasonTable) -> Option<NaiveDate> {
    table
        .periods
        .iter()
        .find(|p| title_lower.contains(&p.label.to_lowercase()))
        .map(|p| p.date)
}

/// Rule 4: coarse category keyword fallback, from the chosen table.
pub fn from_category_fallback(title_lower: &str, table: &SeasonTable) -> Option<NaiveDate> {
    table
        .categories
        .iter()
        .find(|c| title_lower.contains(&c.keyword.to_lowercase()))
        .map(|c| c.date)
}

/// Run the full cascade over one title. `None` when no rule matches.
pub fn infer_date(title: &str, tables: &[SeasonTable]) -> Option<NaiveDate> {
    if let Some(d) = from_month_day_year(title) {
        return Some(d);
    }
    if let Some(d) = from_iso_substring(title) {
        return Some(d);
    }

    let title_lower = title.to_lowercase();
    let table = select_table(tables, &title_lower)?;
    if let Some(d) = from_period_table(&title_lower, table) {
        return Some(d);
    }
    from_category_fallback(&title_lower, table)
}

/// Parse an RFC-822-style timestamp with a trailing zone label,
/// e.g. `"Fri, 06 Feb 2026 10:30:00 GMT"`. Returns the calendar date.
pub fn normalize_timestamp(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // Proper RFC 2822 (numeric offsets and the obsolete named zones).
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.date_naive());
    }

    // Malformed variants: drop a trailing alphabetic zone label chrono
    // rejects ("PST8PDT", "AEST", ...) and retry without it.
    if let Some((head, tail)) = raw.rsplit_once(' ') {
        if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_alphanumeric()) {
            if let Ok(ndt) = NaiveDateTime::parse_from_str(head.trim(), "%a, %d %b %Y %H:%M:%S") {
                return Some(ndt.date());
            }
        }
    }

    None
}

/// Normalization pass: recover `published_at` from `published_raw` where the
/// raw string parses. Unparseable strings are left as they are and counted.
///
/// Returns the records, the number normalized, and the number that failed.
pub fn normalize_timestamps(
    mut records: Vec<EpisodeRecord>,
) -> (Vec<EpisodeRecord>, usize, usize) {
    let mut normalized = 0usize;
    let mut failed = 0usize;

    for rec in records.iter_mut() {
        if rec.published_at.is_some() {
            continue;
        }
        let Some(raw) = rec.published_raw.as_deref() else {
            continue;
        };
        match normalize_timestamp(raw) {
            Some(d) => {
                rec.published_at = Some(d);
                normalized += 1;
            }
            None => failed += 1,
        }
    }

    if normalized > 0 || failed > 0 {
        info!(
            "Timestamp normalization - normalized={}, unparseable={}",
            normalized, failed
        );
    }

    (records, normalized, failed)
}

/// Cascade pass: backfill `published_at` for every record still without one.
///
/// Returns the records, the number inferred, and the number still dateless.
pub fn infer_missing_dates(
    mut records: Vec<EpisodeRecord>,
    tables: &[SeasonTable],
) -> (Vec<EpisodeRecord>, usize, usize) {
    let mut inferred = 0usize;
    let mut still_missing = 0usize;

    for rec in records.iter_mut() {
        if rec.published_at.is_some() {
            continue;
        }
        match infer_date(&rec.title, tables) {
            Some(d) => {
                debug!("Inferred date - id={}, date={}", rec.id, d);
                rec.published_at = Some(d);
                inferred += 1;
            }
            None => still_missing += 1,
        }
    }

    info!(
        "Date inference - inferred={}, still_missing={}",
        inferred, still_missing
    );

    (records, inferred, still_missing)
}
