use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which feed a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Chronologically authoritative feed; source of truth for dates.
    Primary,
    /// Media catalog; durations and upload dates are an imperfect identity proxy.
    Secondary,
}

/// One episode as reported by either source.
///
/// `id` must be unique within its source. The link fields
/// (`external_link`, `linked_id`, `linked_title`, `link_confidence`) are
/// write-once per run and populated only by the matching/merge stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub id: String,
    pub source: Source,
    pub title: String,
    pub published_at: Option<NaiveDate>,
    /// Raw upstream timestamp string, kept so the normalization pass can
    /// recover dates from malformed RFC-822-style values.
    #[serde(default)]
    pub published_raw: Option<String>,
    pub duration_seconds: Option<u32>,
    /// The record's own watch/stream URL (secondary source only).
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    #[serde(default)]
    pub linked_id: Option<String>,
    #[serde(default)]
    pub linked_title: Option<String>,
    #[serde(default)]
    pub link_confidence: Option<f32>,
    /// Auxiliary payload; discarded together with a collapsed duplicate.
    #[serde(default)]
    pub transcript: Option<String>,
}

impl EpisodeRecord {
    pub fn new(id: impl Into<String>, source: Source, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source,
            title: title.into(),
            published_at: None,
            published_raw: None,
            duration_seconds: None,
            media_url: None,
            external_link: None,
            linked_id: None,
            linked_title: None,
            link_confidence: None,
            transcript: None,
        }
    }

    pub fn has_link(&self) -> bool {
        self.external_link.is_some() || self.linked_id.is_some()
    }
}

/// A scored primary × secondary pairing; exists only during ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub primary_id: String,
    pub secondary_id: String,
    pub duration_score: f32,
    pub date_score: f32,
    pub combined_score: f32,
    pub duration_diff_seconds: u32,
    /// `None` when either side has no known date.
    pub date_diff_days: Option<i64>,
}

/// An accepted candidate. Across a run no primary or secondary id appears
/// in more than one Match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub primary_id: String,
    pub secondary_id: String,
    pub duration_score: f32,
    pub date_score: f32,
    pub combined_score: f32,
    pub duration_diff_seconds: u32,
    pub date_diff_days: Option<i64>,
}

impl From<MatchCandidate> for Match {
    fn from(c: MatchCandidate) -> Self {
        Match {
            primary_id: c.primary_id,
            secondary_id: c.secondary_id,
            duration_score: c.duration_score,
            date_score: c.date_score,
            combined_score: c.combined_score,
            duration_diff_seconds: c.duration_diff_seconds,
            date_diff_days: c.date_diff_days,
        }
    }
}
