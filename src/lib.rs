//! castmerge — reconciles episode records describing the same real-world
//! events as reported by two independent, noisy sources: a chronologically
//! authoritative feed (primary) and a secondary media catalog.
//!
//! Pipeline stages, in order:
//! 1. collapse exact-title duplicates in the primary feed
//! 2. score primary × secondary pairs (duration + date signals), hard-filter
//!    implausible date gaps, rank, greedily assign exclusive matches
//! 3. apply accepted links, absorb cross-listed secondary records by title
//!    similarity, propagate links across (title, duration) siblings
//! 4. backfill missing dates from title text via an ordered rule cascade
//!
//! The engine holds no I/O: callers hand in record collections and the
//! versioned season tables, and get back a merged record set plus a report.

pub mod collapse;
pub mod consolidate;
pub mod dates;
pub mod errors;
pub mod matching;
pub mod models;
pub mod orchestrator;
pub mod propagate;
pub mod report;
pub mod similarity;

pub use dates::SeasonTable;
pub use errors::{ReconcileError, Result};
pub use models::{EpisodeRecord, Match, MatchCandidate, Source};
pub use orchestrator::{reconcile, ReconcileOutput, ReconcileParams};
pub use report::MatchReport;
