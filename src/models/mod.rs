//! Data models for Aristosys.
//!
//! API-level response types. Scoring-domain types live in the
//! `aristosys-scoring` crate and are re-exported here.

mod job;
mod screening;

pub use job::*;
pub use screening::*;

pub use aristosys_scoring::{
    AudioAnalysis, CandidateScore, JobAnalysis, ResumeAnalysis, ScoreBreakdown,
};

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Generate a new UUID
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current UTC timestamp in RFC 3339 form.
///
/// Fixed precision keeps stored timestamps sortable as text.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
