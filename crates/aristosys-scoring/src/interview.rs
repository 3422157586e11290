//! Interview transcript analysis.

use serde::{Deserialize, Serialize};

use crate::lenient;

pub const MAX_INTERVIEW_SCORE: i64 = 100;

/// Technical and communication assessment of a recorded interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAnalysis {
    #[serde(default = "default_score", deserialize_with = "lenient::int")]
    pub technical_score: i64,
    #[serde(default = "default_score", deserialize_with = "lenient::int")]
    pub communication_score: i64,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub skills_demonstrated: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub skills_missing: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub technical_notes: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub communication_notes: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub transcript_summary: String,
}

impl AudioAnalysis {
    /// Analysis used when the model cannot produce one.
    pub fn fallback() -> Self {
        Self {
            technical_score: default_score(),
            communication_score: default_score(),
            skills_demonstrated: Vec::new(),
            skills_missing: Vec::new(),
            technical_notes: "Analysis failed".to_string(),
            communication_notes: "Analysis failed".to_string(),
            transcript_summary: String::new(),
        }
    }

    pub fn clamp_scores(&mut self) {
        self.technical_score = self.technical_score.clamp(0, MAX_INTERVIEW_SCORE);
        self.communication_score = self.communication_score.clamp(0, MAX_INTERVIEW_SCORE);
    }
}

fn default_score() -> i64 {
    50
}
