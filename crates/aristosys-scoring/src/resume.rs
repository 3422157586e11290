//! Resume analysis produced by the language model.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient;

/// How prominently a skill features in a resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStrength {
    Strong,
    Moderate,
    Weak,
    #[default]
    Missing,
}

impl SkillStrength {
    /// Share of a skill's points earned at this strength.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Strong => 1.0,
            Self::Moderate => 0.7,
            Self::Weak => 0.3,
            Self::Missing => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "strong",
            Self::Moderate => "moderate",
            Self::Weak => "weak",
            Self::Missing => "missing",
        }
    }

    /// Case-insensitive parse; unrecognised values count as missing.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "strong" => Self::Strong,
            "moderate" => Self::Moderate,
            "weak" => Self::Weak,
            _ => Self::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        *self == Self::Missing
    }
}

impl fmt::Display for SkillStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SkillStrength {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::parse).unwrap_or_default())
    }
}

/// Full-time tenure pattern over the last five years.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobHoppingData {
    #[serde(default, deserialize_with = "lenient::int")]
    pub full_time_roles_last_5_years: i64,
    #[serde(default, deserialize_with = "lenient::int")]
    pub short_tenure_ft_roles_count: i64,
    #[serde(default = "default_true")]
    pub has_valid_explanation: bool,
}

impl Default for JobHoppingData {
    fn default() -> Self {
        Self {
            full_time_roles_last_5_years: 0,
            short_tenure_ft_roles_count: 0,
            has_valid_explanation: true,
        }
    }
}

/// A candidate's resume evaluated against a job's requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    #[serde(default = "default_candidate_name", deserialize_with = "lenient::string")]
    pub candidate_name: String,
    #[serde(default)]
    pub candidate_email: Option<String>,
    #[serde(default)]
    pub candidate_linkedin: Option<String>,
    #[serde(default)]
    pub candidate_phone: Option<String>,
    #[serde(default = "default_total_experience", deserialize_with = "total_experience")]
    pub estimated_total_experience: f64,
    #[serde(default)]
    pub skill_strength: HashMap<String, SkillStrength>,
    #[serde(default, deserialize_with = "lenient::years_map")]
    pub estimated_relevant_experience: HashMap<String, f64>,
    #[serde(default = "default_pattern", deserialize_with = "lenient::string")]
    pub support_hybrid_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_reasoning: Option<String>,
    #[serde(default = "default_depth", deserialize_with = "lenient::int")]
    pub engineering_depth_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engineering_depth_reasoning: Option<String>,
    #[serde(default = "default_formatting", deserialize_with = "lenient::int")]
    pub formatting_score: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatting_notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub career_gap_months: i64,
    #[serde(default = "default_gap_reason", deserialize_with = "lenient::string")]
    pub gap_reason: String,
    #[serde(default)]
    pub gap_is_recent: bool,
    #[serde(default)]
    pub job_hopping_data: JobHoppingData,
    #[serde(default, deserialize_with = "lenient::string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient::strings")]
    pub concerns: Vec<String>,
}

pub const MAX_ENGINEERING_DEPTH: i64 = 15;
pub const MAX_FORMATTING_SCORE: i64 = 3;

impl ResumeAnalysis {
    /// Analysis used when the model cannot produce one.
    pub fn fallback() -> Self {
        Self {
            summary: "Analysis failed".to_string(),
            concerns: vec!["Analysis failed".to_string()],
            ..Self::default()
        }
    }

    /// Clamp model-reported scores into their documented ranges.
    pub fn clamp_scores(&mut self) {
        self.engineering_depth_score = self.engineering_depth_score.clamp(0, MAX_ENGINEERING_DEPTH);
        self.formatting_score = self.formatting_score.clamp(0, MAX_FORMATTING_SCORE);
    }

    /// Candidate name, unless the model could not find one.
    pub fn known_name(&self) -> Option<&str> {
        let name = self.candidate_name.trim();
        if name.is_empty() || name == "Unknown" {
            None
        } else {
            Some(name)
        }
    }

    /// Strength recorded under exactly this skill name.
    pub fn exact_strength(&self, skill: &str) -> SkillStrength {
        self.skill_strength.get(skill).copied().unwrap_or_default()
    }

    /// Strength for a skill: exact key first, then case-insensitive.
    pub fn strength_of(&self, skill: &str) -> SkillStrength {
        if let Some(strength) = self.skill_strength.get(skill) {
            return *strength;
        }
        let wanted = skill.to_lowercase();
        self.skill_strength
            .iter()
            .find(|(key, _)| key.to_lowercase() == wanted)
            .map(|(_, strength)| *strength)
            .unwrap_or_default()
    }
}

impl Default for ResumeAnalysis {
    fn default() -> Self {
        Self {
            candidate_name: default_candidate_name(),
            candidate_email: None,
            candidate_linkedin: None,
            candidate_phone: None,
            estimated_total_experience: default_total_experience(),
            skill_strength: HashMap::new(),
            estimated_relevant_experience: HashMap::new(),
            support_hybrid_pattern: default_pattern(),
            pattern_reasoning: None,
            engineering_depth_score: default_depth(),
            engineering_depth_reasoning: None,
            formatting_score: default_formatting(),
            formatting_notes: None,
            career_gap_months: 0,
            gap_reason: default_gap_reason(),
            gap_is_recent: false,
            job_hopping_data: JobHoppingData::default(),
            summary: String::new(),
            strengths: Vec::new(),
            concerns: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_candidate_name() -> String {
    "Unknown".to_string()
}

fn default_total_experience() -> f64 {
    5.0
}

/// Total years; `null` or unreadable values fall back to the default.
fn total_experience<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(lenient::number(&value).unwrap_or_else(default_total_experience))
}

fn default_pattern() -> String {
    "engineering_heavy".to_string()
}

fn default_depth() -> i64 {
    8
}

fn default_formatting() -> i64 {
    2
}

fn default_gap_reason() -> String {
    "none".to_string()
}
