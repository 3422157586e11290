//! Job description analysis: classification and skill requirements.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient;

/// How strictly a role requires hands-on engineering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobClassification {
    #[default]
    StrictEngineering,
    ModerateEngineering,
    SupportOk,
}

impl JobClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrictEngineering => "strict_engineering",
            Self::ModerateEngineering => "moderate_engineering",
            Self::SupportOk => "support_ok",
        }
    }

    /// Parse a classification, falling back to strict engineering.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "moderate_engineering" => Self::ModerateEngineering,
            "support_ok" => Self::SupportOk,
            _ => Self::StrictEngineering,
        }
    }
}

impl fmt::Display for JobClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JobClassification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(Self::parse).unwrap_or_default())
    }
}

/// Whether a requirement names one skill or a set of alternatives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    #[default]
    Single,
    OrGroup,
}

/// A skill requirement. An OR group is satisfied by any one of its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub skill: String,
    #[serde(rename = "type", default)]
    pub kind: SkillType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Skill {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            skill: name.into(),
            kind: SkillType::Single,
            options: None,
        }
    }

    pub fn or_group(name: impl Into<String>, options: &[&str]) -> Self {
        Self {
            skill: name.into(),
            kind: SkillType::OrGroup,
            options: Some(options.iter().map(|o| o.to_string()).collect()),
        }
    }

    pub fn is_or_group(&self) -> bool {
        self.kind == SkillType::OrGroup
    }

    /// Options of an OR group; empty for single skills.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Label used in score breakdowns, e.g. `Database (MySQL/PostgreSQL)`.
    pub fn display_name(&self) -> String {
        if self.is_or_group() {
            format!("{} ({})", self.skill, self.options().join("/"))
        } else {
            self.skill.clone()
        }
    }

    /// Build a skill from a loosely structured JSON value.
    ///
    /// Strings become single skills, objects are read field by field,
    /// and any other value is rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(name) => Some(Self::single(name.clone())),
            Value::Object(map) => {
                let skill = map
                    .get("skill")
                    .and_then(Value::as_str)
                    .unwrap_or("Skill")
                    .to_string();
                let kind = match map.get("type").and_then(Value::as_str) {
                    Some("or_group") => SkillType::OrGroup,
                    _ => SkillType::Single,
                };
                let options = map.get("options").and_then(Value::as_array).map(|opts| {
                    opts.iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect()
                });
                Some(Self {
                    skill,
                    kind,
                    options,
                })
            }
            _ => None,
        }
    }
}

/// Requirements extracted from a job description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default, deserialize_with = "lenient::string")]
    pub job_title: String,
    #[serde(default)]
    pub job_classification: JobClassification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_reasoning: Option<String>,
    #[serde(default, deserialize_with = "lenient::skills")]
    pub must_have_skills: Vec<Skill>,
    #[serde(default, deserialize_with = "lenient::skills")]
    pub nice_to_have_skills: Vec<Skill>,
    #[serde(default)]
    pub total_experience_required: f64,
    #[serde(default)]
    pub relevant_experience_required: HashMap<String, f64>,
}

impl JobAnalysis {
    /// Analysis used when the model cannot produce one.
    pub fn fallback() -> Self {
        Self {
            job_title: "Technical Position".to_string(),
            job_classification: JobClassification::StrictEngineering,
            classification_reasoning: None,
            must_have_skills: vec![Skill::single("Python")],
            nice_to_have_skills: Vec::new(),
            total_experience_required: 5.0,
            relevant_experience_required: HashMap::new(),
        }
    }

    /// The job title, or `default` when the model left it blank.
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        let title = self.job_title.trim();
        if title.is_empty() {
            default
        } else {
            title
        }
    }

    /// Flat list of every skill name to evaluate: single skills as-is,
    /// OR groups expanded into their options.
    pub fn skills_to_evaluate(&self, include_nice_to_have: bool) -> Vec<String> {
        let nice: &[Skill] = if include_nice_to_have {
            &self.nice_to_have_skills
        } else {
            &[]
        };

        let mut names = Vec::new();
        for skill in self.must_have_skills.iter().chain(nice) {
            if skill.is_or_group() {
                names.extend(skill.options().iter().cloned());
            } else {
                names.push(skill.skill.clone());
            }
        }
        names
    }
}
