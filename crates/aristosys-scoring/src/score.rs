//! Deterministic resume scoring.

use serde::{Deserialize, Serialize};

use crate::job::{JobAnalysis, Skill};
use crate::resume::{ResumeAnalysis, SkillStrength, MAX_ENGINEERING_DEPTH};

/// Years of slack before an experience shortfall is flagged.
const EXPERIENCE_TOLERANCE_YEARS: i64 = 1;

/// Point allocation across scoring components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub base: i64,
    pub must_have_max: f64,
    pub nice_to_have_max: f64,
    pub suitability_max: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            base: 40,
            must_have_max: 30.0,
            nice_to_have_max: 5.0,
            suitability_max: 25.0,
        }
    }
}

/// Points earned for one requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore {
    pub skill: String,
    /// Set for must-have skills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<SkillStrength>,
    /// Set for nice-to-have skills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_skill: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_option: Option<String>,
    pub points: f64,
    pub max_points: f64,
    #[serde(default)]
    pub is_or_group: bool,
}

/// Points earned for a group of requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub category: String,
    pub total_points: f64,
    pub max_points: f64,
    pub skills: Vec<SkillScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: i64,
    pub must_have_score: i64,
    pub nice_to_have_score: i64,
    pub suitability_score: i64,
    /// Informational; not part of the total.
    pub formatting_score: i64,
    pub total: f64,
    pub skills_breakdown: Vec<SkillCategory>,
    pub experience_notes: Vec<String>,
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub final_score: f64,
    pub breakdown: ScoreBreakdown,
}

/// Round experience to whole years: .5 and above rounds up.
pub fn round_experience(years: f64) -> i64 {
    (years + 0.5).floor() as i64
}

/// Pick the strongest option of an OR group.
///
/// Returns the matched option (none when every option is missing) and its
/// strength. Ties keep the earliest option.
pub fn best_option(skill: &Skill, resume: &ResumeAnalysis) -> (Option<String>, SkillStrength) {
    let mut best: Option<&String> = None;
    let mut best_strength = SkillStrength::Missing;

    for option in skill.options() {
        let strength = resume.strength_of(option);
        if strength.multiplier() > best_strength.multiplier() {
            best = Some(option);
            best_strength = strength;
        }
    }

    (best.cloned(), best_strength)
}

/// One decimal place, ties to even on the exact binary value.
fn round1(value: f64) -> f64 {
    format!("{:.1}", value).parse().unwrap_or(value)
}

fn round_whole(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Scores resumes against job requirements.
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoreWeights,
}

impl Scorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Strength of a requirement and, for OR groups, the option that satisfied it.
    ///
    /// Single skills match their name exactly; only OR-group options fall back
    /// to a case-insensitive match.
    fn requirement_strength(
        skill: &Skill,
        resume: &ResumeAnalysis,
    ) -> (Option<String>, SkillStrength) {
        if skill.is_or_group() {
            best_option(skill, resume)
        } else {
            (None, resume.exact_strength(&skill.skill))
        }
    }

    /// Score must-have and nice-to-have skills.
    ///
    /// Must-have skills share the must-have budget equally and earn points by
    /// strength multiplier. Nice-to-have skills share their budget equally and
    /// earn full points for any non-missing strength.
    pub fn score_skills(&self, job: &JobAnalysis, resume: &ResumeAnalysis) -> (i64, i64, Vec<SkillCategory>) {
        let mut breakdown = Vec::new();
        let mut must_have_score = 0.0;
        let mut nice_to_have_score = 0.0;

        if !job.must_have_skills.is_empty() {
            let per_skill = self.weights.must_have_max / job.must_have_skills.len() as f64;
            let mut skills = Vec::with_capacity(job.must_have_skills.len());

            for skill in &job.must_have_skills {
                let (matched_option, strength) = Self::requirement_strength(skill, resume);
                let points = per_skill * strength.multiplier();
                must_have_score += points;

                skills.push(SkillScore {
                    skill: skill.display_name(),
                    strength: Some(strength),
                    has_skill: None,
                    matched_option,
                    points: round1(points),
                    max_points: round1(per_skill),
                    is_or_group: skill.is_or_group(),
                });
            }

            breakdown.push(SkillCategory {
                category: "Must-Have Skills (Technical)".to_string(),
                total_points: round1(must_have_score),
                max_points: self.weights.must_have_max,
                skills,
            });
        }

        if !job.nice_to_have_skills.is_empty() {
            let per_skill = self.weights.nice_to_have_max / job.nice_to_have_skills.len() as f64;
            let mut skills = Vec::with_capacity(job.nice_to_have_skills.len());

            for skill in &job.nice_to_have_skills {
                let (matched_option, strength) = Self::requirement_strength(skill, resume);
                let has_skill = !strength.is_missing();
                let points = if has_skill { per_skill } else { 0.0 };
                nice_to_have_score += points;

                skills.push(SkillScore {
                    skill: skill.display_name(),
                    strength: None,
                    has_skill: Some(has_skill),
                    matched_option,
                    points: round1(points),
                    max_points: round1(per_skill),
                    is_or_group: skill.is_or_group(),
                });
            }

            breakdown.push(SkillCategory {
                category: "Nice-to-Have Skills (Bonus)".to_string(),
                total_points: round1(nice_to_have_score),
                max_points: self.weights.nice_to_have_max,
                skills,
            });
        }

        (
            round_whole(must_have_score),
            round_whole(nice_to_have_score),
            breakdown,
        )
    }

    /// Scale engineering depth (0-15) onto the suitability budget.
    pub fn suitability(&self, engineering_depth: i64) -> i64 {
        let scaled = round_whole(
            engineering_depth as f64 * (self.weights.suitability_max / MAX_ENGINEERING_DEPTH as f64),
        );
        scaled.clamp(0, self.weights.suitability_max as i64)
    }

    /// Compare experience against the requirement.
    ///
    /// Returns explanation lines and notes. Shortfalls are noted, never penalised.
    pub fn check_experience(&self, candidate_years: f64, required_years: f64) -> (Vec<String>, Vec<String>) {
        let candidate = round_experience(candidate_years);
        let required = round_experience(required_years);

        let mut explanations = Vec::new();
        let mut notes = Vec::new();

        if candidate >= required {
            explanations.push(format!("✓ Has {}+ years (required: {})", candidate, required));
        } else if candidate >= required - EXPERIENCE_TOLERANCE_YEARS {
            explanations.push(format!(
                "~ Has {} years (required: {}, within tolerance)",
                candidate, required
            ));
        } else {
            notes.push(format!(
                "Experience gap: {} years below requirement",
                required - candidate
            ));
            explanations.push(format!("⚠ Has {} years (required: {})", candidate, required));
        }

        (explanations, notes)
    }

    /// Total of base, skills and suitability, clamped to 0-100.
    pub fn final_score(&self, must_have: i64, nice_to_have: i64, suitability: i64) -> f64 {
        let total = (self.weights.base + must_have + nice_to_have + suitability) as f64;
        round1(total.clamp(0.0, 100.0))
    }

    /// Complete scoring for one candidate.
    pub fn score_candidate(&self, resume: &ResumeAnalysis, job: &JobAnalysis) -> CandidateScore {
        let (must_have_score, nice_to_have_score, skills_breakdown) = self.score_skills(job, resume);
        let suitability_score = self.suitability(resume.engineering_depth_score);
        let (experience_notes, notes) = self.check_experience(
            resume.estimated_total_experience,
            job.total_experience_required,
        );

        let final_score = self.final_score(must_have_score, nice_to_have_score, suitability_score);

        CandidateScore {
            final_score,
            breakdown: ScoreBreakdown {
                base_score: self.weights.base,
                must_have_score,
                nice_to_have_score,
                suitability_score,
                formatting_score: resume.formatting_score,
                total: final_score,
                skills_breakdown,
                experience_notes,
                notes,
            },
        }
    }
}
