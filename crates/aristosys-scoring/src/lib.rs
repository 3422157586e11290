//! Candidate scoring for Aristosys.
//!
//! Holds the structured results the language model produces for a job
//! description, a resume and an interview, and the deterministic scoring
//! that turns a resume analysis into a 0-100 score.
//!
//! Score allocation:
//! - Base: 40 points
//! - Must-have skills: 30 points, weighted by skill strength
//! - Nice-to-have skills: 5 points, binary per skill
//! - Suitability: 25 points, scaled from engineering depth (0-15)
//!
//! Model output is loosely structured, so every type here deserializes
//! leniently: missing fields take defaults, skills may be plain strings,
//! and unknown enum values collapse to a safe default.

mod interview;
mod job;
mod lenient;
mod resume;
mod score;

pub use interview::AudioAnalysis;
pub use job::{JobAnalysis, JobClassification, Skill, SkillType};
pub use resume::{JobHoppingData, ResumeAnalysis, SkillStrength};
pub use score::{
    best_option, round_experience, CandidateScore, ScoreBreakdown, ScoreWeights, Scorer,
    SkillCategory, SkillScore,
};
