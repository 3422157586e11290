//! Screening run results.

use aristosys_scoring::{AudioAnalysis, JobAnalysis, ResumeAnalysis, ScoreBreakdown};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::ScreeningReport;

/// Outcome of screening one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub name: String,
    pub resume_file: Option<String>,
    pub audio_file: Option<String>,
    pub resume_score: Option<f64>,
    pub resume_analysis: Option<ResumeAnalysis>,
    pub audio_analysis: Option<AudioAnalysis>,
    pub score_breakdown: Option<ScoreBreakdown>,
    pub recommendation: Option<String>,
    pub screened_at: String,
}

impl CandidateResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resume_file: None,
            audio_file: None,
            resume_score: None,
            resume_analysis: None,
            audio_analysis: None,
            score_breakdown: None,
            recommendation: None,
            screened_at: super::now(),
        }
    }

    /// Interview technical score, when an interview was analysed.
    pub fn technical_score(&self) -> Option<i64> {
        self.audio_analysis.as_ref().map(|a| a.technical_score)
    }
}

/// Response of a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningResponse {
    pub report_id: Option<String>,
    pub job_title: String,
    pub job_analysis: JobAnalysis,
    pub candidates: Vec<CandidateResult>,
    pub report_html: Option<String>,
    pub screened_at: String,
}

/// Stored screening report as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: String,
    pub jd_id: Option<String>,
    pub job_title: String,
    pub candidates: Value,
    pub report_html: String,
    pub client_id: Option<String>,
    pub created_at: String,
}

impl From<ScreeningReport> for ReportResponse {
    fn from(report: ScreeningReport) -> Self {
        let candidates = report.candidates();
        Self {
            id: report.id,
            jd_id: report.jd_id,
            job_title: report.job_title,
            candidates,
            report_html: report.report_html,
            client_id: report.client_id,
            created_at: report.created_at,
        }
    }
}
