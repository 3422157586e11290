//! Candidate screening runs.
//!
//! A run resolves the job description, pairs resumes with interview
//! recordings, screens every candidate with bounded concurrency, ranks
//! them and stores the result as a screening report.

use std::cmp::Ordering;
use std::sync::Arc;

use aristosys_scoring::{JobAnalysis, Scorer};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::analysis::AnalysisService;
use super::documents::{extract_text_blocking, upload_or_text};
use super::matching::{group_uploads, CandidateUploads, Upload};
use super::report::render_report;
use super::transcription::Transcriber;
use crate::db::{self, CreateScreeningReport, DbPool};
use crate::error::{Error, Result};
use crate::models::{now, CandidateResult, ScreeningResponse};

/// Inputs of a screening run.
#[derive(Debug, Clone, Default)]
pub struct ScreeningRequest {
    pub jd_id: Option<String>,
    pub jd_file: Option<Upload>,
    pub jd_text: Option<String>,
    pub client_id: Option<String>,
    pub resumes: Vec<Upload>,
    pub audio_files: Vec<Upload>,
}

/// Job description a run screens against.
#[derive(Debug, Clone)]
pub struct ResolvedJob {
    /// Set when the run used a saved job description.
    pub jd_id: Option<String>,
    pub analysis: JobAnalysis,
}

/// Orchestrates screening runs.
#[derive(Clone)]
pub struct ScreeningService {
    db: DbPool,
    analysis: AnalysisService,
    transcriber: Arc<dyn Transcriber>,
    scorer: Scorer,
    concurrency: usize,
}

impl ScreeningService {
    pub fn new(
        db: DbPool,
        analysis: AnalysisService,
        transcriber: Arc<dyn Transcriber>,
        scorer: Scorer,
        concurrency: usize,
    ) -> Self {
        Self {
            db,
            analysis,
            transcriber,
            scorer,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve the job description: saved id, then upload, then text.
    pub async fn resolve_job(
        &self,
        jd_id: Option<&str>,
        jd_file: Option<Upload>,
        jd_text: Option<String>,
    ) -> Result<ResolvedJob> {
        if let Some(jd_id) = jd_id.filter(|id| !id.is_empty()) {
            let saved = db::get_job_description(&self.db, jd_id).await?;
            let analysis = match saved.analysis() {
                Some(analysis) => analysis,
                None => {
                    debug!(jd_id = %saved.id, "Saved JD has no analysis, analysing now");
                    self.analysis.analyze_job(&saved.jd_text, None).await
                }
            };
            return Ok(ResolvedJob {
                jd_id: Some(saved.id),
                analysis,
            });
        }

        match upload_or_text(jd_file, jd_text).await? {
            Some(text) => Ok(ResolvedJob {
                jd_id: None,
                analysis: self.analysis.analyze_job(&text, None).await,
            }),
            None => Err(Error::InvalidInput("Provide jd_id or jd_file".to_string())),
        }
    }

    /// Screen every uploaded candidate and store the ranked result.
    pub async fn screen(&self, request: ScreeningRequest) -> Result<ScreeningResponse> {
        let job = self
            .resolve_job(request.jd_id.as_deref(), request.jd_file, request.jd_text)
            .await?;

        let client = match request.client_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => db::find_client(&self.db, id).await?,
            None => None,
        };
        let client_comments = client.as_ref().and_then(|c| c.prompt_comments());

        let groups = group_uploads(request.resumes, request.audio_files);
        info!(
            job = %job.analysis.job_title,
            candidates = groups.len(),
            concurrency = self.concurrency,
            "Starting screening run"
        );

        // Extract every resume up front so a bad upload fails the run
        // before any model calls are made.
        let mut prepared = Vec::with_capacity(groups.len());
        for mut group in groups {
            // Only the file name is needed once the text is out.
            let resume_text = match group.resume.as_mut() {
                Some(resume) => {
                    let bytes = std::mem::take(&mut resume.bytes);
                    Some(extract_text_blocking(resume.filename.clone(), bytes).await?)
                }
                None => None,
            };
            prepared.push((group, resume_text));
        }

        let job_analysis = &job.analysis;
        let comments = client_comments.as_deref();
        let mut candidates: Vec<CandidateResult> = stream::iter(prepared)
            .map(|(group, resume_text)| {
                self.screen_candidate(group, resume_text, job_analysis, comments)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        rank_candidates(&mut candidates);

        let screened_at = now();
        let job_title = job.analysis.title_or("Unknown Position").to_string();
        let report_html = render_report(&job.analysis, &candidates, &screened_at);

        let report_id = match serde_json::to_value(&candidates) {
            Ok(candidates_json) => {
                let saved = db::create_screening_report(
                    &self.db,
                    CreateScreeningReport {
                        jd_id: job.jd_id.clone(),
                        job_title: job_title.clone(),
                        candidates: candidates_json,
                        report_html: report_html.clone(),
                        client_id: client.map(|c| c.id),
                    },
                )
                .await;
                match saved {
                    Ok(report) => Some(report.id),
                    Err(e) => {
                        warn!(error = %e, "Failed to store screening report");
                        None
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to encode screening results");
                None
            }
        };

        info!(
            job = %job_title,
            candidates = candidates.len(),
            report_id = ?report_id,
            "Screening run complete"
        );

        Ok(ScreeningResponse {
            report_id,
            job_title,
            job_analysis: job.analysis,
            candidates,
            report_html: Some(report_html),
            screened_at,
        })
    }

    async fn screen_candidate(
        &self,
        group: CandidateUploads,
        resume_text: Option<String>,
        job: &JobAnalysis,
        client_comments: Option<&str>,
    ) -> CandidateResult {
        let mut result = CandidateResult::new(group.key.clone());
        result.resume_file = group.resume.as_ref().map(|u| u.filename.clone());
        result.audio_file = group.audio.as_ref().map(|u| u.filename.clone());

        if let Some(text) = resume_text {
            let analysis = self
                .analysis
                .analyze_resume(&text, job, client_comments)
                .await;
            if let Some(name) = analysis.known_name() {
                result.name = name.to_string();
            }

            let score = self.scorer.score_candidate(&analysis, job);
            debug!(candidate = %result.name, score = score.final_score, "Resume scored");
            result.resume_score = Some(score.final_score);
            result.score_breakdown = Some(score.breakdown);
            result.resume_analysis = Some(analysis);
        }

        if let Some(recording) = group.audio {
            let content_type = recording.mime_type();
            match self
                .transcriber
                .transcribe_bytes(recording.bytes, &content_type)
                .await
            {
                Ok(transcript) if !transcript.text.is_empty() => {
                    result.audio_analysis =
                        Some(self.analysis.analyze_interview(&transcript.text, job).await);
                }
                Ok(_) => {
                    debug!(file = %recording.filename, "Empty transcript, skipping interview analysis");
                }
                Err(e) => {
                    warn!(file = %recording.filename, error = %e, "Transcription failed");
                }
            }
        }

        if result.resume_score.is_some() || result.audio_analysis.is_some() {
            let recommendation = self
                .analysis
                .recommend(
                    &result.name,
                    result.resume_score,
                    result.audio_analysis.as_ref(),
                    job,
                )
                .await;
            result.recommendation = Some(recommendation);
        }

        result
    }
}

/// Sort best first by resume score, then interview technical score.
///
/// Missing scores count as zero; ties keep upload order.
pub fn rank_candidates(candidates: &mut [CandidateResult]) {
    fn key(c: &CandidateResult) -> (f64, f64) {
        (
            c.resume_score.unwrap_or(0.0),
            c.technical_score().unwrap_or(0) as f64,
        )
    }

    candidates.sort_by(|a, b| {
        let (a_score, a_tech) = key(a);
        let (b_score, b_tech) = key(b);
        b_score
            .partial_cmp(&a_score)
            .unwrap_or(Ordering::Equal)
            .then(b_tech.partial_cmp(&a_tech).unwrap_or(Ordering::Equal))
    });
}
