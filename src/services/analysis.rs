//! Model-backed analysis of job descriptions, resumes and interviews.
//!
//! Every operation degrades to a fallback value when the model call or
//! JSON parsing fails, so a screening run always completes.

use std::sync::Arc;

use aristosys_llm::{extract_json, Completer};
use aristosys_scoring::{AudioAnalysis, JobAnalysis, ResumeAnalysis};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const JD_CHAR_LIMIT: usize = 8000;
const RESUME_CHAR_LIMIT: usize = 6000;
const TRANSCRIPT_CHAR_LIMIT: usize = 8000;

const JD_MAX_TOKENS: u32 = 2500;
const RESUME_MAX_TOKENS: u32 = 2500;
const INTERVIEW_MAX_TOKENS: u32 = 1500;
const RECOMMENDATION_MAX_TOKENS: u32 = 300;

/// Skills evaluated when the job analysis lists none.
const DEFAULT_SKILL_LIST: &str = "Python, SQL, Git";

/// Analysis service over any [`Completer`].
#[derive(Clone)]
pub struct AnalysisService {
    llm: Arc<dyn Completer>,
}

impl AnalysisService {
    pub fn new(llm: Arc<dyn Completer>) -> Self {
        Self { llm }
    }

    /// Extract structured requirements from a job description.
    pub async fn analyze_job(&self, jd_text: &str, client_comments: Option<&str>) -> JobAnalysis {
        let prompt = job_prompt(jd_text, client_comments);

        match self.complete_json::<JobAnalysis>(&prompt, JD_MAX_TOKENS).await {
            Ok(analysis) => {
                debug!(
                    title = %analysis.job_title,
                    must_have = analysis.must_have_skills.len(),
                    nice_to_have = analysis.nice_to_have_skills.len(),
                    "JD analysed"
                );
                analysis
            }
            Err(e) => {
                warn!(error = %e, "JD analysis failed, using fallback");
                JobAnalysis::fallback()
            }
        }
    }

    /// Evaluate a resume against analysed requirements.
    pub async fn analyze_resume(
        &self,
        resume_text: &str,
        job: &JobAnalysis,
        client_comments: Option<&str>,
    ) -> ResumeAnalysis {
        let prompt = resume_prompt(resume_text, job, client_comments);

        match self
            .complete_json::<ResumeAnalysis>(&prompt, RESUME_MAX_TOKENS)
            .await
        {
            Ok(mut analysis) => {
                analysis.clamp_scores();
                analysis
            }
            Err(e) => {
                warn!(error = %e, "Resume analysis failed, using fallback");
                ResumeAnalysis::fallback()
            }
        }
    }

    /// Evaluate an interview transcript against the must-have skills.
    pub async fn analyze_interview(&self, transcript: &str, job: &JobAnalysis) -> AudioAnalysis {
        let prompt = interview_prompt(transcript, job);

        match self
            .complete_json::<AudioAnalysis>(&prompt, INTERVIEW_MAX_TOKENS)
            .await
        {
            Ok(mut analysis) => {
                analysis.clamp_scores();
                analysis
            }
            Err(e) => {
                warn!(error = %e, "Interview analysis failed, using fallback");
                AudioAnalysis::fallback()
            }
        }
    }

    /// Short hiring recommendation for one candidate.
    pub async fn recommend(
        &self,
        candidate_name: &str,
        resume_score: Option<f64>,
        audio: Option<&AudioAnalysis>,
        job: &JobAnalysis,
    ) -> String {
        let prompt = recommendation_prompt(candidate_name, resume_score, audio, job);

        match self.llm.complete(&prompt, RECOMMENDATION_MAX_TOKENS).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(candidate = %candidate_name, error = %e, "Recommendation failed");
                format!("Unable to generate recommendation: {}", e)
            }
        }
    }

    async fn complete_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        max_tokens: u32,
    ) -> aristosys_llm::Result<T> {
        let text = self.llm.complete(prompt, max_tokens).await?;
        let value = extract_json(&text)?;
        serde_json::from_value(value).map_err(|e| aristosys_llm::Error::InvalidJson(e.to_string()))
    }
}

/// First `limit` characters of `text`.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn job_prompt(jd_text: &str, client_comments: Option<&str>) -> String {
    let client_section = client_comments
        .map(|c| format!("ADDITIONAL CLIENT REQUIREMENTS: {}", c))
        .unwrap_or_default();

    format!(
        r#"You are an expert technical recruiter analyzing a Job Description.

JOB DESCRIPTION:
{jd}

{client_section}

Return ONLY valid JSON:

{{
  "job_title": "exact job title from JD",
  "job_classification": "strict_engineering OR moderate_engineering OR support_ok",
  "classification_reasoning": "1-2 sentence explanation",
  "must_have_skills": [
    {{"skill": "Python", "type": "single"}},
    {{"skill": "Database", "type": "or_group", "options": ["MySQL", "MongoDB", "PostgreSQL"]}},
    {{"skill": "CI/CD Tools", "type": "or_group", "options": ["Jenkins", "GitHub Actions", "GitLab CI"]}},
    {{"skill": "Cloud Platform", "type": "or_group", "options": ["AWS", "Azure", "GCP"]}}
  ],
  "nice_to_have_skills": [
    {{"skill": "Docker", "type": "single"}},
    {{"skill": "Container Orchestration", "type": "or_group", "options": ["Kubernetes", "ECS"]}}
  ],
  "total_experience_required": 5,
  "relevant_experience_required": {{"SkillName": 3}}
}}

SKILL GROUPING RULES:
1. When JD says "(A, B, C)" -> These are OR options, group them together
2. When JD says "e.g., A, B" or "such as A, B" or "like A, B" -> OR options
3. When JD says "A or B" explicitly -> OR options
4. When JD says "A/B/C" with slashes -> OR options
5. When JD says "A and B" explicitly or lists core technologies -> AND (separate skills)
6. For OR groups, use a descriptive category name like "Database", "Cloud Platform", "CI/CD Tools"

CLASSIFICATION RULES:
- strict_engineering: Software Dev, Full Stack, Backend, Frontend, Cloud Engineer, DevOps, SRE, AWS Data Engineer, ETL
- moderate_engineering: QA Automation, Test Engineer, RPA Developer
- support_ok: CDGC, Data Governance, ITSM, SAP functional, CRM functional, L2/L3 support

JSON:"#,
        jd = truncate_chars(jd_text, JD_CHAR_LIMIT),
        client_section = client_section,
    )
}

fn resume_prompt(resume_text: &str, job: &JobAnalysis, client_comments: Option<&str>) -> String {
    let skills = job.skills_to_evaluate(true);
    let skill_list = if skills.is_empty() {
        DEFAULT_SKILL_LIST.to_string()
    } else {
        skills.join(", ")
    };
    let relevant = serde_json::to_string(&job.relevant_experience_required)
        .unwrap_or_else(|_| "{}".to_string());
    let client_section = client_comments
        .map(|c| format!("CLIENT REQUIREMENTS: {}", c))
        .unwrap_or_default();

    format!(
        r#"You are an expert technical recruiter evaluating a candidate's resume.

JOB REQUIREMENTS:
- Title: {title}
- Classification: {classification}
- Total Experience Required: {total} years
- Relevant Experience Required: {relevant}

{client_section}

RESUME:
{resume}

Return ONLY valid JSON:

{{
  "candidate_name": "Full Name from resume",
  "candidate_email": "email@example.com or null if not found",
  "candidate_linkedin": "linkedin.com/in/profile or null if not found",
  "candidate_phone": "phone number or null if not found",
  "estimated_total_experience": 6.5,
  "skill_strength": {{"SkillName": "strong/moderate/weak/missing"}},
  "estimated_relevant_experience": {{"SkillName": 3}},
  "support_hybrid_pattern": "engineering_heavy OR hybrid OR support_heavy",
  "pattern_reasoning": "1 sentence",
  "engineering_depth_score": 12,
  "engineering_depth_reasoning": "1-2 sentences",
  "formatting_score": 2,
  "formatting_notes": "brief notes",
  "career_gap_months": 0,
  "gap_reason": "none OR education OR maternity OR illness OR unexplained",
  "gap_is_recent": false,
  "job_hopping_data": {{
    "full_time_roles_last_5_years": 2,
    "short_tenure_ft_roles_count": 0,
    "has_valid_explanation": true
  }},
  "summary": "2-3 sentence summary",
  "strengths": ["s1", "s2", "s3"],
  "concerns": ["c1", "c2"]
}}

CONTACT INFO EXTRACTION:
- candidate_email: Extract the email address exactly as written in the resume
- candidate_linkedin: Extract the LinkedIn URL
- candidate_phone: Extract phone number including country code if present
- If any contact info is not found, set to null

EVALUATE EACH SKILL INDIVIDUALLY: {skill_list}

SKILL STRENGTH: strong (prominently featured), moderate (mentioned), weak (brief mention), missing (not found)
ENGINEERING DEPTH (0-15): 0-5 (lists tools), 6-10 (basic work), 11-15 (architecture, ownership)
FORMATTING (0-3): 0 (poor), 1 (issues), 2 (good), 3 (excellent)

JSON:"#,
        title = job.title_or("Technical Role"),
        classification = job.job_classification,
        total = job.total_experience_required,
        relevant = relevant,
        client_section = client_section,
        resume = truncate_chars(resume_text, RESUME_CHAR_LIMIT),
        skill_list = skill_list,
    )
}

fn interview_prompt(transcript: &str, job: &JobAnalysis) -> String {
    format!(
        r#"You are an expert technical recruiter evaluating an interview transcript.

JOB: {title}
KEY SKILLS TO EVALUATE: {skills}

INTERVIEW TRANSCRIPT:
{transcript}

Return ONLY valid JSON:

{{
  "technical_score": 75,
  "communication_score": 80,
  "skills_demonstrated": ["skill1", "skill2"],
  "skills_missing": ["skill3"],
  "technical_notes": "2-3 sentences on technical ability",
  "communication_notes": "2-3 sentences on communication",
  "transcript_summary": "Brief summary of interview"
}}

SCORING GUIDELINES:
- technical_score (0-100): How well did they demonstrate technical knowledge?
- communication_score (0-100): Clarity, articulation, professionalism
- Be lenient with accents and non-native phrasing - focus on content

JSON:"#,
        title = job.title_or("Technical Role"),
        skills = job.skills_to_evaluate(false).join(", "),
        transcript = truncate_chars(transcript, TRANSCRIPT_CHAR_LIMIT),
    )
}

fn recommendation_prompt(
    candidate_name: &str,
    resume_score: Option<f64>,
    audio: Option<&AudioAnalysis>,
    job: &JobAnalysis,
) -> String {
    let score = resume_score
        .filter(|s| *s != 0.0)
        .map(|s| format!("{:.1}", s))
        .unwrap_or_else(|| "N/A".to_string());
    let (technical, communication) = match audio {
        Some(a) => (
            format!("TECHNICAL SCORE: {}/100", a.technical_score),
            format!("COMMUNICATION SCORE: {}/100", a.communication_score),
        ),
        None => (String::new(), String::new()),
    };

    format!(
        r#"Based on screening results, provide a brief hiring recommendation.

JOB: {title}
CANDIDATE: {candidate_name}
RESUME SCORE: {score}/100

{technical}
{communication}

Provide a 2-3 sentence recommendation. Be direct about whether to proceed or not."#,
        title = job.title_or("Technical Role"),
    )
}
