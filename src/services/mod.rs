//! Service layer for Aristosys.
//!
//! Contains business logic and external service integrations:
//! - Analysis (model prompts for JDs, resumes, interviews, recommendations)
//! - Transcription (Deepgram speech-to-text)
//! - Auth (Supabase signup/login proxy)
//! - Documents (PDF and text extraction)
//! - Matching (pairing resumes with recordings by file name)
//! - Report (HTML rendering of screening results)
//! - Screening (end-to-end screening runs)

mod analysis;
mod auth;
pub mod documents;
pub mod matching;
pub mod report;
mod screening;
mod transcription;

pub use analysis::AnalysisService;
pub use auth::{AuthService, AuthUser, LoginRequest, LoginResponse, SignupRequest, SignupResponse};
pub use matching::{group_uploads, normalize_name, CandidateUploads, Upload};
pub use screening::{rank_candidates, ResolvedJob, ScreeningRequest, ScreeningService};
pub use transcription::{DeepgramService, Transcriber, Transcript};

pub use aristosys_llm::{Completer, LlmService};
