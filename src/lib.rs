//! Aristosys - AI-powered recruitment screening
//!
//! Analyses job descriptions, scores resumes against them, transcribes and
//! evaluates interview recordings, and stores ranked screening reports.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;
