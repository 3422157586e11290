//! Pairing uploaded resumes with interview recordings by file name.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// File name fragments that describe the document rather than the person.
const NAME_SUFFIXES: &[&str] = &[
    "_resume",
    "_cv",
    "_interview",
    "_audio",
    "_recording",
    "resume",
    "cv",
];

/// Shortest word that takes part in substring matching.
const MIN_PARTIAL_WORD_LEN: usize = 3;

/// An uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            bytes,
        }
    }

    /// Declared content type, else one guessed from the extension.
    pub fn mime_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
            .unwrap_or_else(|| {
                mime_guess::from_path(&self.filename)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            })
    }
}

/// Files belonging to one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateUploads {
    /// Normalized name the files were grouped under.
    pub key: String,
    pub resume: Option<Upload>,
    pub audio: Option<Upload>,
}

struct NamePatterns {
    suffixes: Vec<Regex>,
    separators: Regex,
}

fn patterns() -> &'static NamePatterns {
    static PATTERNS: OnceLock<NamePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| NamePatterns {
        suffixes: NAME_SUFFIXES
            .iter()
            .map(|suffix| {
                Regex::new(&format!(r"(?i)[_\-\s]*{}[_\-\s]*", regex::escape(suffix)))
                    .expect("suffix pattern is valid")
            })
            .collect(),
        separators: Regex::new(r"[_\-]+").expect("separator pattern is valid"),
    })
}

/// Reduce a file name to the person it is about.
///
/// `"John_Smith_Resume.pdf"` and `"John_Smith_Interview.mp3"` both become
/// `"john smith"`.
pub fn normalize_name(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let patterns = patterns();
    let mut name = stem;
    for suffix in &patterns.suffixes {
        name = suffix.replace_all(&name, "").into_owned();
    }

    patterns
        .separators
        .replace_all(&name, " ")
        .to_lowercase()
        .trim()
        .to_string()
}

/// Whether one word contains the other, ignoring very short words.
pub fn partial_word_match(a: &str, b: &str) -> bool {
    if a.chars().count() < MIN_PARTIAL_WORD_LEN || b.chars().count() < MIN_PARTIAL_WORD_LEN {
        return false;
    }
    a.contains(b) || b.contains(a)
}

fn names_overlap(audio_key: &str, candidate_key: &str) -> bool {
    let audio_words: HashSet<&str> = audio_key.split_whitespace().collect();
    let candidate_words: HashSet<&str> = candidate_key.split_whitespace().collect();

    if !audio_words.is_disjoint(&candidate_words) {
        return true;
    }

    audio_words
        .iter()
        .any(|aw| candidate_words.iter().any(|cw| partial_word_match(aw, cw)))
}

/// Group uploads into candidates, keyed by normalized name in upload order.
pub fn group_uploads(resumes: Vec<Upload>, audio: Vec<Upload>) -> Vec<CandidateUploads> {
    let mut candidates: Vec<CandidateUploads> = Vec::new();

    for resume in resumes {
        let key = normalize_name(&resume.filename);
        match candidates.iter_mut().find(|c| c.key == key) {
            Some(existing) => existing.resume = Some(resume),
            None => candidates.push(CandidateUploads {
                key,
                resume: Some(resume),
                audio: None,
            }),
        }
    }

    for recording in audio {
        let key = normalize_name(&recording.filename);

        let target = candidates
            .iter()
            .position(|c| c.key == key)
            .or_else(|| candidates.iter().position(|c| names_overlap(&key, &c.key)));

        match target {
            Some(idx) => candidates[idx].audio = Some(recording),
            None => candidates.push(CandidateUploads {
                key,
                resume: None,
                audio: Some(recording),
            }),
        }
    }

    candidates
}
