//! Result types returned by the extraction and correction entry points.
//!
//! Everything here is `Serialize` so the CLI can emit it with `--json`.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a document's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextSource {
    /// The PDF's embedded text layer (no OCR was run).
    TextLayer,
    /// The best-scoring OCR configuration.
    Ocr { dpi: u32, psm: u8 },
}

/// Score of one configuration tried by the OCR search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub dpi: u32,
    pub psm: u8,
    /// `None` when the configuration could not be rendered.
    pub score: Option<f64>,
    /// Whitespace-separated tokens longer than one character.
    pub words: usize,
    pub chars: usize,
    /// Render failure for this configuration, if any.
    pub error: Option<String>,
}

/// Timing and counters for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Pages in the document (0 if it could not be rendered or opened).
    pub page_count: usize,
    pub configurations_tried: usize,
    pub configurations_failed: usize,
    pub total_duration_ms: u64,
}

/// Text extracted from one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Repaired text (not yet spell-corrected).
    pub text: String,
    pub source: TextSource,
    /// Score of the winning OCR configuration; `None` for the text layer.
    pub score: Option<f64>,
    /// Every OCR configuration in scan order (empty for the text layer).
    pub candidates: Vec<CandidateScore>,
    /// Page-scoped failures that degraded the result.
    pub page_errors: Vec<PageError>,
    pub stats: ExtractionStats,
}

/// Outcome of one document in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub input: PathBuf,
    /// The text file written for this document, if writing succeeded.
    pub output: Option<PathBuf>,
    pub chars: usize,
    pub source: Option<TextSource>,
    pub score: Option<f64>,
    pub page_errors: usize,
    /// Document-level failure description.
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole extraction batch, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub succeeded: usize,
    pub failed: usize,
    pub total_duration_ms: u64,
}

/// One corrected corpus file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Tokens replaced by a vocabulary entry.
    pub replacements: usize,
    pub error: Option<String>,
}

/// Outcome of the corpus correction stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionReport {
    /// Distinct word-forms seen in the corpus.
    pub distinct_words: usize,
    /// Word-forms at or above the frequency threshold.
    pub vocabulary_size: usize,
    pub files: Vec<CorrectedFile>,
    pub total_replacements: usize,
}
