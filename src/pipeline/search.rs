//! Configuration search: try every (resolution, segmentation mode) pair and
//! keep the text that scores best.
//!
//! ## Scan order and ties
//!
//! The grid is walked resolution-major (`300/3, 300/6, 300/1, 400/3, …`).
//! A candidate replaces the incumbent only when its score is strictly
//! greater, so on equal scores the earliest configuration in scan order wins.
//!
//! ## Memory
//!
//! Each resolution is rasterised once. Raw page bitmaps are dropped as soon as
//! they are binarized; the binarized pages of one resolution are then shared
//! by all segmentation modes and dropped before the next resolution renders.
//!
//! ## Scoring
//!
//! [`score_text`] is a heuristic quality proxy, not a correctness criterion:
//! the share of alphabetic characters plus a small bonus for word count,
//! capped at [`WORD_BONUS_CAP`]. Tune it here if recognition quality
//! needs a different proxy.

use crate::error::{PageError, Scan2TxtError};
use crate::output::CandidateScore;
use crate::pipeline::binarize::{binarize, PreprocessedPage};
use crate::pipeline::recognize::{EngineParams, TextRecognizer};
use crate::pipeline::render::PageRenderer;
use crate::pipeline::repair::repair;
use crate::progress::ProgressCallback;
use std::path::Path;
use tracing::{debug, info, warn};

/// Rendering resolutions tried, in scan order.
pub const RESOLUTIONS: [u32; 2] = [300, 400];

/// Tesseract page segmentation modes tried per resolution, in scan order.
pub const SEGMENTATION_MODES: [u8; 3] = [3, 6, 1];

/// Tesseract engine mode (LSTM only).
pub const ENGINE_MODE: u8 = 1;

/// Words needed to earn one full point of word bonus, before the cap.
const WORDS_PER_POINT: f64 = 10_000.0;

/// Upper bound of the word-count bonus.
pub const WORD_BONUS_CAP: f64 = 0.1;

/// One point of the search grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub dpi: u32,
    /// Page segmentation mode.
    pub psm: u8,
}

/// The fixed search grid.
#[derive(Debug, Clone)]
pub struct ConfigurationGrid {
    resolutions: &'static [u32],
    modes: &'static [u8],
}

impl Default for ConfigurationGrid {
    fn default() -> Self {
        Self {
            resolutions: &RESOLUTIONS,
            modes: &SEGMENTATION_MODES,
        }
    }
}

impl ConfigurationGrid {
    /// All configurations in scan order.
    pub fn configurations(&self) -> Vec<Configuration> {
        self.resolutions
            .iter()
            .flat_map(|&dpi| self.modes.iter().map(move |&psm| Configuration { dpi, psm }))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.resolutions.len() * self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Heuristic quality of a recognised text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextScore {
    pub score: f64,
    pub alpha_ratio: f64,
    /// Whitespace-separated tokens longer than one character.
    pub words: usize,
    pub chars: usize,
}

/// `alpha_ratio + min(words / 10000, 0.1)`.
pub fn score_text(text: &str) -> TextScore {
    let chars = text.chars().count();
    let alpha = text.chars().filter(|c| c.is_alphabetic()).count();
    let alpha_ratio = if chars > 0 {
        alpha as f64 / chars as f64
    } else {
        0.0
    };
    let words = text
        .split_whitespace()
        .filter(|w| w.chars().count() > 1)
        .count();
    let word_bonus = (words as f64 / WORDS_PER_POINT).min(WORD_BONUS_CAP);

    TextScore {
        score: alpha_ratio + word_bonus,
        alpha_ratio,
        words,
        chars,
    }
}

/// Repaired text produced by one configuration, with its score.
#[derive(Debug, Clone)]
pub struct ScoredResult {
    pub configuration: Configuration,
    pub text: String,
    pub score: TextScore,
    /// Pages this configuration failed to recognize.
    pub page_errors: Vec<PageError>,
}

/// Everything the search learned about one document.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best: ScoredResult,
    /// Every configuration in scan order, including failed ones.
    pub candidates: Vec<CandidateScore>,
    pub page_count: usize,
}

/// Run the full grid over one document.
///
/// # Errors
/// [`Scan2TxtError::AllConfigurationsFailed`] when no resolution could be
/// rasterised. Recognition failures never fail the search; the page simply
/// contributes empty text.
pub fn search_best(
    pdf_path: &Path,
    renderer: &dyn PageRenderer,
    recognizer: &dyn TextRecognizer,
    language: Option<&str>,
    progress: Option<&ProgressCallback>,
) -> Result<SearchOutcome, Scan2TxtError> {
    search_grid(
        &ConfigurationGrid::default(),
        pdf_path,
        renderer,
        recognizer,
        language,
        progress,
    )
}

fn search_grid(
    grid: &ConfigurationGrid,
    pdf_path: &Path,
    renderer: &dyn PageRenderer,
    recognizer: &dyn TextRecognizer,
    language: Option<&str>,
    progress: Option<&ProgressCallback>,
) -> Result<SearchOutcome, Scan2TxtError> {
    let mut best: Option<ScoredResult> = None;
    let mut candidates = Vec::with_capacity(grid.len());
    let mut first_error: Option<String> = None;
    let mut page_count = 0usize;

    for &dpi in grid.resolutions {
        let prepared: Vec<PreprocessedPage> = match renderer.render(pdf_path, dpi) {
            Ok(pages) => {
                page_count = page_count.max(pages.len());
                pages.iter().map(binarize).collect()
            }
            Err(e) => {
                warn!("Skipping {} DPI for {}: {}", dpi, pdf_path.display(), e);
                let detail = e.to_string();
                for &psm in grid.modes {
                    candidates.push(CandidateScore {
                        dpi,
                        psm,
                        score: None,
                        words: 0,
                        chars: 0,
                        error: Some(detail.clone()),
                    });
                    if let Some(cb) = progress {
                        cb.on_candidate_scored(pdf_path, dpi, psm, None);
                    }
                }
                first_error.get_or_insert(detail);
                continue;
            }
        };

        for &psm in grid.modes {
            let params = EngineParams {
                engine_mode: ENGINE_MODE,
                segmentation_mode: psm,
                language: language.map(str::to_string),
            };

            let mut raw = String::new();
            let mut page_errors = Vec::new();
            for page in &prepared {
                match recognizer.recognize(page, &params) {
                    Ok(text) => raw.push_str(&text),
                    Err(e) => {
                        warn!(
                            "OCR failed (dpi={}, {}) on {}: {}",
                            dpi,
                            params.config_string(),
                            pdf_path.display(),
                            e
                        );
                        page_errors.push(e);
                    }
                }
                raw.push('\n');
            }

            let text = repair(&raw);
            let score = score_text(&text);
            info!(
                "Config dpi={} psm={} -> words={} score={:.4}",
                dpi, psm, score.words, score.score
            );

            candidates.push(CandidateScore {
                dpi,
                psm,
                score: Some(score.score),
                words: score.words,
                chars: score.chars,
                error: None,
            });
            if let Some(cb) = progress {
                cb.on_candidate_scored(pdf_path, dpi, psm, Some(score.score));
            }

            let improves = best
                .as_ref()
                .is_none_or(|b| score.score > b.score.score);
            if improves {
                debug!("New best for {}: dpi={} psm={}", pdf_path.display(), dpi, psm);
                best = Some(ScoredResult {
                    configuration: Configuration { dpi, psm },
                    text,
                    score,
                    page_errors,
                });
            }
        }
    }

    match best {
        Some(best) => Ok(SearchOutcome {
            best,
            candidates,
            page_count,
        }),
        None => Err(Scan2TxtError::AllConfigurationsFailed {
            path: pdf_path.to_path_buf(),
            attempts: grid.len(),
            first_error: first_error.unwrap_or_else(|| "empty search grid".to_string()),
        }),
    }
}
