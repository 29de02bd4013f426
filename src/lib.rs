//! # scan2txt
//!
//! Extract plain text from PDFs, scanned or born-digital, and clean up the
//! result with a corpus-driven spelling pass.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input       validate `%PDF` magic, expand directories
//!  ├─ 2. Text layer  embedded text via pdfium → repair → done
//!  ├─ 3. Search      for DPI in {300, 400}:
//!  │                   render (pdftoppm, pdfium fallback) → binarize (Otsu)
//!  │                   for PSM in {3, 6, 1}: tesseract → repair → score
//!  ├─ 4. Output      best-scoring text → <out_dir>/<stem>.txt
//!  └─ 5. Correct     vocabulary over all outputs → fuzzy word correction
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scan2txt::{correct_corpus, extract_batch, CorrectionConfig, ExtractionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // POPPLER_PATH, TESSERACT_LANG, TESSERACT_CMD, PDFIUM_LIB_PATH
//!     let config = ExtractionConfig::from_env();
//!     let inputs = scan2txt::pipeline::input::discover_pdfs("scans".as_ref())?;
//!     let batch = extract_batch(&inputs, "extracted_texts", &config).await;
//!     eprintln!("{}/{} documents", batch.succeeded, inputs.len());
//!
//!     let report = correct_corpus("extracted_texts", "corrected_texts", &CorrectionConfig::default())?;
//!     eprintln!("{} replacements", report.total_replacements);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `scan2txt` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! scan2txt = { version = "0.1", default-features = false }
//! ```
//!
//! ## External tools
//!
//! | Tool | Used for | Override |
//! |------|----------|----------|
//! | `pdftoppm` (poppler) | primary rasteriser | `POPPLER_PATH` |
//! | pdfium | text layer, fallback rasteriser | `PDFIUM_LIB_PATH` |
//! | `tesseract` | OCR | `TESSERACT_CMD`, `TESSERACT_LANG` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod correct;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CorrectionConfig, CorrectionConfigBuilder, ExtractionConfig, ExtractionConfigBuilder,
};
pub use convert::{
    correct_corpus, extract, extract_batch, extract_from_bytes, extract_sync, extract_to_file,
};
pub use correct::{SpellCorrector, Vocabulary};
pub use error::{PageError, Scan2TxtError};
pub use output::{
    BatchReport, CandidateScore, CorrectedFile, CorrectionReport, DocumentReport,
    ExtractionOutput, ExtractionStats, TextSource,
};
pub use progress::{ExtractionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{extract_stream, DocumentStream};
