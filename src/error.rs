//! Error types for the scan2txt library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`Scan2TxtError`] — **Document-scoped**: this document (or this corpus
//!   directory) cannot produce output (bad input file, no rasteriser worked
//!   for any configuration, output not writable). Returned as
//!   `Err(Scan2TxtError)` from the `extract*` / `correct_corpus` functions.
//!   Batch entry points record it per document and keep going.
//!
//! * [`PageError`] — **Page-scoped**: a single page's text layer could not be
//!   read, or the OCR engine failed on one page. Stored inside
//!   [`crate::output::ExtractionOutput`]; the page contributes empty text and
//!   the rest of the document is unaffected.

use std::path::PathBuf;
use thiserror::Error;

/// All document-level errors returned by the scan2txt library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::ExtractionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Scan2TxtError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not open the document.
    #[error("PDF '{path}' could not be opened: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// A rendering backend failed for a whole resolution.
    ///
    /// The configuration searcher skips every configuration at this DPI.
    #[error("Rasterisation with {backend} failed at {dpi} DPI: {detail}")]
    RasterisationFailed {
        backend: String,
        dpi: u32,
        detail: String,
    },

    /// No configuration in the search grid could be rendered.
    #[error("All {attempts} OCR configurations failed for '{path}'.\nFirst error: {first_error}")]
    AllConfigurationsFailed {
        path: PathBuf,
        attempts: usize,
        first_error: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output text file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The corpus directory could not be listed.
    #[error("Failed to read corpus directory '{path}': {source}")]
    CorpusReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or directory) or install\n\
pdfium where the system loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The embedded text layer of this page could not be read.
    #[error("Page {page}: text layer unreadable: {detail}")]
    TextLayerFailed { page: usize, detail: String },

    /// The OCR engine failed on this page.
    #[error("Page {page}: recognition failed (psm {psm}): {detail}")]
    RecognitionFailed { page: usize, psm: u8, detail: String },
}
