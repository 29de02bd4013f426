//! Pipeline stages for PDF-to-text extraction.
//!
//! Each submodule implements one step and can be tested on its own. The
//! external tools (pdftoppm, pdfium, tesseract) sit behind traits so tests
//! and callers can swap them.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ text_layer ──▶ repair                       (born-digital PDFs)
//!   │
//!   └────▶ search: for each DPI ─▶ render ─▶ binarize
//!                    for each PSM ─▶ recognize ─▶ repair ─▶ score
//! ```
//!
//! 1. [`input`]      — validate paths, discover PDFs, name outputs
//! 2. [`text_layer`] — embedded text via pdfium; short-circuits OCR
//! 3. [`render`]     — rasterise at a DPI: pdftoppm with pdfium fallback
//! 4. [`binarize`]   — grayscale, upscale, median, Otsu threshold
//! 5. [`recognize`]  — run tesseract on one page
//! 6. [`search`]     — walk the DPI × PSM grid and keep the best score
//! 7. [`repair`]     — deterministic text cleanup

pub mod binarize;
pub mod input;
pub mod recognize;
pub mod render;
pub mod repair;
pub mod search;
pub mod text_layer;
