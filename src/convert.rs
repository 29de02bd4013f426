//! Eager entry points: extract documents, write outputs, correct a corpus.
//!
//! [`extract`] returns one document's text in memory. [`extract_to_file`]
//! and [`extract_batch`] write `<out_dir>/<stem>.txt` files; the batch never
//! stops on a failed document. [`correct_corpus`] is the second stage: it
//! builds a vocabulary over a directory of extracted texts and rewrites each
//! one against it. Use [`crate::stream::extract_stream`] to receive documents
//! as they finish.

use crate::config::{CorrectionConfig, ExtractionConfig};
use crate::correct::vocabulary::corpus_files;
use crate::correct::{SpellCorrector, Vocabulary};
use crate::error::Scan2TxtError;
use crate::output::{
    BatchReport, CorrectedFile, CorrectionReport, DocumentReport, ExtractionOutput,
    ExtractionStats, TextSource,
};
use crate::pipeline::recognize::{TesseractRecognizer, TextRecognizer};
use crate::pipeline::render::{FallbackRenderer, PageRenderer};
use crate::pipeline::text_layer::{embedded_text, PdfiumTextLayer, TextLayerReader};
use crate::pipeline::{input, repair::repair, search};
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Extract the text of one PDF.
///
/// The embedded text layer is used when it has content (unless
/// `force_ocr` is set); otherwise every OCR configuration is tried and the
/// best-scoring text is returned. Blocking work runs on tokio's blocking pool.
///
/// # Errors
/// Document-level failures only: the file is missing or not a PDF, or no
/// resolution could be rasterised ([`Scan2TxtError::AllConfigurationsFailed`]).
/// Page-level failures are listed in [`ExtractionOutput::page_errors`].
pub async fn extract(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Scan2TxtError> {
    let pdf_path = input::resolve_local(input.as_ref())?;
    info!("Starting extraction: {}", pdf_path.display());

    let backends = Backends::resolve(config);
    let language = config.language.clone();
    let force_ocr = config.force_ocr;
    let progress = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || {
        extract_blocking(&pdf_path, &backends, language.as_deref(), force_ocr, progress.as_ref())
    })
    .await
    .map_err(|e| Scan2TxtError::Internal(format!("spawn_blocking join: {e}")))?
}

/// Synchronous wrapper around [`extract`].
///
/// Creates a temporary tokio runtime internally.
pub fn extract_sync(
    input: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Scan2TxtError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Scan2TxtError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(extract(input, config))
}

/// Extract text from PDF bytes held in memory.
///
/// The bytes are written to a managed [`tempfile`] that is removed when the
/// call returns.
pub async fn extract_from_bytes(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<ExtractionOutput, Scan2TxtError> {
    let mut tmp = tempfile::Builder::new()
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| Scan2TxtError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .map_err(|e| Scan2TxtError::Internal(format!("tempfile write: {e}")))?;
    extract(tmp.path(), config).await
}

/// Extract one PDF and write `<out_dir>/<stem>.txt` atomically.
///
/// When every OCR configuration fails an empty output file is still written,
/// then the error is returned.
pub async fn extract_to_file(
    input: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> Result<DocumentReport, Scan2TxtError> {
    let input = input.as_ref();
    let out_path = input::output_path_for(input, out_dir.as_ref());

    let output = match extract(input, config).await {
        Ok(output) => output,
        Err(e @ Scan2TxtError::AllConfigurationsFailed { .. }) => {
            warn!("{}; writing empty {}", e, out_path.display());
            write_atomic(&out_path, "").await?;
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    write_atomic(&out_path, &output.text).await?;
    info!(
        "Wrote {} ({} chars)",
        out_path.display(),
        output.text.chars().count()
    );

    Ok(DocumentReport {
        input: input.to_path_buf(),
        output: Some(out_path),
        chars: output.text.chars().count(),
        source: Some(output.source),
        score: output.score,
        page_errors: output.page_errors.len(),
        error: None,
    })
}

/// Extract every input into `out_dir`, up to `config.concurrency` at once.
///
/// Failed documents are recorded in the report and never stop the batch.
/// Reports are in input order.
pub async fn extract_batch(
    inputs: &[PathBuf],
    out_dir: impl AsRef<Path>,
    config: &ExtractionConfig,
) -> BatchReport {
    let start = Instant::now();
    let out_dir = out_dir.as_ref();
    let total = inputs.len();
    info!("Extracting {} documents into {}", total, out_dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut documents: Vec<(usize, DocumentReport)> =
        stream::iter(inputs.iter().enumerate().map(|(idx, path)| async move {
            if let Some(ref cb) = config.progress_callback {
                cb.on_document_start(idx, total, path);
            }
            let report = match extract_to_file(path, out_dir, config).await {
                Ok(report) => {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_document_complete(idx, total, report.chars);
                    }
                    report
                }
                Err(e) => {
                    warn!("Failed {}: {}", path.display(), e);
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_document_error(idx, total, &e.to_string());
                    }
                    failed_report(path, out_dir, &e)
                }
            };
            (idx, report)
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    documents.sort_by_key(|(idx, _)| *idx);
    let documents: Vec<DocumentReport> = documents.into_iter().map(|(_, r)| r).collect();
    let succeeded = documents.iter().filter(|d| d.is_success()).count();

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }
    info!(
        "Batch complete: {}/{} documents in {}ms",
        succeeded,
        total,
        start.elapsed().as_millis()
    );

    BatchReport {
        failed: documents.len() - succeeded,
        succeeded,
        documents,
        total_duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Build a vocabulary over `src_dir/*.txt` and write corrected copies, under
/// the same file names, into `dst_dir`.
///
/// # Errors
/// Only when `src_dir` cannot be listed or `dst_dir` cannot be created.
/// Per-file read or write failures are recorded in the report.
pub fn correct_corpus(
    src_dir: impl AsRef<Path>,
    dst_dir: impl AsRef<Path>,
    config: &CorrectionConfig,
) -> Result<CorrectionReport, Scan2TxtError> {
    let src_dir = src_dir.as_ref();
    let dst_dir = dst_dir.as_ref();

    let vocabulary = Vocabulary::build(src_dir, config.min_count)?;
    let corrector = SpellCorrector::new(&vocabulary, config.cutoff);

    std::fs::create_dir_all(dst_dir).map_err(|e| Scan2TxtError::OutputWriteFailed {
        path: dst_dir.to_path_buf(),
        source: e,
    })?;

    let mut report = CorrectionReport {
        distinct_words: vocabulary.distinct_words(),
        vocabulary_size: vocabulary.len(),
        ..Default::default()
    };

    for path in corpus_files(src_dir)? {
        let Some(name) = path.file_name() else {
            continue;
        };
        let out_path = dst_dir.join(name);
        let result = std::fs::read(&path)
            .map_err(|e| format!("read {}: {}", path.display(), e))
            .and_then(|bytes| {
                let text = String::from_utf8_lossy(&bytes);
                let (fixed, count) = corrector.correct_with_count(&text);
                write_atomic_sync(&out_path, &fixed)
                    .map(|_| count)
                    .map_err(|e| e.to_string())
            });

        let file = match result {
            Ok(replacements) => {
                debug!("{}: {} replacements", out_path.display(), replacements);
                report.total_replacements += replacements;
                CorrectedFile {
                    input: path,
                    output: out_path,
                    replacements,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Correction failed: {}", e);
                CorrectedFile {
                    input: path,
                    output: out_path,
                    replacements: 0,
                    error: Some(e),
                }
            }
        };
        report.files.push(file);
    }

    info!(
        "Corrected {} files, {} replacements (vocabulary {} of {} words)",
        report.files.len(),
        report.total_replacements,
        report.vocabulary_size,
        report.distinct_words
    );
    Ok(report)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Backends in effect for one call: pre-built overrides from the config,
/// else the defaults built from its paths.
pub(crate) struct Backends {
    pub renderer: Arc<dyn PageRenderer>,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub text_layer: Arc<dyn TextLayerReader>,
}

impl Backends {
    pub(crate) fn resolve(config: &ExtractionConfig) -> Self {
        let renderer = match config.renderer {
            Some(ref r) => Arc::clone(r),
            None => Arc::new(FallbackRenderer::poppler_then_pdfium(
                config.poppler_path.clone(),
                config.pdfium_library_path.clone(),
            )),
        };
        let recognizer = match config.recognizer {
            Some(ref r) => Arc::clone(r),
            None => Arc::new(TesseractRecognizer::new(config.tesseract_cmd.clone())),
        };
        let text_layer = match config.text_layer {
            Some(ref t) => Arc::clone(t),
            None => Arc::new(PdfiumTextLayer::new(config.pdfium_library_path.clone())),
        };
        Self {
            renderer,
            recognizer,
            text_layer,
        }
    }
}

pub(crate) fn extract_blocking(
    pdf_path: &Path,
    backends: &Backends,
    language: Option<&str>,
    force_ocr: bool,
    progress: Option<&ProgressCallback>,
) -> Result<ExtractionOutput, Scan2TxtError> {
    let start = Instant::now();

    if !force_ocr {
        if let Some(embedded) = embedded_text(backends.text_layer.as_ref(), pdf_path) {
            info!("Using embedded text layer of {}", pdf_path.display());
            return Ok(ExtractionOutput {
                text: repair(&embedded.text),
                source: TextSource::TextLayer,
                score: None,
                candidates: Vec::new(),
                page_errors: embedded.page_errors,
                stats: ExtractionStats {
                    page_count: embedded.page_count,
                    configurations_tried: 0,
                    configurations_failed: 0,
                    total_duration_ms: start.elapsed().as_millis() as u64,
                },
            });
        }
    }

    info!(
        "Running OCR search on {} (renderer: {})",
        pdf_path.display(),
        backends.renderer.name()
    );
    let outcome = search::search_best(
        pdf_path,
        backends.renderer.as_ref(),
        backends.recognizer.as_ref(),
        language,
        progress,
    )?;

    let best = outcome.best;
    info!(
        "Best for {}: dpi={} psm={} score={:.4}",
        pdf_path.display(),
        best.configuration.dpi,
        best.configuration.psm,
        best.score.score
    );

    let configurations_failed = outcome
        .candidates
        .iter()
        .filter(|c| c.score.is_none())
        .count();
    Ok(ExtractionOutput {
        text: best.text,
        source: TextSource::Ocr {
            dpi: best.configuration.dpi,
            psm: best.configuration.psm,
        },
        score: Some(best.score.score),
        stats: ExtractionStats {
            page_count: outcome.page_count,
            configurations_tried: outcome.candidates.len(),
            configurations_failed,
            total_duration_ms: start.elapsed().as_millis() as u64,
        },
        candidates: outcome.candidates,
        page_errors: best.page_errors,
    })
}

fn failed_report(input: &Path, out_dir: &Path, error: &Scan2TxtError) -> DocumentReport {
    let output = match error {
        Scan2TxtError::AllConfigurationsFailed { .. } => {
            Some(input::output_path_for(input, out_dir))
        }
        _ => None,
    };
    DocumentReport {
        input: input.to_path_buf(),
        output,
        chars: 0,
        source: None,
        score: None,
        page_errors: 0,
        error: Some(error.to_string()),
    }
}

/// Atomic write: write to a uniquely named sibling temp file, then rename.
async fn write_atomic(path: &Path, contents: &str) -> Result<(), Scan2TxtError> {
    let owned_path = path.to_path_buf();
    let contents = contents.to_owned();
    tokio::task::spawn_blocking(move || write_atomic_sync(&owned_path, &contents))
        .await
        .map_err(|e| Scan2TxtError::Internal(format!("spawn_blocking join: {e}")))?
}

fn write_atomic_sync(path: &Path, contents: &str) -> Result<(), Scan2TxtError> {
    let fail = |e| Scan2TxtError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(fail)?;
    let mut tmp = tempfile::Builder::new()
        .prefix(".scan2txt-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(fail)?;
    tmp.write_all(contents.as_bytes()).map_err(fail)?;
    tmp.persist(path).map_err(|e| fail(e.error))?;
    Ok(())
}
