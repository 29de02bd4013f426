//! End-to-end integration tests for scan2txt.
//!
//! These tests drive the real external tools: pdfium (text layer, PDF
//! fixtures, fallback rendering), `pdftoppm` and `tesseract` with the `tur`
//! language pack. They are gated behind the `E2E_ENABLED` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! Point `PDFIUM_LIB_PATH` at libpdfium when it is not on the system path.

use image::DynamicImage;
use pdfium_render::prelude::*;
use scan2txt::pipeline::render::{PageRenderer, PdfiumRenderer, PopplerRenderer};
use scan2txt::{
    correct_corpus, extract, extract_batch, extract_sync, CorrectionConfig, ExtractionConfig,
    TextSource,
};
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

fn pdfium_lib() -> Option<PathBuf> {
    std::env::var("PDFIUM_LIB_PATH")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn pdfium() -> Pdfium {
    let bindings = match pdfium_lib() {
        Some(p) if p.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&p))
        }
        Some(p) => Pdfium::bind_to_library(&p),
        None => Pdfium::bind_to_system_library(),
    }
    .expect("pdfium library must be available for e2e tests");
    Pdfium::new(bindings)
}

fn config() -> ExtractionConfig {
    let mut builder = ExtractionConfig::builder().language("tur");
    if let Some(lib) = pdfium_lib() {
        builder = builder.pdfium_library_path(lib);
    }
    builder.build().expect("valid config")
}

/// A one-page PDF with a real text layer.
fn write_text_pdf(path: &Path, text: &str) {
    let pdfium = pdfium();
    let mut document = pdfium.create_new_pdf().expect("new pdf");
    let font = document.fonts_mut().helvetica();
    let mut page = document
        .pages_mut()
        .create_page_at_end(PdfPagePaperSize::a4())
        .expect("new page");
    page.objects_mut()
        .create_text_object(
            PdfPoints::new(72.0),
            PdfPoints::new(700.0),
            text,
            font,
            PdfPoints::new(40.0),
        )
        .expect("text object");
    document.save_to_file(path).expect("save text pdf");
}

/// A one-page PDF whose only content is a raster image of `text`.
fn write_scanned_pdf(path: &Path, text: &str) {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.pdf");
    write_text_pdf(&source, text);

    let rendered = PdfiumRenderer::new(pdfium_lib())
        .render(&source, 200)
        .expect("render source page");
    let image = &rendered[0].image;

    let pdfium = pdfium();
    let mut document = pdfium.create_new_pdf().expect("new pdf");
    let paper = PdfPagePaperSize::a4();
    let mut page = document
        .pages_mut()
        .create_page_at_end(paper)
        .expect("new page");
    page.objects_mut()
        .create_image_object(
            PdfPoints::ZERO,
            PdfPoints::ZERO,
            image,
            Some(paper.width()),
            Some(paper.height()),
        )
        .expect("image object");
    document.save_to_file(path).expect("save scanned pdf");
}

// ── Text layer ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_text_layer_pdf() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("dijital.pdf");
    write_text_pdf(&pdf, "Merhaba Dünya");

    let out = extract(&pdf, &config()).await.expect("extraction");
    println!("text layer → {:?}", out.text);
    assert_eq!(out.source, TextSource::TextLayer);
    assert!(out.text.contains("Merhaba Dünya"), "got {:?}", out.text);
}

// ── Rasterisers ──────────────────────────────────────────────────────────────

#[test]
fn test_pdfium_render_scales_with_dpi() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("a4.pdf");
    write_text_pdf(&pdf, "Ölçek");

    let renderer = PdfiumRenderer::new(pdfium_lib());
    let low = renderer.render(&pdf, 72).expect("72 dpi");
    let high = renderer.render(&pdf, 144).expect("144 dpi");
    assert_eq!(low.len(), 1);
    // An opaque page drops the alpha channel.
    assert!(
        matches!(low[0].image, DynamicImage::ImageRgb8(_)),
        "got {:?}",
        low[0].image.color()
    );
    // A4 is 595 × 842 points.
    assert!((low[0].width() as i64 - 595).abs() <= 1);
    assert!((high[0].width() as i64 - 2 * low[0].width() as i64).abs() <= 2);
}

#[test]
fn test_pdftoppm_render() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("poppler.pdf");
    write_text_pdf(&pdf, "Poppler");

    let poppler_dir = std::env::var("POPPLER_PATH").ok().map(PathBuf::from);
    match PopplerRenderer::new(poppler_dir).render(&pdf, 100) {
        Ok(pages) => {
            assert_eq!(pages.len(), 1);
            assert!(pages[0].width() > 700);
        }
        Err(e) => println!("SKIP — pdftoppm unavailable: {e}"),
    }
}

// ── Full pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_scanned_pdf_ocr() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("tarama.pdf");
    write_scanned_pdf(&pdf, "Merhaba Dünya");

    let out = extract(&pdf, &config()).await.expect("extraction");
    println!("ocr → {:?} via {:?} (score {:?})", out.text, out.source, out.score);
    for c in &out.candidates {
        println!("  dpi={} psm={} score={:?} err={:?}", c.dpi, c.psm, c.score, c.error);
    }
    assert!(matches!(out.source, TextSource::Ocr { .. }));
    assert_eq!(out.candidates.len(), 6);
    assert!(out.text.to_lowercase().contains("merhaba"), "got {:?}", out.text);
}

#[tokio::test]
async fn test_extract_then_correct() {
    e2e_skip_unless_enabled!();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("merhaba.pdf");
    write_scanned_pdf(&pdf, "merhaba dünya");

    let extracted = dir.path().join("extracted_texts");
    let corrected = dir.path().join("corrected_texts");
    let batch = extract_batch(&[pdf], &extracted, &config()).await;
    assert_eq!(batch.succeeded, 1, "{:?}", batch.documents[0].error);

    // Seed the vocabulary so both words are known regardless of OCR noise.
    std::fs::write(
        extracted.join("sozluk.txt"),
        "merhaba merhaba dünya dünya\n",
    )
    .unwrap();

    let report = correct_corpus(&extracted, &corrected, &CorrectionConfig::default())
        .expect("correction");
    assert_eq!(report.files.len(), 2);

    let text = std::fs::read_to_string(corrected.join("merhaba.txt")).unwrap();
    println!("corrected → {text:?}");
    assert_eq!(text.trim().to_lowercase(), "merhaba dünya");
}

#[test]
fn test_extract_sync_on_missing_file() {
    e2e_skip_unless_enabled!();
    let err = extract_sync("/nonexistent/belge.pdf", &config()).unwrap_err();
    assert!(err.to_string().contains("not found"));
}
