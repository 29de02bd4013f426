//! PDF rasterisation: render every page of a document at a given DPI.
//!
//! Two backends sit behind the [`PageRenderer`] trait:
//!
//! * [`PopplerRenderer`] shells out to `pdftoppm`, which renders scanned
//!   pages faithfully and is the primary path.
//! * [`PdfiumRenderer`] uses `pdfium-render` in-process, scaling each page by
//!   `dpi / 72` (PDF user space is 72 points per inch).
//!
//! [`FallbackRenderer`] chains them: the secondary only runs when the primary
//! returns an error, and only when both fail does the caller see
//! [`Scan2TxtError::RasterisationFailed`].

use crate::error::Scan2TxtError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// PDF user-space units per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// One rendered page. Always has positive width and height.
#[derive(Debug, Clone)]
pub struct Page {
    /// 0-based page index in the source document.
    pub index: usize,
    pub image: DynamicImage,
}

impl Page {
    /// Wrap a rendered image; `None` if either dimension is zero.
    pub fn new(index: usize, image: DynamicImage) -> Option<Self> {
        if image.width() == 0 || image.height() == 0 {
            return None;
        }
        Some(Self { index, image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Renders a whole document to page images, in page order.
///
/// Implementations block; the pipeline calls them from `spawn_blocking`.
pub trait PageRenderer: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &str;

    fn render(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<Page>, Scan2TxtError>;
}

// ── pdftoppm ─────────────────────────────────────────────────────────────

/// Primary backend: poppler's `pdftoppm`.
#[derive(Debug, Clone, Default)]
pub struct PopplerRenderer {
    /// Directory holding the `pdftoppm` binary; `None` uses `PATH`.
    pub bin_dir: Option<PathBuf>,
}

impl PopplerRenderer {
    pub fn new(bin_dir: Option<PathBuf>) -> Self {
        Self { bin_dir }
    }

    fn program(&self) -> PathBuf {
        let exe = format!("pdftoppm{}", std::env::consts::EXE_SUFFIX);
        match &self.bin_dir {
            Some(dir) => dir.join(exe),
            None => PathBuf::from(exe),
        }
    }

    fn failure(&self, dpi: u32, detail: impl Into<String>) -> Scan2TxtError {
        Scan2TxtError::RasterisationFailed {
            backend: self.name().to_string(),
            dpi,
            detail: detail.into(),
        }
    }
}

impl PageRenderer for PopplerRenderer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn render(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<Page>, Scan2TxtError> {
        let out_dir = tempfile::tempdir().map_err(|e| self.failure(dpi, e.to_string()))?;
        let prefix = out_dir.path().join("page");

        let output = Command::new(self.program())
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-png")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| self.failure(dpi, format!("failed to invoke pdftoppm: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure(
                dpi,
                format!("pdftoppm exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        // pdftoppm writes `page-1.png`, `page-01.png`, ... depending on page count.
        let mut numbered: Vec<(usize, PathBuf)> = std::fs::read_dir(out_dir.path())
            .map_err(|e| self.failure(dpi, e.to_string()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter_map(|p| page_number(&p).map(|n| (n, p)))
            .collect();
        numbered.sort_by_key(|(n, _)| *n);

        if numbered.is_empty() {
            return Err(self.failure(dpi, "pdftoppm produced no pages"));
        }

        let mut pages = Vec::with_capacity(numbered.len());
        for (number, path) in numbered {
            let image = image::open(&path)
                .map_err(|e| self.failure(dpi, format!("page {number}: {e}")))?;
            let page = Page::new(number.saturating_sub(1), image)
                .ok_or_else(|| self.failure(dpi, format!("page {number} is empty")))?;
            debug!(
                "pdftoppm rendered page {} → {}x{} px",
                number,
                page.width(),
                page.height()
            );
            pages.push(page);
        }

        Ok(pages)
    }
}

/// Extract the 1-based page number from a `page-NN.png` file name.
fn page_number(path: &Path) -> Option<usize> {
    if !crate::pipeline::input::has_extension(path, "png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let (_, digits) = stem.rsplit_once('-')?;
    digits.parse().ok()
}

// ── pdfium ───────────────────────────────────────────────────────────────

/// Secondary backend: in-process pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRenderer {
    /// pdfium library file or directory; `None` binds the system library.
    pub library_path: Option<PathBuf>,
}

impl PdfiumRenderer {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }

    fn failure(&self, dpi: u32, detail: impl Into<String>) -> Scan2TxtError {
        Scan2TxtError::RasterisationFailed {
            backend: self.name().to_string(),
            dpi,
            detail: detail.into(),
        }
    }
}

impl PageRenderer for PdfiumRenderer {
    fn name(&self) -> &str {
        "pdfium"
    }

    fn render(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<Page>, Scan2TxtError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| self.failure(dpi, format!("{:?}", e)))?;

        let zoom = dpi as f32 / POINTS_PER_INCH;
        let pages = document.pages();
        let mut results = Vec::with_capacity(pages.len() as usize);

        for (idx, page) in pages.iter().enumerate() {
            let target_width = (page.width().value * zoom).round().max(1.0) as i32;
            let target_height = (page.height().value * zoom).round().max(1.0) as i32;
            let render_config = PdfRenderConfig::new()
                .set_target_width(target_width)
                .set_target_height(target_height)
                .render_form_data(true)
                .render_annotations(true);

            let bitmap = page
                .render_with_config(&render_config)
                .map_err(|e| self.failure(dpi, format!("page {}: {:?}", idx + 1, e)))?;

            // Keep the alpha channel only when the page reports transparency.
            let rendered = bitmap.as_image();
            let image = if page.has_transparency() {
                DynamicImage::ImageRgba8(rendered.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(rendered.to_rgb8())
            };

            let page = Page::new(idx, image)
                .ok_or_else(|| self.failure(dpi, format!("page {} is empty", idx + 1)))?;
            debug!(
                "pdfium rendered page {} → {}x{} px",
                idx + 1,
                page.width(),
                page.height()
            );
            results.push(page);
        }

        if results.is_empty() {
            return Err(self.failure(dpi, "document has no pages"));
        }
        Ok(results)
    }
}

/// Bind pdfium from an explicit file or directory, else the system library.
pub(crate) fn bind_pdfium(library_path: Option<&Path>) -> Result<Pdfium, Scan2TxtError> {
    let bindings = match library_path {
        Some(path) if path.is_dir() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path))
        }
        Some(path) => Pdfium::bind_to_library(path),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| Scan2TxtError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

// ── Fallback chain ───────────────────────────────────────────────────────

/// Try `primary`; on any error, try `secondary`.
pub struct FallbackRenderer {
    primary: Box<dyn PageRenderer>,
    secondary: Box<dyn PageRenderer>,
    name: String,
}

impl FallbackRenderer {
    pub fn new(primary: Box<dyn PageRenderer>, secondary: Box<dyn PageRenderer>) -> Self {
        let name = format!("{}+{}", primary.name(), secondary.name());
        Self {
            primary,
            secondary,
            name,
        }
    }

    /// `pdftoppm` first, pdfium second.
    pub fn poppler_then_pdfium(poppler_dir: Option<PathBuf>, pdfium_lib: Option<PathBuf>) -> Self {
        Self::new(
            Box::new(PopplerRenderer::new(poppler_dir)),
            Box::new(PdfiumRenderer::new(pdfium_lib)),
        )
    }
}

impl PageRenderer for FallbackRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, pdf_path: &Path, dpi: u32) -> Result<Vec<Page>, Scan2TxtError> {
        let primary_err = match self.primary.render(pdf_path, dpi) {
            Ok(pages) => return Ok(pages),
            Err(e) => e,
        };
        warn!(
            "{} failed at {} DPI ({}); falling back to {}",
            self.primary.name(),
            dpi,
            primary_err,
            self.secondary.name()
        );

        match self.secondary.render(pdf_path, dpi) {
            Ok(pages) => {
                info!(
                    "{} rendered {} pages at {} DPI",
                    self.secondary.name(),
                    pages.len(),
                    dpi
                );
                Ok(pages)
            }
            Err(secondary_err) => Err(Scan2TxtError::RasterisationFailed {
                backend: self.name.clone(),
                dpi,
                detail: format!(
                    "{}: {}; {}: {}",
                    self.primary.name(),
                    primary_err,
                    self.secondary.name(),
                    secondary_err
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Failing;

    impl PageRenderer for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn render(&self, _: &Path, dpi: u32) -> Result<Vec<Page>, Scan2TxtError> {
            Err(Scan2TxtError::RasterisationFailed {
                backend: "failing".into(),
                dpi,
                detail: "nope".into(),
            })
        }
    }

    struct Counting(Arc<AtomicUsize>);

    impl PageRenderer for Counting {
        fn name(&self) -> &str {
            "counting"
        }
        fn render(&self, _: &Path, _dpi: u32) -> Result<Vec<Page>, Scan2TxtError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([255, 255, 255])));
            Ok(vec![Page::new(0, img).unwrap()])
        }
    }

    #[test]
    fn page_rejects_empty_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        assert!(Page::new(0, img).is_none());
    }

    #[test]
    fn fallback_uses_secondary_when_primary_fails() {
        let calls = Arc::new(AtomicUsize::new(0));
        let r = FallbackRenderer::new(Box::new(Failing), Box::new(Counting(calls.clone())));
        let pages = r.render(Path::new("x.pdf"), 300).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn fallback_skips_secondary_when_primary_succeeds() {
        let primary = Arc::new(AtomicUsize::new(0));
        let secondary = Arc::new(AtomicUsize::new(0));
        let r = FallbackRenderer::new(
            Box::new(Counting(primary.clone())),
            Box::new(Counting(secondary.clone())),
        );
        r.render(Path::new("x.pdf"), 400).unwrap();
        assert_eq!(primary.load(Ordering::SeqCst), 1);
        assert_eq!(secondary.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn fallback_reports_both_failures() {
        let r = FallbackRenderer::new(Box::new(Failing), Box::new(Failing));
        let err = r.render(Path::new("x.pdf"), 400).unwrap_err();
        match err {
            Scan2TxtError::RasterisationFailed {
                backend,
                dpi,
                detail,
            } => {
                assert_eq!(backend, "failing+failing");
                assert_eq!(dpi, 400);
                assert_eq!(detail.matches("nope").count(), 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn page_number_parses_pdftoppm_names() {
        assert_eq!(page_number(Path::new("/tmp/x/page-1.png")), Some(1));
        assert_eq!(page_number(Path::new("/tmp/x/page-012.png")), Some(12));
        assert_eq!(page_number(Path::new("/tmp/x/page.png")), None);
        assert_eq!(page_number(Path::new("/tmp/x/page-3.ppm")), None);
    }

    #[test]
    fn poppler_missing_binary_is_a_render_error() {
        let r = PopplerRenderer::new(Some(PathBuf::from("/nonexistent/poppler/bin")));
        let err = r.render(Path::new("x.pdf"), 300).unwrap_err();
        assert!(matches!(err, Scan2TxtError::RasterisationFailed { dpi: 300, .. }));
    }
}
