//! Embedded text layer: read text the PDF already carries, skipping OCR.
//!
//! Born-digital documents have a text layer; scanned ones usually do not, or
//! carry only whitespace. [`embedded_text`] returns `None` in the second case
//! so the caller falls through to the configuration search.

use crate::error::{PageError, Scan2TxtError};
use crate::pipeline::render::bind_pdfium;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Per-page text of one document; an `Err` entry marks an unreadable page.
pub type PageTexts = Vec<Result<String, PageError>>;

/// Reads the embedded text of every page.
pub trait TextLayerReader: Send + Sync {
    /// # Errors
    /// A document-level failure (the file cannot be opened). Page-level
    /// failures are reported inside the returned vector.
    fn page_texts(&self, pdf_path: &Path) -> Result<PageTexts, Scan2TxtError>;
}

/// Text layer via pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextLayer {
    /// pdfium library file or directory; `None` binds the system library.
    pub library_path: Option<PathBuf>,
}

impl PdfiumTextLayer {
    pub fn new(library_path: Option<PathBuf>) -> Self {
        Self { library_path }
    }
}

impl TextLayerReader for PdfiumTextLayer {
    fn page_texts(&self, pdf_path: &Path) -> Result<PageTexts, Scan2TxtError> {
        let pdfium = bind_pdfium(self.library_path.as_deref())?;
        let document = pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| Scan2TxtError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

        Ok(document
            .pages()
            .iter()
            .enumerate()
            .map(|(idx, page)| {
                page.text()
                    .map(|t| t.all())
                    .map_err(|e| PageError::TextLayerFailed {
                        page: idx + 1,
                        detail: format!("{:?}", e),
                    })
            })
            .collect())
    }
}

/// Text-layer result for one document.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedText {
    /// Non-empty pages joined, each followed by `\n`. Not yet repaired.
    pub text: String,
    pub page_count: usize,
    pub page_errors: Vec<PageError>,
}

/// Read the text layer; `None` when it is missing, blank, or unreadable.
///
/// Unreadable pages are skipped with a warning. A document that cannot be
/// opened at all is treated the same as one without a text layer.
pub fn embedded_text(reader: &dyn TextLayerReader, pdf_path: &Path) -> Option<EmbeddedText> {
    let pages = match reader.page_texts(pdf_path) {
        Ok(pages) => pages,
        Err(e) => {
            warn!(
                "Text layer unavailable for {}: {}; using OCR",
                pdf_path.display(),
                e
            );
            return None;
        }
    };

    let mut out = EmbeddedText {
        page_count: pages.len(),
        ..Default::default()
    };
    for page in pages {
        match page {
            Ok(text) if !text.is_empty() => {
                out.text.push_str(&text);
                out.text.push('\n');
            }
            Ok(_) => {}
            Err(e) => {
                warn!("{}: {}", pdf_path.display(), e);
                out.page_errors.push(e);
            }
        }
    }

    if out.text.trim().is_empty() {
        debug!("No usable text layer in {}", pdf_path.display());
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<PageTexts, ()>);

    impl TextLayerReader for Fixed {
        fn page_texts(&self, pdf_path: &Path) -> Result<PageTexts, Scan2TxtError> {
            self.0.clone().map_err(|_| Scan2TxtError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: "broken xref".into(),
            })
        }
    }

    #[test]
    fn joins_non_empty_pages() {
        let reader = Fixed(Ok(vec![
            Ok("Birinci sayfa".into()),
            Ok(String::new()),
            Ok("Üçüncü sayfa".into()),
        ]));
        let out = embedded_text(&reader, Path::new("a.pdf")).unwrap();
        assert_eq!(out.text, "Birinci sayfa\nÜçüncü sayfa\n");
        assert_eq!(out.page_count, 3);
        assert!(out.page_errors.is_empty());
    }

    #[test]
    fn whitespace_only_layer_is_absent() {
        let reader = Fixed(Ok(vec![Ok("  \n".into()), Ok("\t".into())]));
        assert!(embedded_text(&reader, Path::new("a.pdf")).is_none());
    }

    #[test]
    fn unreadable_document_is_absent() {
        let reader = Fixed(Err(()));
        assert!(embedded_text(&reader, Path::new("a.pdf")).is_none());
    }

    #[test]
    fn unreadable_page_is_skipped() {
        let reader = Fixed(Ok(vec![
            Err(PageError::TextLayerFailed {
                page: 1,
                detail: "bad font".into(),
            }),
            Ok("Kalan metin".into()),
        ]));
        let out = embedded_text(&reader, Path::new("a.pdf")).unwrap();
        assert_eq!(out.text, "Kalan metin\n");
        assert_eq!(out.page_errors.len(), 1);
    }

    #[test]
    fn missing_library_is_document_error() {
        let reader = PdfiumTextLayer::new(Some(PathBuf::from("/nonexistent/libpdfium.so")));
        assert!(reader.page_texts(Path::new("a.pdf")).is_err());
    }
}
