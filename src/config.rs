//! Configuration types for extraction and corpus correction.
//!
//! Extraction behaviour is controlled through [`ExtractionConfig`], built via
//! [`ExtractionConfigBuilder`]; the correction stage has its own small
//! [`CorrectionConfig`]. The OCR search grid itself (resolutions, segmentation
//! modes, engine mode) is deliberately absent: it is fixed in
//! [`crate::pipeline::search::ConfigurationGrid`].

use crate::error::Scan2TxtError;
use crate::pipeline::recognize::TextRecognizer;
use crate::pipeline::render::PageRenderer;
use crate::pipeline::text_layer::TextLayerReader;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default OCR language hint (Turkish traineddata).
pub const DEFAULT_LANGUAGE: &str = "tur";

/// Default similarity cutoff for the corpus correction stage.
pub const DEFAULT_CUTOFF: f64 = 0.72;

/// Minimum corpus frequency for a word-form to count as known.
pub const DEFAULT_MIN_COUNT: u64 = 2;

/// Configuration for extracting text from PDFs.
///
/// # Example
/// ```rust
/// use scan2txt::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .language("tur+eng")
///     .concurrency(2)
///     .build()
///     .unwrap();
/// assert_eq!(config.language.as_deref(), Some("tur+eng"));
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Recognition language hint passed as `-l`. Default: `tur`.
    ///
    /// `None` lets the engine use its own default language.
    pub language: Option<String>,

    /// Directory containing the `pdftoppm` binary. Default: `None` (PATH lookup).
    pub poppler_path: Option<PathBuf>,

    /// pdfium shared library, as a file or a directory. Default: `None`
    /// (system library).
    pub pdfium_library_path: Option<PathBuf>,

    /// Tesseract executable. Default: `tesseract`.
    pub tesseract_cmd: PathBuf,

    /// Number of documents processed at once by the batch APIs. Default: 1.
    ///
    /// Each document runs its whole configuration search on one blocking
    /// thread; raising this trades memory for wall-clock time.
    pub concurrency: usize,

    /// Skip the embedded text layer and always run OCR. Default: false.
    pub force_ocr: bool,

    /// Pre-constructed renderer. Takes precedence over the poppler/pdfium default.
    pub renderer: Option<Arc<dyn PageRenderer>>,

    /// Pre-constructed recognizer. Takes precedence over the tesseract default.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,

    /// Pre-constructed text-layer reader. Takes precedence over pdfium.
    pub text_layer: Option<Arc<dyn TextLayerReader>>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            language: Some(DEFAULT_LANGUAGE.to_string()),
            poppler_path: None,
            pdfium_library_path: None,
            tesseract_cmd: PathBuf::from("tesseract"),
            concurrency: 1,
            force_ocr: false,
            renderer: None,
            recognizer: None,
            text_layer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("language", &self.language)
            .field("poppler_path", &self.poppler_path)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("concurrency", &self.concurrency)
            .field("force_ocr", &self.force_ocr)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn PageRenderer>"))
            .field(
                "recognizer",
                &self.recognizer.as_ref().map(|_| "<dyn TextRecognizer>"),
            )
            .field(
                "text_layer",
                &self.text_layer.as_ref().map(|_| "<dyn TextLayerReader>"),
            )
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Defaults overlaid with `POPPLER_PATH`, `TESSERACT_LANG`,
    /// `TESSERACT_CMD` and `PDFIUM_LIB_PATH`.
    ///
    /// An empty `TESSERACT_LANG` clears the language hint.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(dir) = non_empty_var("POPPLER_PATH") {
            config.poppler_path = Some(PathBuf::from(dir));
        }
        if let Ok(lang) = std::env::var("TESSERACT_LANG") {
            config.language = if lang.trim().is_empty() {
                None
            } else {
                Some(lang.trim().to_string())
            };
        }
        if let Some(cmd) = non_empty_var("TESSERACT_CMD") {
            config.tesseract_cmd = PathBuf::from(cmd);
        }
        if let Some(lib) = non_empty_var("PDFIUM_LIB_PATH") {
            config.pdfium_library_path = Some(PathBuf::from(lib));
        }
        config
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    /// Start from [`ExtractionConfig::from_env`] instead of the plain defaults.
    pub fn from_env() -> Self {
        Self {
            config: ExtractionConfig::from_env(),
        }
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = Some(lang.into());
        self
    }

    pub fn no_language(mut self) -> Self {
        self.config.language = None;
        self
    }

    pub fn poppler_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.poppler_path = Some(dir.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn force_ocr(mut self, v: bool) -> Self {
        self.config.force_ocr = v;
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn PageRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn text_layer(mut self, reader: Arc<dyn TextLayerReader>) -> Self {
        self.config.text_layer = Some(reader);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, Scan2TxtError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(Scan2TxtError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.tesseract_cmd.as_os_str().is_empty() {
            return Err(Scan2TxtError::InvalidConfig(
                "Tesseract command must not be empty".into(),
            ));
        }
        if matches!(c.language.as_deref(), Some(l) if l.trim().is_empty()) {
            return Err(Scan2TxtError::InvalidConfig(
                "Language hint must not be blank; use no_language() instead".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Correction ───────────────────────────────────────────────────────────

/// Configuration for the corpus correction stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionConfig {
    /// Minimum similarity (0, 1] a vocabulary entry needs to replace a token.
    /// Default: 0.72.
    pub cutoff: f64,

    /// Minimum corpus count for a word-form to be known. Default: 2.
    pub min_count: u64,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_CUTOFF,
            min_count: DEFAULT_MIN_COUNT,
        }
    }
}

impl CorrectionConfig {
    pub fn builder() -> CorrectionConfigBuilder {
        CorrectionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CorrectionConfig`].
#[derive(Debug)]
pub struct CorrectionConfigBuilder {
    config: CorrectionConfig,
}

impl CorrectionConfigBuilder {
    pub fn cutoff(mut self, cutoff: f64) -> Self {
        self.config.cutoff = cutoff;
        self
    }

    pub fn min_count(mut self, n: u64) -> Self {
        self.config.min_count = n.max(1);
        self
    }

    pub fn build(self) -> Result<CorrectionConfig, Scan2TxtError> {
        let cutoff = self.config.cutoff;
        if !(cutoff > 0.0 && cutoff <= 1.0) {
            return Err(Scan2TxtError::InvalidConfig(format!(
                "Cutoff must be in (0, 1], got {}",
                cutoff
            )));
        }
        Ok(self.config)
    }
}
