//! OCR invocation: run the recognition engine on one preprocessed page.
//!
//! The engine is an external black box behind [`TextRecognizer`]. The default
//! [`TesseractRecognizer`] writes the page to a temporary PNG and runs the
//! `tesseract` CLI with `stdout` as the output base, so nothing but the
//! recognised text comes back.

use crate::error::PageError;
use crate::pipeline::binarize::PreprocessedPage;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Engine parameters for one recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineParams {
    /// OCR engine mode (`--oem`).
    pub engine_mode: u8,
    /// Page segmentation mode (`--psm`).
    pub segmentation_mode: u8,
    /// Language hint (`-l`), e.g. `tur`.
    pub language: Option<String>,
}

impl EngineParams {
    /// The engine configuration string, e.g. `--oem 1 --psm 3`.
    pub fn config_string(&self) -> String {
        format!(
            "--oem {} --psm {}",
            self.engine_mode, self.segmentation_mode
        )
    }
}

/// Recognises text on a binarized page.
///
/// Implementations block; errors are page-scoped and never abort the search.
pub trait TextRecognizer: Send + Sync {
    fn recognize(
        &self,
        page: &PreprocessedPage,
        params: &EngineParams,
    ) -> Result<String, PageError>;
}

/// Default recognizer: the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    pub command: PathBuf,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self {
            command: PathBuf::from("tesseract"),
        }
    }
}

impl TesseractRecognizer {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(
        &self,
        page: &PreprocessedPage,
        params: &EngineParams,
    ) -> Result<String, PageError> {
        let fail = |detail: String| PageError::RecognitionFailed {
            page: page.index + 1,
            psm: params.segmentation_mode,
            detail,
        };

        let tmp = tempfile::Builder::new()
            .prefix("scan2txt-page-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| fail(format!("temp file: {e}")))?;
        page.image
            .save_with_format(tmp.path(), image::ImageFormat::Png)
            .map_err(|e| fail(format!("PNG encode: {e}")))?;

        let mut cmd = Command::new(&self.command);
        cmd.arg(tmp.path()).arg("stdout");
        if let Some(lang) = params.language.as_deref() {
            cmd.arg("-l").arg(lang);
        }
        cmd.arg("--oem")
            .arg(params.engine_mode.to_string())
            .arg("--psm")
            .arg(params.segmentation_mode.to_string());

        let output = cmd
            .output()
            .map_err(|e| fail(format!("failed to run tesseract (is it installed?): {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "tesseract page {} ({}): {} chars",
            page.index + 1,
            params.config_string(),
            text.len()
        );
        Ok(text)
    }
}
