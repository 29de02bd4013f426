//! Streaming batch API: emit documents as they finish.
//!
//! Unlike [`crate::convert::extract_batch`], which writes files and returns
//! one report at the end, [`extract_stream`] yields each document's
//! [`ExtractionOutput`] as soon as it is ready and writes nothing. With
//! `concurrency > 1` items arrive in completion order; each carries its input
//! index so callers can restore input order.

use crate::config::ExtractionConfig;
use crate::convert::extract;
use crate::error::Scan2TxtError;
use crate::output::ExtractionOutput;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::pin::Pin;
use tokio_stream::Stream;
use tracing::info;

/// One finished document: input index, input path, result.
pub type DocumentItem = (usize, PathBuf, Result<ExtractionOutput, Scan2TxtError>);

/// A boxed stream of finished documents.
pub type DocumentStream = Pin<Box<dyn Stream<Item = DocumentItem> + Send>>;

/// Extract every input, yielding documents as they complete.
///
/// Up to `config.concurrency` documents run at once. Progress callbacks fire
/// per document exactly as in the eager batch.
///
/// # Example
/// ```rust,no_run
/// use scan2txt::{extract_stream, ExtractionConfig};
/// use futures::StreamExt;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() {
/// let config = ExtractionConfig::from_env();
/// let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
/// let mut docs = extract_stream(inputs, &config);
/// while let Some((idx, path, result)) = docs.next().await {
///     match result {
///         Ok(out) => println!("#{idx} {}: {} chars", path.display(), out.text.len()),
///         Err(e) => eprintln!("#{idx} {}: {e}", path.display()),
///     }
/// }
/// # }
/// ```
pub fn extract_stream(inputs: Vec<PathBuf>, config: &ExtractionConfig) -> DocumentStream {
    let total = inputs.len();
    info!("Starting streaming extraction of {} documents", total);

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let concurrency = config.concurrency.max(1);
    let config = config.clone();

    let s = stream::iter(inputs.into_iter().enumerate().map(move |(idx, path)| {
        let cfg = config.clone();
        async move {
            if let Some(ref cb) = cfg.progress_callback {
                cb.on_document_start(idx, total, &path);
            }
            let result = extract(&path, &cfg).await;
            if let Some(ref cb) = cfg.progress_callback {
                match &result {
                    Ok(out) => cb.on_document_complete(idx, total, out.text.chars().count()),
                    Err(e) => cb.on_document_error(idx, total, &e.to_string()),
                }
            }
            (idx, path, result)
        }
    }))
    .buffer_unordered(concurrency);

    Box::pin(s)
}
