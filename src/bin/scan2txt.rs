//! CLI binary for scan2txt.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` / `CorrectionConfig` and prints reports.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use scan2txt::pipeline::input::collect_inputs;
use scan2txt::{
    correct_corpus, extract_batch, BatchReport, CorrectionConfig, CorrectionReport,
    ExtractionConfig, ExtractionProgressCallback, ProgressCallback,
};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// One bar for the batch, one log line per finished document.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Candidates scored for the document currently shown in the message.
    scored: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            scored: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .map(|mut m| m.remove(&index))
            .ok()
            .flatten()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Extracting {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, index: usize, _total: usize, path: &Path) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.scored.store(0, Ordering::SeqCst);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_candidate_scored(&self, _path: &Path, dpi: u32, psm: u8, score: Option<f64>) {
        let n = self.scored.fetch_add(1, Ordering::SeqCst) + 1;
        let score = score.map_or_else(|| "failed".to_string(), |s| format!("{s:.3}"));
        self.bar
            .set_message(format!("config {n}: dpi={dpi} psm={psm} → {score}"));
    }

    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{chars:>7} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);

        let first_line = error.lines().next().unwrap_or(error);
        let msg: String = if first_line.chars().count() > 80 {
            first_line.chars().take(79).chain(['…']).collect()
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} Document {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        let failed = total_documents.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} documents extracted",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract every PDF in the current directory into ./extracted_texts
  scan2txt extract

  # Extract two files, always running OCR, four documents at a time
  scan2txt extract a.pdf b.pdf --force-ocr -j 4 -o texts

  # Correct a directory of extracted texts
  scan2txt correct extracted_texts -o corrected_texts --cutoff 0.8

  # Both stages
  scan2txt run scans/

  # Machine-readable report
  scan2txt extract scans/ --json > report.json

ENVIRONMENT VARIABLES:
  POPPLER_PATH      Directory holding pdftoppm (default: PATH lookup)
  TESSERACT_LANG    Tesseract language, e.g. tur, eng, tur+eng (default: tur;
                    empty disables the hint)
  TESSERACT_CMD     Tesseract executable (default: tesseract)
  PDFIUM_LIB_PATH   pdfium library file or directory (default: system library)
  RUST_LOG          Log filter, overrides --verbose / --quiet

OCR SEARCH:
  Pages without an embedded text layer are rendered at 300 and 400 DPI,
  binarized with Otsu's threshold and read with tesseract --oem 1 using
  page segmentation modes 3, 6 and 1. The text with the highest share of
  letters (plus a small bonus for word count) is kept.
"#;

/// Extract text from scanned and born-digital PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "scan2txt",
    version,
    about = "Extract text from scanned and born-digital PDFs",
    long_about = "Extract plain text from PDFs. Embedded text layers are used directly; \
scanned pages go through a DPI × segmentation-mode OCR search with tesseract. A second \
stage corrects OCR misspellings against a vocabulary built from all extracted texts.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output a structured JSON report instead of a summary.
    #[arg(long, global = true, env = "SCAN2TXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "SCAN2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "SCAN2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "SCAN2TXT_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract text from PDF files or directories of PDFs.
    Extract {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Directory for `<name>.txt` outputs.
        #[arg(short, long, env = "SCAN2TXT_OUTPUT_DIR", default_value = "extracted_texts")]
        output_dir: PathBuf,
    },

    /// Correct a directory of `.txt` files against its own vocabulary.
    Correct {
        /// Directory of extracted `.txt` files.
        #[arg(default_value = "extracted_texts")]
        src_dir: PathBuf,

        /// Directory for corrected copies.
        #[arg(short, long, default_value = "corrected_texts")]
        output_dir: PathBuf,

        #[command(flatten)]
        correct: CorrectArgs,
    },

    /// Extract, then correct.
    Run {
        #[command(flatten)]
        extract: ExtractArgs,

        #[arg(long, default_value = "extracted_texts")]
        extracted_dir: PathBuf,

        #[arg(long, default_value = "corrected_texts")]
        corrected_dir: PathBuf,

        #[command(flatten)]
        correct: CorrectArgs,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// PDF files or directories (default: current directory).
    inputs: Vec<PathBuf>,

    /// Tesseract language (e.g. tur, eng). Empty disables the hint.
    #[arg(long, env = "TESSERACT_LANG", default_value = "tur")]
    lang: String,

    /// Directory holding the pdftoppm binary.
    #[arg(long, env = "POPPLER_PATH")]
    poppler_path: Option<PathBuf>,

    /// Tesseract executable.
    #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract_cmd: PathBuf,

    /// pdfium library file or directory.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// Documents processed at once.
    #[arg(short = 'j', long, env = "SCAN2TXT_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Ignore embedded text layers and always run OCR.
    #[arg(long, env = "SCAN2TXT_FORCE_OCR")]
    force_ocr: bool,
}

#[derive(Args, Debug)]
struct CorrectArgs {
    /// Minimum similarity (0, 1] for a replacement.
    #[arg(long, env = "SCAN2TXT_CUTOFF", default_value_t = scan2txt::config::DEFAULT_CUTOFF)]
    cutoff: f64,

    /// Minimum corpus count for a word to be known.
    #[arg(long, env = "SCAN2TXT_MIN_COUNT", default_value_t = scan2txt::config::DEFAULT_MIN_COUNT)]
    min_count: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match &cli.command {
        Command::Extract {
            extract,
            output_dir,
        } => {
            let batch = run_extract(&cli, extract, output_dir, show_progress).await?;
            emit_json(&cli, &batch)?;
            if !batch.documents.is_empty() && batch.succeeded == 0 {
                anyhow::bail!("All {} documents failed", batch.documents.len());
            }
        }
        Command::Correct {
            src_dir,
            output_dir,
            correct,
        } => {
            let report = run_correct(&cli, src_dir, output_dir, correct)?;
            emit_json(&cli, &report)?;
        }
        Command::Run {
            extract,
            extracted_dir,
            corrected_dir,
            correct,
        } => {
            let batch = run_extract(&cli, extract, extracted_dir, show_progress).await?;
            if !batch.documents.is_empty() && batch.succeeded == 0 {
                emit_json(&cli, &batch)?;
                anyhow::bail!("All {} documents failed", batch.documents.len());
            }
            let report = run_correct(&cli, extracted_dir, corrected_dir, correct)?;
            if cli.json {
                let json = serde_json::json!({ "extraction": batch, "correction": report });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json).context("Failed to serialise report")?
                );
            }
        }
    }

    Ok(())
}

async fn run_extract(
    cli: &Cli,
    args: &ExtractArgs,
    output_dir: &Path,
    show_progress: bool,
) -> Result<BatchReport> {
    let inputs = if args.inputs.is_empty() {
        collect_inputs(&[PathBuf::from(".")])
    } else {
        collect_inputs(&args.inputs)
    };
    if inputs.is_empty() {
        anyhow::bail!("No PDF files found");
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(args, progress_cb)?;

    let batch = extract_batch(&inputs, output_dir, &config).await;

    if !cli.quiet && !cli.json && !show_progress {
        eprintln!(
            "Extracted {}/{} documents in {}ms",
            batch.succeeded,
            batch.documents.len(),
            batch.total_duration_ms
        );
    }
    if !cli.quiet && !cli.json {
        for doc in batch.documents.iter().filter(|d| !d.is_success()) {
            eprintln!(
                "  {} {}: {}",
                red("✗"),
                doc.input.display(),
                doc.error.as_deref().unwrap_or("unknown error")
            );
        }
        eprintln!("   →  {}", bold(&output_dir.display().to_string()));
    }
    Ok(batch)
}

fn run_correct(
    cli: &Cli,
    src_dir: &Path,
    output_dir: &Path,
    args: &CorrectArgs,
) -> Result<CorrectionReport> {
    let config = CorrectionConfig::builder()
        .cutoff(args.cutoff)
        .min_count(args.min_count)
        .build()
        .context("Invalid configuration")?;

    let report = correct_corpus(src_dir, output_dir, &config)
        .with_context(|| format!("Correction of {} failed", src_dir.display()))?;

    if !cli.quiet && !cli.json {
        let failed = report.files.iter().filter(|f| f.error.is_some()).count();
        eprintln!(
            "{}  {} files  {} replacements  {}",
            if failed == 0 { green("✔") } else { cyan("⚠") },
            report.files.len(),
            report.total_replacements,
            dim(&format!(
                "vocabulary {}/{} words",
                report.vocabulary_size, report.distinct_words
            )),
        );
        for f in report.files.iter().filter(|f| f.error.is_some()) {
            eprintln!(
                "  {} {}",
                red("✗"),
                f.error.as_deref().unwrap_or("unknown error")
            );
        }
        eprintln!("   →  {}", bold(&output_dir.display().to_string()));
    }
    Ok(report)
}

fn emit_json<T: serde::Serialize>(cli: &Cli, value: &T) -> Result<()> {
    if cli.json {
        let json = serde_json::to_string_pretty(value).context("Failed to serialise report")?;
        println!("{json}");
    }
    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(args: &ExtractArgs, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut builder = ExtractionConfig::builder()
        .tesseract_cmd(args.tesseract_cmd.clone())
        .concurrency(args.concurrency)
        .force_ocr(args.force_ocr);

    builder = if args.lang.trim().is_empty() {
        builder.no_language()
    } else {
        builder.language(args.lang.trim())
    };
    if let Some(ref dir) = args.poppler_path {
        builder = builder.poppler_path(dir.clone());
    }
    if let Some(ref lib) = args.pdfium_lib {
        builder = builder.pdfium_library_path(lib.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
