//! Input resolution: validate PDF paths, expand directories, name outputs.
//!
//! We validate the PDF magic bytes (`%PDF`) before any backend touches the
//! file so callers get a meaningful error rather than a pdfium or poppler
//! failure six configurations later.

use crate::error::Scan2TxtError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Scan2TxtError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(Scan2TxtError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Scan2TxtError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Scan2TxtError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Scan2TxtError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// List `*.pdf` files (case-insensitive) directly inside `dir`, sorted.
pub fn discover_pdfs(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, "pdf"))
        .collect();
    found.sort();
    Ok(found)
}

/// Expand CLI-style inputs: directories become their PDFs, files pass through.
///
/// Unreadable directories are logged and skipped.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match discover_pdfs(input) {
                Ok(pdfs) => {
                    if pdfs.is_empty() {
                        warn!("No PDF files found in {}", input.display());
                    }
                    out.extend(pdfs);
                }
                Err(e) => warn!("Cannot list {}: {}", input.display(), e),
            }
        } else {
            out.push(input.clone());
        }
    }
    out
}

/// `<out_dir>/<base name>.txt` for a source document.
pub fn output_path_for(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());
    out_dir.join(format!("{stem}.txt"))
}

/// Case-insensitive extension check.
pub(crate) fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_path_keeps_base_name() {
        let out = output_path_for(Path::new("/scans/Kitap 01.PDF"), Path::new("texts"));
        assert_eq!(out, PathBuf::from("texts/Kitap 01.txt"));
    }

    #[test]
    fn resolve_rejects_missing_file() {
        let err = resolve_local(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, Scan2TxtError::FileNotFound { .. }));
    }

    #[test]
    fn resolve_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("fake.pdf");
        std::fs::write(&p, b"PK\x03\x04zip").unwrap();
        let err = resolve_local(&p).unwrap_err();
        assert!(matches!(err, Scan2TxtError::NotAPdf { magic, .. } if &magic == b"PK\x03\x04"));
    }

    #[test]
    fn resolve_accepts_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ok.pdf");
        std::fs::write(&p, b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_local(&p).unwrap(), p);
    }

    #[test]
    fn discover_is_sorted_and_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt", "c.pdf.bak"] {
            std::fs::write(dir.path().join(name), b"%PDF").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.pdf")).unwrap();

        let found = discover_pdfs(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn collect_inputs_expands_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.pdf"), b"%PDF").unwrap();
        let single = PathBuf::from("/elsewhere/y.pdf");
        let all = collect_inputs(&[dir.path().to_path_buf(), single.clone()]);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], single);
    }
}
