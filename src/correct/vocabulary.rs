//! Corpus vocabulary: lowercase word frequencies over a directory of texts.

use crate::correct::tokenize::{lowercase_word, words};
use crate::error::Scan2TxtError;
use crate::pipeline::input::has_extension;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{debug, info, warn};

/// Word → count table. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    counts: HashMap<String, u64>,
    known: BTreeSet<String>,
    min_count: u64,
}

impl Vocabulary {
    /// Count words in every `*.txt` file of `dir` (not recursive).
    ///
    /// Invalid UTF-8 is replaced rather than rejected. Files that cannot be
    /// read are logged and skipped.
    ///
    /// # Errors
    /// [`Scan2TxtError::CorpusReadFailed`] when `dir` itself cannot be listed.
    pub fn build(dir: &Path, min_count: u64) -> Result<Self, Scan2TxtError> {
        let files = corpus_files(dir)?;
        let mut counts = HashMap::new();

        for path in &files {
            match std::fs::read(path) {
                Ok(bytes) => {
                    let text = String::from_utf8_lossy(&bytes);
                    count_words(&text, &mut counts);
                    debug!("Counted words in {}", path.display());
                }
                Err(e) => warn!("Skipping unreadable corpus file {}: {}", path.display(), e),
            }
        }

        let vocab = Self::from_counts(counts, min_count);
        info!(
            "Vocabulary from {} files: {} distinct words, {} known (count >= {})",
            files.len(),
            vocab.distinct_words(),
            vocab.len(),
            min_count
        );
        Ok(vocab)
    }

    /// Build from in-memory texts.
    pub fn from_texts<'a, I>(texts: I, min_count: u64) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = HashMap::new();
        for text in texts {
            count_words(text, &mut counts);
        }
        Self::from_counts(counts, min_count)
    }

    fn from_counts(counts: HashMap<String, u64>, min_count: u64) -> Self {
        let known = counts
            .iter()
            .filter(|(_, &n)| n >= min_count)
            .map(|(w, _)| w.clone())
            .collect();
        Self {
            counts,
            known,
            min_count,
        }
    }

    /// Corpus count of a lowercase word; 0 when absent.
    pub fn frequency(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    /// All counted words, including those below the threshold.
    pub fn frequencies(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// Whether a lowercase word is in the known set.
    pub fn contains(&self, word: &str) -> bool {
        self.known.contains(word)
    }

    /// Number of known words.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Known words in lexicographic order.
    pub fn known_words(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    /// Number of distinct words seen, known or not.
    pub fn distinct_words(&self) -> usize {
        self.counts.len()
    }

    pub fn min_count(&self) -> u64 {
        self.min_count
    }
}

fn count_words(text: &str, counts: &mut HashMap<String, u64>) {
    for word in words(text) {
        *counts.entry(lowercase_word(word)).or_insert(0) += 1;
    }
}

/// `*.txt` files directly under `dir`, sorted.
pub(crate) fn corpus_files(dir: &Path) -> Result<Vec<std::path::PathBuf>, Scan2TxtError> {
    let entries = std::fs::read_dir(dir).map_err(|e| Scan2TxtError::CorpusReadFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut files: Vec<_> = entries
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_extension(p, "txt"))
        .collect();
    files.sort();
    Ok(files)
}
