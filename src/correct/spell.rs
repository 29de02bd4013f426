//! Token-level spelling correction against a corpus [`Vocabulary`].
//!
//! Known words are left alone. An unknown word is replaced by the most
//! similar known word when the similarity reaches the cutoff, and the
//! replacement takes the capitalization class of the original:
//!
//! | original     | replacement  |
//! |--------------|--------------|
//! | `KITAB`      | `KITAP`      |
//! | `Kitab`      | `Kitap`      |
//! | `kitab`, `kItAb` | `kitap`  |
//!
//! Separators are never touched, so the token sequence keeps its length.

use crate::correct::tokenize::{lowercase_word, tokenize, uppercase_word, Token};
use crate::correct::vocabulary::Vocabulary;
use strsim::normalized_levenshtein;

/// Fuzzy corrector bound to one vocabulary.
#[derive(Debug, Clone)]
pub struct SpellCorrector<'v> {
    vocabulary: &'v Vocabulary,
    cutoff: f64,
    /// Known words with their char lengths, for the length bound.
    candidates: Vec<(&'v str, usize)>,
}

impl<'v> SpellCorrector<'v> {
    /// `cutoff` is the minimum normalized similarity in `(0, 1]`.
    pub fn new(vocabulary: &'v Vocabulary, cutoff: f64) -> Self {
        let candidates = vocabulary
            .known_words()
            .map(|w| (w, w.chars().count()))
            .collect();
        Self {
            vocabulary,
            cutoff,
            candidates,
        }
    }

    pub fn correct(&self, text: &str) -> String {
        self.correct_with_count(text).0
    }

    /// Corrected text plus the number of replaced words.
    pub fn correct_with_count(&self, text: &str) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut replaced = 0usize;

        for token in tokenize(text) {
            match token {
                Token::Separator(s) => out.push_str(s),
                Token::Word(w) => match self.correct_word(w) {
                    Some(fixed) => {
                        out.push_str(&fixed);
                        replaced += 1;
                    }
                    None => out.push_str(w),
                },
            }
        }
        (out, replaced)
    }

    /// Replacement for one word, or `None` to keep it.
    pub fn correct_word(&self, word: &str) -> Option<String> {
        let lower = lowercase_word(word);
        if self.vocabulary.contains(&lower) {
            return None;
        }
        let best = self.closest(&lower)?;
        let fixed = match_case(word, best);
        (fixed != word).then_some(fixed)
    }

    /// Most similar known word at or above the cutoff.
    ///
    /// Ties go to the higher corpus frequency, then the lexicographically
    /// smaller word.
    fn closest(&self, lower: &str) -> Option<&'v str> {
        let len = lower.chars().count();
        let mut best: Option<(&'v str, f64, u64)> = None;

        for &(candidate, cand_len) in &self.candidates {
            // Edit distance is at least the length difference.
            let (short, long) = if len < cand_len {
                (len, cand_len)
            } else {
                (cand_len, len)
            };
            if long == 0 || (short as f64 / long as f64) < self.cutoff {
                continue;
            }

            let sim = normalized_levenshtein(lower, candidate);
            if sim < self.cutoff {
                continue;
            }
            let freq = self.vocabulary.frequency(candidate);
            let better = match best {
                None => true,
                Some((b_word, b_sim, b_freq)) => {
                    sim > b_sim
                        || (sim == b_sim
                            && (freq > b_freq || (freq == b_freq && candidate < b_word)))
                }
            };
            if better {
                best = Some((candidate, sim, freq));
            }
        }
        best.map(|(w, _, _)| w)
    }
}

/// Give `replacement` (lowercase) the capitalization class of `original`.
fn match_case(original: &str, replacement: &str) -> String {
    if is_all_upper(original) {
        uppercase_word(replacement)
    } else if is_title(original) {
        capitalize(replacement)
    } else {
        replacement.to_string()
    }
}

fn is_all_upper(word: &str) -> bool {
    word.chars().any(char::is_uppercase) && !word.chars().any(char::is_lowercase)
}

fn is_title(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(char::is_uppercase) && chars.all(|c| !c.is_uppercase())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[(&str, usize)]) -> Vocabulary {
        let texts: Vec<String> = words
            .iter()
            .map(|(w, n)| vec![*w; *n].join(" "))
            .collect();
        Vocabulary::from_texts(texts.iter().map(String::as_str), 2)
    }

    #[test]
    fn corrects_with_capitalization() {
        let v = vocab(&[("kitap", 2)]);
        let c = SpellCorrector::new(&v, 0.72);
        assert_eq!(c.correct("Kitab"), "Kitap");
        assert_eq!(c.correct("KITAB"), "KITAP");
        assert_eq!(c.correct("kitab"), "kitap");
    }

    #[test]
    fn mixed_case_falls_to_lowercase() {
        let v = vocab(&[("kitap", 2)]);
        let c = SpellCorrector::new(&v, 0.72);
        assert_eq!(c.correct("kItAb"), "kitap");
    }

    #[test]
    fn known_words_untouched() {
        let v = vocab(&[("kitap", 2)]);
        let c = SpellCorrector::new(&v, 0.72);
        let (out, n) = c.correct_with_count("KİTAP Kitap kitap");
        assert_eq!(out, "KİTAP Kitap kitap");
        assert_eq!(n, 0);
    }

    #[test]
    fn far_words_are_kept() {
        let v = vocab(&[("kitap", 2)]);
        let c = SpellCorrector::new(&v, 0.72);
        assert_eq!(c.correct("masa"), "masa");
    }

    #[test]
    fn words_below_min_count_are_not_targets() {
        let v = vocab(&[("kitap", 1)]);
        let c = SpellCorrector::new(&v, 0.72);
        assert_eq!(c.correct("kitab"), "kitab");
    }

    #[test]
    fn separators_are_preserved() {
        let v = vocab(&[("merhaba", 3), ("dünya", 3)]);
        let c = SpellCorrector::new(&v, 0.72);
        let (out, n) = c.correct_with_count("  Merhaba, dünyq!\n\t42 -- merhabq.");
        assert_eq!(out, "  Merhaba, dünya!\n\t42 -- merhaba.");
        assert_eq!(n, 2);
    }

    #[test]
    fn token_count_is_invariant() {
        let v = vocab(&[("ev", 2), ("evler", 2), ("okul", 2), ("çocuk", 2)]);
        let c = SpellCorrector::new(&v, 0.6);
        let inputs = [
            "Evlr okl çocuj, 1999 yılında!",
            "OKUK ve EVLER",
            "",
            "...",
            "İzmir'de çocuklar",
        ];
        for input in inputs {
            let out = c.correct(input);
            assert_eq!(tokenize(&out).len(), tokenize(input).len(), "{input:?} -> {out:?}");
        }
    }

    #[test]
    fn ties_prefer_frequency_then_lexical_order() {
        // "kalem" is one substitution away from both candidates.
        let v = vocab(&[("kalek", 2), ("kalen", 5)]);
        let c = SpellCorrector::new(&v, 0.7);
        assert_eq!(c.correct("kalem"), "kalen");

        let v = vocab(&[("kalen", 2), ("kalek", 2)]);
        let c = SpellCorrector::new(&v, 0.7);
        assert_eq!(c.correct("kalem"), "kalek");
    }

    #[test]
    fn case_helpers() {
        assert!(is_all_upper("KITAB"));
        assert!(is_all_upper("K"));
        assert!(!is_all_upper("Kitab"));
        assert!(is_title("Kitab"));
        assert!(!is_title("KiTab"));
        assert_eq!(capitalize("çiçek"), "Çiçek");
    }
}
