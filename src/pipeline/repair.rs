//! Text repair: deterministic cleanup of raw OCR or text-layer output.
//!
//! Recognition engines emit text laid out like the page image: words split
//! with a hyphen at the right margin, sentences broken at every visual line,
//! ligature code points from the font, form feeds between pages. This module
//! undoes those artefacts without touching content.
//!
//! ## Rule Order
//!
//! Line endings are normalised and trailing whitespace trimmed before
//! dehyphenation, so that `"exam-  \nple"` is rejoined on the first pass
//! rather than the second; that keeps [`repair`] idempotent. Dehyphenation
//! runs before line merging so a rejoined word is never separated by the
//! merge space.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all repair rules to raw text.
///
/// Rules (applied in order):
/// 1. Expand the `fi` / `fl` ligatures
/// 2. Form feed → newline
/// 3. Normalise line endings and trim trailing whitespace per line
/// 4. Remove end-of-line hyphenation (`-\n` plus following whitespace)
/// 5. Merge lines broken mid-sentence (next line starts lowercase)
/// 6. Collapse runs of spaces
///
/// `repair(&repair(x)) == repair(x)` for every input.
pub fn repair(input: &str) -> String {
    let s = expand_ligatures(input);
    let s = form_feeds_to_newlines(&s);
    let s = normalise_lines(&s);
    let s = remove_hyphenation(&s);
    let s = merge_wrapped_lines(&s);
    collapse_spaces(&s)
}

// ── Rule 1: Ligatures ───────────────────────────────────────────────────────

fn expand_ligatures(input: &str) -> String {
    input.replace('\u{FB01}', "fi").replace('\u{FB02}', "fl")
}

// ── Rule 2: Form feeds ──────────────────────────────────────────────────────

fn form_feeds_to_newlines(input: &str) -> String {
    input.replace('\u{000C}', "\n")
}

// ── Rule 3: Normalise line endings, trim trailing whitespace ────────────────

fn normalise_lines(input: &str) -> String {
    input
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: Dehyphenation ───────────────────────────────────────────────────

static RE_LINE_END_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-\n\s*").unwrap());

fn remove_hyphenation(input: &str) -> String {
    RE_LINE_END_HYPHEN.replace_all(input, "").to_string()
}

// ── Rule 5: Line merging ────────────────────────────────────────────────────

/// Blank lines are kept as paragraph breaks. A non-blank line whose successor
/// (left-trimmed) starts with a lowercase letter was wrapped by the layout, so
/// the two are joined with one space and the joined line is examined again.
///
/// Splits on `'\n'` rather than [`str::lines`] so a trailing newline survives
/// and the rule stays idempotent.
fn merge_wrapped_lines(input: &str) -> String {
    let lines: Vec<&str> = input.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut carry: Option<String> = None;
    let mut i = 0;

    while i < lines.len() {
        let current = match carry.take() {
            Some(merged) => merged,
            None => lines[i].trim_end().to_string(),
        };

        if current.is_empty() {
            out.push(current);
            i += 1;
            continue;
        }

        let next = lines.get(i + 1).map(|l| l.trim_start()).unwrap_or("");
        let wrapped = next.chars().next().is_some_and(char::is_lowercase);

        if wrapped {
            carry = Some(format!("{} {}", current, next.trim_end()));
        } else {
            out.push(current);
        }
        i += 1;
    }

    out.join("\n")
}

// ── Rule 6: Collapse spaces ─────────────────────────────────────────────────

static RE_MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_MULTI_SPACE.replace_all(input, " ").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────
