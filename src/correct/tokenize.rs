//! Word / separator tokenization for correction.
//!
//! A word is a maximal run of ASCII letters and the Turkish letters
//! `ÇĞİÖŞÜçğıöşü`. Everything else (digits, punctuation, whitespace, other
//! scripts) forms separator runs. Concatenating the tokens of a text gives
//! back the text byte for byte.

/// Turkish letters outside ASCII that count as word characters.
const TURKISH_LETTERS: &str = "ÇĞİÖŞÜçğıöşü";

/// One token of a text; borrows from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Word(&'a str),
    Separator(&'a str),
}

impl<'a> Token<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Token::Word(s) | Token::Separator(s) => s,
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphabetic() || TURKISH_LETTERS.contains(c)
}

/// Split `text` into alternating word and separator runs.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_word: Option<bool> = None;

    for (pos, c) in text.char_indices() {
        let word = is_word_char(c);
        match in_word {
            Some(prev) if prev != word => {
                tokens.push(make(&text[start..pos], prev));
                start = pos;
            }
            _ => {}
        }
        in_word = Some(word);
    }
    if let Some(word) = in_word {
        tokens.push(make(&text[start..], word));
    }
    tokens
}

fn make(s: &str, word: bool) -> Token<'_> {
    if word {
        Token::Word(s)
    } else {
        Token::Separator(s)
    }
}

/// Iterate over the word tokens only.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    tokenize(text)
        .into_iter()
        .filter_map(|t| match t {
            Token::Word(w) => Some(w),
            Token::Separator(_) => None,
        })
}

/// Lowercase a word, folding `İ` to plain `i`.
///
/// `char::to_lowercase('İ')` yields `i` followed by a combining dot, which is
/// not a word character and would split the token on re-tokenization.
pub fn lowercase_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        if c == 'İ' {
            out.push('i');
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Uppercase a word. `i` maps to `I` and `ı` maps to `I`, as `char::to_uppercase` does.
pub fn uppercase_word(word: &str) -> String {
    word.chars().flat_map(char::to_uppercase).collect()
}
