use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

// Canonicalizes free text for comparison: lowercases, strips combining
// diacritics (U+0300..=U+036F) after NFD decomposition, replaces 'ł' with 'l'
// and collapses whitespace runs into single spaces.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let stripped = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            // 'ł' has no canonical decomposition.
            'ł' | 'Ł' => 'l',
            c => c,
        })
        .collect::<String>();

    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}
