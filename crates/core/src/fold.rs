use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case and strip diacritics: `Á`, `ñ`, `ç` fold to `a`, `n`, `c`.
/// Composed and decomposed inputs fold to the same output.
pub fn fold(s: &str) -> String {
    fold_chars(s.chars()).collect()
}

/// Fold a single character. Usually yields exactly one char.
pub fn fold_char(c: char) -> impl Iterator<Item = char> {
    fold_chars(std::iter::once(c))
}

fn fold_chars<I: Iterator<Item = char>>(chars: I) -> impl Iterator<Item = char> {
    chars
        .flat_map(char::to_lowercase)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
}

/// Header form: trimmed, diacritic-free, upper-cased, inner whitespace
/// collapsed to single spaces.
pub fn fold_header(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_uppercase)
        .collect()
}

pub fn digits_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}
