use optistock_core::{fold, fold_char};

use crate::escape::{escape_html, push_escaped};

const MARK_OPEN: &str = "<span class=\"hl\">";
const MARK_CLOSE: &str = "</span>";

/// Escape `text` and wrap every stretch matching one of `tokens` in a
/// highlight span.
///
/// Matching runs on the folded form, so `optica` marks `ÓPTICA` and `nino`
/// marks `Niño`, while the output keeps the original characters. Tokens
/// are tried longest first; overlapping matches merge into one span.
pub fn highlight(text: &str, tokens: &[String]) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut needles: Vec<String> = tokens
        .iter()
        .map(|t| fold(t.trim()))
        .filter(|t| !t.is_empty())
        .collect();
    if needles.is_empty() {
        return escape_html(text);
    }
    needles.sort_by(|a, b| b.len().cmp(&a.len()));

    let chars: Vec<char> = text.chars().collect();
    let mut folded = String::with_capacity(text.len());
    // owner[b] = index in `chars` of the character folded byte b came from
    let mut owner: Vec<usize> = Vec::with_capacity(text.len());
    let mut folds_to_nothing = vec![false; chars.len()];
    for (i, c) in chars.iter().enumerate() {
        let before = folded.len();
        folded.extend(fold_char(*c));
        owner.resize(folded.len(), i);
        folds_to_nothing[i] = folded.len() == before;
    }

    let mut marked = vec![false; chars.len()];
    for needle in &needles {
        for (start, m) in folded.match_indices(needle.as_str()) {
            for &i in &owner[start..start + m.len()] {
                marked[i] = true;
            }
        }
    }
    // stray combining marks follow their base character
    for i in 1..chars.len() {
        if folds_to_nothing[i] {
            marked[i] = marked[i - 1];
        }
    }

    let mut out = String::with_capacity(text.len() + 32);
    let mut open = false;
    for (c, &m) in chars.iter().zip(&marked) {
        if m && !open {
            out.push_str(MARK_OPEN);
            open = true;
        } else if !m && open {
            out.push_str(MARK_CLOSE);
            open = false;
        }
        push_escaped(&mut out, *c);
    }
    if open {
        out.push_str(MARK_CLOSE);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(t: &[&str]) -> Vec<String> {
        t.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn no_tokens_only_escapes() {
        assert_eq!(highlight("<b>Vulk</b>", &[]), "&lt;b&gt;Vulk&lt;/b&gt;");
        assert_eq!(highlight("Vulk", &toks(&["  "])), "Vulk");
    }

    #[test]
    fn empty_text_is_empty() {
        assert_eq!(highlight("", &toks(&["a"])), "");
    }

    #[test]
    fn marks_accent_insensitive_match_keeping_original() {
        assert_eq!(
            highlight("ÓPTICA Sur", &toks(&["optica"])),
            "<span class=\"hl\">ÓPTICA</span> Sur"
        );
        assert_eq!(
            highlight("Niño", &toks(&["NIN"])),
            "<span class=\"hl\">Niñ</span>o"
        );
    }

    #[test]
    fn decomposed_accents_stay_inside_span() {
        assert_eq!(
            highlight("Nin\u{0303}o", &toks(&["nin"])),
            "<span class=\"hl\">Nin\u{0303}</span>o"
        );
    }

    #[test]
    fn overlapping_tokens_merge() {
        assert_eq!(
            highlight("carey mate", &toks(&["car", "carey"])),
            "<span class=\"hl\">carey</span> mate"
        );
        assert_eq!(
            highlight("abcdef", &toks(&["abc", "cde"])),
            "<span class=\"hl\">abcde</span>f"
        );
    }

    #[test]
    fn every_occurrence_is_marked() {
        assert_eq!(
            highlight("1231", &toks(&["1"])),
            "<span class=\"hl\">1</span>23<span class=\"hl\">1</span>"
        );
    }

    #[test]
    fn injected_markup_is_escaped_even_when_matched() {
        let out = highlight("<script>alert(1)</script>", &toks(&["script"]));
        assert!(!out.contains("<script>"));
        assert_eq!(
            out,
            "&lt;<span class=\"hl\">script</span>&gt;alert(1)&lt;/<span class=\"hl\">script</span>&gt;"
        );
    }

    #[test]
    fn token_with_markup_characters_matches_literal_text() {
        assert_eq!(
            highlight("A&B", &toks(&["&"])),
            "A<span class=\"hl\">&amp;</span>B"
        );
    }
}
