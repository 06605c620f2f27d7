//! Cleanup and segmentation of extracted document text.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{00A0}]+").unwrap());
static RE_HYPHEN_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{L})-[ \t]*\n[ \t]*(\p{L})").unwrap());
static RE_PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n\s*").unwrap());

/// Abbreviations whose trailing period does not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "sr", "sra", "srta", "dr", "dra", "ud", "uds", "vd", "vds", "pág", "núm", "art", "cap",
];

/// Minimum length, in characters, for a fragment to count as a sentence.
const MIN_SENTENCE_CHARS: usize = 2;

/// Repair common PDF extraction artifacts.
///
/// Joins words hyphenated across a line break, turns single newlines into
/// spaces and keeps blank lines as paragraph breaks (at most one).
pub fn clean_text(raw: &str) -> String {
    let text: String = raw.replace("\r\n", "\n").nfc().collect();
    let text = RE_SPACES.replace_all(&text, " ");
    let text = RE_HYPHEN_BREAK.replace_all(&text, "$1$2");
    RE_PARAGRAPH_BREAK
        .split(&text)
        .map(|para| {
            para.split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|lines| !lines.is_empty())
        .map(|lines| lines.join(" "))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split cleaned text on blank lines.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    RE_PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|para| !para.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '…')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, '"' | '\'' | '”' | '’' | '»' | ')' | ']')
}

fn ends_with_abbreviation(current: &str) -> bool {
    let Some(stem) = current.strip_suffix('.') else {
        return false;
    };
    let word = stem
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '¿' || c == '¡')
        .next()
        .unwrap_or("");
    let lower = word.to_lowercase();
    ABBREVIATIONS.contains(&lower.as_str())
}

/// Split a paragraph into sentences.
///
/// A sentence ends after a run of `.`, `!`, `?` or `…` followed by
/// whitespace or the end of the text; closing quotes and brackets right after
/// the terminator stay with the sentence. Fragments shorter than two
/// characters are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        current.push(ch);
        i += 1;
        if !is_terminator(ch) {
            continue;
        }
        while i < chars.len() && is_terminator(chars[i]) {
            current.push(chars[i]);
            i += 1;
        }
        while i < chars.len() && is_closer(chars[i]) {
            current.push(chars[i]);
            i += 1;
        }
        let at_boundary = i >= chars.len() || chars[i].is_whitespace();
        if at_boundary && !(ch == '.' && ends_with_abbreviation(current.trim_end())) {
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);
    sentences
}

fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
    let sentence = fragment.trim();
    if sentence.chars().count() >= MIN_SENTENCE_CHARS {
        sentences.push(sentence.to_string());
    }
}

/// Sentences of each non-empty paragraph, in order.
pub fn group_sentences_by_paragraph(text: &str) -> Vec<Vec<String>> {
    split_paragraphs(text)
        .iter()
        .map(|para| split_sentences(para))
        .filter(|sentences| !sentences.is_empty())
        .collect()
}

/// Flatten paragraph groups into the reading-order sentence list.
pub fn flatten_paragraphs(paragraphs: Vec<Vec<String>>) -> Vec<String> {
    paragraphs.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_repairs_line_breaks() {
        let raw = "La  casa   era\nmuy gran-\nde.\n\n\n\nOtro   párrafo.";
        assert_eq!(clean_text(raw), "La casa era muy grande.\n\nOtro párrafo.");
    }

    #[test]
    fn hyphen_before_blank_line_keeps_paragraphs_apart() {
        assert_eq!(clean_text("gran-\n\nde"), "gran-\n\nde");
    }

    #[test]
    fn cleanup_composes_accents() {
        let decomposed = "cancio\u{0301}n";
        assert_eq!(clean_text(decomposed), "canción");
    }

    #[test]
    fn splits_on_spanish_punctuation() {
        let sentences = split_sentences("¿Dónde estás? ¡Aquí! Vale... Hasta luego.");
        assert_eq!(
            sentences,
            vec!["¿Dónde estás?", "¡Aquí!", "Vale...", "Hasta luego."]
        );
    }

    #[test]
    fn closing_quotes_stay_with_sentence() {
        let sentences = split_sentences("Dijo: «Ya voy.» Luego salió.");
        assert_eq!(sentences, vec!["Dijo: «Ya voy.»", "Luego salió."]);
    }

    #[test]
    fn decimals_and_abbreviations_do_not_split() {
        let sentences = split_sentences("El Sr. García pagó 3.50 euros. Fin.");
        assert_eq!(sentences, vec!["El Sr. García pagó 3.50 euros.", "Fin."]);
    }

    #[test]
    fn single_characters_are_dropped() {
        assert_eq!(split_sentences("Bien. . "), vec!["Bien."]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn groups_by_paragraph() {
        let groups = group_sentences_by_paragraph("Uno. Dos.\n\nTres.\n\n \n\n");
        assert_eq!(
            groups,
            vec![vec!["Uno.".to_string(), "Dos.".to_string()], vec!["Tres.".to_string()]]
        );
        assert_eq!(flatten_paragraphs(groups).len(), 3);
    }
}
