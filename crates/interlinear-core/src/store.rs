//! Append-only store of sentence pairs.
//!
//! A pair is identified by its index, and indices never move: pairs are only
//! ever appended, in reading order.

use crate::error::ReaderError;
use serde::{Deserialize, Serialize};

/// One source sentence and its translation, rendered as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct SentencePair {
    pub source: String,
    pub translation: String,
}

impl SentencePair {
    pub fn new(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
        }
    }
}

impl From<(String, String)> for SentencePair {
    fn from((source, translation): (String, String)) -> Self {
        Self {
            source,
            translation,
        }
    }
}

impl From<SentencePair> for (String, String) {
    fn from(pair: SentencePair) -> Self {
        (pair.source, pair.translation)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentencePairStore {
    pairs: Vec<SentencePair>,
}

impl SentencePairStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: Vec<SentencePair>) -> Self {
        Self { pairs }
    }

    /// Append pairs at the end. Returns the index of the first appended pair.
    pub fn append(&mut self, pairs: impl IntoIterator<Item = SentencePair>) -> usize {
        let first = self.pairs.len();
        self.pairs.extend(pairs);
        first
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&SentencePair> {
        self.pairs.get(idx)
    }

    pub fn as_slice(&self) -> &[SentencePair] {
        &self.pairs
    }

    /// Serialize as `[[source, translation], ...]`.
    pub fn to_json(&self) -> Result<String, ReaderError> {
        Ok(serde_json::to_string(&self.pairs)?)
    }

    pub fn from_json(data: &str) -> Result<Self, ReaderError> {
        let pairs: Vec<SentencePair> = serde_json::from_str(data)?;
        Ok(Self { pairs })
    }
}

/// Pair sources with translations positionally.
///
/// A length mismatch is reported instead of truncating, so a bad batch can
/// never shift translations onto the wrong sentences.
pub fn zip_batch(
    sources: Vec<String>,
    translations: Vec<String>,
) -> Result<Vec<SentencePair>, ReaderError> {
    if sources.len() != translations.len() {
        return Err(ReaderError::LengthMismatch {
            sources: sources.len(),
            translations: translations.len(),
        });
    }
    Ok(sources
        .into_iter()
        .zip(translations)
        .map(|(source, translation)| SentencePair {
            source,
            translation,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn append_keeps_indices_monotonic() {
        let mut store = SentencePairStore::new();
        let first = store.append(vec![SentencePair::new("Hola.", "Hello.")]);
        let second = store.append(vec![
            SentencePair::new("Mundo.", "World."),
            SentencePair::new("Adiós.", "Goodbye."),
        ]);
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(2).map(|p| p.source.as_str()), Some("Adiós."));
    }

    #[test]
    fn zip_rejects_short_translation_batch() {
        let sources = strings(&["a", "b", "c", "d", "e", "f", "g", "h"]);
        let translations = strings(&["1", "2", "3", "4", "5", "6", "7"]);
        let err = zip_batch(sources, translations).unwrap_err();
        assert!(matches!(
            err,
            ReaderError::LengthMismatch {
                sources: 8,
                translations: 7
            }
        ));
    }

    #[test]
    fn zip_pairs_positionally() {
        let pairs = zip_batch(strings(&["Hola.", "Mundo."]), strings(&["Hello.", "World."]))
            .expect("equal lengths");
        assert_eq!(pairs[1], SentencePair::new("Mundo.", "World."));
    }

    #[test]
    fn json_shape_is_array_of_two_element_arrays() {
        let store = SentencePairStore::from_pairs(vec![SentencePair::new("Hola.", "Hello.")]);
        let json = store.to_json().expect("serialize");
        assert_eq!(json, r#"[["Hola.","Hello."]]"#);
        let restored = SentencePairStore::from_json(&json).expect("parse");
        assert_eq!(restored.as_slice(), store.as_slice());
    }
}
