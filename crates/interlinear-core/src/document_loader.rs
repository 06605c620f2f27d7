//! Turn a document on disk into the ordered sentence list the reader pairs up.
//!
//! PDFs go through `pdf-extract`, plain text is read as is, and a `.json`
//! file holding `[[source, translation], ...]` is taken as already paired so
//! translation can be skipped entirely.

use crate::error::ReaderError;
use crate::store::{SentencePair, SentencePairStore};
use crate::text_utils;
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Source sentences still to be translated, grouped by paragraph.
    Sentences(Vec<Vec<String>>),
    /// Content that was paired ahead of time.
    Paired(Vec<SentencePair>),
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub name: String,
    pub content: DocumentContent,
}

impl LoadedDocument {
    pub fn sentence_count(&self) -> usize {
        match &self.content {
            DocumentContent::Sentences(paragraphs) => paragraphs.iter().map(Vec::len).sum(),
            DocumentContent::Paired(pairs) => pairs.len(),
        }
    }

    /// Fail with [`ReaderError::EmptyInput`] when nothing was extracted.
    pub fn require_content(self) -> Result<Self, ReaderError> {
        if self.sentence_count() == 0 {
            return Err(ReaderError::EmptyInput);
        }
        Ok(self)
    }
}

pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document")
        .to_string();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let content = match extension.as_str() {
        "pdf" => {
            info!(path = %path.display(), "Extracting PDF text");
            let bytes =
                fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let raw = pdf_extract::extract_text_from_mem(&bytes).map_err(|err| {
                anyhow!("Failed to extract text from {}: {err}", path.display())
            })?;
            DocumentContent::Sentences(segment(&raw))
        }
        "txt" | "text" => {
            info!(path = %path.display(), "Loading plain text content");
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            DocumentContent::Sentences(segment(&raw))
        }
        "json" => {
            info!(path = %path.display(), "Loading pre-paired content");
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let store = SentencePairStore::from_json(&data)
                .with_context(|| format!("Invalid sentence pair file {}", path.display()))?;
            DocumentContent::Paired(store.as_slice().to_vec())
        }
        other => bail!(
            "Unsupported document type {:?} for {}",
            other,
            path.display()
        ),
    };

    let document = LoadedDocument { name, content };
    info!(
        sentences = document.sentence_count(),
        "Finished loading document"
    );
    Ok(document)
}

/// Clean extracted text and split it into paragraph-grouped sentences.
pub fn segment(raw: &str) -> Vec<Vec<String>> {
    let cleaned = text_utils::clean_text(raw);
    let paragraphs = text_utils::group_sentences_by_paragraph(&cleaned);
    debug!(
        chars = cleaned.len(),
        paragraphs = paragraphs.len(),
        "Segmented document text"
    );
    paragraphs
}
