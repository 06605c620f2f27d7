//! Height measurement for sentence pairs.
//!
//! Pagination only needs one number per pair: the vertical space it takes at
//! a given font size and content width. Hosts with real font shaping can
//! provide their own [`TextMeasurer`] (run widths) or replace the whole
//! [`LayoutMeasurer`].

use crate::store::SentencePair;
use std::sync::Arc;
use unicode_segmentation::UnicodeSegmentation;

/// Line box of a source line, as a multiple of the font size.
pub const SOURCE_LINE_HEIGHT: f32 = 1.5;
/// Gap between the source block and its translation.
pub const SOURCE_GAP_EM: f32 = 0.3;
/// Translation glyphs are rendered at this fraction of the font size.
pub const TRANSLATION_SCALE: f32 = 0.85;
pub const TRANSLATION_LINE_HEIGHT: f32 = 1.4;
/// Spacing added after every pair.
pub const PAIR_SPACING_EM: f32 = 0.8;

/// Vertical space a pair occupies when rendered.
///
/// Implementations must be pure: the same inputs always give the same height.
pub trait LayoutMeasurer: Send + Sync {
    fn measure(&self, pair: &SentencePair, font_size: u32, content_width: f32) -> f32;
}

/// Width of a single-line run of text.
pub trait TextMeasurer: Send + Sync {
    fn measure_text_px(&self, text: &str, size_px: f32) -> f32;
}

/// Glyph-class width model for a proportional serif face.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure_text_px(&self, text: &str, size_px: f32) -> f32 {
        let em_sum: f32 = text
            .graphemes(true)
            .map(|g| g.chars().next().map(glyph_em_width).unwrap_or(0.0))
            .sum();
        em_sum * size_px * 1.03
    }
}

fn glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        'i' | 'l' | 'I' | '|' | '!' | '¡' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        '¿' | '?' => 0.44,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_uppercase() => 0.64,
        c if c.is_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}

/// Measures pairs by greedy word wrapping at the content width.
#[derive(Clone)]
pub struct WrappingMeasurer {
    text: Arc<dyn TextMeasurer>,
}

impl Default for WrappingMeasurer {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicTextMeasurer))
    }
}

impl WrappingMeasurer {
    pub fn new(text: Arc<dyn TextMeasurer>) -> Self {
        Self { text }
    }

    /// Number of lines `text` wraps to at `size_px` within `width`.
    pub fn line_count(&self, text: &str, size_px: f32, width: f32) -> usize {
        let width = width.max(1.0);
        let space = self.text.measure_text_px(" ", size_px);
        let mut lines = 0usize;
        let mut line_width = 0.0f32;

        for word in text.split_whitespace() {
            let word_width = self.text.measure_text_px(word, size_px);
            if word_width > width {
                // Overlong words break at grapheme boundaries on fresh lines.
                if line_width > 0.0 {
                    lines += 1;
                }
                let (full_lines, rest) = self.break_word(word, size_px, width);
                lines += full_lines;
                line_width = rest;
                continue;
            }
            if line_width == 0.0 {
                line_width = word_width;
            } else if line_width + space + word_width <= width {
                line_width += space + word_width;
            } else {
                lines += 1;
                line_width = word_width;
            }
        }

        if line_width > 0.0 {
            lines += 1;
        }
        lines
    }

    fn break_word(&self, word: &str, size_px: f32, width: f32) -> (usize, f32) {
        let mut full_lines = 0usize;
        let mut current = 0.0f32;
        for grapheme in word.graphemes(true) {
            let w = self.text.measure_text_px(grapheme, size_px);
            if current > 0.0 && current + w > width {
                full_lines += 1;
                current = w;
            } else {
                current += w;
            }
        }
        (full_lines, current)
    }
}

impl LayoutMeasurer for WrappingMeasurer {
    fn measure(&self, pair: &SentencePair, font_size: u32, content_width: f32) -> f32 {
        let fs = font_size as f32;
        let translation_fs = fs * TRANSLATION_SCALE;
        let source_lines = self.line_count(&pair.source, fs, content_width) as f32;
        let translation_lines =
            self.line_count(&pair.translation, translation_fs, content_width) as f32;

        source_lines * fs * SOURCE_LINE_HEIGHT
            + fs * SOURCE_GAP_EM
            + translation_lines * translation_fs * TRANSLATION_LINE_HEIGHT
            + fs * PAIR_SPACING_EM
    }
}
