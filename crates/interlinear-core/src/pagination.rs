//! Pagination of sentence pairs into fixed-viewport pages.
//!
//! Pages are packed greedily in reading order: a pair joins the current page
//! while the accumulated height stays within the container, otherwise it
//! opens a new page. A pair is never split, so a pair taller than the
//! container sits alone on an overflowing page.

use crate::measure::LayoutMeasurer;
use crate::store::SentencePair;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Minimum allowed font size (px).
pub const MIN_FONT_SIZE: u32 = 12;
/// Maximum allowed font size (px).
pub const MAX_FONT_SIZE: u32 = 32;
pub const FONT_SIZE_STEP: i32 = 2;
pub const MIN_MARGIN: u32 = 8;
pub const MAX_MARGIN: u32 = 64;
pub const MARGIN_STEP: i32 = 8;

/// User-adjustable display parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayParams {
    pub font_size: u32,
    pub margin: u32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            font_size: 18,
            margin: 24,
        }
    }
}

impl DisplayParams {
    pub fn new(font_size: u32, margin: u32) -> Self {
        Self {
            font_size: clamp_font_size(font_size),
            margin: clamp_margin(margin),
        }
    }

    /// Bring both values back into their allowed ranges.
    pub fn clamped(self) -> Self {
        Self::new(self.font_size, self.margin)
    }
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

pub fn clamp_margin(margin: u32) -> u32 {
    margin.clamp(MIN_MARGIN, MAX_MARGIN)
}

/// Apply a signed step to a value, saturating at zero before clamping.
pub fn step_value(value: u32, delta: i32) -> u32 {
    value.saturating_add_signed(delta)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Container box derived from the viewport and margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub font_size: u32,
    pub content_width: f32,
    pub content_height: f32,
}

impl PageGeometry {
    pub fn new(params: DisplayParams, viewport: Viewport) -> Self {
        let inset = 2.0 * params.margin as f32;
        Self {
            font_size: params.font_size,
            content_width: (viewport.width - inset).max(1.0),
            content_height: (viewport.height - inset).max(0.0),
        }
    }
}

/// Indices of the pairs shown together on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub indices: Vec<usize>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn contains(&self, idx: usize) -> bool {
        self.indices.binary_search(&idx).is_ok()
    }
}

/// Every page for the current content and parameters, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    pages: Vec<Page>,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }
}

impl PageLayout {
    /// Number of pages, never zero.
    pub fn total_pages(&self) -> usize {
        self.pages.len().max(1)
    }

    pub fn page(&self, idx: usize) -> Option<&Page> {
        self.pages.get(idx)
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page holding the given pair index, if it has been laid out.
    pub fn page_of(&self, pair_idx: usize) -> Option<usize> {
        let pos = self
            .pages
            .partition_point(|page| page.first().map(|first| first <= pair_idx).unwrap_or(false));
        let candidate = pos.checked_sub(1)?;
        self.pages[candidate].contains(pair_idx).then_some(candidate)
    }

    /// True when pages hold exactly `0..pair_count` once each, in order.
    pub fn covers(&self, pair_count: usize) -> bool {
        let mut expected = 0usize;
        for page in &self.pages {
            for &idx in &page.indices {
                if idx != expected {
                    return false;
                }
                expected += 1;
            }
        }
        expected == pair_count && !self.pages.is_empty()
    }
}

/// Run a full pagination pass.
pub fn paginate(
    pairs: &[SentencePair],
    geometry: PageGeometry,
    measurer: &dyn LayoutMeasurer,
) -> PageLayout {
    let mut pages = Vec::new();
    pack_from(&mut pages, pairs, 0, geometry, measurer);
    finish(pages, pairs.len(), geometry)
}

/// Extend a layout after pairs were appended with unchanged geometry.
///
/// Only the last page is reopened; earlier pages are closed and, because
/// packing is deterministic, would come out identical from a full pass.
pub fn repaginate_tail(
    layout: PageLayout,
    pairs: &[SentencePair],
    geometry: PageGeometry,
    measurer: &dyn LayoutMeasurer,
) -> PageLayout {
    let mut pages = layout.pages;
    let resume = match pages.pop() {
        Some(last) => last.first().unwrap_or(0),
        None => 0,
    };
    pack_from(&mut pages, pairs, resume, geometry, measurer);
    finish(pages, pairs.len(), geometry)
}

fn pack_from(
    pages: &mut Vec<Page>,
    pairs: &[SentencePair],
    start: usize,
    geometry: PageGeometry,
    measurer: &dyn LayoutMeasurer,
) {
    let mut current = Page::default();
    let mut accumulated = 0.0f32;

    for (idx, pair) in pairs.iter().enumerate().skip(start) {
        let height = measurer.measure(pair, geometry.font_size, geometry.content_width);
        // Exact fit stays on the current page.
        if accumulated + height > geometry.content_height && !current.is_empty() {
            pages.push(std::mem::take(&mut current));
            current.indices.push(idx);
            accumulated = height;
        } else {
            current.indices.push(idx);
            accumulated += height;
        }
    }

    if !current.is_empty() {
        pages.push(current);
    }
}

fn finish(mut pages: Vec<Page>, pair_count: usize, geometry: PageGeometry) -> PageLayout {
    if pages.is_empty() {
        pages.push(Page::default());
    }
    let layout = PageLayout { pages };
    debug_assert!(
        layout.covers(pair_count),
        "page layout must cover every pair exactly once"
    );
    debug!(
        pages = layout.pages.len(),
        pairs = pair_count,
        font_size = geometry.font_size,
        content_width = geometry.content_width,
        content_height = geometry.content_height,
        "Paginated sentence pairs"
    );
    layout
}
