use crate::pagination::DisplayParams;
use serde::Serialize;

/// Direction the host should animate the last page change in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageTransition {
    #[default]
    None,
    Forward,
    Backward,
}

/// Reading position and display flags.
#[derive(Debug, Clone)]
pub struct ReaderState {
    pub(crate) current_page: usize,
    pub(crate) overlay_visible: bool,
    pub(crate) params: DisplayParams,
    pub(crate) last_transition: PageTransition,
}

impl ReaderState {
    pub fn new(params: DisplayParams) -> Self {
        Self {
            current_page: 0,
            overlay_visible: false,
            params: params.clamped(),
            last_transition: PageTransition::None,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn params(&self) -> DisplayParams {
        self.params
    }

    pub fn last_transition(&self) -> PageTransition {
        self.last_transition
    }

    /// Advance one page. Returns false at the last page.
    pub(crate) fn next_page(&mut self, total_pages: usize) -> bool {
        if self.current_page + 1 < total_pages {
            self.current_page += 1;
            self.last_transition = PageTransition::Forward;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns false at the first page.
    pub(crate) fn prev_page(&mut self, total_pages: usize) -> bool {
        if self.current_page > 0 {
            self.current_page = (self.current_page - 1).min(total_pages.saturating_sub(1));
            self.last_transition = PageTransition::Backward;
            true
        } else {
            false
        }
    }

    /// Jump straight to `page`. Out-of-range targets are ignored.
    pub(crate) fn goto_page(&mut self, page: usize, total_pages: usize) -> bool {
        if page < total_pages {
            self.current_page = page;
            self.last_transition = PageTransition::None;
            true
        } else {
            false
        }
    }

    pub(crate) fn toggle_overlay(&mut self) {
        self.overlay_visible = !self.overlay_visible;
    }

    /// Keep the page index valid after the layout changed size.
    pub(crate) fn set_page_clamped(&mut self, page: usize, total_pages: usize) {
        self.current_page = page.min(total_pages.max(1) - 1);
    }
}
