//! Collapses bursts of viewport resizes into one re-pagination.

use crate::pagination::Viewport;
use std::time::{Duration, Instant};

/// Reference quiet period before a resize is applied.
pub const DEFAULT_RESIZE_WINDOW: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct ResizeDebouncer {
    window: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_RESIZE_WINDOW)
    }
}

impl ResizeDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a resize signal; the newest dimensions replace any pending ones.
    pub fn push(&mut self, viewport: Viewport, now: Instant) {
        self.pending = Some((viewport, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the final dimensions once the burst has been quiet for the window.
    pub fn poll(&mut self, now: Instant) -> Option<Viewport> {
        let (_, last) = self.pending?;
        if now.saturating_duration_since(last) >= self.window {
            self.pending.take().map(|(viewport, _)| viewport)
        } else {
            None
        }
    }
}
