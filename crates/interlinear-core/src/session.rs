use crate::cache::Bookmark;
use crate::debounce::ResizeDebouncer;
use crate::feed::{FeedHandle, FeedMessage, FeedProgress};
use crate::measure::LayoutMeasurer;
use crate::pagination::{
    self, DisplayParams, FONT_SIZE_STEP, MARGIN_STEP, PageGeometry, PageLayout, Viewport,
};
use crate::reader::{PageTransition, ReaderState};
use crate::store::{SentencePair, SentencePairStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReaderPhase {
    Loading,
    Ready,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaderSnapshot {
    pub document_name: String,
    pub current_page: usize,
    pub total_pages: usize,
    pub pairs: Vec<SentencePair>,
    pub overlay_visible: bool,
    pub params: DisplayParams,
    pub phase: ReaderPhase,
    pub transition: PageTransition,
    pub progress: FeedProgress,
    pub progress_fraction: f32,
    pub feed_error: Option<String>,
    pub no_content: bool,
}

#[derive(Debug, Clone)]
pub enum SessionCommand {
    GetSnapshot,
    NextPage,
    PrevPage,
    GoToPage { page: usize },
    ToggleOverlay,
    HideOverlay,
    SetFontSize { size: u32 },
    AdjustFontSize { steps: i32 },
    SetMargin { margin: u32 },
    AdjustMargin { steps: i32 },
    ViewportResize { width: f32, height: f32 },
    AppendContent { pairs: Vec<SentencePair> },
    Tick,
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::NextPage => "reader_next_page",
            Self::PrevPage => "reader_prev_page",
            Self::GoToPage { .. } => "reader_go_to_page",
            Self::ToggleOverlay => "reader_toggle_overlay",
            Self::HideOverlay => "reader_hide_overlay",
            Self::SetFontSize { .. } => "reader_set_font_size",
            Self::AdjustFontSize { .. } => "reader_adjust_font_size",
            Self::SetMargin { .. } => "reader_set_margin",
            Self::AdjustMargin { .. } => "reader_adjust_margin",
            Self::ViewportResize { .. } => "reader_viewport_resize",
            Self::AppendContent { .. } => "reader_append_content",
            Self::Tick => "reader_tick",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: ReaderSnapshot,
}

/// Everything one open document needs: the pair store, its current layout,
/// the reading position and the background producer feeding the store.
pub struct ReaderSession {
    document_name: String,
    store: SentencePairStore,
    layout: PageLayout,
    reader: ReaderState,
    viewport: Viewport,
    resize: ResizeDebouncer,
    measurer: Arc<dyn LayoutMeasurer>,
    feed: Option<FeedHandle>,
    total_sentences: usize,
    feed_error: Option<String>,
    /// Restored bookmark whose anchor pair has not been translated yet.
    pending_bookmark: Option<Bookmark>,
    pagination_passes: usize,
}

impl ReaderSession {
    pub fn open(
        document_name: impl Into<String>,
        pairs: Vec<SentencePair>,
        total_sentences: usize,
        params: DisplayParams,
        viewport: Viewport,
        measurer: Arc<dyn LayoutMeasurer>,
        resize_window: Duration,
    ) -> Self {
        let document_name = document_name.into();
        if !viewport.is_valid() {
            warn!(
                width = viewport.width,
                height = viewport.height,
                "Opening reader with a degenerate viewport"
            );
        }
        let store = SentencePairStore::from_pairs(pairs);
        let mut session = Self {
            total_sentences: total_sentences.max(store.len()),
            document_name,
            store,
            layout: PageLayout::default(),
            reader: ReaderState::new(params),
            viewport,
            resize: ResizeDebouncer::new(resize_window),
            measurer,
            feed: None,
            feed_error: None,
            pending_bookmark: None,
            pagination_passes: 0,
        };
        session.repaginate();
        info!(
            document = %session.document_name,
            pairs = session.store.len(),
            total_sentences = session.total_sentences,
            pages = session.layout.total_pages(),
            "Opened reader session"
        );
        session
    }

    /// Hand the session the producer translating the rest of the document.
    pub fn attach_feed(&mut self, feed: FeedHandle) {
        if let Some(mut previous) = self.feed.replace(feed) {
            previous.cancel();
        }
    }

    /// Stop the background producer. Batches not yet drained are dropped.
    pub fn close(&mut self) {
        if let Some(mut feed) = self.feed.take() {
            feed.cancel();
            info!(
                document = %self.document_name,
                processed = self.store.len(),
                "Stopped background translation"
            );
        }
    }

    pub fn document_name(&self) -> &str {
        &self.document_name
    }

    pub fn store(&self) -> &SentencePairStore {
        &self.store
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn reader(&self) -> &ReaderState {
        &self.reader
    }

    pub fn params(&self) -> DisplayParams {
        self.reader.params()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn current_page(&self) -> usize {
        self.reader.current_page()
    }

    pub fn total_pages(&self) -> usize {
        self.layout.total_pages()
    }

    /// Number of pagination passes run so far, full or incremental.
    pub fn pagination_passes(&self) -> usize {
        self.pagination_passes
    }

    pub fn is_feed_running(&self) -> bool {
        self.feed.as_ref().is_some_and(|feed| !feed.is_finished())
    }

    pub fn phase(&self) -> ReaderPhase {
        if (self.store.is_empty() && self.is_feed_running()) || self.resize.is_pending() {
            ReaderPhase::Loading
        } else {
            ReaderPhase::Ready
        }
    }

    pub fn no_content(&self) -> bool {
        self.store.is_empty() && !self.is_feed_running()
    }

    pub fn progress(&self) -> FeedProgress {
        FeedProgress::new(self.store.len(), self.total_sentences)
    }

    pub fn next_page(&mut self) {
        if self.reader.next_page(self.layout.total_pages()) {
            self.pending_bookmark = None;
            debug!(page = self.reader.current_page(), "Next page");
        }
    }

    pub fn prev_page(&mut self) {
        if self.reader.prev_page(self.layout.total_pages()) {
            self.pending_bookmark = None;
            debug!(page = self.reader.current_page(), "Previous page");
        }
    }

    pub fn goto_page(&mut self, page: usize) {
        if self.reader.goto_page(page, self.layout.total_pages()) {
            self.pending_bookmark = None;
            debug!(page, "Jumped to page");
        } else {
            debug!(page, total = self.layout.total_pages(), "Ignoring out-of-range page");
        }
    }

    pub fn toggle_overlay(&mut self) {
        self.reader.toggle_overlay();
    }

    /// Escape: close the overlay if it is open, otherwise nothing.
    pub fn hide_overlay(&mut self) {
        if self.reader.overlay_visible() {
            self.reader.toggle_overlay();
        }
    }

    pub fn set_font_size(&mut self, size: u32) {
        let next = pagination::clamp_font_size(size);
        if next == self.reader.params.font_size {
            return;
        }
        info!(from = self.reader.params.font_size, to = next, "Font size changed");
        self.reader.params.font_size = next;
        self.repaginate();
    }

    pub fn adjust_font_size(&mut self, steps: i32) {
        let current = self.reader.params.font_size;
        self.set_font_size(pagination::step_value(current, steps * FONT_SIZE_STEP));
    }

    pub fn set_margin(&mut self, margin: u32) {
        let next = pagination::clamp_margin(margin);
        if next == self.reader.params.margin {
            return;
        }
        info!(from = self.reader.params.margin, to = next, "Margin changed");
        self.reader.params.margin = next;
        self.repaginate();
    }

    pub fn adjust_margin(&mut self, steps: i32) {
        let current = self.reader.params.margin;
        self.set_margin(pagination::step_value(current, steps * MARGIN_STEP));
    }

    /// Queue a resize. The layout is rebuilt by [`Self::tick`] once the burst
    /// settles; until then the previous layout keeps being served.
    pub fn viewport_resize(&mut self, width: f32, height: f32, now: Instant) {
        let viewport = Viewport::new(width, height);
        if !viewport.is_valid() {
            debug!(width, height, "Ignoring degenerate viewport");
            return;
        }
        self.resize.push(viewport, now);
    }

    /// Append freshly translated pairs and extend the layout.
    pub fn append_sentences(&mut self, pairs: Vec<SentencePair>) {
        if pairs.is_empty() {
            return;
        }
        let first = self.store.append(pairs);
        self.total_sentences = self.total_sentences.max(self.store.len());
        let layout = std::mem::take(&mut self.layout);
        self.layout = pagination::repaginate_tail(
            layout,
            self.store.as_slice(),
            self.geometry(),
            self.measurer.as_ref(),
        );
        self.pagination_passes += 1;
        let page = self.reader.current_page();
        self.reader.set_page_clamped(page, self.layout.total_pages());
        debug!(
            first,
            pairs = self.store.len(),
            pages = self.layout.total_pages(),
            "Appended sentence pairs"
        );
        self.resolve_pending_anchor();
    }

    /// Periodic housekeeping: apply a settled resize and drain the feed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(viewport) = self.resize.poll(now) {
            if viewport != self.viewport {
                info!(
                    width = viewport.width,
                    height = viewport.height,
                    "Viewport resized"
                );
                self.viewport = viewport;
                self.repaginate();
            }
        }
        self.drain_feed();
    }

    pub fn current_page_pairs(&self) -> Vec<SentencePair> {
        self.layout
            .page(self.reader.current_page())
            .map(|page| {
                page.indices
                    .iter()
                    .filter_map(|&idx| self.store.get(idx).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let progress = self.progress();
        ReaderSnapshot {
            document_name: self.document_name.clone(),
            current_page: self.reader.current_page(),
            total_pages: self.layout.total_pages(),
            pairs: self.current_page_pairs(),
            overlay_visible: self.reader.overlay_visible(),
            params: self.reader.params(),
            phase: self.phase(),
            transition: self.reader.last_transition(),
            progress,
            progress_fraction: progress.fraction(),
            feed_error: self.feed_error.clone(),
            no_content: self.no_content(),
        }
    }

    pub fn apply_command(&mut self, command: SessionCommand, now: Instant) -> SessionEvent {
        let action = command.action();
        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::NextPage => self.next_page(),
            SessionCommand::PrevPage => self.prev_page(),
            SessionCommand::GoToPage { page } => self.goto_page(page),
            SessionCommand::ToggleOverlay => self.toggle_overlay(),
            SessionCommand::HideOverlay => self.hide_overlay(),
            SessionCommand::SetFontSize { size } => self.set_font_size(size),
            SessionCommand::AdjustFontSize { steps } => self.adjust_font_size(steps),
            SessionCommand::SetMargin { margin } => self.set_margin(margin),
            SessionCommand::AdjustMargin { steps } => self.adjust_margin(steps),
            SessionCommand::ViewportResize { width, height } => {
                self.viewport_resize(width, height, now)
            }
            SessionCommand::AppendContent { pairs } => self.append_sentences(pairs),
            SessionCommand::Tick => self.tick(now),
        }
        debug_assert!(self.reader.current_page() < self.layout.total_pages());
        SessionEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    /// Current position. A restored bookmark still waiting for its anchor is
    /// returned unchanged so quitting early does not lose it.
    pub fn to_bookmark(&self) -> Bookmark {
        if let Some(bookmark) = self.pending_bookmark {
            return bookmark;
        }
        let page = self.reader.current_page();
        Bookmark {
            page,
            pair_idx: self.layout.page(page).and_then(|p| p.first()),
        }
    }

    /// Move to a saved position. An anchor that has not been translated yet
    /// is kept and honoured as soon as the feed delivers it.
    pub fn restore_bookmark(&mut self, bookmark: &Bookmark) {
        self.pending_bookmark = None;
        let total = self.layout.total_pages();
        match bookmark.pair_idx {
            Some(anchor) => match self.layout.page_of(anchor) {
                Some(page) => self.reader.set_page_clamped(page, total),
                None => {
                    self.reader.set_page_clamped(bookmark.page, total);
                    self.pending_bookmark = Some(*bookmark);
                }
            },
            None => self.reader.set_page_clamped(bookmark.page, total),
        }
        info!(
            page = self.reader.current_page(),
            pending_anchor = ?self.pending_bookmark.and_then(|b| b.pair_idx),
            "Restored bookmark"
        );
    }

    fn geometry(&self) -> PageGeometry {
        PageGeometry::new(self.reader.params(), self.viewport)
    }

    fn repaginate(&mut self) {
        self.layout = pagination::paginate(
            self.store.as_slice(),
            self.geometry(),
            self.measurer.as_ref(),
        );
        self.pagination_passes += 1;
        let page = self.reader.current_page();
        self.reader.set_page_clamped(page, self.layout.total_pages());
        self.resolve_pending_anchor();
    }

    fn resolve_pending_anchor(&mut self) {
        let Some(anchor) = self.pending_bookmark.and_then(|b| b.pair_idx) else {
            return;
        };
        if let Some(page) = self.layout.page_of(anchor) {
            self.reader.set_page_clamped(page, self.layout.total_pages());
            self.pending_bookmark = None;
            debug!(anchor, page, "Reached bookmarked pair");
        }
    }

    fn drain_feed(&mut self) {
        let Some(feed) = self.feed.as_mut() else {
            return;
        };
        for message in feed.drain() {
            match message {
                FeedMessage::Batch { start_idx, pairs } => {
                    if start_idx != self.store.len() {
                        warn!(
                            start_idx,
                            expected = self.store.len(),
                            "Discarding out-of-order batch"
                        );
                        continue;
                    }
                    self.append_sentences(pairs);
                }
                FeedMessage::Failed { start_idx, error } => {
                    warn!(start_idx, "Progressive translation stopped: {error}");
                    self.feed_error = Some(error.to_string());
                }
                FeedMessage::Finished => {
                    info!(pairs = self.store.len(), "Progressive translation finished");
                }
            }
        }
        if self.feed.as_ref().is_some_and(FeedHandle::is_finished) {
            self.feed = None;
        }
    }
}

impl Drop for ReaderSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use crate::feed::FeedSizes;
    use crate::measure::WrappingMeasurer;
    use crate::translator::Translator;
    use std::thread;

    /// Every pair is `factor × font_size` tall regardless of width.
    struct PerFont(f32);

    impl LayoutMeasurer for PerFont {
        fn measure(&self, _pair: &SentencePair, font_size: u32, _content_width: f32) -> f32 {
            self.0 * font_size as f32
        }
    }

    /// Every pair has the same height.
    struct Fixed(f32);

    impl LayoutMeasurer for Fixed {
        fn measure(&self, _pair: &SentencePair, _font_size: u32, _content_width: f32) -> f32 {
            self.0
        }
    }

    struct Echo;

    impl Translator for Echo {
        fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ReaderError> {
            Ok(texts.iter().map(|t| format!("en:{t}")).collect())
        }
    }

    /// Loses one sentence of every batch.
    struct Lossy;

    impl Translator for Lossy {
        fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ReaderError> {
            Ok(texts.iter().skip(1).cloned().collect())
        }
    }

    fn pairs(count: usize) -> Vec<SentencePair> {
        (0..count)
            .map(|i| SentencePair::new(format!("Frase {i}."), format!("Sentence {i}.")))
            .collect()
    }

    fn open_with(
        pairs: Vec<SentencePair>,
        viewport: Viewport,
        measurer: Arc<dyn LayoutMeasurer>,
    ) -> ReaderSession {
        let total = pairs.len();
        ReaderSession::open(
            "test.pdf",
            pairs,
            total,
            DisplayParams::default(),
            viewport,
            measurer,
            Duration::from_millis(200),
        )
    }

    /// 100px pairs in a 150px container: one pair per page.
    fn one_per_page(count: usize) -> ReaderSession {
        open_with(
            pairs(count),
            Viewport::new(1024.0, 198.0),
            Arc::new(Fixed(100.0)),
        )
    }

    fn pump_until_idle(session: &mut ReaderSession) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.feed.is_some() && Instant::now() < deadline {
            session.tick(Instant::now());
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn two_short_pairs_share_one_page() {
        let session = open_with(
            vec![
                SentencePair::new("Hola.", "Hello."),
                SentencePair::new("Mundo.", "World."),
            ],
            Viewport::new(1024.0, 700.0),
            Arc::new(WrappingMeasurer::default()),
        );
        assert_eq!(session.layout().pages()[0].indices, vec![0, 1]);
        assert_eq!(session.total_pages(), 1);
        assert_eq!(session.phase(), ReaderPhase::Ready);
    }

    #[test]
    fn next_page_stops_at_the_end() {
        let mut session = one_per_page(2);
        assert_eq!(session.total_pages(), 2);
        session.next_page();
        assert_eq!(session.current_page(), 1);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.transition, PageTransition::Forward);
        assert_eq!(snapshot.pairs, vec![SentencePair::new("Frase 1.", "Sentence 1.")]);
        session.next_page();
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn larger_font_adds_pages_and_keeps_first_page() {
        // 10 pairs in a 652px container: 60px each at 12px, 160px at 32px.
        let mut session = open_with(
            pairs(10),
            Viewport::new(1024.0, 700.0),
            Arc::new(PerFont(5.0)),
        );
        session.set_font_size(12);
        assert_eq!(session.total_pages(), 1);
        session.set_font_size(32);
        assert_eq!(session.total_pages(), 3);
        assert_eq!(session.current_page(), 0);
    }

    #[test]
    fn smaller_font_clamps_to_new_last_page() {
        let mut session = open_with(
            pairs(10),
            Viewport::new(1024.0, 700.0),
            Arc::new(PerFont(5.0)),
        );
        session.set_font_size(32);
        session.goto_page(2);
        assert_eq!(session.current_page(), 2);
        session.set_font_size(12);
        assert_eq!(session.total_pages(), 1);
        assert_eq!(session.current_page(), 0);
    }

    #[test]
    fn empty_append_runs_no_pass() {
        let mut session = one_per_page(3);
        session.next_page();
        let passes = session.pagination_passes();
        session.append_sentences(Vec::new());
        assert_eq!(session.pagination_passes(), passes);
        assert_eq!(session.total_pages(), 3);
        assert_eq!(session.current_page(), 1);
    }

    #[test]
    fn unchanged_font_size_runs_no_pass() {
        let mut session = one_per_page(3);
        let passes = session.pagination_passes();
        session.set_font_size(18);
        session.set_margin(24);
        session.set_font_size(200);
        session.set_font_size(32);
        assert_eq!(session.pagination_passes(), passes + 1);
    }

    #[test]
    fn append_keeps_position_and_closed_pages() {
        let mut session = one_per_page(3);
        session.goto_page(1);
        let before = session.layout().pages().to_vec();
        session.append_sentences(pairs(4));
        assert_eq!(session.total_pages(), 7);
        assert_eq!(session.current_page(), 1);
        assert_eq!(&session.layout().pages()[..before.len()], &before[..]);
    }

    #[test]
    fn mismatched_batch_leaves_store_untouched() {
        let mut session = one_per_page(2);
        let sentences: Vec<String> = (0..10).map(|i| format!("s{i}")).collect();
        let sizes = FeedSizes {
            initial: 2,
            chunk: 8,
            background: 8,
        };
        session.attach_feed(FeedHandle::spawn(Arc::new(Lossy), sentences, 2, sizes));
        pump_until_idle(&mut session);

        assert_eq!(session.store().len(), 2);
        assert_eq!(
            session.store().get(1),
            Some(&SentencePair::new("Frase 1.", "Sentence 1."))
        );
        let error = session.snapshot().feed_error.expect("feed error");
        assert!(error.contains("8 source sentences, 7 translations"));
    }

    #[test]
    fn feed_batches_are_appended_on_tick() {
        let sentences: Vec<String> = (0..40).map(|i| format!("s{i}")).collect();
        let mut session = open_with(
            Vec::new(),
            Viewport::new(1024.0, 198.0),
            Arc::new(Fixed(100.0)),
        );
        assert!(session.no_content());
        session.attach_feed(FeedHandle::spawn(
            Arc::new(Echo),
            sentences,
            0,
            FeedSizes::default(),
        ));
        assert_eq!(session.phase(), ReaderPhase::Loading);
        assert!(!session.no_content());

        pump_until_idle(&mut session);
        assert_eq!(session.store().len(), 40);
        assert_eq!(session.total_pages(), 40);
        assert_eq!(session.store().get(39).map(|p| p.translation.as_str()), Some("en:s39"));
        assert_eq!(session.phase(), ReaderPhase::Ready);
        assert!(session.progress().is_complete());
    }

    #[test]
    fn resize_applies_after_quiet_window() {
        let mut session = one_per_page(4);
        let start = Instant::now();
        session.viewport_resize(1024.0, 500.0, start);
        session.viewport_resize(1024.0, 448.0, start + Duration::from_millis(100));
        session.tick(start + Duration::from_millis(250));
        assert_eq!(session.phase(), ReaderPhase::Loading);
        assert_eq!(session.total_pages(), 4);

        session.tick(start + Duration::from_millis(300));
        assert_eq!(session.phase(), ReaderPhase::Ready);
        // 400px container holds four 100px pairs.
        assert_eq!(session.total_pages(), 1);
        assert_eq!(session.viewport(), Viewport::new(1024.0, 448.0));
    }

    #[test]
    fn degenerate_resize_is_ignored() {
        let mut session = one_per_page(2);
        session.viewport_resize(0.0, 300.0, Instant::now());
        session.viewport_resize(f32::NAN, 300.0, Instant::now());
        assert_eq!(session.phase(), ReaderPhase::Ready);
    }

    #[test]
    fn escape_only_closes_an_open_overlay() {
        let mut session = one_per_page(1);
        session.hide_overlay();
        assert!(!session.reader().overlay_visible());
        session.toggle_overlay();
        assert!(session.reader().overlay_visible());
        session.hide_overlay();
        assert!(!session.reader().overlay_visible());
    }

    #[test]
    fn bookmark_anchor_waits_for_content() {
        let mut session = one_per_page(5);
        session.restore_bookmark(&Bookmark {
            page: 7,
            pair_idx: Some(7),
        });
        assert_eq!(session.current_page(), 4);
        session.append_sentences(pairs(5));
        assert_eq!(session.current_page(), 7);
        assert_eq!(session.to_bookmark(), Bookmark {
            page: 7,
            pair_idx: Some(7)
        });
    }

    #[test]
    fn navigation_cancels_pending_anchor() {
        let mut session = one_per_page(5);
        session.restore_bookmark(&Bookmark {
            page: 7,
            pair_idx: Some(7),
        });
        session.prev_page();
        session.append_sentences(pairs(5));
        assert_eq!(session.current_page(), 3);
    }

    #[test]
    fn quitting_before_anchor_arrives_keeps_saved_position() {
        let mut session = one_per_page(5);
        session.total_sentences = 20;
        let saved = Bookmark {
            page: 12,
            pair_idx: Some(12),
        };
        session.restore_bookmark(&saved);
        assert_eq!(session.current_page(), 4);
        assert_eq!(session.to_bookmark(), saved);

        session.append_sentences(pairs(3));
        assert_eq!(session.to_bookmark(), saved);
    }

    /// Takes a while per call so a batch is in flight when the session ends.
    struct Slow;

    impl Translator for Slow {
        fn translate_batch(&self, texts: &[String]) -> Result<Vec<String>, ReaderError> {
            thread::sleep(Duration::from_millis(20));
            Ok(texts.to_vec())
        }
    }

    #[test]
    fn close_stops_the_feed_and_drops_in_flight_batches() {
        let mut session = one_per_page(2);
        session.total_sentences = 200;
        let sentences: Vec<String> = (0..200).map(|i| format!("Frase {i}.")).collect();
        session.attach_feed(FeedHandle::spawn(
            Arc::new(Slow),
            sentences,
            2,
            FeedSizes::default(),
        ));
        assert!(session.is_feed_running());

        session.close();
        assert!(!session.is_feed_running());
        let len = session.store().len();
        thread::sleep(Duration::from_millis(100));
        session.tick(Instant::now());
        assert_eq!(session.store().len(), len);
        assert!(!session.is_feed_running());
        assert!(session.snapshot().feed_error.is_none());
    }

    #[test]
    fn bookmark_anchor_survives_font_change() {
        let mut session = open_with(
            pairs(10),
            Viewport::new(1024.0, 700.0),
            Arc::new(PerFont(5.0)),
        );
        session.set_font_size(32);
        session.goto_page(2);
        let bookmark = session.to_bookmark();
        assert_eq!(bookmark.pair_idx, Some(8));

        session.set_font_size(12);
        session.set_font_size(32);
        session.restore_bookmark(&bookmark);
        assert_eq!(session.current_page(), 2);
    }

    #[test]
    fn page_index_stays_in_range_for_any_event_sequence() {
        let mut session = open_with(
            pairs(25),
            Viewport::new(800.0, 600.0),
            Arc::new(PerFont(4.0)),
        );
        let start = Instant::now();
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        for step in 0..500u64 {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let pick = (seed >> 33) % 9;
            let now = start + Duration::from_millis(step * 40);
            let command = match pick {
                0 => SessionCommand::NextPage,
                1 => SessionCommand::PrevPage,
                2 => SessionCommand::GoToPage {
                    page: (seed >> 40) as usize % 12,
                },
                3 => SessionCommand::AdjustFontSize {
                    steps: if seed & 1 == 0 { 1 } else { -1 },
                },
                4 => SessionCommand::AdjustMargin {
                    steps: if seed & 2 == 0 { 1 } else { -1 },
                },
                5 => SessionCommand::ViewportResize {
                    width: 300.0 + (seed >> 20) as f32 % 900.0,
                    height: 200.0 + (seed >> 30) as f32 % 700.0,
                },
                6 => SessionCommand::AppendContent { pairs: pairs(2) },
                7 => SessionCommand::ToggleOverlay,
                _ => SessionCommand::Tick,
            };
            let event = session.apply_command(command, now);
            assert!(event.snapshot.current_page < event.snapshot.total_pages);
            assert!(session.layout().covers(session.store().len()));
            let params = event.snapshot.params;
            assert!((12..=32).contains(&params.font_size));
            assert!((8..=64).contains(&params.margin));
        }
    }

    #[test]
    fn command_dispatch_reports_action_and_snapshot() {
        let mut session = one_per_page(3);
        let event = session.apply_command(SessionCommand::GoToPage { page: 2 }, Instant::now());
        assert_eq!(event.action, "reader_go_to_page");
        assert_eq!(event.snapshot.current_page, 2);
        assert_eq!(event.snapshot.transition, PageTransition::None);
        assert_eq!(event.snapshot.document_name, "test.pdf");
    }

    #[test]
    fn empty_session_reports_no_content() {
        let session = open_with(
            Vec::new(),
            Viewport::new(1024.0, 700.0),
            Arc::new(Fixed(10.0)),
        );
        let snapshot = session.snapshot();
        assert!(snapshot.no_content);
        assert_eq!(snapshot.total_pages, 1);
        assert!(snapshot.pairs.is_empty());
        assert_eq!(snapshot.phase, ReaderPhase::Ready);
    }
}
