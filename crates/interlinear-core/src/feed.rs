//! Progressive content feed.
//!
//! The first sentences of a document are translated up front so the reader
//! can open immediately; the rest is translated on a worker thread and handed
//! back to the session in batches over a channel.

use crate::cancellation::CancellationToken;
use crate::error::ReaderError;
use crate::store::{SentencePair, zip_batch};
use crate::translator::{Translator, translate_in_chunks};
use serde::Serialize;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

pub const DEFAULT_INITIAL_BATCH: usize = 50;
pub const DEFAULT_TRANSLATE_CHUNK: usize = 8;
pub const DEFAULT_BACKGROUND_BATCH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSizes {
    pub initial: usize,
    pub chunk: usize,
    pub background: usize,
}

impl Default for FeedSizes {
    fn default() -> Self {
        Self {
            initial: DEFAULT_INITIAL_BATCH,
            chunk: DEFAULT_TRANSLATE_CHUNK,
            background: DEFAULT_BACKGROUND_BATCH,
        }
    }
}

/// How far the whole-document translation has come.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedProgress {
    pub processed: usize,
    pub total: usize,
}

impl FeedProgress {
    pub fn new(processed: usize, total: usize) -> Self {
        Self { processed, total }
    }

    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.processed as f32 / self.total as f32).min(1.0)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

#[derive(Debug)]
pub enum FeedMessage {
    Batch {
        start_idx: usize,
        pairs: Vec<SentencePair>,
    },
    Failed {
        start_idx: usize,
        error: ReaderError,
    },
    Finished,
}

/// Translate the head of the document synchronously.
pub fn translate_initial(
    translator: &dyn Translator,
    sentences: &[String],
    sizes: FeedSizes,
) -> Result<Vec<SentencePair>, ReaderError> {
    let head = &sentences[..sentences.len().min(sizes.initial)];
    if head.is_empty() {
        return Ok(Vec::new());
    }
    info!(count = head.len(), "Translating initial batch");
    let translations = translate_in_chunks(translator, head, sizes.chunk)?;
    zip_batch(head.to_vec(), translations)
}

/// Receiving end of a running background producer.
pub struct FeedHandle {
    rx: Receiver<FeedMessage>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
    next_idx: usize,
    finished: bool,
}

impl FeedHandle {
    /// Start translating `sentences[start_idx..]` in background batches.
    pub fn spawn(
        translator: Arc<dyn Translator>,
        sentences: Vec<String>,
        start_idx: usize,
        sizes: FeedSizes,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let worker = thread::spawn(move || {
            let batch_size = sizes.background.max(1);
            let mut next = start_idx.min(sentences.len());
            while next < sentences.len() {
                if let Err(err) = token.check_cancelled("background_translate") {
                    debug!("{err}");
                    return;
                }
                let end = (next + batch_size).min(sentences.len());
                let sources = &sentences[next..end];
                let result = translate_in_chunks(translator.as_ref(), sources, sizes.chunk)
                    .and_then(|translations| zip_batch(sources.to_vec(), translations));
                match result {
                    Ok(pairs) => {
                        debug!(start_idx = next, count = pairs.len(), "Background batch ready");
                        if tx.send(FeedMessage::Batch { start_idx: next, pairs }).is_err() {
                            return;
                        }
                    }
                    Err(error) => {
                        warn!(start_idx = next, "Background translation failed: {error}");
                        let _ = tx.send(FeedMessage::Failed {
                            start_idx: next,
                            error,
                        });
                        return;
                    }
                }
                next = end;
            }
            let _ = tx.send(FeedMessage::Finished);
        });
        Self {
            rx,
            cancel,
            worker: Some(worker),
            next_idx: start_idx,
            finished: false,
        }
    }

    /// Drain every message that is ready without blocking.
    ///
    /// A producer that disconnects without `Finished` or `Failed` (a panic,
    /// for instance) is reported as `Failed` at the next expected index.
    pub fn drain(&mut self) -> Vec<FeedMessage> {
        let mut messages = Vec::new();
        if self.finished {
            return messages;
        }
        loop {
            match self.rx.try_recv() {
                Ok(message) => {
                    match &message {
                        FeedMessage::Batch { start_idx, pairs } => {
                            self.next_idx = start_idx + pairs.len();
                        }
                        FeedMessage::Failed { .. } | FeedMessage::Finished => {
                            self.finished = true;
                        }
                    }
                    messages.push(message);
                    if self.finished {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!(start_idx = self.next_idx, "Background translation exited early");
                    self.finished = true;
                    messages.push(FeedMessage::Failed {
                        start_idx: self.next_idx,
                        error: ReaderError::Translation(
                            "background translation stopped unexpectedly".to_string(),
                        ),
                    });
                    break;
                }
            }
        }
        messages
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop the producer. A batch still being translated is discarded.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.finished = true;
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() && worker.join().is_err() {
                warn!("Background translation thread panicked");
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
