use crate::error::ReaderError;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared stop flag for the background translation producer.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn check_cancelled(&self, stage: &'static str) -> Result<(), ReaderError> {
        if self.is_cancelled() {
            return Err(ReaderError::Cancelled { stage });
        }
        Ok(())
    }
}
