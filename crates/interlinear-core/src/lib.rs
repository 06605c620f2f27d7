pub mod cache;
pub mod cancellation;
pub mod config;
pub mod debounce;
pub mod document_loader;
pub mod error;
pub mod feed;
pub mod measure;
pub mod pagination;
pub mod reader;
pub mod session;
pub mod store;
pub mod text_utils;
pub mod translator;

pub use error::ReaderError;
pub use session::{ReaderPhase, ReaderSession, ReaderSnapshot, SessionCommand, SessionEvent};
pub use store::{SentencePair, SentencePairStore};
