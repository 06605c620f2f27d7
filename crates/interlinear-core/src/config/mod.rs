//! Configuration for the interlinear reader.
//!
//! Settings are read from `conf/config.toml` when present. Missing tables or
//! keys take their defaults, and an unreadable file falls back to defaults
//! entirely so the reader can still open.

mod defaults;
mod io;
mod models;
mod tables;

pub use io::{load_config, parse_config, serialize_config};
pub use models::{AppConfig, LogLevel};
