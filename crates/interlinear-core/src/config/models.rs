use super::defaults;
use crate::feed::FeedSizes;
use crate::pagination::{DisplayParams, Viewport};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Flattened view of every table in the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub font_size: u32,
    pub margin: u32,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub resize_debounce_ms: u64,
    /// argv of the translator worker; empty means no translator.
    pub translator_command: Vec<String>,
    pub initial_batch_size: usize,
    pub translate_batch_size: usize,
    pub background_batch_size: usize,
    pub log_level: LogLevel,
    pub cache_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            font_size: defaults::default_font_size(),
            margin: defaults::default_margin(),
            viewport_width: defaults::default_viewport_width(),
            viewport_height: defaults::default_viewport_height(),
            resize_debounce_ms: defaults::default_resize_debounce_ms(),
            translator_command: Vec::new(),
            initial_batch_size: defaults::default_initial_batch_size(),
            translate_batch_size: defaults::default_translate_batch_size(),
            background_batch_size: defaults::default_background_batch_size(),
            log_level: defaults::default_log_level(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

impl AppConfig {
    pub fn display_params(&self) -> DisplayParams {
        DisplayParams::new(self.font_size, self.margin)
    }

    pub fn set_display_params(&mut self, params: DisplayParams) {
        self.font_size = params.font_size;
        self.margin = params.margin;
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn resize_window(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn feed_sizes(&self) -> FeedSizes {
        FeedSizes {
            initial: self.initial_batch_size,
            chunk: self.translate_batch_size.max(1),
            background: self.background_batch_size.max(1),
        }
    }

    pub fn cache_root(&self) -> PathBuf {
        PathBuf::from(&self.cache_dir)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    #[default]
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
