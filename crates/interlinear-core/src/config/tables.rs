use super::defaults;
use super::models::{AppConfig, LogLevel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    appearance: AppearanceConfig,
    #[serde(default)]
    viewport: ViewportConfig,
    #[serde(default)]
    translation: TranslationConfig,
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    cache: CacheConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            font_size: tables.appearance.font_size,
            margin: tables.appearance.margin,
            viewport_width: tables.viewport.width,
            viewport_height: tables.viewport.height,
            resize_debounce_ms: tables.viewport.resize_debounce_ms,
            translator_command: tables.translation.command,
            initial_batch_size: tables.translation.initial_batch_size,
            translate_batch_size: tables.translation.translate_batch_size,
            background_batch_size: tables.translation.background_batch_size,
            log_level: tables.logging.log_level,
            cache_dir: tables.cache.dir,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            appearance: AppearanceConfig {
                font_size: config.font_size,
                margin: config.margin,
            },
            viewport: ViewportConfig {
                width: config.viewport_width,
                height: config.viewport_height,
                resize_debounce_ms: config.resize_debounce_ms,
            },
            translation: TranslationConfig {
                command: config.translator_command.clone(),
                initial_batch_size: config.initial_batch_size,
                translate_batch_size: config.translate_batch_size,
                background_batch_size: config.background_batch_size,
            },
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            cache: CacheConfig {
                dir: config.cache_dir.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct AppearanceConfig {
    #[serde(default = "defaults::default_font_size")]
    font_size: u32,
    #[serde(default = "defaults::default_margin")]
    margin: u32,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            font_size: defaults::default_font_size(),
            margin: defaults::default_margin(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct ViewportConfig {
    #[serde(default = "defaults::default_viewport_width")]
    width: f32,
    #[serde(default = "defaults::default_viewport_height")]
    height: f32,
    #[serde(default = "defaults::default_resize_debounce_ms")]
    resize_debounce_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            width: defaults::default_viewport_width(),
            height: defaults::default_viewport_height(),
            resize_debounce_ms: defaults::default_resize_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct TranslationConfig {
    #[serde(default)]
    command: Vec<String>,
    #[serde(default = "defaults::default_initial_batch_size")]
    initial_batch_size: usize,
    #[serde(default = "defaults::default_translate_batch_size")]
    translate_batch_size: usize,
    #[serde(default = "defaults::default_background_batch_size")]
    background_batch_size: usize,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        TranslationConfig {
            command: Vec::new(),
            initial_batch_size: defaults::default_initial_batch_size(),
            translate_batch_size: defaults::default_translate_batch_size(),
            background_batch_size: defaults::default_background_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct CacheConfig {
    #[serde(default = "defaults::default_cache_dir")]
    dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            dir: defaults::default_cache_dir(),
        }
    }
}
