use super::models::LogLevel;

pub(crate) fn default_font_size() -> u32 {
    18
}

pub(crate) fn default_margin() -> u32 {
    24
}

pub(crate) fn default_viewport_width() -> f32 {
    1024.0
}

pub(crate) fn default_viewport_height() -> f32 {
    700.0
}

pub(crate) fn default_resize_debounce_ms() -> u64 {
    200
}

pub(crate) fn default_initial_batch_size() -> usize {
    50
}

pub(crate) fn default_translate_batch_size() -> usize {
    8
}

pub(crate) fn default_background_batch_size() -> usize {
    16
}

pub(crate) fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

pub(crate) fn default_cache_dir() -> String {
    crate::cache::CACHE_DIR.to_string()
}
