use super::models::AppConfig;
use super::tables::ConfigTables;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from the given path, falling back to defaults on error.
pub fn load_config(path: &Path) -> AppConfig {
    let contents = match fs::read_to_string(path) {
        Ok(data) => {
            info!(path = %path.display(), "Loaded base config");
            data
        }
        Err(err) => {
            warn!(
                path = %path.display(),
                "Falling back to default config: {err}"
            );
            return AppConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            debug!("Parsed configuration from disk");
            config
        }
        Err(err) => {
            warn!(path = %path.display(), "Invalid config TOML: {err}");
            AppConfig::default()
        }
    }
}

pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    let tables: ConfigTables = toml::from_str(contents)?;
    Ok(tables.into())
}

pub fn serialize_config(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string(&ConfigTables::from(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").expect("parse");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.font_size, 18);
        assert_eq!(config.margin, 24);
        assert_eq!(config.resize_debounce_ms, 200);
        assert_eq!(config.feed_sizes().background, 16);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = parse_config(
            r#"
[appearance]
font_size = 26

[translation]
command = ["python3", "worker.py"]
background_batch_size = 32

[logging]
log_level = "info"
"#,
        )
        .expect("parse");
        assert_eq!(config.font_size, 26);
        assert_eq!(config.margin, 24);
        assert_eq!(config.translator_command, vec!["python3", "worker.py"]);
        assert_eq!(config.background_batch_size, 32);
        assert_eq!(config.translate_batch_size, 8);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn out_of_range_appearance_is_clamped_on_use() {
        let config = parse_config("[appearance]\nfont_size = 90\nmargin = 1\n").expect("parse");
        let params = config.display_params();
        assert_eq!((params.font_size, params.margin), (32, 8));
    }

    #[test]
    fn serialized_config_parses_back() {
        let mut config = AppConfig::default();
        config.translator_command = vec!["translate".to_string()];
        config.viewport_width = 800.0;
        let text = serialize_config(&config).expect("serialize");
        assert!(text.contains("[viewport]"));
        assert_eq!(parse_config(&text).expect("parse"), config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/interlinear/config.toml"));
        assert_eq!(config, AppConfig::default());
    }
}
