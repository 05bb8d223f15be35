pub mod dlg_migrate_blocked_numbers;
pub mod dlg_migrate_blocked_numbers_stt;

pub mod log_capture;

// Export modules for external use
pub use dialer_app::{DialerApp as GuiApp, View};
pub mod dialer_app;
pub mod dialer_app_stt;

#[cfg(target_os = "android")]
mod main_android;

use anyhow::{Context, Result};
#[cfg(not(target_os = "android"))]
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parses the level names stored in settings ("Error", "warn", ...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn priority(self) -> u8 {
        match self {
            LogLevel::Error => 0,
            LogLevel::Warn => 1,
            LogLevel::Info => 2,
            LogLevel::Debug => 3,
            LogLevel::Trace => 4,
        }
    }

    /// True if a message at `self` passes a filter set to `threshold`.
    pub fn passes(self, threshold: LogLevel) -> bool {
        self.priority() <= threshold.priority()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub config_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub show_logs: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_log_level() -> String {
    "Error".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_logs: false,
            log_level: default_log_level(),
            language: default_language(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        #[cfg(target_os = "android")]
        {
            let config_dir = PathBuf::from("/data/data/com.android.dialer.migrate/files");

            log::info!("Android config path - config_dir: {:?}", config_dir);

            match fs::create_dir_all(&config_dir) {
                Ok(()) => log::info!("Successfully created config_dir: {:?}", config_dir),
                Err(e) => log::error!(
                    "Failed to create config_dir: {:?} - Error: {}",
                    config_dir,
                    e
                ),
            }

            Ok(Config { config_dir })
        }

        #[cfg(not(target_os = "android"))]
        {
            let proj_dirs = ProjectDirs::from("com", "android", "dialer_migrate")
                .context("Failed to get project directories")?;

            let config_dir = proj_dirs.config_dir().to_path_buf();
            fs::create_dir_all(&config_dir)?;

            Ok(Config { config_dir })
        }
    }

    /// Config rooted at an explicit directory.
    pub fn with_dir(config_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir {:?}", config_dir))?;
        Ok(Config { config_dir })
    }

    pub fn load_settings(&self) -> Result<Settings> {
        let settings_path = self.config_dir.join("settings.txt");

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents =
            fs::read_to_string(&settings_path).context("Failed to read settings file")?;

        let settings: Settings =
            serde_json::from_str(&contents).context("Failed to parse settings JSON")?;

        Ok(settings)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let settings_path = self.config_dir.join("settings.txt");

        let json =
            serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

        fs::write(&settings_path, json).context("Failed to write settings file")?;

        tracing::info!("Settings saved to {:?}", settings_path);
        Ok(())
    }
}

/// Loads the string tables holding the dialog title, message and button labels.
pub fn init_i18n() {
    let en_us = String::from_utf8_lossy(include_bytes!("../assets/languages/fluent/en-US.ftl"));
    let ko_kr = String::from_utf8_lossy(include_bytes!("../assets/languages/fluent/ko-KR.ftl"));

    if let Err(e) = egui_i18n::load_translations_from_text("en-US", en_us) {
        tracing::error!("Failed to load en-US translations: {:?}", e);
    }
    if let Err(e) = egui_i18n::load_translations_from_text("ko-KR", ko_kr) {
        tracing::error!("Failed to load ko-KR translations: {:?}", e);
    }

    egui_i18n::set_language("en-US");
    egui_i18n::set_fallback("en-US");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults_from_partial_json() {
        let settings: Settings = serde_json::from_str(r#"{"show_logs": true}"#).unwrap();

        assert!(settings.show_logs);
        assert_eq!(settings.log_level, "Error");
        assert_eq!(settings.language, "en-US");
    }

    #[test]
    fn test_save_and_load_settings() {
        let dir = std::env::temp_dir().join(format!("dialer_migrate_cfg_{}", std::process::id()));
        let config = Config::with_dir(dir.clone()).unwrap();

        let settings = Settings {
            show_logs: true,
            log_level: "Debug".to_string(),
            language: "ko-KR".to_string(),
        };
        config.save_settings(&settings).unwrap();

        let loaded = config.load_settings().unwrap();
        assert!(loaded.show_logs);
        assert_eq!(loaded.log_level, "Debug");
        assert_eq!(loaded.language, "ko-KR");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_log_level_filtering() {
        assert_eq!(LogLevel::from_name("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_name("verbose"), None);
        assert!(LogLevel::Error.passes(LogLevel::Info));
        assert!(LogLevel::Info.passes(LogLevel::Info));
        assert!(!LogLevel::Debug.passes(LogLevel::Info));
    }
}
