//! User settings stored as settings.json in the app data directory

use crate::constants::{API_URL_ENV, DEFAULT_API_BASE_URL, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use crate::types::VisibleColumns;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Table
    pub visible_columns: VisibleColumns,
    pub page_size: u32,

    // Backend
    pub api_base_url: Option<String>,

    // Last export destination
    pub export_dir: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            visible_columns: VisibleColumns::default(),
            page_size: DEFAULT_PAGE_SIZE,
            api_base_url: None,
            export_dir: None,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str::<Settings>(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings.sanitized()
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join(SETTINGS_FILE);
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    /// Page size outside the offered options falls back to the default
    fn sanitized(mut self) -> Self {
        if !PAGE_SIZE_OPTIONS.contains(&self.page_size) {
            warn!(page_size = self.page_size, "Unsupported page size in settings");
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        self
    }

    /// Backend URL: environment override, then settings, then the built-in default
    pub fn api_base_url(&self) -> String {
        let env = std::env::var(API_URL_ENV).ok();
        let url = resolve_api_base(env.as_deref(), self.api_base_url.as_deref());
        info!(url = %url, "Using traces API");
        url
    }

    pub fn export_dir_or_default(&self) -> PathBuf {
        self.export_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

pub fn resolve_api_base(env: Option<&str>, configured: Option<&str>) -> String {
    [env, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_API_BASE_URL)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnKey;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            window_w: Some(1600.0),
            window_h: Some(900.0),
            visible_columns: VisibleColumns::default().toggled(ColumnKey::Tokens),
            page_size: 25,
            api_base_url: Some("http://localhost:5000/api/traces".into()),
            ..Settings::default()
        };
        settings.save(dir.path());
        assert_eq!(Settings::load(dir.path()), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{ "page_size": 50 }"#).unwrap();
        let s = Settings::load(dir.path());
        assert_eq!(s.page_size, 50);
        assert_eq!(s.visible_columns, VisibleColumns::default());
        assert_eq!(s.api_base_url, None);
    }

    #[test]
    fn corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "{ nope").unwrap();
        assert_eq!(Settings::load(dir.path()), Settings::default());
    }

    #[test]
    fn unsupported_page_size_is_reset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{ "page_size": 7 }"#).unwrap();
        assert_eq!(Settings::load(dir.path()).page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn api_base_precedence() {
        assert_eq!(resolve_api_base(None, None), DEFAULT_API_BASE_URL);
        assert_eq!(resolve_api_base(None, Some("http://a")), "http://a");
        assert_eq!(resolve_api_base(Some("http://b"), Some("http://a")), "http://b");
        // Blank values are ignored
        assert_eq!(resolve_api_base(Some("  "), Some("http://a")), "http://a");
        assert_eq!(resolve_api_base(Some(""), Some("")), DEFAULT_API_BASE_URL);
    }
}
