use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::domain::LayoutConfig;

/// Where the dashboard dataset comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    #[default]
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub data_source: DataSourceKind,
    pub refresh_interval_secs: u64,
    pub load_delay_ms: u64,
    pub request_timeout_secs: u64,
    pub trace_depth: u32,
    pub layout: LayoutConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            data_source: DataSourceKind::Local,
            refresh_interval_secs: 30,
            load_delay_ms: 800,
            request_timeout_secs: 10,
            trace_depth: 3,
            layout: LayoutConfig::default(),
        }
    }
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path)
}

/// Missing file means defaults; a file that fails to parse is logged and
/// replaced by defaults.
pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => config,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "invalid config, using defaults");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("CHAINAUDIT_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("chainaudit").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("chainaudit").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "chainaudit", "chainaudit")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("chainaudit"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("chainaudit"));
    }
    directories::ProjectDirs::from("io", "chainaudit", "chainaudit")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn log_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("chainaudit.log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.data_source, DataSourceKind::Local);
        assert_eq!(config.refresh_interval(), Duration::from_secs(30));
        assert_eq!(config.load_delay(), Duration::from_millis(800));
        assert_eq!(config.trace_depth, 3);
        assert_eq!(config.layout.radius, 300.0);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "http://analytics.internal:8080/"
data_source = "remote"
refresh_interval_secs = 5

[layout]
radius = 150.0
"#
        )
        .unwrap();

        let config = load_from(file.path());
        assert_eq!(config.api_base(), "http://analytics.internal:8080");
        assert_eq!(config.data_source, DataSourceKind::Remote);
        assert_eq!(config.refresh_interval_secs, 5);
        assert_eq!(config.load_delay_ms, 800);
        assert_eq!(config.layout.radius, 150.0);
        assert_eq!(config.layout.width, 600.0);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_source = 42").unwrap();
        let config = load_from(file.path());
        assert_eq!(config.data_source, DataSourceKind::Local);
    }

    #[test]
    fn test_invalid_file_warning_reaches_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, "trace_depth = \"deep\"\n").unwrap();
        let log_file = dir.path().join("chainaudit.log");
        let writer = std::sync::Mutex::new(std::fs::File::create(&log_file).unwrap());
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || load_from(&config_file));
        assert_eq!(config.trace_depth, 3);
        let logged = std::fs::read_to_string(&log_file).unwrap();
        assert!(logged.contains("invalid config, using defaults"), "{logged}");
        assert!(logged.contains("WARN"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_from(&dir.path().join("absent.toml"));
        assert_eq!(config.trace_depth, 3);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = Config {
            refresh_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.refresh_interval(), Duration::from_secs(1));
    }
}
