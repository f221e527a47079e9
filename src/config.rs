// src/config.rs
//! TOML configuration surface. Loaded once at startup; everything downstream
//! treats these as already-validated in-memory structures.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const ENV_CONFIG_PATH: &str = "RECRUIT_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/recruit.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub include_keywords: Vec<String>,
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f64,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default = "default_history_path")]
    pub history_path: PathBuf,
}

fn default_threshold() -> f64 {
    0.3
}

fn default_history_path() -> PathBuf {
    PathBuf::from("data/job_history.json")
}

/// Raw schedule shape as written in TOML. `ScheduleSpec::from_config`
/// resolves the precedence (times, then window, then bare interval).
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default = "default_interval")]
    pub interval_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            times: Vec::new(),
            start_time: None,
            end_time: None,
            interval_minutes: default_interval(),
        }
    }
}

fn default_interval() -> u32 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub feed_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub terminal: bool,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub file: FileConfig,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            terminal: true,
            email: EmailConfig::default(),
            file: FileConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub format: FileFormat,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_dir: default_output_dir(),
            format: FileFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    #[default]
    Json,
    Txt,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// `$RECRUIT_CONFIG_PATH`, falling back to `config/recruit.toml`.
    pub fn load_default() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::from_path(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config_parses() {
        let toml = r#"
include_keywords = ["백엔드 개발자", "Python"]
exclude_keywords = ["인턴"]
similarity_threshold = 0.4
history_path = "state/history.json"

[schedule]
start_time = "09:00"
end_time = "18:00"
interval_minutes = 30

[[sources]]
name = "example"
feed_url = "https://jobs.example/rss?q={keyword}"

[notifications]
terminal = true

[notifications.file]
enabled = true
output_dir = "out"
format = "txt"

[notifications.email]
enabled = false
"#;
        let cfg: Config = toml::from_str(toml).unwrap();
        assert_eq!(cfg.include_keywords.len(), 2);
        assert_eq!(cfg.exclude_keywords, vec!["인턴"]);
        assert_eq!(cfg.similarity_threshold, 0.4);
        assert_eq!(cfg.schedule.start_time.as_deref(), Some("09:00"));
        assert_eq!(cfg.schedule.interval_minutes, 30);
        assert_eq!(cfg.sources[0].name, "example");
        assert!(cfg.notifications.file.enabled);
        assert_eq!(cfg.notifications.file.format, FileFormat::Txt);
        assert!(!cfg.notifications.email.enabled);
        assert_eq!(cfg.history_path, PathBuf::from("state/history.json"));
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg: Config = toml::from_str(r#"include_keywords = ["rust"]"#).unwrap();
        assert_eq!(cfg.similarity_threshold, 0.3);
        assert!(cfg.schedule.times.is_empty());
        assert_eq!(cfg.schedule.interval_minutes, 60);
        assert!(cfg.notifications.terminal);
        assert!(!cfg.notifications.file.enabled);
        assert_eq!(cfg.history_path, PathBuf::from("data/job_history.json"));
    }
}
