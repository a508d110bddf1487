// ⚙️ Extraction configuration
//
// Priority (highest to lowest): CLI flags, environment variables, TOML file,
// defaults.

use crate::sink::STATUS_TAB;
use crate::store::DEFAULT_DEGREE_LEVEL_ID;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const ENV_DB: &str = "COURSE_EXTRACT_DB";
pub const ENV_OUTPUT_DIR: &str = "COURSE_EXTRACT_OUTPUT_DIR";
pub const ENV_WRITE_DELAY_MS: &str = "COURSE_EXTRACT_WRITE_DELAY_MS";
pub const ENV_HOST: &str = "COURSE_EXTRACT_HOST";
pub const ENV_PORT: &str = "COURSE_EXTRACT_PORT";
pub const ENV_LOG_LEVEL: &str = "COURSE_EXTRACT_LOG_LEVEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}. Must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidNumber { var: String, value: String },

    #[error("Invalid tab name for {0}: must be non-empty and not the status tab")]
    InvalidTabName(String),

    #[error("Configuration file error: {0}")]
    FileError(String),
}

// ============================================================================
// LOG LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        LogLevel::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl LogLevel {
    /// Directive for `tracing_subscriber::EnvFilter`
    pub fn as_filter_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

// ============================================================================
// SECTIONS
// ============================================================================

/// Output tab per extraction module
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TabNames {
    pub details: String,
    pub entry_requirements: String,
    pub disc_spec: String,
    pub fee_non_degree: String,
    pub fee_degree: String,
    pub fee_partnerships: String,
}

impl Default for TabNames {
    fn default() -> Self {
        Self {
            details: "Details-Extraction-CWB".to_string(),
            entry_requirements: "ER-Extraction-CWB".to_string(),
            disc_spec: "Disc-Spec-Extraction-CWB".to_string(),
            fee_non_degree: "Fee-Extraction-Non-Degree-CWB".to_string(),
            fee_degree: "Fee-Extraction-Degree-CWB".to_string(),
            fee_partnerships: "Fee-Extraction-Partnerships-CWB".to_string(),
        }
    }
}

impl TabNames {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("details", self.details.as_str()),
            ("entry_requirements", self.entry_requirements.as_str()),
            ("disc_spec", self.disc_spec.as_str()),
            ("fee_non_degree", self.fee_non_degree.as_str()),
            ("fee_degree", self.fee_degree.as_str()),
            ("fee_partnerships", self.fee_partnerships.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// EXTRACT CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// SQLite course store
    pub database_path: PathBuf,
    /// Root directory for CSV workbooks
    pub output_dir: PathBuf,
    /// Pause after each module, in milliseconds
    pub write_delay_ms: u64,
    pub degree_level_id: String,
    pub log_level: LogLevel,
    pub tabs: TabNames,
    pub server: ServerSettings,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("courses.db"),
            output_dir: PathBuf::from("workbooks"),
            write_delay_ms: 2000,
            degree_level_id: DEFAULT_DEGREE_LEVEL_ID.to_string(),
            log_level: LogLevel::Info,
            tabs: TabNames::default(),
            server: ServerSettings::default(),
        }
    }
}

impl ExtractConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ExtractConfig = toml::from_str(content)
            .map_err(|e| ConfigError::FileError(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileError(format!("Failed to read config file: {}", e)))?;
        Self::from_toml_str(&content)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`)
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(ENV_DB) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(delay) = lookup(ENV_WRITE_DELAY_MS) {
            self.write_delay_ms = delay.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: ENV_WRITE_DELAY_MS.to_string(),
                value: delay.clone(),
            })?;
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: ENV_PORT.to_string(),
                value: port.clone(),
            })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = LogLevel::from_str(&level)?;
        }
        Ok(())
    }

    /// CLI takes precedence over everything else
    pub fn merge_with_cli(&mut self, cli: &CliOverrides) -> Result<(), ConfigError> {
        if let Some(db) = &cli.database {
            self.database_path = db.clone();
        }
        if let Some(dir) = &cli.output_dir {
            self.output_dir = dir.clone();
        }
        if let Some(delay) = cli.write_delay_ms {
            self.write_delay_ms = delay;
        }
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(level) = &cli.log_level {
            self.log_level = LogLevel::from_str(level)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort(self.server.port));
        }

        for (field, name) in self.tabs.entries() {
            if name.trim().is_empty() || name == STATUS_TAB {
                return Err(ConfigError::InvalidTabName(field.to_string()));
            }
        }

        Ok(())
    }
}

/// Overrides collected from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_file: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub write_delay_ms: Option<u64>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Build configuration from all sources
pub fn build_config(cli: &CliOverrides) -> Result<ExtractConfig, ConfigError> {
    build_config_with(cli, |key| std::env::var(key).ok())
}

pub fn build_config_with<F>(cli: &CliOverrides, env: F) -> Result<ExtractConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &cli.config_file {
        Some(path) => ExtractConfig::from_file(path)?,
        None => ExtractConfig::default(),
    };

    config.apply_env(env)?;
    config.merge_with_cli(cli)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ExtractConfig::default();
        assert_eq!(config.write_delay_ms, 2000);
        assert_eq!(config.degree_level_id, DEFAULT_DEGREE_LEVEL_ID);
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.tabs.fee_degree, "Fee-Extraction-Degree-CWB");
        assert_eq!(config.server.socket_addr(), "0.0.0.0:3000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("TRACE").unwrap(), LogLevel::Trace);
        assert_eq!(LogLevel::from_str(" warn ").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ExtractConfig::from_toml_str(
            r#"
            write_delay_ms = 0
            log_level = "debug"

            [tabs]
            fee_degree = "Degree Fees"

            [server]
            port = 8081
            "#,
        )
        .unwrap();

        assert_eq!(config.write_delay_ms, 0);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.tabs.fee_degree, "Degree Fees");
        assert_eq!(config.tabs.details, "Details-Extraction-CWB");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_invalid_toml_values() {
        assert!(matches!(
            ExtractConfig::from_toml_str("log_level = \"loud\""),
            Err(ConfigError::FileError(_))
        ));
        assert!(matches!(
            ExtractConfig::from_toml_str("[server]\nport = 0"),
            Err(ConfigError::InvalidPort(0))
        ));
        assert!(matches!(
            ExtractConfig::from_toml_str("[tabs]\ndetails = \"Status\""),
            Err(ConfigError::InvalidTabName(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ExtractConfig::default();
        config
            .apply_env(env_of(&[
                (ENV_DB, "/data/courses.db"),
                (ENV_WRITE_DELAY_MS, "250"),
                (ENV_PORT, "9000"),
                (ENV_LOG_LEVEL, "warn"),
            ]))
            .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/courses.db"));
        assert_eq!(config.write_delay_ms, 250);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.log_level, LogLevel::Warn);

        let err = ExtractConfig::default()
            .apply_env(env_of(&[(ENV_WRITE_DELAY_MS, "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_WRITE_DELAY_MS));
    }

    #[test]
    fn test_cli_wins_over_env() {
        let cli = CliOverrides {
            output_dir: Some(PathBuf::from("out")),
            port: Some(7000),
            ..Default::default()
        };

        let config = build_config_with(
            &cli,
            env_of(&[(ENV_OUTPUT_DIR, "env-out"), (ENV_PORT, "9000"), (ENV_HOST, "127.0.0.1")]),
        )
        .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_cli_port_zero_rejected() {
        let cli = CliOverrides {
            port: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            build_config_with(&cli, |_| None),
            Err(ConfigError::InvalidPort(0))
        ));
    }
}
