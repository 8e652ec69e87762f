use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::db::services::Retention;

const ENV_PREFIX: &str = "RANKING_";

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    #[default]
    All,
    Newest,
    Best,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub max_connections: u32,
    pub log_dir: String,

    /// School variant when true; the school-less variant stores "".
    pub require_school: bool,
    /// When false and the client omits it, deviation is derived from `target_time`.
    pub require_deviation: bool,
    pub target_time: f64,

    pub top_limit: u64,
    pub reset_keyword: String,

    pub retention: RetentionPolicy,
    pub max_records: Option<u64>,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub struct PartialServerConfig {
    bind_addr: Option<String>,
    database_url: Option<String>,
    max_connections: Option<u32>,
    log_dir: Option<String>,
    require_school: Option<bool>,
    require_deviation: Option<bool>,
    target_time: Option<f64>,
    top_limit: Option<u64>,
    reset_keyword: Option<String>,
    retention: Option<RetentionPolicy>,
    max_records: Option<u64>,
}

fn default_bind_addr() -> String {
    "0.0.0.0:10000".to_string()
}

fn default_database_url() -> String {
    "sqlite://ranking.db?mode=rwc".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_reset_keyword() -> String {
    "초기화".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: default_bind_addr(),
            database_url: default_database_url(),
            max_connections: 5,
            log_dir: default_log_dir(),
            require_school: true,
            require_deviation: true,
            target_time: 10.0,
            top_limit: 20,
            reset_keyword: default_reset_keyword(),
            retention: RetentionPolicy::All,
            max_records: None,
        }
    }
}

impl ServerConfig {
    /// Loads defaults, then the optional TOML file, then `RANKING_*`
    /// environment variables. Later layers win.
    pub fn load(config_path: Option<&str>) -> Result<Self, String> {
        dotenv::dotenv().ok();

        let file_config: PartialServerConfig = match config_path {
            Some(path_str) => {
                let path = Path::new(path_str);
                if path.exists() {
                    let contents = fs::read_to_string(path)
                        .map_err(|e| format!("Failed to read config file at {path:?}: {e}"))?;
                    toml::from_str(&contents).map_err(|e| {
                        format!("Failed to parse TOML from config file at {path:?}: {e}")
                    })?
                } else {
                    return Err(format!("Config file not found at {path:?}"));
                }
            }
            None => PartialServerConfig::default(),
        };

        let env_config: PartialServerConfig = envy::prefixed(ENV_PREFIX)
            .from_env::<PartialServerConfig>()
            .map_err(|e| format!("Failed to load config from environment: {e}"))?;

        Self::from_layers(file_config, env_config)
    }

    pub fn from_layers(
        file_config: PartialServerConfig,
        env_config: PartialServerConfig,
    ) -> Result<Self, String> {
        let defaults = ServerConfig::default();

        let config = ServerConfig {
            bind_addr: env_config.bind_addr.or(file_config.bind_addr)
                .unwrap_or(defaults.bind_addr),
            database_url: env_config.database_url.or(file_config.database_url)
                .unwrap_or(defaults.database_url),
            max_connections: env_config.max_connections.or(file_config.max_connections)
                .unwrap_or(defaults.max_connections),
            log_dir: env_config.log_dir.or(file_config.log_dir)
                .unwrap_or(defaults.log_dir),
            require_school: env_config.require_school.or(file_config.require_school)
                .unwrap_or(defaults.require_school),
            require_deviation: env_config.require_deviation.or(file_config.require_deviation)
                .unwrap_or(defaults.require_deviation),
            target_time: env_config.target_time.or(file_config.target_time)
                .unwrap_or(defaults.target_time),
            top_limit: env_config.top_limit.or(file_config.top_limit)
                .unwrap_or(defaults.top_limit),
            reset_keyword: env_config.reset_keyword.or(file_config.reset_keyword)
                .unwrap_or(defaults.reset_keyword),
            retention: env_config.retention.or(file_config.retention)
                .unwrap_or(defaults.retention),
            max_records: env_config.max_records.or(file_config.max_records),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), String> {
        if self.max_connections == 0 {
            return Err("max_connections must be at least 1".to_string());
        }
        if self.top_limit == 0 {
            return Err("top_limit must be at least 1".to_string());
        }
        if self.reset_keyword.trim().is_empty() {
            return Err("reset_keyword must not be empty".to_string());
        }
        if !self.target_time.is_finite() {
            return Err("target_time must be a finite number".to_string());
        }
        if self.retention != RetentionPolicy::All {
            match self.max_records {
                None => return Err(format!("retention {:?} requires max_records", self.retention)),
                Some(0) => return Err("max_records must be at least 1".to_string()),
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn retention(&self) -> Retention {
        match (self.retention, self.max_records) {
            (RetentionPolicy::Newest, Some(max)) => Retention::KeepNewest(max),
            (RetentionPolicy::Best, Some(max)) => Retention::KeepBest(max),
            _ => Retention::KeepAll,
        }
    }
}
