use crate::storage::RemoteHandle;
use log::LevelFilter;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("缺少配置项: {0}")]
    Missing(&'static str),

    #[error("配置项 {key} 无效: {value}")]
    Invalid { key: &'static str, value: String },
}

/// 控制台运行配置，来自环境变量（可由 .env 提供）
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub log_dir: PathBuf,
    pub log_level: LevelFilter,
    pub resources_dir: PathBuf,
    /// 没有配置时使用进程内的存储模拟器
    pub database_url: Option<String>,
    pub account: RemoteHandle,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => raw.parse::<LevelFilter>().map_err(|_| ConfigError::Invalid {
                key: "LOG_LEVEL",
                value: raw.to_string(),
            })?,
            None => LevelFilter::Debug,
        };

        let account = match get("STORAGE_CONNECTION_STRING") {
            Some(conn) => {
                RemoteHandle::from_connection_string(conn).ok_or_else(|| ConfigError::Invalid {
                    key: "STORAGE_CONNECTION_STRING",
                    value: "缺少 AccountName".to_string(),
                })?
            }
            None => {
                let name = get("STORAGE_ACCOUNT").ok_or(ConfigError::Missing("STORAGE_ACCOUNT"))?;
                let key = get("STORAGE_ACCOUNT_KEY")
                    .ok_or(ConfigError::Missing("STORAGE_ACCOUNT_KEY"))?;
                RemoteHandle::with_key(name, key)
            }
        };

        Ok(Self {
            bind_addr: get("BIND_ADDR").unwrap_or("0.0.0.0:8080").to_string(),
            log_dir: PathBuf::from(get("LOG_DIR").unwrap_or("logs")),
            log_level,
            resources_dir: PathBuf::from(get("RESOURCES_DIR").unwrap_or("resources")),
            database_url: get("DATABASE_URL").map(|s| s.to_string()),
            account,
        })
    }
}
