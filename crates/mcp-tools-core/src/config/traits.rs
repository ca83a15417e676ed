//! Configuration provider trait

use async_trait::async_trait;

use super::setting::{SourceSetting, ToolsConfig};

/// Configuration provider abstraction
///
/// `FileConfigProvider` (YAML at user, workspace or explicit level) is the
/// built-in implementation; embedding hosts can supply their own.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    /// Current configuration bundle
    async fn get_config(&self) -> ConfigResult<ToolsConfig>;

    /// Set (or replace) one source's setting
    async fn set_source(&self, source_id: &str, setting: SourceSetting) -> ConfigResult<()>;

    /// Drop a source's entry so it goes back to auto-detection
    async fn remove_source(&self, source_id: &str) -> ConfigResult<()>;
}

/// Errors that can occur during configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Source not configured: {0}")]
    SourceNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Other(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
