//! File-based configuration provider (YAML)
//!
//! Supports user-level (~/.config/mcp-tools/config.yaml) and workspace-level
//! (.config/mcp-tools/config.yaml) config, or any explicit path.
//!
//! ```yaml
//! activation_timeout_secs: 20
//! sources:
//!   context7:
//!     api_key: "ctx7-..."
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::setting::{SourceSetting, ToolsConfig};
use super::traits::{ConfigProvider, ConfigError, ConfigResult};

/// Where a config file came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLevel {
    /// User-level config (~/.config/mcp-tools/config.yaml)
    User,
    /// Workspace-level config (.config/mcp-tools/config.yaml in workspace root)
    Workspace,
    /// A path given on the command line or by the host
    Explicit,
}

impl ConfigLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigLevel::User => "user",
            ConfigLevel::Workspace => "workspace",
            ConfigLevel::Explicit => "explicit",
        }
    }
}

/// File-based configuration provider
///
/// A missing file reads as an empty configuration (every source on auto).
///
/// # Example
///
/// ```no_run
/// use mcp_tools_core::config::FileConfigProvider;
///
/// let user_config = FileConfigProvider::user();
/// let workspace_config = FileConfigProvider::workspace("/path/to/workspace");
/// ```
pub struct FileConfigProvider {
    path: PathBuf,
    level: ConfigLevel,
    cache: RwLock<Option<ToolsConfig>>,
}

impl FileConfigProvider {
    pub fn new(path: impl Into<PathBuf>, level: ConfigLevel) -> Self {
        Self {
            path: path.into(),
            level,
            cache: RwLock::new(None),
        }
    }

    /// User-level config provider (~/.config/mcp-tools/config.yaml)
    pub fn user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".config"));
        Self::new(config_dir.join("mcp-tools").join("config.yaml"), ConfigLevel::User)
    }

    /// Workspace-level config provider (.config/mcp-tools/config.yaml)
    pub fn workspace(workspace_root: impl AsRef<Path>) -> Self {
        let path = workspace_root.as_ref().join(".config").join("mcp-tools").join("config.yaml");
        Self::new(path, ConfigLevel::Workspace)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> ConfigLevel {
        self.level
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn load(&self) -> ConfigResult<ToolsConfig> {
        if !self.path.exists() {
            return Ok(ToolsConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ToolsConfig::default());
        }
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Write `config` to disk and refresh the cache
    pub fn save(&self, config: &ToolsConfig) -> ConfigResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_yaml::to_string(config)?)?;
        *self.cache.write() = Some(config.clone());
        Ok(())
    }

    fn cached(&self) -> ConfigResult<ToolsConfig> {
        if let Some(config) = self.cache.read().as_ref() {
            return Ok(config.clone());
        }
        self.reload()
    }

    /// Reload config from disk (invalidate cache)
    pub fn reload(&self) -> ConfigResult<ToolsConfig> {
        let config = self.load()?;
        *self.cache.write() = Some(config.clone());
        Ok(config)
    }
}

impl std::fmt::Debug for FileConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileConfigProvider")
            .field("path", &self.path)
            .field("level", &self.level)
            .field("exists", &self.exists())
            .finish()
    }
}

#[async_trait]
impl ConfigProvider for FileConfigProvider {
    async fn get_config(&self) -> ConfigResult<ToolsConfig> {
        self.cached()
    }

    async fn set_source(&self, source_id: &str, setting: SourceSetting) -> ConfigResult<()> {
        let mut config = self.cached()?;
        config.sources.insert(source_id.to_string(), setting);
        self.save(&config)
    }

    async fn remove_source(&self, source_id: &str) -> ConfigResult<()> {
        let mut config = self.cached()?;
        if config.sources.remove(source_id).is_none() {
            return Err(ConfigError::SourceNotFound(source_id.to_string()));
        }
        self.save(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSettings;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_is_empty_config() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::Explicit);

        assert!(!provider.exists());
        assert_eq!(provider.get_config().await.unwrap(), ToolsConfig::default());
    }

    #[tokio::test]
    async fn test_set_source_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let provider = FileConfigProvider::new(&path, ConfigLevel::User);

        provider
            .set_source("context7", SourceSetting::Enabled(SourceSettings::with_api_key("k")))
            .await
            .unwrap();
        provider.set_source("other", SourceSetting::Disabled).await.unwrap();
        assert!(provider.exists());

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("context7"));
        assert!(content.contains("api_key"));

        let fresh = FileConfigProvider::new(&path, ConfigLevel::User);
        let config = fresh.get_config().await.unwrap();
        assert!(config.setting("other").is_disabled());
        assert_eq!(
            config.setting("context7"),
            SourceSetting::Enabled(SourceSettings::with_api_key("k"))
        );
    }

    #[tokio::test]
    async fn test_reload_sees_external_edits() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "sources:\n  context7: false\n").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::Workspace);
        assert!(provider.get_config().await.unwrap().setting("context7").is_disabled());

        fs::write(&path, "sources:\n  context7: true\n").unwrap();
        // still cached
        assert!(provider.get_config().await.unwrap().setting("context7").is_disabled());

        let reloaded = provider.reload().unwrap();
        assert_eq!(reloaded.setting("context7"), SourceSetting::enabled());
    }

    #[tokio::test]
    async fn test_remove_unknown_source() {
        let dir = tempdir().unwrap();
        let provider = FileConfigProvider::new(dir.path().join("config.yaml"), ConfigLevel::Explicit);

        assert!(matches!(
            provider.remove_source("nope").await,
            Err(ConfigError::SourceNotFound(_))
        ));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "sources: [unclosed").unwrap();

        let provider = FileConfigProvider::new(&path, ConfigLevel::Explicit);
        assert!(matches!(provider.reload(), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_workspace_path() {
        let provider = FileConfigProvider::workspace("/tmp/ws");
        assert_eq!(provider.path(), Path::new("/tmp/ws/.config/mcp-tools/config.yaml"));
        assert_eq!(provider.level().as_str(), "workspace");
    }
}
