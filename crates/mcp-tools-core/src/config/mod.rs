//! Which tool sources to use and how to reach them
//!
//! - `ToolsConfig` / `SourceSetting`: the per-source configuration bundle
//! - `FileConfigProvider`: YAML file-based (user/workspace level)

mod setting;
mod traits;
mod file;

pub use setting::{SourceSetting, SourceSettings, ToolsConfig};
pub use traits::{ConfigProvider, ConfigError, ConfigResult};
pub use file::{FileConfigProvider, ConfigLevel};
