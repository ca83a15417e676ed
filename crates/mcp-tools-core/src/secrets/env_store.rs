//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Mapping from tool source ids to the environment variables holding their keys
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("context7", vec!["CONTEXT7_API_KEY"]);
    m
});

/// Secret store that reads from environment variables
///
/// Read-only. Empty values are treated as unset.
///
/// Lookup order for a key:
/// 1. the key itself as a variable name (`CONTEXT7_API_KEY`)
/// 2. the variables mapped to a known source id (`context7`)
/// 3. `<KEY>_API_KEY`
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Get the environment variable names for a source id
    pub fn get_env_vars_for_source(source_id: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(source_id.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn read(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::read(key) {
            return Some(value);
        }

        if let Some(env_vars) = Self::get_env_vars_for_source(key) {
            if let Some(value) = env_vars.iter().find_map(|name| Self::read(name)) {
                return Some(value);
            }
        }

        Self::read(&format!("{}_API_KEY", key.to_uppercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; tests run in parallel threads.

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("MCP_TOOLS_TEST_DIRECT_SECRET", "direct");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("MCP_TOOLS_TEST_DIRECT_SECRET"), Some("direct".to_string()));

        env::remove_var("MCP_TOOLS_TEST_DIRECT_SECRET");
    }

    #[test]
    fn test_env_store_suffix_convention() {
        env::set_var("MCPTOOLSSUFFIX_API_KEY", "suffixed");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("mcptoolssuffix"), Some("suffixed".to_string()));

        env::remove_var("MCPTOOLSSUFFIX_API_KEY");
    }

    #[test]
    fn test_env_store_empty_is_unset() {
        env::set_var("MCP_TOOLS_TEST_EMPTY_SECRET", "");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("MCP_TOOLS_TEST_EMPTY_SECRET"), None);
        assert!(!store.has("MCP_TOOLS_TEST_EMPTY_SECRET"));

        env::remove_var("MCP_TOOLS_TEST_EMPTY_SECRET");
    }

    #[test]
    fn test_env_vars_for_source() {
        assert_eq!(
            EnvSecretStore::get_env_vars_for_source("Context7"),
            Some(&["CONTEXT7_API_KEY"][..])
        );
        assert!(EnvSecretStore::get_env_vars_for_source("unknown_source_xyz").is_none());
    }

    #[test]
    fn test_env_store_holder() {
        env::set_var("MCP_TOOLS_TEST_INFO_SECRET", "value");

        let store = EnvSecretStore::new();
        assert_eq!(store.holder("MCP_TOOLS_TEST_INFO_SECRET"), Some("env"));
        assert_eq!(store.holder("MCP_TOOLS_NONEXISTENT_XYZ"), None);

        env::remove_var("MCP_TOOLS_TEST_INFO_SECRET");
    }
}
