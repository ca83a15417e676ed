//! In-memory secret store

use std::collections::HashMap;

use super::traits::SecretStore;

/// Secrets handed over by the host, e.g. from command-line flags
///
/// Fixed at construction. Empty values count as missing.
///
/// # Example
///
/// ```
/// use mcp_tools_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::with_secret("CONTEXT7_API_KEY", "ctx7-test");
/// assert_eq!(store.get("CONTEXT7_API_KEY"), Some("ctx7-test".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySecretStore {
    secrets: HashMap<String, String>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secrets(secrets: HashMap<String, String>) -> Self {
        Self { secrets }
    }

    pub fn with_secret(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut secrets = HashMap::new();
        secrets.insert(key.into(), value.into());
        Self::with_secrets(secrets)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lookup() {
        let mut initial = HashMap::new();
        initial.insert("CONTEXT7_API_KEY".to_string(), "k".to_string());
        initial.insert("OTHER".to_string(), "o".to_string());

        let store = MemorySecretStore::with_secrets(initial);
        assert_eq!(store.name(), "memory");
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("CONTEXT7_API_KEY"), Some("k".to_string()));
        assert!(!store.has("missing"));
        assert!(MemorySecretStore::new().is_empty());
    }

    #[test]
    fn test_memory_store_empty_value_is_missing() {
        let store = MemorySecretStore::with_secret("CONTEXT7_API_KEY", "");
        assert_eq!(store.get("CONTEXT7_API_KEY"), None);
        assert_eq!(store.holder("CONTEXT7_API_KEY"), None);
    }
}
