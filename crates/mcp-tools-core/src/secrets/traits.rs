//! Core trait for secret lookup

/// Read-only credential lookup
///
/// Lookups must be cheap and local: `ToolSource::is_available` calls `get`
/// and is not allowed to block on I/O.
///
/// # Example
///
/// ```
/// use mcp_tools_core::secrets::{SecretStore, EnvSecretStore};
///
/// let store = EnvSecretStore::new();
/// // store.get("context7") will check CONTEXT7_API_KEY
/// ```
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Check if this store can currently be read
    fn is_available(&self) -> bool {
        true
    }

    /// Retrieve a secret by key
    ///
    /// The key can be a source id (e.g. "context7") or a direct name
    /// (e.g. "CONTEXT7_API_KEY").
    fn get(&self, key: &str) -> Option<String>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Name of the store that actually holds `key`
    ///
    /// Composite stores report the member, not themselves.
    fn holder(&self, key: &str) -> Option<&str> {
        if self.has(key) {
            Some(self.name())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_default_holder_is_self() {
        let store = MemorySecretStore::with_secret("present", "value");
        assert_eq!(store.holder("present"), Some("memory"));
        assert_eq!(store.holder("absent"), None);
    }
}
