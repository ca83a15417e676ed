//! Chained secret store with fallback behavior

use std::sync::Arc;

use super::traits::SecretStore;

/// Tries several stores in order and returns the first hit
///
/// # Example
///
/// ```
/// use mcp_tools_core::secrets::{SecretStore, ChainSecretStore, EnvSecretStore, MemorySecretStore};
/// use std::sync::Arc;
///
/// let overrides: Arc<dyn SecretStore> =
///     Arc::new(MemorySecretStore::with_secret("CONTEXT7_API_KEY", "from-host"));
/// let env: Arc<dyn SecretStore> = Arc::new(EnvSecretStore::new());
///
/// // Host-provided values win over the environment
/// let chain = ChainSecretStore::new(vec![overrides, env]);
/// assert_eq!(chain.holder("CONTEXT7_API_KEY"), Some("memory"));
/// ```
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    fn find_store(&self, key: &str) -> Option<&Arc<dyn SecretStore>> {
        self.stores
            .iter()
            .find(|store| store.is_available() && store.has(key))
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSecretStore").field("stores", &names).finish()
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn is_available(&self) -> bool {
        self.stores.iter().any(|s| s.is_available())
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores
            .iter()
            .filter(|store| store.is_available())
            .find_map(|store| store.get(key))
    }

    fn holder(&self, key: &str) -> Option<&str> {
        self.find_store(key).and_then(|store| store.holder(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_chain_fallback_order() {
        let first: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::with_secret("shared", "first"));
        let second: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::with_secret("only_second", "value"));

        let chain = ChainSecretStore::new(vec![first, second]);

        assert_eq!(chain.get("shared"), Some("first".to_string()));
        assert_eq!(chain.get("only_second"), Some("value".to_string()));
        assert_eq!(chain.get("missing"), None);
        assert_eq!(chain.holder("missing"), None);
    }

    #[test]
    fn test_chain_reports_member_as_holder() {
        struct Vault;
        impl SecretStore for Vault {
            fn name(&self) -> &str {
                "vault"
            }
            fn get(&self, key: &str) -> Option<String> {
                (key == "CONTEXT7_API_KEY").then(|| "v".to_string())
            }
        }

        let empty: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::new());
        let vault: Arc<dyn SecretStore> = Arc::new(Vault);
        let chain = ChainSecretStore::new(vec![empty, vault]);

        assert_eq!(chain.holder("CONTEXT7_API_KEY"), Some("vault"));
    }

    #[test]
    fn test_empty_chain() {
        let chain = ChainSecretStore::new(Vec::new());
        assert!(!chain.is_available());
        assert_eq!(chain.get("anything"), None);
    }
}
