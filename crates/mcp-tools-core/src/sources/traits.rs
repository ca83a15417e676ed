//! Tool source trait and the types it exchanges with the manager

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::SourceSettings;
use crate::logging::SharedLogger;
use crate::mcp::{McpError, McpResult};
use crate::tools::ToolEntry;

/// Errors raised while resolving or activating a source
///
/// The manager catches all of these per source; none escape `activate_all`.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No usable credential; names what is missing and how to supply it
    #[error("{source_id}: missing `{key}`; pass it in the source settings or set the {env_var} environment variable")]
    MissingConfig {
        source_id: String,
        key: String,
        env_var: String,
    },

    #[error("{source_id}: invalid configuration: {message}")]
    InvalidConfig { source_id: String, message: String },

    #[error("{source_id}: activation failed: {error}")]
    Activation {
        source_id: String,
        #[source]
        error: McpError,
    },

    #[error("{source_id}: activation timed out after {timeout:?}")]
    TimedOut { source_id: String, timeout: Duration },
}

impl SourceError {
    pub fn missing_config(
        source_id: impl Into<String>,
        key: impl Into<String>,
        env_var: impl Into<String>,
    ) -> Self {
        Self::MissingConfig {
            source_id: source_id.into(),
            key: key.into(),
            env_var: env_var.into(),
        }
    }

    pub fn invalid_config(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    pub fn activation(source_id: impl Into<String>, error: McpError) -> Self {
        Self::Activation {
            source_id: source_id.into(),
            error,
        }
    }

    /// Id of the source the error belongs to
    pub fn source_id(&self) -> &str {
        match self {
            Self::MissingConfig { source_id, .. }
            | Self::InvalidConfig { source_id, .. }
            | Self::Activation { source_id, .. }
            | Self::TimedOut { source_id, .. } => source_id,
        }
    }
}

pub type SourceResult<T> = Result<T, SourceError>;

/// How to reach a source's server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEndpoint {
    /// Streamable HTTP
    Http { url: String },
    /// Spawn a local process and talk over its stdio
    Stdio {
        command: String,
        args: Vec<String>,
        /// Added to the child's environment
        env: BTreeMap<String, String>,
    },
}

/// Configuration after merging explicit settings with the secret store
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSourceConfig {
    pub source_id: String,
    pub api_key: String,
    /// "settings", or the name of the secret store that had the key
    pub key_origin: String,
    pub endpoint: SourceEndpoint,
}

// Keep the key out of logs
impl std::fmt::Debug for ResolvedSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSourceConfig")
            .field("source_id", &self.source_id)
            .field("api_key", &"<redacted>")
            .field("key_origin", &self.key_origin)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// A live connection the manager must eventually close
#[async_trait]
pub trait SourceConnection: Send + Sync {
    /// Release the connection. Not assumed to be idempotent.
    async fn close(&self) -> McpResult<()>;
}

/// Pass `result` through, closing `connection` first if it is an error
///
/// For activation steps that run after connecting: the connection has not
/// been handed to the manager yet, so nobody else would close it.
pub(crate) async fn close_on_error<T>(
    source_id: &str,
    connection: &dyn SourceConnection,
    result: McpResult<T>,
    logger: &SharedLogger,
) -> SourceResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) => {
            if let Err(close_err) = connection.close().await {
                logger.warn(&format!(
                    "[{}] Failed to close after activation error: {}",
                    source_id, close_err
                ));
            }
            Err(SourceError::activation(source_id, e))
        }
    }
}

/// What a successful activation hands back
pub struct Activation {
    /// Tools exposed by the connection, in the order the server listed them
    pub tools: Vec<ToolEntry>,
    /// Ownership passes to the manager
    pub connection: Arc<dyn SourceConnection>,
}

impl std::fmt::Debug for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activation")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

/// Adapter for one external tool provider
///
/// `settings` is `None` when the caller gave no explicit configuration and the
/// source should rely on its defaults and the environment.
#[async_trait]
pub trait ToolSource: Send + Sync {
    /// Stable identifier, also the key in `ToolsConfig::sources`
    fn id(&self) -> &str;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// Merge `settings` with the source's fallbacks
    fn resolve_config(&self, settings: Option<&SourceSettings>) -> SourceResult<ResolvedSourceConfig>;

    /// Whether `resolve_config` would succeed
    ///
    /// Must stay local: no network, no process spawning, no side effects.
    fn is_available(&self, settings: Option<&SourceSettings>) -> bool {
        self.resolve_config(settings).is_ok()
    }

    /// Resolve, connect and list tools
    async fn activate(&self, settings: Option<&SourceSettings>) -> SourceResult<Activation>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::logging::MemoryLogger;

    struct CountingConnection {
        closes: AtomicUsize,
        fails: bool,
    }

    #[async_trait]
    impl SourceConnection for CountingConnection {
        async fn close(&self) -> McpResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                Err(McpError::Protocol("broken pipe".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn connection(fails: bool) -> CountingConnection {
        CountingConnection {
            closes: AtomicUsize::new(0),
            fails,
        }
    }

    #[tokio::test]
    async fn test_listing_failure_closes_connection() {
        let conn = connection(false);
        let logger: SharedLogger = Arc::new(MemoryLogger::new());

        let result: SourceResult<Vec<String>> = close_on_error(
            "docs",
            &conn,
            Err(McpError::Protocol("tools/list rejected".to_string())),
            &logger,
        )
        .await;

        match result {
            Err(SourceError::Activation { source_id, error }) => {
                assert_eq!(source_id, "docs");
                assert!(error.to_string().contains("tools/list rejected"));
            }
            other => panic!("expected Activation, got {:?}", other),
        }
        assert_eq!(conn.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_leaves_connection_open() {
        let conn = connection(false);
        let logger: SharedLogger = Arc::new(MemoryLogger::new());

        let tools = close_on_error("docs", &conn, Ok(vec!["lookup"]), &logger).await.unwrap();
        assert_eq!(tools, vec!["lookup"]);
        assert_eq!(conn.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_close_failure_is_logged_and_original_error_kept() {
        let conn = connection(true);
        let logger = Arc::new(MemoryLogger::new());
        let shared: SharedLogger = logger.clone();

        let err = close_on_error::<()>(
            "docs",
            &conn,
            Err(McpError::Protocol("tools/list rejected".to_string())),
            &shared,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("tools/list rejected"));
        let warnings = logger.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("broken pipe"));
    }

    #[test]
    fn test_missing_config_message_names_key_and_env() {
        let err = SourceError::missing_config("context7", "api_key", "CONTEXT7_API_KEY");
        let message = err.to_string();

        assert_eq!(err.source_id(), "context7");
        assert!(message.contains("api_key"));
        assert!(message.contains("CONTEXT7_API_KEY"));
    }

    #[test]
    fn test_activation_error_keeps_cause() {
        use std::error::Error as _;

        let err = SourceError::activation("docs", McpError::ConnectionFailed("refused".to_string()));
        assert!(err.to_string().contains("refused"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_resolved_config_debug_redacts_key() {
        let resolved = ResolvedSourceConfig {
            source_id: "context7".to_string(),
            api_key: "super-secret".to_string(),
            key_origin: "settings".to_string(),
            endpoint: SourceEndpoint::Http { url: "https://example.test".to_string() },
        };

        let debug = format!("{:?}", resolved);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}
