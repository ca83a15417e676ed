//! Context7 documentation lookup source
//!
//! Context7 serves up-to-date library documentation over MCP. It needs an API
//! key, taken from the source settings or from `CONTEXT7_API_KEY`.
//!
//! ## Example
//! ```yaml
//! sources:
//!   context7:
//!     api_key: "ctx7sk-..."          # optional, falls back to CONTEXT7_API_KEY
//!     url: "https://mcp.context7.com/mcp"
//!     # or run the server locally:
//!     # command: "npx"
//!     # args: ["-y", "@upstash/context7-mcp"]
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SourceSettings;
use crate::logging::SharedLogger;
use crate::mcp::McpClient;
use crate::secrets::{EnvSecretStore, SecretStore};
use crate::tools::{ToolEntry, ToolInvoker};

use super::traits::{
    close_on_error, Activation, ResolvedSourceConfig, SourceConnection, SourceEndpoint,
    SourceError, SourceResult, ToolSource,
};

pub const SOURCE_ID: &str = "context7";

/// Environment variable (and secret name) holding the API key
pub const API_KEY_ENV: &str = "CONTEXT7_API_KEY";

/// Hosted endpoint
pub const DEFAULT_URL: &str = "https://mcp.context7.com/mcp";

/// Documentation lookup via Context7
pub struct Context7Source {
    secrets: Arc<dyn SecretStore>,
    logger: SharedLogger,
}

impl Context7Source {
    /// Falls back to the process environment for the API key
    pub fn new(logger: SharedLogger) -> Self {
        Self::with_secret_store(Arc::new(EnvSecretStore::new()), logger)
    }

    pub fn with_secret_store(secrets: Arc<dyn SecretStore>, logger: SharedLogger) -> Self {
        Self { secrets, logger }
    }

    fn explicit_key(settings: Option<&SourceSettings>) -> Option<&str> {
        settings
            .and_then(|s| s.api_key.as_deref())
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Key from the secret store, with the name of the store that had it
    fn stored_key(&self, name: &str) -> Option<(String, String)> {
        if !self.secrets.is_available() {
            return None;
        }
        let key = self
            .secrets
            .get(name)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())?;
        let origin = self.secrets.holder(name).unwrap_or(self.secrets.name());
        Some((key, origin.to_string()))
    }

    fn endpoint(settings: Option<&SourceSettings>) -> SourceResult<SourceEndpoint> {
        let Some(settings) = settings else {
            return Ok(SourceEndpoint::Http { url: DEFAULT_URL.to_string() });
        };

        if let Some(command) = &settings.command {
            if command.trim().is_empty() {
                return Err(SourceError::invalid_config(SOURCE_ID, "`command` is empty"));
            }
            return Ok(SourceEndpoint::Stdio {
                command: command.clone(),
                args: settings.args.clone(),
                env: settings.env.clone(),
            });
        }

        let url = settings
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_URL);
        Ok(SourceEndpoint::Http { url: url.to_string() })
    }
}

#[async_trait]
impl ToolSource for Context7Source {
    fn id(&self) -> &str {
        SOURCE_ID
    }

    fn description(&self) -> &str {
        "Up-to-date library documentation lookup (Context7)"
    }

    fn resolve_config(&self, settings: Option<&SourceSettings>) -> SourceResult<ResolvedSourceConfig> {
        let env_var = settings
            .and_then(|s| s.api_key_env.as_deref())
            .unwrap_or(API_KEY_ENV);

        let (api_key, key_origin) = match Self::explicit_key(settings) {
            Some(key) => (key.to_string(), "settings".to_string()),
            None => match self.stored_key(env_var) {
                Some(found) => found,
                None => return Err(SourceError::missing_config(SOURCE_ID, "api_key", env_var)),
            },
        };

        Ok(ResolvedSourceConfig {
            source_id: SOURCE_ID.to_string(),
            api_key,
            key_origin,
            endpoint: Self::endpoint(settings)?,
        })
    }

    async fn activate(&self, settings: Option<&SourceSettings>) -> SourceResult<Activation> {
        let resolved = self.resolve_config(settings)?;
        self.logger.debug(&format!(
            "[Context7] Using API key from {}",
            resolved.key_origin
        ));

        let client = match &resolved.endpoint {
            SourceEndpoint::Http { url } => {
                McpClient::connect_http(url, Some(&resolved.api_key), self.logger.clone()).await
            }
            SourceEndpoint::Stdio { command, args, env } => {
                // The resolved key is set last so `env` cannot shadow it
                let envs: Vec<(String, String)> = env
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .chain(std::iter::once((API_KEY_ENV.to_string(), resolved.api_key.clone())))
                    .collect();
                McpClient::connect_stdio(command, args, &envs, self.logger.clone()).await
            }
        }
        .map_err(|e| SourceError::activation(SOURCE_ID, e))?;
        let client = Arc::new(client);

        let listed = client.list_tools().await;
        let listed = close_on_error(SOURCE_ID, &*client, listed, &self.logger).await?;

        let invoker: Arc<dyn ToolInvoker> = client.clone();
        let tools = listed
            .into_iter()
            .map(|tool| ToolEntry::from_mcp(tool, SOURCE_ID, invoker.clone()))
            .collect();
        let connection: Arc<dyn SourceConnection> = client;

        Ok(Activation { tools, connection })
    }
}
