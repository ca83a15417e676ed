//! Tools manager

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::config::{SourceSetting, SourceSettings, ToolsConfig};
use crate::logging::SharedLogger;
use crate::secrets::{EnvSecretStore, SecretStore};
use crate::sources::{Activation, Context7Source, SourceConnection, SourceError, SourceResult, ToolSource};
use crate::tools::ToolSet;
use crate::{log_debug, log_info, log_warn};

use super::close::CloseHandle;
use super::error::ToolsResult;

/// Bound on a single source's activation unless the config says otherwise
pub const DEFAULT_ACTIVATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Where a source ended up after one `activate_all` pass
///
/// Every source goes `Decided -> Attempting -> <one of these>`; skipped sources
/// never reach `Attempting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Activated,
    SkippedDisabled,
    SkippedUnavailable,
    Failed,
}

/// Per-source diagnostics from one `activate_all` pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source_id: String,
    pub state: SourceState,
    /// Tools this source contributed to the merged set
    pub tool_count: usize,
    /// Error message when `state` is `Failed`
    pub error: Option<String>,
}

impl SourceOutcome {
    fn skipped(source_id: &str, state: SourceState) -> Self {
        Self {
            source_id: source_id.to_string(),
            state,
            tool_count: 0,
            error: None,
        }
    }
}

/// Result of `ToolsManager::activate_all`
#[derive(Debug)]
pub struct ActivatedTools {
    /// Merged tools of every activated source
    pub tools: ToolSet,
    /// Ids of sources that actually activated, in priority order
    pub enabled_sources: Vec<String>,
    /// What happened to each registered source, in priority order
    pub outcomes: Vec<SourceOutcome>,
    /// Closes everything opened by this call
    pub close_handle: CloseHandle,
}

impl ActivatedTools {
    /// Shorthand for `self.close_handle.close()`
    pub async fn close(&self) -> ToolsResult<()> {
        self.close_handle.close().await
    }

    pub fn outcome(&self, source_id: &str) -> Option<&SourceOutcome> {
        self.outcomes.iter().find(|o| o.source_id == source_id)
    }
}

enum Decision {
    Skip(SourceState),
    Attempt(Option<SourceSettings>),
}

enum Attempt {
    Skipped(SourceState),
    Finished(SourceResult<Activation>),
}

/// Decides which sources to activate, activates them, and merges their tools
///
/// Sources are kept in registration order, which is their priority order:
/// it fixes both the order of `enabled_sources` and which source wins a tool
/// name collision (the earlier one).
///
/// The manager holds no connections itself. Each `activate_all` call returns
/// an independent `ActivatedTools` that owns everything it opened.
pub struct ToolsManager {
    sources: Vec<Arc<dyn ToolSource>>,
    activation_timeout: Duration,
    logger: SharedLogger,
}

impl ToolsManager {
    /// Manager with no sources registered
    pub fn new(logger: SharedLogger) -> Self {
        Self {
            sources: Vec::new(),
            activation_timeout: DEFAULT_ACTIVATION_TIMEOUT,
            logger,
        }
    }

    /// Manager with the built-in sources, reading credentials from the environment
    pub fn with_defaults(logger: SharedLogger) -> Self {
        Self::with_secret_store(Arc::new(EnvSecretStore::new()), logger)
    }

    /// Manager with the built-in sources, reading credentials from `secrets`
    pub fn with_secret_store(secrets: Arc<dyn SecretStore>, logger: SharedLogger) -> Self {
        let context7 = Arc::new(Context7Source::with_secret_store(secrets, logger.clone()));
        Self::new(logger).with_source(context7)
    }

    /// Builder form of `register`
    pub fn with_source(mut self, source: Arc<dyn ToolSource>) -> Self {
        self.register(source);
        self
    }

    /// Add a source at the lowest priority
    ///
    /// Returns false (and keeps the existing one) if the id is already registered.
    pub fn register(&mut self, source: Arc<dyn ToolSource>) -> bool {
        if self.sources.iter().any(|s| s.id() == source.id()) {
            log_warn!(
                self.logger,
                "[ToolsManager] Source '{}' is already registered, ignoring duplicate",
                source.id()
            );
            return false;
        }
        self.sources.push(source);
        true
    }

    pub fn with_activation_timeout(mut self, timeout: Duration) -> Self {
        self.activation_timeout = timeout;
        self
    }

    pub fn activation_timeout(&self) -> Duration {
        self.activation_timeout
    }

    /// Registered source ids, in priority order
    pub fn sources(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    pub fn source(&self, id: &str) -> Option<&Arc<dyn ToolSource>> {
        self.sources.iter().find(|s| s.id() == id)
    }

    /// Ids of sources usable from the environment alone
    pub fn list_available(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|s| s.is_available(None))
            .map(|s| s.id().to_string())
            .collect()
    }

    fn decide(&self, source: &dyn ToolSource, config: Option<&ToolsConfig>) -> Decision {
        let setting = config
            .map(|c| c.setting(source.id()))
            .unwrap_or_default();

        match setting {
            SourceSetting::Disabled => Decision::Skip(SourceState::SkippedDisabled),
            SourceSetting::Enabled(settings) => Decision::Attempt(Some(settings)),
            SourceSetting::Auto if source.is_available(None) => Decision::Attempt(None),
            SourceSetting::Auto => Decision::Skip(SourceState::SkippedUnavailable),
        }
    }

    fn warn_unknown_sources(&self, config: &ToolsConfig) {
        for id in config.sources.keys() {
            if self.source(id).is_none() {
                log_warn!(
                    self.logger,
                    "[ToolsManager] Config mentions unknown source '{}' (known: {})",
                    id,
                    self.sources().join(", ")
                );
            }
        }
    }

    async fn attempt(
        &self,
        source: &dyn ToolSource,
        settings: Option<&SourceSettings>,
        timeout: Duration,
    ) -> SourceResult<Activation> {
        log_debug!(self.logger, "[ToolsManager] Activating {}", source.id());

        match tokio::time::timeout(timeout, source.activate(settings)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::TimedOut {
                source_id: source.id().to_string(),
                timeout,
            }),
        }
    }

    /// Activate every source the configuration allows
    ///
    /// Per source: `Disabled` is skipped without probing; `Enabled` is
    /// attempted with its settings; anything else is attempted only if
    /// `is_available(None)` says so. Attempts run concurrently, each bounded by
    /// the activation timeout, and results are merged in priority order.
    ///
    /// Never fails: a source that cannot be activated is logged as a warning
    /// and left out of `enabled_sources`.
    pub async fn activate_all(&self, config: Option<&ToolsConfig>) -> ActivatedTools {
        let timeout = config
            .and_then(|c| c.activation_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(self.activation_timeout);

        if let Some(config) = config {
            self.warn_unknown_sources(config);
        }

        let plans: Vec<(&Arc<dyn ToolSource>, Decision)> = self
            .sources
            .iter()
            .map(|source| (source, self.decide(source.as_ref(), config)))
            .collect();

        let attempts = plans.iter().map(|(source, decision)| async move {
            match decision {
                Decision::Skip(state) => Attempt::Skipped(*state),
                Decision::Attempt(settings) => {
                    Attempt::Finished(self.attempt(source.as_ref(), settings.as_ref(), timeout).await)
                }
            }
        });
        let results = join_all(attempts).await;

        let mut tools = ToolSet::new();
        let mut enabled_sources = Vec::new();
        let mut outcomes = Vec::with_capacity(results.len());
        let mut connections: Vec<(String, Arc<dyn SourceConnection>)> = Vec::new();

        for ((source, _), result) in plans.iter().zip(results) {
            let id = source.id();
            match result {
                Attempt::Skipped(state) => {
                    log_debug!(self.logger, "[ToolsManager] Skipping {} ({:?})", id, state);
                    outcomes.push(SourceOutcome::skipped(id, state));
                }
                Attempt::Finished(Ok(activation)) => {
                    let mut added = 0;
                    for entry in activation.tools {
                        if let Some(existing) = tools.get(entry.name()) {
                            log_warn!(
                                self.logger,
                                "[ToolsManager] Tool '{}' from {} collides with one from {}; keeping the {} version",
                                entry.name(),
                                id,
                                existing.source,
                                existing.source
                            );
                            continue;
                        }
                        tools.insert(entry);
                        added += 1;
                    }

                    log_info!(self.logger, "[ToolsManager] Activated {} with {} tools", id, added);
                    connections.push((id.to_string(), activation.connection));
                    enabled_sources.push(id.to_string());
                    outcomes.push(SourceOutcome {
                        source_id: id.to_string(),
                        state: SourceState::Activated,
                        tool_count: added,
                        error: None,
                    });
                }
                Attempt::Finished(Err(e)) => {
                    log_warn!(self.logger, "[ToolsManager] Could not activate {}: {}", id, e);
                    outcomes.push(SourceOutcome {
                        source_id: id.to_string(),
                        state: SourceState::Failed,
                        tool_count: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        ActivatedTools {
            tools,
            enabled_sources,
            outcomes,
            close_handle: CloseHandle::new(connections, self.logger.clone()),
        }
    }
}

impl std::fmt::Debug for ToolsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsManager")
            .field("sources", &self.sources())
            .field("activation_timeout", &self.activation_timeout)
            .finish()
    }
}
