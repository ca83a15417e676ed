//! `mcp-tools` - inspect and call the tools of every configured MCP source

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use mcp_tools_core::{
    ActivatedTools, ChainSecretStore, ConfigError, ConfigLevel, ConfigProvider, ConsoleLogger,
    EnvSecretStore, FileConfigProvider, LogLevel, MemorySecretStore, SecretStore, SharedLogger,
    SourceSetting, ToolCall, ToolsConfig, ToolsManager,
};

#[derive(Parser, Debug)]
#[command(name = "mcp-tools", version, about = "Activate MCP tool sources and use their tools")]
struct Cli {
    /// Config file; without it the workspace config is layered over the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Per-source activation timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Secret override, e.g. CONTEXT7_API_KEY=ctx7sk-...; wins over the environment
    #[arg(long = "secret", value_name = "NAME=VALUE", global = true, value_parser = parse_secret)]
    secrets: Vec<(String, String)>,

    /// Minimum log level (debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", value_parser = parse_level)]
    log_level: LogLevel,

    /// Shorthand for --log-level debug
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered sources and whether the environment can activate them
    Sources,
    /// Activate sources and list the merged tools
    Tools {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Activate sources and call one tool
    Call {
        /// Tool name
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, default_value = "{}")]
        args: String,
    },
    /// Always activate a source, even without detected credentials
    Enable { source: String },
    /// Never activate a source
    Disable { source: String },
    /// Drop a source's entry so it is auto-detected again
    Reset { source: String },
}

fn parse_secret(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}

fn parse_level(raw: &str) -> Result<LogLevel, String> {
    LogLevel::parse(raw).ok_or_else(|| format!("unknown log level '{}'", raw))
}

/// Flag overrides first, then the process environment
fn secret_store(overrides: &[(String, String)]) -> Arc<dyn SecretStore> {
    let env: Arc<dyn SecretStore> = Arc::new(EnvSecretStore::new());
    if overrides.is_empty() {
        return env;
    }
    let flags: HashMap<String, String> = overrides.iter().cloned().collect();
    let flags: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::with_secrets(flags));
    Arc::new(ChainSecretStore::new(vec![flags, env]))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LogLevel::Debug } else { cli.log_level };
    let logger: SharedLogger = Arc::new(ConsoleLogger::new().with_min_level(level));

    let manager = ToolsManager::with_secret_store(secret_store(&cli.secrets), logger);

    match cli.command {
        Command::Sources => {
            let available = manager.list_available();
            for id in manager.sources() {
                let description = manager.source(id).map(|s| s.description()).unwrap_or_default();
                let status = if available.iter().any(|a| a == id) { "available" } else { "not configured" };
                println!("{:<12} {:<16} {}", id, status, description);
            }
            Ok(())
        }
        Command::Tools { json } => {
            let config = load_config(cli.config.as_ref(), cli.timeout).await?;
            let activated = manager.activate_all(Some(&config)).await;
            print_tools(&activated, json)?;
            finish(&activated, Ok(())).await
        }
        Command::Call { tool, args } => {
            let arguments: Value = serde_json::from_str(&args).context("--args is not valid JSON")?;
            let config = load_config(cli.config.as_ref(), cli.timeout).await?;
            let activated = manager.activate_all(Some(&config)).await;

            let result = activated
                .tools
                .execute_tool_call(&ToolCall::new("cli", tool.as_str(), arguments))
                .await;
            println!("{}", result.content);

            let outcome = if result.is_error {
                Err(anyhow!("tool '{}' returned an error", tool))
            } else {
                Ok(())
            };
            finish(&activated, outcome).await
        }
        Command::Enable { source } => {
            check_known(&manager, &source)?;
            write_setting(cli.config.as_ref(), &source, Some(SourceSetting::enabled())).await
        }
        Command::Disable { source } => {
            check_known(&manager, &source)?;
            write_setting(cli.config.as_ref(), &source, Some(SourceSetting::Disabled)).await
        }
        Command::Reset { source } => write_setting(cli.config.as_ref(), &source, None).await,
    }
}

fn check_known(manager: &ToolsManager, source: &str) -> Result<()> {
    if manager.source(source).is_none() {
        bail!("unknown source '{}' (known: {})", source, manager.sources().join(", "));
    }
    Ok(())
}

async fn read(provider: &FileConfigProvider) -> Result<ToolsConfig> {
    provider
        .get_config()
        .await
        .with_context(|| format!("failed to load {} config {}", provider.level().as_str(), provider.path().display()))
}

/// Load the config; `--timeout` overrides whatever it says
async fn load_config(path: Option<&PathBuf>, timeout: Option<u64>) -> Result<ToolsConfig> {
    let mut config = match path {
        Some(path) => read(&FileConfigProvider::new(path, ConfigLevel::Explicit)).await?,
        None => {
            let cwd = std::env::current_dir().context("cannot determine the current directory")?;
            let user = read(&FileConfigProvider::user()).await?;
            user.overlay(read(&FileConfigProvider::workspace(cwd)).await?)
        }
    };
    if timeout.is_some() {
        config.activation_timeout_secs = timeout;
    }
    Ok(config)
}

/// Persist one source's setting to `--config` or the user config; `None` removes it
async fn write_setting(path: Option<&PathBuf>, source: &str, setting: Option<SourceSetting>) -> Result<()> {
    let provider = match path {
        Some(path) => FileConfigProvider::new(path, ConfigLevel::Explicit),
        None => FileConfigProvider::user(),
    };

    let written = match setting {
        Some(setting) => provider.set_source(source, setting).await,
        None => match provider.remove_source(source).await {
            Err(ConfigError::SourceNotFound(_)) => {
                println!("{} has no entry in {}", source, provider.path().display());
                return Ok(());
            }
            other => other,
        },
    };
    written.with_context(|| format!("failed to write {}", provider.path().display()))?;

    println!("Updated {} config {}", provider.level().as_str(), provider.path().display());
    Ok(())
}

fn print_tools(activated: &ActivatedTools, as_json: bool) -> Result<()> {
    if as_json {
        let out = json!({
            "enabledSources": activated.enabled_sources,
            "tools": activated.tools.definitions(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if activated.enabled_sources.is_empty() {
        println!("No sources activated");
        return Ok(());
    }
    println!("Enabled sources: {}", activated.enabled_sources.join(", "));
    for entry in activated.tools.iter() {
        println!("  {:<32} [{}] {}", entry.name(), entry.source, entry.tool.description);
    }
    Ok(())
}

/// Close everything once, then report the first problem
async fn finish(activated: &ActivatedTools, outcome: Result<()>) -> Result<()> {
    let closed = activated.close().await;
    outcome?;
    if let Err(e) = closed {
        bail!(e);
    }
    Ok(())
}
