//! Per-source configuration

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Explicit settings for one source
///
/// Unknown keys are rejected: a misspelled `api_key` must not silently turn
/// into "enabled, use the environment".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSettings {
    /// API key; wins over the secret store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Name of the secret to fall back to, e.g. "CONTEXT7_API_KEY"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// HTTP endpoint override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Run the server locally over stdio instead of HTTP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Extra environment for a `command` server; ignored over HTTP
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl SourceSettings {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }
}

/// How the manager should treat one source
///
/// In YAML/JSON: `false` disables, `true` enables with defaults, a map
/// enables with those settings, and `null` (or leaving the source out)
/// means auto-detect.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SourceSetting {
    /// Activate iff the source reports itself available from the environment
    #[default]
    Auto,
    /// Never probe, never activate
    Disabled,
    /// Activate with these settings (default settings = use the environment)
    Enabled(SourceSettings),
}

impl SourceSetting {
    /// Enabled with default settings
    pub fn enabled() -> Self {
        SourceSetting::Enabled(SourceSettings::default())
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, SourceSetting::Disabled)
    }
}

struct SettingVisitor;

impl<'de> Visitor<'de> for SettingVisitor {
    type Value = SourceSetting;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a boolean, null, or a map of source settings")
    }

    fn visit_bool<E: de::Error>(self, enabled: bool) -> Result<Self::Value, E> {
        Ok(if enabled {
            SourceSetting::enabled()
        } else {
            SourceSetting::Disabled
        })
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SourceSetting::Auto)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(SourceSetting::Auto)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
        SourceSettings::deserialize(de::value::MapAccessDeserializer::new(map))
            .map(SourceSetting::Enabled)
    }
}

impl<'de> Deserialize<'de> for SourceSetting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_option(SettingVisitor)
    }
}

impl Serialize for SourceSetting {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SourceSetting::Auto => serializer.serialize_none(),
            SourceSetting::Disabled => serializer.serialize_bool(false),
            SourceSetting::Enabled(settings) if *settings == SourceSettings::default() => {
                serializer.serialize_bool(true)
            }
            SourceSetting::Enabled(settings) => settings.serialize(serializer),
        }
    }
}

/// Configuration bundle passed to `ToolsManager::activate_all`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Per-source settings keyed by source id; missing ids are `Auto`
    #[serde(default)]
    pub sources: BTreeMap<String, SourceSetting>,
    /// Upper bound on one source's activation, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activation_timeout_secs: Option<u64>,
}

impl ToolsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Setting for a source, `Auto` when it has no entry
    pub fn setting(&self, source_id: &str) -> SourceSetting {
        self.sources.get(source_id).cloned().unwrap_or_default()
    }

    pub fn with_source(mut self, source_id: impl Into<String>, setting: SourceSetting) -> Self {
        self.sources.insert(source_id.into(), setting);
        self
    }

    pub fn disable(self, source_id: impl Into<String>) -> Self {
        self.with_source(source_id, SourceSetting::Disabled)
    }

    pub fn enable(self, source_id: impl Into<String>) -> Self {
        self.with_source(source_id, SourceSetting::enabled())
    }

    /// Layer `top` over `self`
    ///
    /// A source entry in `top` replaces the whole entry below it; settings
    /// maps are not merged field by field.
    pub fn overlay(mut self, top: ToolsConfig) -> Self {
        self.sources.extend(top.sources);
        if top.activation_timeout_secs.is_some() {
            self.activation_timeout_secs = top.activation_timeout_secs;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_three_states_from_yaml() {
        let yaml = r#"
sources:
  alpha: false
  beta: true
  keyed:
    api_key: "x"
    url: "https://example.test/mcp"
    env:
      DEFAULT_MINIMUM_TOKENS: "5000"
  delta: ~
activation_timeout_secs: 5
"#;
        let config: ToolsConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.setting("alpha"), SourceSetting::Disabled);
        assert_eq!(config.setting("beta"), SourceSetting::enabled());
        assert_eq!(config.setting("delta"), SourceSetting::Auto);
        assert_eq!(config.setting("missing"), SourceSetting::Auto);
        assert_eq!(config.activation_timeout_secs, Some(5));

        match config.setting("keyed") {
            SourceSetting::Enabled(settings) => {
                assert_eq!(settings.api_key.as_deref(), Some("x"));
                assert_eq!(settings.url.as_deref(), Some("https://example.test/mcp"));
                assert_eq!(
                    settings.env.get("DEFAULT_MINIMUM_TOKENS").map(String::as_str),
                    Some("5000")
                );
            }
            other => panic!("expected Enabled, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_map_enables_with_defaults() {
        let config: ToolsConfig = serde_json::from_value(json!({ "sources": { "docs": {} } })).unwrap();
        assert_eq!(config.setting("docs"), SourceSetting::enabled());
    }

    #[test]
    fn test_serialize_compact_forms() {
        let config = ToolsConfig::new()
            .disable("a")
            .enable("b")
            .with_source("c", SourceSetting::Enabled(SourceSettings::with_api_key("k")));

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["sources"]["a"], json!(false));
        assert_eq!(value["sources"]["b"], json!(true));
        assert_eq!(value["sources"]["c"], json!({ "api_key": "k" }));
        assert!(value.get("activation_timeout_secs").is_none());

        let back: ToolsConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_missing_sources_section() {
        let config: ToolsConfig = serde_yaml::from_str("activation_timeout_secs: 10").unwrap();
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_misspelled_field_is_rejected() {
        let err = serde_yaml::from_str::<ToolsConfig>("sources:\n  context7:\n    apikey: x\n").unwrap_err();
        assert!(err.to_string().contains("apikey"), "{}", err);

        let err = serde_json::from_value::<ToolsConfig>(json!({ "sources": { "docs": { "urll": "x" } } }))
            .unwrap_err();
        assert!(err.to_string().contains("urll"), "{}", err);
    }

    #[test]
    fn test_misspelled_top_level_key_is_rejected() {
        assert!(serde_yaml::from_str::<ToolsConfig>("source:\n  context7: false\n").is_err());
    }

    #[test]
    fn test_non_map_setting_is_rejected() {
        assert!(serde_yaml::from_str::<ToolsConfig>("sources:\n  context7: 3\n").is_err());
    }

    #[test]
    fn test_overlay_replaces_entries_and_timeout() {
        let user = ToolsConfig {
            activation_timeout_secs: Some(30),
            ..ToolsConfig::new()
        }
        .with_source("context7", SourceSetting::Enabled(SourceSettings::with_api_key("user-key")))
        .disable("other");

        let workspace = ToolsConfig::new().disable("context7").enable("local");

        let merged = user.clone().overlay(workspace);
        assert!(merged.setting("context7").is_disabled());
        assert!(merged.setting("other").is_disabled());
        assert_eq!(merged.setting("local"), SourceSetting::enabled());
        assert_eq!(merged.activation_timeout_secs, Some(30));

        let faster = ToolsConfig {
            activation_timeout_secs: Some(5),
            ..ToolsConfig::new()
        };
        assert_eq!(user.overlay(faster).activation_timeout_secs, Some(5));
    }
}
