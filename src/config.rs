//! Plugin options and build context resolution.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::debug;

use crate::context::{Context, DEVELOPMENT};
use crate::error::Result;

const NODE_ENV: &str = "NODE_ENV";

/// Options passed to the plugin from the bundler configuration.
///
/// ```json
/// { "target": "APP_ENV", "vars": { "APP_ENV": "staging", "NEW_CHECKOUT": "1" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginConfig {
    /// Explicit environment name.
    pub env: Option<String>,
    /// Name of a variable holding the environment name. Wins over `env` when set.
    pub target: Option<String>,
    /// Variables for feature checks, layered over the process environment.
    pub vars: BTreeMap<String, String>,
    /// Extra module specifiers to treat as construct imports.
    pub import_sources: Vec<String>,
}

impl PluginConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(raw)?)
    }

    /// Builds the immutable context for one transform.
    ///
    /// `host_env` is the environment name reported by the compiler host, used
    /// when neither the options nor `NODE_ENV` say otherwise.
    pub fn resolve_context<I>(&self, host_env: Option<&str>, process_vars: I) -> Context
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: BTreeMap<String, String> = process_vars.into_iter().collect();
        vars.extend(self.vars.iter().map(|(k, v)| (k.clone(), v.clone())));

        let non_empty = |v: &&String| !v.is_empty();
        let from_target = self
            .target
            .as_ref()
            .and_then(|name| vars.get(name))
            .filter(non_empty);

        let current_env = from_target
            .or(self.env.as_ref().filter(non_empty))
            .or(vars.get(NODE_ENV).filter(non_empty))
            .cloned()
            .or_else(|| host_env.filter(|e| !e.is_empty()).map(str::to_string))
            .unwrap_or_else(|| DEVELOPMENT.to_string());

        debug!(env = %current_env, vars = vars.len(), "resolved build context");
        Context::new(current_env, vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_camel_case_options() {
        let config = PluginConfig::from_json(
            r#"{ "env": "qa", "target": "APP_ENV", "vars": { "A": "1" }, "importSources": ["jovius"] }"#,
        )
        .unwrap();
        assert_eq!(config.env.as_deref(), Some("qa"));
        assert_eq!(config.target.as_deref(), Some("APP_ENV"));
        assert_eq!(config.vars.get("A").map(String::as_str), Some("1"));
        assert_eq!(config.import_sources, vec!["jovius".to_string()]);
    }

    #[test]
    fn empty_options_are_default() {
        assert_eq!(PluginConfig::from_json("").unwrap(), PluginConfig::default());
        assert_eq!(PluginConfig::from_json("{}").unwrap(), PluginConfig::default());
    }

    #[test]
    fn malformed_options_are_config_errors() {
        let err = PluginConfig::from_json("{ env: ").unwrap_err();
        assert!(err.to_string().starts_with("invalid plugin configuration"));
        assert!(PluginConfig::from_json(r#"{ "env": 3 }"#).is_err());
    }

    #[test]
    fn target_variable_wins() {
        let config = PluginConfig {
            env: Some("qa".into()),
            target: Some("APP_ENV".into()),
            ..Default::default()
        };
        let ctx = config.resolve_context(None, vars(&[("APP_ENV", "staging"), ("NODE_ENV", "production")]));
        assert_eq!(ctx.current_env(), "staging");
    }

    #[test]
    fn unset_target_falls_back_to_env() {
        let config = PluginConfig {
            env: Some("qa".into()),
            target: Some("APP_ENV".into()),
            ..Default::default()
        };
        let ctx = config.resolve_context(Some("production"), vars(&[("APP_ENV", "")]));
        assert_eq!(ctx.current_env(), "qa");
    }

    #[test]
    fn empty_env_option_is_unset() {
        let config = PluginConfig::from_json(r#"{ "env": "" }"#).unwrap();
        let ctx = config.resolve_context(None, vars(&[("NODE_ENV", "production")]));
        assert_eq!(ctx.current_env(), "production");
    }

    #[test]
    fn node_env_then_host_then_development() {
        let config = PluginConfig::default();
        let ctx = config.resolve_context(Some("test"), vars(&[("NODE_ENV", "production")]));
        assert_eq!(ctx.current_env(), "production");

        let ctx = config.resolve_context(Some("test"), vars(&[]));
        assert_eq!(ctx.current_env(), "test");

        let ctx = config.resolve_context(None, vars(&[]));
        assert_eq!(ctx.current_env(), "development");
    }

    #[test]
    fn option_vars_override_process_vars() {
        let config = PluginConfig {
            vars: [("FLAG".to_string(), "".to_string())].into_iter().collect(),
            target: Some("STAGE".into()),
            ..Default::default()
        };
        let ctx = config.resolve_context(None, vars(&[("FLAG", "1"), ("STAGE", "qa")]));
        assert!(!ctx.is_feature_active("FLAG"));
        assert_eq!(ctx.current_env(), "qa");
    }
}
