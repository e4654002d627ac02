//! Build-time context and the predicates every construct rule is decided by.
//!
//! A [`Context`] is built once per transform and never mutated afterwards.
//! All predicates are pure lookups against it.

use std::collections::BTreeMap;

pub const DEVELOPMENT: &str = "development";
pub const PRODUCTION: &str = "production";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    current_env: String,
    vars: BTreeMap<String, String>,
}

impl Context {
    pub fn new(current_env: impl Into<String>, vars: BTreeMap<String, String>) -> Self {
        Self {
            current_env: current_env.into(),
            vars,
        }
    }

    pub fn current_env(&self) -> &str {
        &self.current_env
    }

    /// Environment variable lookup. Empty values count as unset.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn is_dev(&self) -> bool {
        self.current_env == DEVELOPMENT
    }

    pub fn is_prod(&self) -> bool {
        self.current_env == PRODUCTION
    }

    /// True iff the current environment is one of `envs`.
    pub fn matches_env<S: AsRef<str>>(&self, envs: &[S]) -> bool {
        envs.iter().any(|e| e.as_ref() == self.current_env)
    }

    pub fn is_feature_active(&self, feature: &str) -> bool {
        self.lookup(feature).is_some()
    }

    /// True iff at least one of `features` is active.
    pub fn matches_feature<S: AsRef<str>>(&self, features: &[S]) -> bool {
        features.iter().any(|f| self.is_feature_active(f.as_ref()))
    }

    /// Value of the first case keyed by the current environment.
    pub fn select_case<K, T, I>(&self, cases: I) -> Option<T>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, T)>,
    {
        cases
            .into_iter()
            .find(|(key, _)| key.as_ref() == self.current_env)
            .map(|(_, value)| value)
    }

    /// Value of the first case whose key names an active feature.
    ///
    /// Cases are tried in the order given, which for object literals is source
    /// order. When several features are active, the earliest case wins.
    pub fn select_feature_case<K, T, I>(&self, cases: I) -> Option<T>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, T)>,
    {
        cases
            .into_iter()
            .find(|(key, _)| self.is_feature_active(key.as_ref()))
            .map(|(_, value)| value)
    }
}
