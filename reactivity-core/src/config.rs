//! Runtime Configuration
//!
//! A [`RuntimeConfig`] is handed to [`Runtime::with_config`] and is fixed for
//! the lifetime of that runtime. It can be built in code or parsed from JSON;
//! every field has a default, so `{}` is a valid configuration.
//!
//! [`Runtime::with_config`]: crate::reactive::Runtime::with_config

use serde::Deserialize;

use crate::error::Result;

/// Default bound on nested `set()` calls.
pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 256;

/// Tunables for a [`Runtime`](crate::reactive::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Maximum nesting of re-entrant `set()` calls. `None` disables the guard
    /// and lets cyclic mutation recurse until the stack overflows.
    pub max_propagation_depth: Option<usize>,

    /// Check dependency lists when an effect is registered.
    pub validate_dependencies: bool,

    /// Install the verbose debug hook when the runtime is created.
    pub verbose_debug: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_propagation_depth: Some(DEFAULT_MAX_PROPAGATION_DEPTH),
            validate_dependencies: cfg!(debug_assertions),
            verbose_debug: false,
        }
    }
}

impl RuntimeConfig {
    /// Parse a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn max_propagation_depth(mut self, limit: Option<usize>) -> Self {
        self.max_propagation_depth = limit;
        self
    }

    pub fn validate_dependencies(mut self, enabled: bool) -> Self {
        self.validate_dependencies = enabled;
        self
    }

    pub fn verbose_debug(mut self, enabled: bool) -> Self {
        self.verbose_debug = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactiveError;

    #[test]
    fn empty_json_yields_defaults() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(
            config.max_propagation_depth,
            Some(DEFAULT_MAX_PROPAGATION_DEPTH)
        );
    }

    #[test]
    fn json_overrides_fields() {
        let config = RuntimeConfig::from_json(
            r#"{ "max_propagation_depth": null, "validate_dependencies": true, "verbose_debug": true }"#,
        )
        .unwrap();

        assert_eq!(config.max_propagation_depth, None);
        assert!(config.validate_dependencies);
        assert!(config.verbose_debug);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = RuntimeConfig::from_json(r#"{ "batching": true }"#).unwrap_err();
        assert!(matches!(err, ReactiveError::Config(_)));
    }

    #[test]
    fn builder_setters() {
        let config = RuntimeConfig::default()
            .max_propagation_depth(Some(4))
            .validate_dependencies(false)
            .verbose_debug(true);

        assert_eq!(config.max_propagation_depth, Some(4));
        assert!(!config.validate_dependencies);
        assert!(config.verbose_debug);
    }
}
