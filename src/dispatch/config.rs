//! Dispatch configuration.
//!
//! A [`DispatchConfig`] is built once at startup and shared read-only by every
//! [`Dispatcher`](super::Dispatcher) built from it. [`DispatchSettings`] is the
//! file-loadable description of the same thing.
//!
//! # Examples
//!
//! ```
//! use rpc_rail::dispatch::{DispatchConfig, DispatchSettings};
//!
//! let settings: DispatchSettings =
//!     serde_json::from_str(r#"{ "default_sources": ["body", "empty"], "max_body_bytes": 1024 }"#).unwrap();
//! let config = DispatchConfig::try_from(settings).unwrap();
//!
//! assert_eq!(config.max_body_bytes(), 1024);
//! assert_eq!(config.default_sources().len(), 2);
//! ```
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hook::{ErrorHook, TracingErrorHook};
use crate::source::{default_sources, SourceKind, SourceList};
use crate::traits::ParamSource;

/// Largest request body read by default: 4 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// Invalid dispatch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one default parameter source is required")]
    NoDefaultSources,
    #[error("max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
}

/// Immutable dispatch settings: fallback parameter sources, error hook, body limit.
#[derive(Clone)]
pub struct DispatchConfig {
    default_sources: SourceList,
    hook: Arc<dyn ErrorHook>,
    max_body_bytes: usize,
}

impl DispatchConfig {
    #[inline]
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }

    /// Sources used by `get_*` calls that pass no sources.
    #[inline]
    pub fn default_sources(&self) -> &SourceList {
        &self.default_sources
    }

    /// Hook invoked once per failed call.
    #[inline]
    pub fn hook(&self) -> &dyn ErrorHook {
        self.hook.as_ref()
    }

    #[inline]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_sources: default_sources(),
            hook: Arc::new(TracingErrorHook),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl fmt::Debug for DispatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<&str> = self.default_sources.iter().map(|s| s.name()).collect();
        f.debug_struct("DispatchConfig")
            .field("default_sources", &sources)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl TryFrom<DispatchSettings> for DispatchConfig {
    type Error = ConfigError;

    fn try_from(settings: DispatchSettings) -> Result<Self, Self::Error> {
        settings.into_builder().build()
    }
}

/// Builder for [`DispatchConfig`]; starts from the defaults.
pub struct DispatchConfigBuilder {
    default_sources: SourceList,
    hook: Arc<dyn ErrorHook>,
    max_body_bytes: usize,
}

impl Default for DispatchConfigBuilder {
    fn default() -> Self {
        let DispatchConfig { default_sources, hook, max_body_bytes } = DispatchConfig::default();
        Self { default_sources, hook, max_body_bytes }
    }
}

impl DispatchConfigBuilder {
    /// Replaces the default source list.
    pub fn default_sources<I>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ParamSource>>,
    {
        self.default_sources = sources.into_iter().collect();
        self
    }

    /// Replaces the default source list with built-in sources.
    pub fn default_source_kinds<I>(self, kinds: I) -> Self
    where
        I: IntoIterator<Item = SourceKind>,
    {
        self.default_sources(kinds.into_iter().map(SourceKind::source))
    }

    /// Replaces the error hook.
    pub fn error_hook<H>(mut self, hook: H) -> Self
    where
        H: ErrorHook + 'static,
    {
        self.hook = Arc::new(hook);
        self
    }

    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// # Errors
    ///
    /// [`ConfigError::NoDefaultSources`] for an empty source list and
    /// [`ConfigError::ZeroBodyLimit`] for a zero body limit.
    pub fn build(self) -> Result<DispatchConfig, ConfigError> {
        if self.default_sources.is_empty() {
            return Err(ConfigError::NoDefaultSources);
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroBodyLimit);
        }
        Ok(DispatchConfig {
            default_sources: self.default_sources,
            hook: self.hook,
            max_body_bytes: self.max_body_bytes,
        })
    }
}

/// Serializable dispatch settings, e.g. a section of a service config file.
///
/// Missing fields take the defaults: `["body", "form", "context"]` and 4 MiB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub default_sources: Vec<SourceKind>,
    pub max_body_bytes: usize,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            default_sources: vec![SourceKind::Body, SourceKind::Form, SourceKind::Context],
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl DispatchSettings {
    /// Builder seeded with these settings and the default hook.
    pub fn into_builder(self) -> DispatchConfigBuilder {
        DispatchConfig::builder()
            .default_source_kinds(self.default_sources)
            .max_body_bytes(self.max_body_bytes)
    }
}
