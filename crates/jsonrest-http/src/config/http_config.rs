//! HTTP surface configuration
//!
//! Loaded from `JSONREST_*` environment variables on top of
//! [`HttpDefaults`], integrating with the jsonrest-core configuration
//! contract.

use super::defaults::HttpDefaults;
use jsonrest_core::config::{
    env_flag_or, env_or_default, env_parse_or, ConfigValidator, RangeValidator, SegmentValidator, UrlValidator,
};
use jsonrest_core::{AppConfigTrait, ConfigError, ConfigSource, SearchLimits};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// REST surface configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Path segment every API route is mounted under
    pub prefix: String,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Absolute URL clients reach the server at. When unset, links are
    /// built from the request's `Host` header.
    pub base_url: Option<String>,
    /// Reject plain-HTTP requests to non-localhost hosts
    pub require_https: bool,
    /// Search page size when the request gives none
    pub default_limit: usize,
    /// Largest accepted search page size
    pub max_limit: usize,
    /// Request timeout in seconds
    pub request_timeout_secs: u64,
    /// Maximum request body size in bytes
    pub max_request_size: usize,
    /// Enable request tracing
    pub enable_tracing: bool,
    pub debug: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            prefix: HttpDefaults::PREFIX.to_string(),
            host: HttpDefaults::HOST.to_string(),
            port: HttpDefaults::PORT,
            base_url: None,
            require_https: HttpDefaults::REQUIRE_HTTPS,
            default_limit: HttpDefaults::DEFAULT_LIMIT,
            max_limit: HttpDefaults::MAX_LIMIT,
            request_timeout_secs: HttpDefaults::REQUEST_TIMEOUT_SECS,
            max_request_size: HttpDefaults::MAX_REQUEST_SIZE,
            enable_tracing: HttpDefaults::ENABLE_TRACING,
            debug: HttpDefaults::DEBUG,
        }
    }
}

impl AppConfigTrait for HttpConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var("JSONREST_BASE_URL")
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let config = HttpConfig {
            prefix: env_or_default("JSONREST_PREFIX", HttpDefaults::PREFIX),
            host: env_or_default("JSONREST_HOST", HttpDefaults::HOST),
            port: env_parse_or("JSONREST_PORT", "port", HttpDefaults::PORT, "valid port number")?,
            base_url,
            require_https: env_flag_or("JSONREST_REQUIRE_HTTPS", "require_https", HttpDefaults::REQUIRE_HTTPS)?,
            default_limit: env_parse_or(
                "JSONREST_DEFAULT_LIMIT",
                "default_limit",
                HttpDefaults::DEFAULT_LIMIT,
                "positive page size",
            )?,
            max_limit: env_parse_or(
                "JSONREST_MAX_LIMIT",
                "max_limit",
                HttpDefaults::MAX_LIMIT,
                "positive page size",
            )?,
            request_timeout_secs: env_parse_or(
                "JSONREST_REQUEST_TIMEOUT",
                "request_timeout_secs",
                HttpDefaults::REQUEST_TIMEOUT_SECS,
                "valid number of seconds",
            )?,
            max_request_size: env_parse_or(
                "JSONREST_MAX_REQUEST_SIZE",
                "max_request_size",
                HttpDefaults::MAX_REQUEST_SIZE,
                "valid number of bytes",
            )?,
            enable_tracing: env_flag_or("JSONREST_ENABLE_TRACING", "enable_tracing", HttpDefaults::ENABLE_TRACING)?,
            debug: env_flag_or("JSONREST_DEBUG", "debug", HttpDefaults::DEBUG)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        SegmentValidator.validate("prefix", self.prefix.as_str())?;
        RangeValidator::new(1, u16::MAX as u64).validate("port", &(self.port as u64))?;

        if let Some(base_url) = &self.base_url {
            UrlValidator::default().validate("base_url", base_url.as_str())?;
        }

        if self.max_limit == 0 {
            return Err(ConfigError::validation_failed("Maximum page size must be greater than 0"));
        }
        RangeValidator::new(1, self.max_limit as u64).validate("default_limit", &(self.default_limit as u64))?;

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::validation_failed("Request timeout must be greater than 0"));
        }

        if self.max_request_size == 0 {
            return Err(ConfigError::validation_failed(
                "Maximum request size must be greater than 0",
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert(
            "prefix".to_string(),
            ConfigSource::env_or_default("JSONREST_PREFIX", HttpDefaults::PREFIX),
        );
        sources.insert(
            "host".to_string(),
            ConfigSource::env_or_default("JSONREST_HOST", HttpDefaults::HOST),
        );
        sources.insert(
            "port".to_string(),
            ConfigSource::env_or_default("JSONREST_PORT", HttpDefaults::PORT),
        );
        sources.insert(
            "base_url".to_string(),
            ConfigSource::env_or_default("JSONREST_BASE_URL", "request Host header"),
        );
        sources.insert(
            "require_https".to_string(),
            ConfigSource::env_or_default("JSONREST_REQUIRE_HTTPS", HttpDefaults::REQUIRE_HTTPS),
        );
        sources.insert(
            "default_limit".to_string(),
            ConfigSource::env_or_default("JSONREST_DEFAULT_LIMIT", HttpDefaults::DEFAULT_LIMIT),
        );
        sources.insert(
            "max_limit".to_string(),
            ConfigSource::env_or_default("JSONREST_MAX_LIMIT", HttpDefaults::MAX_LIMIT),
        );
        sources.insert(
            "request_timeout_secs".to_string(),
            ConfigSource::env_or_default("JSONREST_REQUEST_TIMEOUT", HttpDefaults::REQUEST_TIMEOUT_SECS),
        );
        sources.insert(
            "max_request_size".to_string(),
            ConfigSource::env_or_default("JSONREST_MAX_REQUEST_SIZE", HttpDefaults::MAX_REQUEST_SIZE),
        );
        sources.insert(
            "enable_tracing".to_string(),
            ConfigSource::env_or_default("JSONREST_ENABLE_TRACING", HttpDefaults::ENABLE_TRACING),
        );
        sources.insert(
            "debug".to_string(),
            ConfigSource::env_or_default("JSONREST_DEBUG", HttpDefaults::DEBUG),
        );
        sources
    }
}

impl HttpConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Page size bounds for search requests
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
        }
    }

    /// `host:port` to bind the listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route prefix with a leading slash, e.g. `/rest`
    pub fn mount_path(&self) -> String {
        format!("/{}", self.prefix)
    }

    /// Configured base URL without a trailing slash
    pub fn trimmed_base_url(&self) -> Option<&str> {
        self.base_url.as_deref().map(|url| url.trim_end_matches('/'))
    }
}
