use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Create an environment error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Self::EnvironmentError {
            message: message.into(),
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate the value of `field`
    fn validate(&self, field: &str, value: &T) -> Result<(), ConfigError>;
}

/// Inclusive numeric range validator
pub struct RangeValidator {
    pub min: u64,
    pub max: u64,
}

impl RangeValidator {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }
}

impl ConfigValidator<u64> for RangeValidator {
    fn validate(&self, field: &str, value: &u64) -> Result<(), ConfigError> {
        if *value < self.min || *value > self.max {
            return Err(ConfigError::invalid_value(
                field,
                value.to_string(),
                format!("value between {} and {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Absolute URL validator backed by the `url` parser
pub struct UrlValidator {
    pub schemes: Vec<String>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self {
            schemes: vec!["http".to_string(), "https".to_string()],
        }
    }
}

impl ConfigValidator<str> for UrlValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(value)
            .map_err(|e| ConfigError::invalid_value(field, value, format!("absolute URL ({})", e)))?;

        if !self.schemes.iter().any(|scheme| scheme == parsed.scheme()) {
            return Err(ConfigError::invalid_value(
                field,
                value,
                format!("URL with scheme: {}", self.schemes.join(", ")),
            ));
        }

        if parsed.host_str().is_none() {
            return Err(ConfigError::invalid_value(field, value, "URL with host"));
        }

        Ok(())
    }
}

/// Path segment validator: non-empty, no slashes, no whitespace
pub struct SegmentValidator;

impl ConfigValidator<str> for SegmentValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        if value.is_empty() || value.contains('/') || value.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid_value(
                field,
                value,
                "a single non-empty path segment",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_validator() {
        let validator = RangeValidator::new(1, 1000);
        assert!(validator.validate("max_limit", &1).is_ok());
        assert!(validator.validate("max_limit", &1000).is_ok());

        let err = validator.validate("max_limit", &0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "max_limit"));
        assert!(validator.validate("max_limit", &1001).is_err());
    }

    #[test]
    fn test_url_validator() {
        let validator = UrlValidator::default();
        assert!(validator.validate("base_url", "http://localhost:8080").is_ok());
        assert!(validator.validate("base_url", "https://api.example.com").is_ok());
        assert!(validator.validate("base_url", "ftp://example.com").is_err());
        assert!(validator.validate("base_url", "not a url").is_err());
    }

    #[test]
    fn test_segment_validator() {
        assert!(SegmentValidator.validate("prefix", "rest").is_ok());
        assert!(SegmentValidator.validate("prefix", "").is_err());
        assert!(SegmentValidator.validate("prefix", "a/b").is_err());
        assert!(SegmentValidator.validate("prefix", "a b").is_err());
    }
}
