use thiserror::Error;

/// Error raised while reading or validating bootstrap settings
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
}

/// Parse a boolean switch the way process settings spell it
pub fn parse_switch(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::invalid_value(
            field,
            value,
            "true, false, 1, 0, yes, no, on or off",
        )),
    }
}

/// Check that a setting holds a non-blank value
pub fn require_non_blank(field: &str, value: &str, hint: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::missing_required(field, hint));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        assert!(parse_switch("strict", "TRUE").unwrap());
        assert!(parse_switch("strict", " yes ").unwrap());
        assert!(!parse_switch("strict", "off").unwrap());
        assert!(!parse_switch("strict", "").unwrap());

        let err = parse_switch("strict", "maybe").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("'maybe'"));
    }

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("base_path", "META-INF", "hint").is_ok());
        assert!(matches!(
            require_non_blank("base_path", "  ", "hint"),
            Err(ConfigError::MissingRequired { .. })
        ));
    }
}
