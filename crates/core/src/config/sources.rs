use std::fmt;

/// Provenance of one bootstrap setting
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "from", rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in value of the setting
    Default { value: &'static str },
    /// Read from a `WIREUP_*` variable, with the text exactly as given
    Environment { variable: &'static str, raw: String },
    /// Set through a [`BootstrapSettings`](crate::config::BootstrapSettings) builder method
    Builder { method: &'static str },
}

impl ConfigSource {
    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default { .. })
    }

    pub fn is_environment(&self) -> bool {
        matches!(self, ConfigSource::Environment { .. })
    }

    /// The environment variable the setting was read from, if any
    pub fn variable(&self) -> Option<&'static str> {
        match self {
            ConfigSource::Environment { variable, .. } => Some(variable),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Default { value } => write!(f, "default ({})", value),
            ConfigSource::Environment { variable, raw } => write!(f, "{}={:?}", variable, raw),
            ConfigSource::Builder { method } => write!(f, "BootstrapSettings::{}", method),
        }
    }
}
