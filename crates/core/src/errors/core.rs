use thiserror::Error;

/// Core error type for the wireup engine
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// No usable configuration source, or strict validation found errors.
    #[error("Bootstrap failed: {message}")]
    Bootstrap { message: String },

    /// A resource file or a type it names is unusable.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    #[error(transparent)]
    Settings(#[from] crate::config::ConfigError),
}

impl CoreError {
    /// Create a new bootstrap failure
    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::Bootstrap {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if the error is a bootstrap failure
    pub fn is_bootstrap(&self) -> bool {
        matches!(self, Self::Bootstrap { .. })
    }

    /// Check if the error is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Check if the error is an instantiation error
    pub fn is_instantiation(&self) -> bool {
        matches!(self, Self::Instantiation(_))
    }
}

/// Boxed error returned by registered constructors
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Classification of a failed attempt to create an instance of a configured type.
///
/// The `Display` output of each variant is the diagnostic that is accumulated
/// during validation or carried by a strict-mode [`CoreError::Bootstrap`].
#[derive(Debug, Error)]
pub enum InstantiationError {
    #[error("unable to create new instance of configured class. Configured class is 'null'")]
    NullReference,

    #[error("unable to create new instance of configured class {type_name}. Configured class is an interface")]
    Interface { type_name: String },

    #[error("unable to create new instance of configured class {type_name}. Configured class is abstract")]
    Abstract { type_name: String },

    #[error("unable to create new instance of implementation for {capability}, faulty class: {type_name}")]
    MissingConstructor {
        capability: &'static str,
        type_name: String,
    },

    #[error("unable to create new instance of implementation for {capability}, faulty class: {type_name} ({source})")]
    ConstructorFailed {
        capability: &'static str,
        type_name: String,
        #[source]
        source: BoxError,
    },
}

impl InstantiationError {
    /// Name of the offending type, if there was one
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::NullReference => None,
            Self::Interface { type_name }
            | Self::Abstract { type_name }
            | Self::MissingConstructor { type_name, .. }
            | Self::ConstructorFailed { type_name, .. } => Some(type_name),
        }
    }
}
