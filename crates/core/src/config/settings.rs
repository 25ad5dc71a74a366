use crate::config::resolver::ResolverOptions;
use crate::config::validation::{parse_switch, require_non_blank};
use crate::config::{ConfigError, ConfigSource};
use crate::foundation::resource_path;
use std::collections::BTreeMap;
use std::env;

/// Environment variable overriding the resource base path
pub const ENV_BASE_PATH: &str = "WIREUP_BASE_PATH";
/// Environment variable overriding the custom configuration resource name
pub const ENV_CONFIGURATION_RESOURCE: &str = "WIREUP_CONFIGURATION_RESOURCE";
/// Environment variable overriding the default configuration-bearing type
pub const ENV_DEFAULT_CONFIGURATION: &str = "WIREUP_DEFAULT_CONFIGURATION";
/// Environment variable overriding the startup writer resource name
pub const ENV_STARTUP_WRITERS_RESOURCE: &str = "WIREUP_STARTUP_WRITERS_RESOURCE";
/// Environment variable switching strict configuration analysis on
pub const ENV_EXCEPTION_ON_ERROR: &str = "WIREUP_EXCEPTION_ON_ERROR";

pub const DEFAULT_BASE_PATH: &str = "META-INF/wireup";
pub const DEFAULT_CONFIGURATION_RESOURCE: &str = "wireup.configuration";
pub const DEFAULT_CONFIGURATION_TYPE: &str = "wireup.DefaultServiceLayer";
pub const DEFAULT_STARTUP_WRITERS_RESOURCE: &str = "wireup.startup-writers";

/// Settings read from the process environment
pub trait EnvironmentSettings: Sized {
    /// Load settings from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the settings
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get setting source information for debugging
    fn config_sources(&self) -> BTreeMap<String, ConfigSource>;
}

/// Process-level settings that steer bootstrap.
///
/// Read once when a bootstrap is constructed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct BootstrapSettings {
    pub base_path: String,
    pub configuration_resource: String,
    pub default_configuration: String,
    pub startup_writers_resource: String,
    pub exception_on_error: bool,
    #[serde(skip)]
    sources: BTreeMap<String, ConfigSource>,
}

impl BootstrapSettings {
    /// Settings with every value at its default
    pub fn new() -> Self {
        let sources = [
            ("base_path", DEFAULT_BASE_PATH),
            ("configuration_resource", DEFAULT_CONFIGURATION_RESOURCE),
            ("default_configuration", DEFAULT_CONFIGURATION_TYPE),
            ("startup_writers_resource", DEFAULT_STARTUP_WRITERS_RESOURCE),
            ("exception_on_error", "false"),
        ]
        .into_iter()
        .map(|(field, value)| (field.to_string(), ConfigSource::Default { value }))
        .collect();

        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            configuration_resource: DEFAULT_CONFIGURATION_RESOURCE.to_string(),
            default_configuration: DEFAULT_CONFIGURATION_TYPE.to_string(),
            startup_writers_resource: DEFAULT_STARTUP_WRITERS_RESOURCE.to_string(),
            exception_on_error: false,
            sources,
        }
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::new();

        if let Some(value) = lookup(ENV_BASE_PATH) {
            settings.mark_env("base_path", ENV_BASE_PATH, &value);
            settings.base_path = value;
        }
        if let Some(value) = lookup(ENV_CONFIGURATION_RESOURCE) {
            settings.mark_env("configuration_resource", ENV_CONFIGURATION_RESOURCE, &value);
            settings.configuration_resource = value;
        }
        if let Some(value) = lookup(ENV_DEFAULT_CONFIGURATION) {
            settings.mark_env("default_configuration", ENV_DEFAULT_CONFIGURATION, &value);
            settings.default_configuration = value;
        }
        if let Some(value) = lookup(ENV_STARTUP_WRITERS_RESOURCE) {
            settings.mark_env("startup_writers_resource", ENV_STARTUP_WRITERS_RESOURCE, &value);
            settings.startup_writers_resource = value;
        }
        if let Some(value) = lookup(ENV_EXCEPTION_ON_ERROR) {
            settings.exception_on_error = parse_switch(ENV_EXCEPTION_ON_ERROR, &value)?;
            settings.mark_env("exception_on_error", ENV_EXCEPTION_ON_ERROR, &value);
        }

        settings.validate()?;
        Ok(settings)
    }

    fn mark_env(&mut self, field: &str, variable: &'static str, raw: &str) {
        self.sources.insert(
            field.to_string(),
            ConfigSource::Environment {
                variable,
                raw: raw.to_string(),
            },
        );
    }

    fn mark_builder(&mut self, field: &str, method: &'static str) {
        self.sources
            .insert(field.to_string(), ConfigSource::Builder { method });
    }

    /// Set the resource base path
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self.mark_builder("base_path", "with_base_path");
        self
    }

    /// Set the custom configuration resource name
    pub fn with_configuration_resource(mut self, name: impl Into<String>) -> Self {
        self.configuration_resource = name.into();
        self.mark_builder("configuration_resource", "with_configuration_resource");
        self
    }

    /// Set the default configuration-bearing type name
    pub fn with_default_configuration(mut self, type_name: impl Into<String>) -> Self {
        self.default_configuration = type_name.into();
        self.mark_builder("default_configuration", "with_default_configuration");
        self
    }

    /// Set the startup writer resource name
    pub fn with_startup_writers_resource(mut self, name: impl Into<String>) -> Self {
        self.startup_writers_resource = name.into();
        self.mark_builder("startup_writers_resource", "with_startup_writers_resource");
        self
    }

    /// Raise on configuration errors instead of logging them
    pub fn strict(mut self, exception_on_error: bool) -> Self {
        self.exception_on_error = exception_on_error;
        self.mark_builder("exception_on_error", "strict");
        self
    }

    /// Full path of the custom configuration resource
    pub fn configuration_path(&self) -> String {
        resource_path(&self.base_path, &self.configuration_resource)
    }

    /// Full path of the startup writer resource
    pub fn startup_writers_path(&self) -> String {
        resource_path(&self.base_path, &self.startup_writers_resource)
    }

    /// Options for a configuration resolver driven by these settings
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            default_type_name: self.default_configuration.clone(),
            custom_resource_path: self.configuration_path(),
            exception_on_error: self.exception_on_error,
        }
    }
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentSettings for BootstrapSettings {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| match env::var(var) {
            Ok(value) => Some(value),
            Err(env::VarError::NotPresent) => None,
            Err(env::VarError::NotUnicode(_)) => {
                tracing::warn!(variable = var, "Ignoring non-unicode environment variable");
                None
            }
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank(
            "configuration_resource",
            &self.configuration_resource,
            "Name the resource that lists the custom configuration type",
        )?;
        require_non_blank(
            "default_configuration",
            &self.default_configuration,
            "Name the type carrying the default configuration",
        )?;
        require_non_blank(
            "startup_writers_resource",
            &self.startup_writers_resource,
            "Name the resource that lists startup writers",
        )?;
        Ok(())
    }

    fn config_sources(&self) -> BTreeMap<String, ConfigSource> {
        self.sources.clone()
    }
}
