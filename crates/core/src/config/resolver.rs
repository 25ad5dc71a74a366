//! Two-tier configuration resolution.
//!
//! A [`ConfigurationResolver`] looks for two records of the same schema: the
//! built-in *default* record carried by a named type, and an application
//! supplied *custom* record carried by the type listed in a resource file.
//! The custom record is authoritative when present. Every type-reference
//! field is then resolved custom-first with fallback to the default.

use crate::config::record::{ConfigurationRecord, ConfigurationSchema};
use crate::discovery::TypeDiscovery;
use crate::errors::CoreError;
use crate::foundation::{Capability, TypeRef};
use crate::instantiation::{as_list, create_many, resolve_with_fallback, FactoryBinding};
use std::fmt;

/// Where a resolver looks for its records and how it treats problems
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverOptions {
    pub default_type_name: String,
    pub custom_resource_path: String,
    pub exception_on_error: bool,
}

impl ResolverOptions {
    /// Options using the schema's own default type
    pub fn for_schema<S: ConfigurationSchema>(schema: &S, custom_resource_path: impl Into<String>) -> Self {
        Self {
            default_type_name: schema.default_type_name().to_string(),
            custom_resource_path: custom_resource_path.into(),
            exception_on_error: false,
        }
    }

    /// Raise instead of accumulating configuration errors
    pub fn strict(mut self, exception_on_error: bool) -> Self {
        self.exception_on_error = exception_on_error;
        self
    }
}

/// The outcome of looking up the default and custom records
#[derive(Clone)]
pub struct ResolvedConfiguration<R> {
    default_type_name: String,
    custom_resource_path: String,
    custom_type_name: Option<String>,
    default_record: R,
    default_available: bool,
    custom_record: R,
    custom_available: bool,
    errors: Vec<String>,
}

impl<R: ConfigurationRecord> ResolvedConfiguration<R> {
    /// Combine the discovered records.
    ///
    /// Fails when neither record was discovered: there is no usable source.
    pub fn new(
        default_type_name: impl Into<String>,
        default_record: Option<R>,
        custom_resource_path: impl Into<String>,
        custom: Option<(String, R)>,
    ) -> Result<Self, CoreError> {
        let default_type_name = default_type_name.into();
        let custom_resource_path = custom_resource_path.into();

        if default_record.is_none() && custom.is_none() {
            return Err(CoreError::bootstrap(format!(
                "no configuration available: default configuration class '{}' could not be loaded and custom configuration file '{}' names no configuration class",
                default_type_name, custom_resource_path
            )));
        }

        let default_available = default_record.is_some();
        let custom_available = custom.is_some();
        let (custom_type_name, custom_record) = match custom {
            Some((name, record)) => (Some(name), record),
            None => (None, R::unset()),
        };

        Ok(Self {
            default_type_name,
            custom_resource_path,
            custom_type_name,
            default_record: default_record.unwrap_or_else(R::unset),
            default_available,
            custom_record,
            custom_available,
            errors: Vec::new(),
        })
    }

    pub fn default_record(&self) -> &R {
        &self.default_record
    }

    pub fn custom_record(&self) -> &R {
        &self.custom_record
    }

    pub fn is_default_available(&self) -> bool {
        self.default_available
    }

    pub fn is_custom_available(&self) -> bool {
        self.custom_available
    }

    /// The custom record when it was discovered, otherwise the default one
    pub fn authoritative(&self) -> &R {
        if self.custom_available {
            &self.custom_record
        } else {
            &self.default_record
        }
    }

    pub fn default_type_name(&self) -> &str {
        &self.default_type_name
    }

    pub fn custom_resource_path(&self) -> &str {
        &self.custom_resource_path
    }

    /// Type that carried the custom record, if one was discovered
    pub fn custom_type_name(&self) -> Option<&str> {
        self.custom_type_name.as_deref()
    }

    /// Validation errors retained in non-strict mode
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl<R> fmt::Debug for ResolvedConfiguration<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfiguration")
            .field("default_type_name", &self.default_type_name)
            .field("default_available", &self.default_available)
            .field("custom_resource_path", &self.custom_resource_path)
            .field("custom_type_name", &self.custom_type_name)
            .field("errors", &self.errors)
            .finish()
    }
}

/// Resolves and validates the records of one schema
pub struct ConfigurationResolver<S: ConfigurationSchema> {
    schema: S,
    configuration: ResolvedConfiguration<S::Record>,
    strict: bool,
}

impl<S: ConfigurationSchema> ConfigurationResolver<S> {
    /// Discover, combine and validate the records
    pub fn new(schema: S, discovery: &TypeDiscovery, options: ResolverOptions) -> Result<Self, CoreError> {
        let default_record = Self::resolve_default(discovery, &options.default_type_name);
        let custom = Self::resolve_custom(discovery, &options.custom_resource_path)?;

        let mut configuration = ResolvedConfiguration::new(
            options.default_type_name.clone(),
            default_record,
            options.custom_resource_path.clone(),
            custom,
        )?;

        if configuration.is_custom_available() {
            let errors = schema.validate(configuration.authoritative());
            if !errors.is_empty() {
                for error in &errors {
                    tracing::warn!(error = %error, "Configuration problem");
                }
                if options.exception_on_error {
                    return Err(CoreError::bootstrap(format!(
                        "found {} error(s) during analysis of configuration",
                        errors.len()
                    )));
                }
                configuration.errors = errors;
            }
        } else {
            tracing::debug!(
                resource = %options.custom_resource_path,
                "No custom configuration supplied, using defaults"
            );
        }

        Ok(Self {
            schema,
            configuration,
            strict: options.exception_on_error,
        })
    }

    fn resolve_default(discovery: &TypeDiscovery, type_name: &str) -> Option<S::Record> {
        let Some(type_ref) = discovery.registry().load_by_name(type_name) else {
            tracing::debug!(type_name, "Default configuration class not loadable");
            return None;
        };
        let record = type_ref.configuration::<S::Record>().cloned();
        if record.is_none() {
            tracing::warn!(type_name, "Default configuration class carries no configuration");
        }
        record
    }

    fn resolve_custom(
        discovery: &TypeDiscovery,
        path: &str,
    ) -> Result<Option<(String, S::Record)>, CoreError> {
        let Some(type_ref) = discovery.read_one(path, None)? else {
            return Ok(None);
        };
        match type_ref.configuration::<S::Record>() {
            Some(record) => {
                tracing::info!(type_name = %type_ref, resource = path, "Using custom configuration");
                Ok(Some((type_ref.name().to_string(), record.clone())))
            }
            None => {
                tracing::warn!(
                    type_name = %type_ref,
                    resource = path,
                    "Custom configuration class carries no configuration"
                );
                Ok(None)
            }
        }
    }

    pub fn schema(&self) -> &S {
        &self.schema
    }

    pub fn configuration(&self) -> &ResolvedConfiguration<S::Record> {
        &self.configuration
    }

    /// Check if instantiation failures raise instead of yielding `None`
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Resolve one type-reference field, custom first, then default
    pub fn resolve<C: Capability + ?Sized>(
        &self,
        field: impl Fn(&S::Record) -> &TypeRef,
    ) -> Result<Option<FactoryBinding<C>>, CoreError> {
        resolve_with_fallback::<C>(
            Some(field(self.configuration.custom_record())),
            Some(field(self.configuration.default_record())),
            self.strict,
        )
    }

    /// Instantiate every type a multi-valued field of the authoritative record names
    pub fn resolve_many<C: Capability + ?Sized>(
        &self,
        field: impl Fn(&S::Record) -> Option<&[TypeRef]>,
    ) -> Result<Vec<FactoryBinding<C>>, CoreError> {
        create_many::<C>(field(self.configuration.authoritative()), self.strict)
    }

    /// Read an array-valued field of the authoritative record
    pub fn list<T: Clone>(&self, field: impl Fn(&S::Record) -> Option<&[T]>) -> Option<Vec<T>> {
        as_list(field(self.configuration.authoritative()))
    }
}

impl<S: ConfigurationSchema> fmt::Debug for ConfigurationResolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationResolver")
            .field("configuration", &self.configuration)
            .field("strict", &self.strict)
            .finish()
    }
}
