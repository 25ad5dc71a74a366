//! Collaborator interfaces of the service layer.
//!
//! The engine only ever sees these through their factories: each factory
//! exposes exactly one zero-argument operation producing its service.

use crate::capability;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Tracing/logging service of the layer
pub trait TraceProvider: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Check if messages of this level are recorded
    fn is_enabled(&self, level: Level) -> bool {
        let _ = level;
        true
    }

    /// Record a message
    fn trace(&self, level: Level, message: &str);
}

impl fmt::Debug for dyn TraceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceProvider")
            .field("name", &self.name())
            .finish()
    }
}

/// Localized message storage
pub trait MessageRepository: Send + Sync {
    /// Message text for a key, in the given locale
    fn message(&self, locale: &str, key: &str) -> Option<String>;
}

/// Value verification
pub trait Verifier: Send + Sync {
    /// Check a value against a named rule
    fn verify(&self, rule: &str, value: &str) -> Result<(), String>;
}

/// Configuration values of the hosting application
pub trait ConfigurationProvider: Send + Sync {
    fn value(&self, key: &str) -> Option<String>;
}

/// Locale of the current caller
pub trait LocaleProvider: Send + Sync {
    fn locale(&self) -> String;
}

/// Principal of the current caller
pub trait PrincipalProvider: Send + Sync {
    fn principal(&self) -> Option<String>;
}

/// Producer of health and runtime information
pub trait InfoProvider: Send + Sync {
    /// Key/value pairs describing the running process
    fn info(&self) -> Vec<(String, String)>;
}

/// Conversions between textual values and datatypes
pub trait DatatypeConverterRegistry: Send + Sync {
    /// Names of supported datatypes
    fn datatypes(&self) -> Vec<String>;

    /// Normalize a value of a datatype to its canonical text form
    fn convert(&self, datatype: &str, value: &str) -> Result<String, String>;
}

pub trait TraceProviderFactory: Send + Sync {
    fn trace_provider(&self) -> Arc<dyn TraceProvider>;
}

pub trait MessageRepositoryFactory: Send + Sync {
    fn message_repository(&self) -> Arc<dyn MessageRepository>;
}

pub trait VerifierFactory: Send + Sync {
    fn verifier(&self) -> Arc<dyn Verifier>;
}

pub trait ConfigurationProviderFactory: Send + Sync {
    fn configuration_provider(&self) -> Arc<dyn ConfigurationProvider>;
}

pub trait LocaleProviderFactory: Send + Sync {
    fn locale_provider(&self) -> Arc<dyn LocaleProvider>;
}

pub trait PrincipalProviderFactory: Send + Sync {
    fn principal_provider(&self) -> Arc<dyn PrincipalProvider>;
}

pub trait InfoProviderFactory: Send + Sync {
    fn info_provider(&self) -> Arc<dyn InfoProvider>;
}

pub trait DatatypeConverterRegistryFactory: Send + Sync {
    fn datatype_converter_registry(&self) -> Arc<dyn DatatypeConverterRegistry>;
}

/// Tag identifying a startup milestone by the type that reaches it
#[derive(Debug, Clone, Copy)]
pub struct Milestone {
    type_id: TypeId,
    name: &'static str,
}

impl Milestone {
    /// Milestone reached by the type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Milestone {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Milestone {}

impl std::hash::Hash for Milestone {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

/// Observer writing diagnostics when a milestone is reached
pub trait StartupWriter: Send + Sync {
    /// Milestone this writer is interested in
    fn milestone(&self) -> Milestone;

    /// Write diagnostics through the current tracing service
    fn write(&self, trace: &dyn TraceProvider, level: Level);
}

capability! {
    dyn TraceProviderFactory => "wireup.TraceProviderFactory",
    dyn MessageRepositoryFactory => "wireup.MessageRepositoryFactory",
    dyn VerifierFactory => "wireup.VerifierFactory",
    dyn ConfigurationProviderFactory => "wireup.ConfigurationProviderFactory",
    dyn LocaleProviderFactory => "wireup.LocaleProviderFactory",
    dyn PrincipalProviderFactory => "wireup.PrincipalProviderFactory",
    dyn InfoProviderFactory => "wireup.InfoProviderFactory",
    dyn DatatypeConverterRegistryFactory => "wireup.DatatypeConverterRegistryFactory",
    dyn StartupWriter => "wireup.StartupWriter",
}
