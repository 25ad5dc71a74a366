pub mod foundation;
pub mod errors;
pub mod discovery;
pub mod instantiation;
pub mod config;
pub mod services;
pub mod trace;
pub mod layer;
pub mod providers;
pub mod startup;
pub mod bootstrap;
pub mod facade;

// Re-export key types for convenience
pub use foundation::{Capability, CapabilityId, FileSystemResources, ResourceSource, StaticResources, TypeDescriptor, TypeKind, TypeRef, TypeRegistry};
pub use errors::{BoxError, CoreError, InstantiationError};
pub use discovery::TypeDiscovery;
pub use instantiation::FactoryBinding;
pub use config::{BootstrapSettings, ConfigError, ConfigSource, ConfigurationRecord, ConfigurationResolver, ConfigurationSchema, EnvironmentSettings, ResolvedConfiguration};
pub use layer::{ServiceLayerConfiguration, ServiceLayerResolver, ServiceLayerSchema};
pub use startup::{StartupWriterRegistry, TraceSource};
pub use bootstrap::{Bootstrap, BootstrapReport, SlotState};
pub use providers::builtin_registry;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine information
pub const ENGINE_NAME: &str = "wireup";

/// Get engine version
pub fn version() -> &'static str {
    VERSION
}

/// Get engine name
pub fn name() -> &'static str {
    ENGINE_NAME
}
