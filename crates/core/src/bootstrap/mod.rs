//! The bootstrapped service layer.
//!
//! A [`Bootstrap`] is built once from [`BootstrapSettings`] and a
//! [`TypeDiscovery`]. Construction resolves the configuration and binds every
//! service factory except tracing, which is resolved lazily on first use
//! through a [`GuardedSlot`] so that resolving it may itself log.

pub mod diagnostics;
pub mod report;
pub mod slot;

pub use report::*;
pub use slot::*;

use crate::config::{BootstrapSettings, EnvironmentSettings, ResolvedConfiguration};
use crate::discovery::TypeDiscovery;
use crate::errors::CoreError;
use crate::instantiation::FactoryBinding;
use crate::layer::{ServiceLayerConfiguration, ServiceLayerResolver, ServiceLayerSchema};
use crate::providers::TracingTraceProviderFactory;
use crate::services::*;
use crate::startup::{StartupWriterRegistry, TraceSource};
use crate::trace::{EmergencyLogger, EmergencyTraceProvider};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::Level;
use uuid::Uuid;

/// Name the bootstrap registers its own startup writer under
pub const BOOTSTRAP_WRITER_NAME: &str = "wireup.Bootstrap";

/// The service layer of one process
pub struct Bootstrap {
    instance_id: Uuid,
    started_at: DateTime<Utc>,
    settings: BootstrapSettings,
    discovery: TypeDiscovery,
    resolver: ServiceLayerResolver,
    message_repository: Option<FactoryBinding<dyn MessageRepositoryFactory>>,
    verifier: Option<FactoryBinding<dyn VerifierFactory>>,
    configuration_provider: Option<FactoryBinding<dyn ConfigurationProviderFactory>>,
    locale_provider: Option<FactoryBinding<dyn LocaleProviderFactory>>,
    principal_provider: Option<FactoryBinding<dyn PrincipalProviderFactory>>,
    info_provider: Option<FactoryBinding<dyn InfoProviderFactory>>,
    datatype_converter_registry: Option<FactoryBinding<dyn DatatypeConverterRegistryFactory>>,
    trace: GuardedSlot<dyn TraceProvider>,
    startup_writers: StartupWriterRegistry,
}

impl Bootstrap {
    /// Bootstrap the service layer.
    ///
    /// Fires the bootstrap milestone before returning. Failures are logged
    /// through the emergency logger and returned.
    pub fn new(settings: BootstrapSettings, discovery: TypeDiscovery) -> Result<Self, CoreError> {
        Self::construct(settings, discovery).map_err(|e| {
            EmergencyLogger::error(&format!("service layer bootstrap failed: {}", e));
            e
        })
    }

    fn construct(settings: BootstrapSettings, discovery: TypeDiscovery) -> Result<Self, CoreError> {
        let started = Instant::now();
        let started_at = Utc::now();
        let instance_id = Uuid::new_v4();

        diagnostics::emit(&settings, &discovery);

        let resolver = ServiceLayerResolver::new(ServiceLayerSchema, &discovery, settings.resolver_options())?;

        let message_repository = resolver.message_repository_factory()?;
        let verifier = resolver.verifier_factory()?;
        let configuration_provider = resolver.configuration_provider_factory()?;
        let locale_provider = resolver.locale_provider_factory()?;
        let principal_provider = resolver.principal_provider_factory()?;
        let info_provider = resolver.info_provider_factory()?;
        let datatype_converter_registry = resolver.datatype_converter_registry_factory()?;

        let mut startup_writers = StartupWriterRegistry::discover(
            &discovery,
            &settings.startup_writers_path(),
            settings.exception_on_error,
        )?;
        startup_writers.extend(resolver.declared_startup_writers()?);

        let mut bootstrap = Self {
            instance_id,
            started_at,
            settings,
            discovery,
            resolver,
            message_repository,
            verifier,
            configuration_provider,
            locale_provider,
            principal_provider,
            info_provider,
            datatype_converter_registry,
            trace: GuardedSlot::new(),
            startup_writers,
        };

        let summary = BootstrapSummaryWriter {
            instance_id,
            bound: bootstrap.bindings().values().filter(|b| b.is_some()).count(),
            errors: bootstrap.configuration().error_count(),
            elapsed_ms: started.elapsed().as_millis(),
        };
        bootstrap
            .startup_writers
            .prepend(BOOTSTRAP_WRITER_NAME, Arc::new(summary));

        bootstrap
            .startup_writers
            .fire(Milestone::of::<Bootstrap>(), Level::INFO, &bootstrap);

        Ok(bootstrap)
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn settings(&self) -> &BootstrapSettings {
        &self.settings
    }

    pub fn discovery(&self) -> &TypeDiscovery {
        &self.discovery
    }

    pub fn resolver(&self) -> &ServiceLayerResolver {
        &self.resolver
    }

    /// The resolved service-layer configuration
    pub fn configuration(&self) -> &ResolvedConfiguration<ServiceLayerConfiguration> {
        self.resolver.configuration()
    }

    pub fn startup_writers(&self) -> &StartupWriterRegistry {
        &self.startup_writers
    }

    /// The tracing service.
    ///
    /// Resolved on first call. Never blocks and never fails: a call made
    /// while resolution is in flight gets a fresh emergency provider.
    pub fn trace_provider(&self) -> Arc<dyn TraceProvider> {
        if let Some(trace) = self.trace.get() {
            return trace;
        }

        self.trace
            .resolve(|| match self.resolve_trace_provider() {
                Ok(trace) => trace,
                Err(e) => {
                    self.trace_provider().trace(
                        Level::WARN,
                        &format!("falling back to built-in tracing: {}", e),
                    );
                    TracingTraceProviderFactory.trace_provider()
                }
            })
            .unwrap_or_else(|| Arc::new(EmergencyTraceProvider))
    }

    fn resolve_trace_provider(&self) -> Result<Arc<dyn TraceProvider>, CoreError> {
        match self.resolver.trace_provider_factory()? {
            Some(binding) => Ok(binding.instance().trace_provider()),
            None => Err(CoreError::bootstrap("no usable trace provider factory configured")),
        }
    }

    pub fn tracing_state(&self) -> SlotState {
        self.trace.state()
    }

    pub fn message_repository_factory(&self) -> Option<&FactoryBinding<dyn MessageRepositoryFactory>> {
        self.message_repository.as_ref()
    }

    pub fn verifier_factory(&self) -> Option<&FactoryBinding<dyn VerifierFactory>> {
        self.verifier.as_ref()
    }

    pub fn configuration_provider_factory(&self) -> Option<&FactoryBinding<dyn ConfigurationProviderFactory>> {
        self.configuration_provider.as_ref()
    }

    pub fn locale_provider_factory(&self) -> Option<&FactoryBinding<dyn LocaleProviderFactory>> {
        self.locale_provider.as_ref()
    }

    pub fn principal_provider_factory(&self) -> Option<&FactoryBinding<dyn PrincipalProviderFactory>> {
        self.principal_provider.as_ref()
    }

    pub fn info_provider_factory(&self) -> Option<&FactoryBinding<dyn InfoProviderFactory>> {
        self.info_provider.as_ref()
    }

    pub fn datatype_converter_registry_factory(
        &self,
    ) -> Option<&FactoryBinding<dyn DatatypeConverterRegistryFactory>> {
        self.datatype_converter_registry.as_ref()
    }

    pub fn message_repository(&self) -> Option<Arc<dyn MessageRepository>> {
        self.message_repository
            .as_ref()
            .map(|b| b.instance().message_repository())
    }

    pub fn verifier(&self) -> Option<Arc<dyn Verifier>> {
        self.verifier.as_ref().map(|b| b.instance().verifier())
    }

    pub fn configuration_provider(&self) -> Option<Arc<dyn ConfigurationProvider>> {
        self.configuration_provider
            .as_ref()
            .map(|b| b.instance().configuration_provider())
    }

    pub fn locale_provider(&self) -> Option<Arc<dyn LocaleProvider>> {
        self.locale_provider
            .as_ref()
            .map(|b| b.instance().locale_provider())
    }

    pub fn principal_provider(&self) -> Option<Arc<dyn PrincipalProvider>> {
        self.principal_provider
            .as_ref()
            .map(|b| b.instance().principal_provider())
    }

    pub fn info_provider(&self) -> Option<Arc<dyn InfoProvider>> {
        self.info_provider.as_ref().map(|b| b.instance().info_provider())
    }

    pub fn datatype_converter_registry(&self) -> Option<Arc<dyn DatatypeConverterRegistry>> {
        self.datatype_converter_registry
            .as_ref()
            .map(|b| b.instance().datatype_converter_registry())
    }

    /// Bound implementation name of every eagerly resolved role
    pub fn bindings(&self) -> BTreeMap<String, Option<String>> {
        fn name<C: ?Sized>(binding: &Option<FactoryBinding<C>>) -> Option<String> {
            binding.as_ref().map(|b| b.type_name().to_string())
        }

        [
            ("message_repository_factory", name(&self.message_repository)),
            ("verifier_factory", name(&self.verifier)),
            ("configuration_provider_factory", name(&self.configuration_provider)),
            ("locale_provider_factory", name(&self.locale_provider)),
            ("principal_provider_factory", name(&self.principal_provider)),
            ("info_provider_factory", name(&self.info_provider)),
            ("datatype_converter_registry_factory", name(&self.datatype_converter_registry)),
        ]
        .into_iter()
        .map(|(role, bound)| (role.to_string(), bound))
        .collect()
    }

    /// Build a fresh bootstrap from the same settings and discovery.
    ///
    /// The new instance fires its own startup milestone. This one is left
    /// untouched.
    pub fn reload(&self) -> Result<Self, CoreError> {
        self.trace_provider().trace(
            Level::WARN,
            &format!("reloading service layer configuration (instance {})", self.instance_id),
        );
        Self::new(self.settings.clone(), self.discovery.clone())
    }

    pub fn report(&self) -> BootstrapReport {
        let configuration = self.configuration();
        let custom_path = configuration.custom_resource_path().to_string();

        BootstrapReport {
            instance_id: self.instance_id,
            started_at: self.started_at,
            version: crate::VERSION.to_string(),
            settings: self.settings.clone(),
            setting_sources: self.settings.config_sources(),
            default_configuration: DefaultSourceReport {
                type_name: configuration.default_type_name().to_string(),
                available: configuration.is_default_available(),
            },
            custom_configuration: CustomSourceReport {
                resource_exists: self.discovery.exists(&custom_path),
                resource: custom_path,
                type_name: configuration.custom_type_name().map(str::to_string),
                available: configuration.is_custom_available(),
            },
            application_name: self.resolver.application_name(),
            supported_locales: self.resolver.supported_locales(),
            bindings: self.bindings(),
            tracing: self.tracing_state(),
            startup_writers: self.startup_writers.names().to_vec(),
            errors: configuration.errors().to_vec(),
        }
    }
}

impl TraceSource for Bootstrap {
    fn try_trace_provider(&self) -> Result<Arc<dyn TraceProvider>, CoreError> {
        if let Some(trace) = self.trace.get() {
            return Ok(trace);
        }
        let resolved = self.trace.try_resolve(|| self.resolve_trace_provider())?;
        Ok(resolved.unwrap_or_else(|| Arc::new(EmergencyTraceProvider)))
    }
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("instance_id", &self.instance_id)
            .field("started_at", &self.started_at)
            .field("bindings", &self.bindings())
            .field("tracing", &self.tracing_state())
            .field("startup_writers", &self.startup_writers)
            .finish()
    }
}

/// First observer of the bootstrap milestone: a one-line summary
#[derive(Debug)]
struct BootstrapSummaryWriter {
    instance_id: Uuid,
    bound: usize,
    errors: usize,
    elapsed_ms: u128,
}

impl StartupWriter for BootstrapSummaryWriter {
    fn milestone(&self) -> Milestone {
        Milestone::of::<Bootstrap>()
    }

    fn write(&self, trace: &dyn TraceProvider, level: Level) {
        trace.trace(
            level,
            &format!(
                "service layer {} ready in {} ms: {} of 7 services bound, {} configuration error(s)",
                self.instance_id, self.elapsed_ms, self.bound, self.errors
            ),
        );
    }
}
