use crate::bootstrap::Bootstrap;
use crate::config::{ConfigurationRecord, DEFAULT_CONFIGURATION_TYPE};
use crate::foundation::{TypeDescriptor, TypeRef, TypeRegistry};
use crate::layer::ServiceLayerConfiguration;
use crate::providers::builtin::*;
use crate::services::*;
use std::sync::Arc;
use tracing::Level;

pub const RUNTIME_INFO_STARTUP_WRITER: &str = "wireup.builtin.RuntimeInfoStartupWriter";

/// Writes the runtime information once bootstrap completes
#[derive(Debug, Default)]
pub struct RuntimeInfoStartupWriter;

impl StartupWriter for RuntimeInfoStartupWriter {
    fn milestone(&self) -> Milestone {
        Milestone::of::<Bootstrap>()
    }

    fn write(&self, trace: &dyn TraceProvider, level: Level) {
        if !trace.is_enabled(level) {
            return;
        }
        for (key, value) in RuntimeInfoProvider.info() {
            trace.trace(level, &format!("{} = {}", key, value));
        }
    }
}

/// Register every built-in type into `registry`, including the default
/// configuration-bearing type that binds them together.
pub fn register_builtins(registry: &mut TypeRegistry) -> TypeRef {
    let trace = registry.register(TypeDescriptor::concrete(TRACE_PROVIDER_FACTORY).implements::<
        dyn TraceProviderFactory,
        _,
    >(|| Ok(Arc::new(TracingTraceProviderFactory))));
    let messages = registry.register(
        TypeDescriptor::concrete(MESSAGE_REPOSITORY_FACTORY)
            .implements::<dyn MessageRepositoryFactory, _>(|| Ok(Arc::new(InMemoryMessageRepositoryFactory))),
    );
    let verifier = registry.register(
        TypeDescriptor::concrete(VERIFIER_FACTORY)
            .implements::<dyn VerifierFactory, _>(|| Ok(Arc::new(RuleVerifierFactory))),
    );
    let configuration = registry.register(
        TypeDescriptor::concrete(CONFIGURATION_PROVIDER_FACTORY).implements::<
            dyn ConfigurationProviderFactory,
            _,
        >(|| Ok(Arc::new(EnvConfigurationProviderFactory))),
    );
    let locale = registry.register(
        TypeDescriptor::concrete(LOCALE_PROVIDER_FACTORY)
            .implements::<dyn LocaleProviderFactory, _>(|| Ok(Arc::new(EnvLocaleProviderFactory))),
    );
    let principal = registry.register(
        TypeDescriptor::concrete(PRINCIPAL_PROVIDER_FACTORY).implements::<
            dyn PrincipalProviderFactory,
            _,
        >(|| Ok(Arc::new(ProcessPrincipalProviderFactory))),
    );
    let info = registry.register(
        TypeDescriptor::concrete(INFO_PROVIDER_FACTORY)
            .implements::<dyn InfoProviderFactory, _>(|| Ok(Arc::new(RuntimeInfoProviderFactory))),
    );
    let datatypes = registry.register(
        TypeDescriptor::concrete(DATATYPE_CONVERTER_REGISTRY_FACTORY).implements::<
            dyn DatatypeConverterRegistryFactory,
            _,
        >(|| Ok(Arc::new(StandardDatatypeConverterRegistryFactory))),
    );
    registry.register(
        TypeDescriptor::concrete(RUNTIME_INFO_STARTUP_WRITER)
            .implements::<dyn StartupWriter, _>(|| Ok(Arc::new(RuntimeInfoStartupWriter))),
    );

    let layer = ServiceLayerConfiguration::unset()
        .with_trace_provider_factory(trace)
        .with_message_repository_factory(messages)
        .with_verifier_factory(verifier)
        .with_configuration_provider_factory(configuration)
        .with_locale_provider_factory(locale)
        .with_principal_provider_factory(principal)
        .with_info_provider_factory(info)
        .with_datatype_converter_registry_factory(datatypes);

    registry.register(TypeDescriptor::concrete(DEFAULT_CONFIGURATION_TYPE).with_configuration(layer))
}

/// A registry holding only the built-in types
pub fn builtin_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    register_builtins(&mut registry);
    registry
}
