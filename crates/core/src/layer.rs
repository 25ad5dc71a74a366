//! The service-layer configuration record and its resolver.

use crate::config::{ConfigurationRecord, ConfigurationResolver, ConfigurationSchema, DEFAULT_CONFIGURATION_TYPE};
use crate::errors::CoreError;
use crate::foundation::{Capability, TypeRef};
use crate::instantiation::{try_create, FactoryBinding};
use crate::services::{
    ConfigurationProviderFactory, DatatypeConverterRegistryFactory, InfoProviderFactory,
    LocaleProviderFactory, MessageRepositoryFactory, PrincipalProviderFactory, StartupWriter,
    TraceProviderFactory, VerifierFactory,
};

/// Which implementation backs each service of the layer
#[derive(Debug, Clone)]
pub struct ServiceLayerConfiguration {
    pub message_repository_factory: TypeRef,
    pub verifier_factory: TypeRef,
    pub configuration_provider_factory: TypeRef,
    pub locale_provider_factory: TypeRef,
    pub principal_provider_factory: TypeRef,
    pub info_provider_factory: TypeRef,
    pub datatype_converter_registry_factory: TypeRef,
    pub trace_provider_factory: TypeRef,
    /// Startup writers declared in addition to discovered ones
    pub startup_writers: Option<Vec<TypeRef>>,
    pub application_name: Option<String>,
    pub supported_locales: Option<Vec<String>>,
}

impl ConfigurationRecord for ServiceLayerConfiguration {
    fn unset() -> Self {
        Self {
            message_repository_factory: TypeRef::sentinel::<dyn MessageRepositoryFactory>(),
            verifier_factory: TypeRef::sentinel::<dyn VerifierFactory>(),
            configuration_provider_factory: TypeRef::sentinel::<dyn ConfigurationProviderFactory>(),
            locale_provider_factory: TypeRef::sentinel::<dyn LocaleProviderFactory>(),
            principal_provider_factory: TypeRef::sentinel::<dyn PrincipalProviderFactory>(),
            info_provider_factory: TypeRef::sentinel::<dyn InfoProviderFactory>(),
            datatype_converter_registry_factory: TypeRef::sentinel::<dyn DatatypeConverterRegistryFactory>(),
            trace_provider_factory: TypeRef::sentinel::<dyn TraceProviderFactory>(),
            startup_writers: None,
            application_name: None,
            supported_locales: None,
        }
    }
}

impl ServiceLayerConfiguration {
    pub fn with_message_repository_factory(mut self, type_ref: TypeRef) -> Self {
        self.message_repository_factory = type_ref;
        self
    }

    pub fn with_verifier_factory(mut self, type_ref: TypeRef) -> Self {
        self.verifier_factory = type_ref;
        self
    }

    pub fn with_configuration_provider_factory(mut self, type_ref: TypeRef) -> Self {
        self.configuration_provider_factory = type_ref;
        self
    }

    pub fn with_locale_provider_factory(mut self, type_ref: TypeRef) -> Self {
        self.locale_provider_factory = type_ref;
        self
    }

    pub fn with_principal_provider_factory(mut self, type_ref: TypeRef) -> Self {
        self.principal_provider_factory = type_ref;
        self
    }

    pub fn with_info_provider_factory(mut self, type_ref: TypeRef) -> Self {
        self.info_provider_factory = type_ref;
        self
    }

    pub fn with_datatype_converter_registry_factory(mut self, type_ref: TypeRef) -> Self {
        self.datatype_converter_registry_factory = type_ref;
        self
    }

    pub fn with_trace_provider_factory(mut self, type_ref: TypeRef) -> Self {
        self.trace_provider_factory = type_ref;
        self
    }

    pub fn with_startup_writers(mut self, writers: Vec<TypeRef>) -> Self {
        self.startup_writers = Some(writers);
        self
    }

    pub fn with_application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    pub fn with_supported_locales(mut self, locales: Vec<String>) -> Self {
        self.supported_locales = Some(locales);
        self
    }
}

/// Schema of [`ServiceLayerConfiguration`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceLayerSchema;

fn check<C: Capability + ?Sized>(type_ref: &TypeRef, errors: &mut Vec<String>) {
    if let Err(e) = try_create::<C>(Some(type_ref)) {
        errors.push(e.to_string());
    }
}

impl ConfigurationSchema for ServiceLayerSchema {
    type Record = ServiceLayerConfiguration;

    fn default_type_name(&self) -> &str {
        DEFAULT_CONFIGURATION_TYPE
    }

    fn validate(&self, record: &ServiceLayerConfiguration) -> Vec<String> {
        let mut errors = Vec::new();
        check::<dyn MessageRepositoryFactory>(&record.message_repository_factory, &mut errors);
        check::<dyn VerifierFactory>(&record.verifier_factory, &mut errors);
        check::<dyn ConfigurationProviderFactory>(&record.configuration_provider_factory, &mut errors);
        check::<dyn LocaleProviderFactory>(&record.locale_provider_factory, &mut errors);
        check::<dyn PrincipalProviderFactory>(&record.principal_provider_factory, &mut errors);
        check::<dyn InfoProviderFactory>(&record.info_provider_factory, &mut errors);
        check::<dyn DatatypeConverterRegistryFactory>(
            &record.datatype_converter_registry_factory,
            &mut errors,
        );
        check::<dyn TraceProviderFactory>(&record.trace_provider_factory, &mut errors);

        for writer in record.startup_writers.iter().flatten() {
            check::<dyn StartupWriter>(writer, &mut errors);
        }
        errors
    }
}

/// Resolver of the service-layer configuration
pub type ServiceLayerResolver = ConfigurationResolver<ServiceLayerSchema>;

impl ConfigurationResolver<ServiceLayerSchema> {
    pub fn message_repository_factory(
        &self,
    ) -> Result<Option<FactoryBinding<dyn MessageRepositoryFactory>>, CoreError> {
        self.resolve(|r| &r.message_repository_factory)
    }

    pub fn verifier_factory(&self) -> Result<Option<FactoryBinding<dyn VerifierFactory>>, CoreError> {
        self.resolve(|r| &r.verifier_factory)
    }

    pub fn configuration_provider_factory(
        &self,
    ) -> Result<Option<FactoryBinding<dyn ConfigurationProviderFactory>>, CoreError> {
        self.resolve(|r| &r.configuration_provider_factory)
    }

    pub fn locale_provider_factory(
        &self,
    ) -> Result<Option<FactoryBinding<dyn LocaleProviderFactory>>, CoreError> {
        self.resolve(|r| &r.locale_provider_factory)
    }

    pub fn principal_provider_factory(
        &self,
    ) -> Result<Option<FactoryBinding<dyn PrincipalProviderFactory>>, CoreError> {
        self.resolve(|r| &r.principal_provider_factory)
    }

    pub fn info_provider_factory(&self) -> Result<Option<FactoryBinding<dyn InfoProviderFactory>>, CoreError> {
        self.resolve(|r| &r.info_provider_factory)
    }

    pub fn datatype_converter_registry_factory(
        &self,
    ) -> Result<Option<FactoryBinding<dyn DatatypeConverterRegistryFactory>>, CoreError> {
        self.resolve(|r| &r.datatype_converter_registry_factory)
    }

    pub fn trace_provider_factory(&self) -> Result<Option<FactoryBinding<dyn TraceProviderFactory>>, CoreError> {
        self.resolve(|r| &r.trace_provider_factory)
    }

    /// Startup writers the authoritative record declares
    pub fn declared_startup_writers(&self) -> Result<Vec<FactoryBinding<dyn StartupWriter>>, CoreError> {
        self.resolve_many(|r| r.startup_writers.as_deref())
    }

    pub fn application_name(&self) -> Option<String> {
        self.configuration().authoritative().application_name.clone()
    }

    pub fn supported_locales(&self) -> Option<Vec<String>> {
        self.list(|r| r.supported_locales.as_deref())
    }
}
