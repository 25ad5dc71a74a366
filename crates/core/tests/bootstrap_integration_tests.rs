//! Bootstrap scenarios over the built-in registry and custom configurations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::Level;
use wireup_core::config::ConfigurationRecord;
use wireup_core::providers::{register_builtins, RUNTIME_INFO_STARTUP_WRITER};
use wireup_core::services::*;
use wireup_core::*;

static CUSTOM_WRITES: AtomicUsize = AtomicUsize::new(0);

struct UpperMessages;

impl MessageRepository for UpperMessages {
    fn message(&self, _locale: &str, key: &str) -> Option<String> {
        Some(key.to_uppercase())
    }
}

struct UpperMessagesFactory;

impl MessageRepositoryFactory for UpperMessagesFactory {
    fn message_repository(&self) -> Arc<dyn MessageRepository> {
        Arc::new(UpperMessages)
    }
}

#[derive(Default)]
struct RecordingTrace {
    lines: Mutex<Vec<String>>,
}

impl TraceProvider for RecordingTrace {
    fn name(&self) -> &str {
        "recording"
    }

    fn trace(&self, _level: Level, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

struct CountingWriter;

impl StartupWriter for CountingWriter {
    fn milestone(&self) -> Milestone {
        Milestone::of::<Bootstrap>()
    }

    fn write(&self, _trace: &dyn TraceProvider, _level: Level) {
        CUSTOM_WRITES.fetch_add(1, Ordering::SeqCst);
    }
}

fn registry_with(extra: Vec<TypeDescriptor>) -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    register_builtins(&mut registry);
    for descriptor in extra {
        registry.register(descriptor);
    }
    registry
}

fn discovery(registry: TypeRegistry, resources: StaticResources) -> TypeDiscovery {
    TypeDiscovery::new(Arc::new(registry), Arc::new(resources))
}

fn upper_messages() -> TypeDescriptor {
    TypeDescriptor::concrete("app.UpperMessagesFactory")
        .implements::<dyn MessageRepositoryFactory, _>(|| Ok(Arc::new(UpperMessagesFactory)))
}

#[test]
fn test_bootstrap_with_builtin_defaults() {
    let bootstrap = Bootstrap::new(
        BootstrapSettings::default(),
        discovery(registry_with(vec![]), StaticResources::new()),
    )
    .unwrap();

    let configuration = bootstrap.configuration();
    assert!(configuration.is_default_available());
    assert!(!configuration.is_custom_available());
    assert_eq!(configuration.error_count(), 0);

    assert!(bootstrap.bindings().values().all(Option::is_some));
    assert_eq!(bootstrap.bindings().len(), 7);
    assert!(bootstrap.verifier().unwrap().verify("numeric", "12").is_ok());
    assert_eq!(
        bootstrap
            .datatype_converter_registry()
            .unwrap()
            .convert("boolean", "yes")
            .unwrap(),
        "true"
    );
    assert!(!bootstrap.info_provider().unwrap().info().is_empty());
}

#[test]
fn test_tracing_is_resolved_lazily() {
    let bootstrap = Bootstrap::new(
        BootstrapSettings::default(),
        discovery(registry_with(vec![]), StaticResources::new()),
    )
    .unwrap();

    // Firing the bootstrap milestone needed a tracing service
    assert_eq!(bootstrap.tracing_state(), SlotState::Resolved);
    assert_eq!(bootstrap.trace_provider().name(), "tracing");
}

#[test]
fn test_custom_configuration_overrides_default() {
    let custom = ServiceLayerConfiguration::unset()
        .with_message_repository_factory(upper_messages().into())
        .with_application_name("shop")
        .with_supported_locales(vec![]);
    let registry = registry_with(vec![
        upper_messages(),
        TypeDescriptor::concrete("app.ShopConfiguration").with_configuration(custom),
    ]);
    let resources = StaticResources::new().with("META-INF/wireup/wireup.configuration", "app.ShopConfiguration\n");

    let bootstrap = Bootstrap::new(BootstrapSettings::default(), discovery(registry, resources)).unwrap();

    let configuration = bootstrap.configuration();
    assert!(configuration.is_custom_available());
    assert_eq!(configuration.custom_type_name(), Some("app.ShopConfiguration"));
    assert_eq!(
        bootstrap.message_repository_factory().unwrap().type_name(),
        "app.UpperMessagesFactory"
    );
    assert_eq!(
        bootstrap.message_repository().unwrap().message("en", "hi").as_deref(),
        Some("HI")
    );
    // Sentinel fields fall back to the built-in default
    assert!(bootstrap.verifier_factory().is_some());
    assert_eq!(bootstrap.resolver().application_name().as_deref(), Some("shop"));
    assert_eq!(bootstrap.resolver().supported_locales(), Some(vec![]));
}

#[test]
fn test_custom_sentinels_are_reported_not_fatal() {
    let custom = ServiceLayerConfiguration::unset().with_message_repository_factory(upper_messages().into());
    let registry = registry_with(vec![
        upper_messages(),
        TypeDescriptor::concrete("app.PartialConfiguration").with_configuration(custom),
    ]);
    let resources =
        StaticResources::new().with("META-INF/wireup/wireup.configuration", "app.PartialConfiguration");

    let bootstrap = Bootstrap::new(BootstrapSettings::default(), discovery(registry, resources)).unwrap();

    // One error per factory field left at its sentinel
    assert_eq!(bootstrap.configuration().error_count(), 7);
    assert!(bootstrap.configuration().errors().iter().all(|e| e.ends_with("Configured class is an interface")));
    assert!(bootstrap.report().bindings.values().all(Option::is_some));
}

#[test]
fn test_strict_mode_fails_on_configuration_errors() {
    let custom = ServiceLayerConfiguration::unset();
    let registry = registry_with(vec![TypeDescriptor::concrete("app.Empty").with_configuration(custom)]);
    let resources = StaticResources::new().with("META-INF/wireup/wireup.configuration", "app.Empty");

    let err = Bootstrap::new(BootstrapSettings::default().strict(true), discovery(registry, resources)).unwrap_err();
    assert!(err.is_bootstrap());
    assert!(err.to_string().contains("found 8 error(s) during analysis of configuration"));
}

#[test]
fn test_no_configuration_source_is_fatal() {
    let settings = BootstrapSettings::default().with_default_configuration("app.Missing");
    let err = Bootstrap::new(settings, discovery(registry_with(vec![]), StaticResources::new())).unwrap_err();

    let message = err.to_string();
    assert!(err.is_bootstrap());
    assert!(message.contains("app.Missing"));
    assert!(message.contains("META-INF/wireup/wireup.configuration"));
}

#[test]
fn test_ambiguous_custom_resource_is_a_configuration_error() {
    let resources = StaticResources::new().with("META-INF/wireup/wireup.configuration", "a.One\na.Two\n");
    let err = Bootstrap::new(
        BootstrapSettings::default(),
        discovery(registry_with(vec![]), resources),
    )
    .unwrap_err();

    assert!(err.is_configuration());
    assert!(err.to_string().contains("contains more than one class name"));
}

#[test]
fn test_discovered_and_declared_startup_writers_fire() {
    let writer = TypeDescriptor::concrete("app.CountingWriter")
        .implements::<dyn StartupWriter, _>(|| Ok(Arc::new(CountingWriter)));
    let custom = ServiceLayerConfiguration::unset().with_startup_writers(vec![writer.into()]);
    let mut registry = registry_with(vec![TypeDescriptor::concrete("app.Writers").with_configuration(custom)]);
    registry.register(
        TypeDescriptor::concrete("app.CountingWriter")
            .implements::<dyn StartupWriter, _>(|| Ok(Arc::new(CountingWriter))),
    );
    let resources = StaticResources::new()
        .with("META-INF/wireup/wireup.configuration", "app.Writers")
        .with(
            "META-INF/wireup/wireup.startup-writers",
            format!("{}\napp.CountingWriter\napp.Unknown\n", RUNTIME_INFO_STARTUP_WRITER),
        );

    let before = CUSTOM_WRITES.load(Ordering::SeqCst);
    let bootstrap = Bootstrap::new(BootstrapSettings::default(), discovery(registry, resources)).unwrap();

    assert_eq!(
        bootstrap.startup_writers().names(),
        [
            "wireup.Bootstrap",
            RUNTIME_INFO_STARTUP_WRITER,
            "app.CountingWriter",
            "app.CountingWriter"
        ]
    );
    assert_eq!(CUSTOM_WRITES.load(Ordering::SeqCst) - before, 2);
}

#[test]
fn test_configured_trace_provider_is_used() {
    let recording = Arc::new(RecordingTrace::default());
    let shared = Arc::clone(&recording);

    struct Fixed(Arc<RecordingTrace>);
    impl TraceProviderFactory for Fixed {
        fn trace_provider(&self) -> Arc<dyn TraceProvider> {
            self.0.clone()
        }
    }

    let factory = TypeDescriptor::concrete("app.RecordingTraceFactory")
        .implements::<dyn TraceProviderFactory, _>(move || Ok(Arc::new(Fixed(Arc::clone(&shared)))));
    let custom = ServiceLayerConfiguration::unset().with_trace_provider_factory(factory.into());
    let registry = registry_with(vec![TypeDescriptor::concrete("app.Traced").with_configuration(custom)]);
    let resources = StaticResources::new().with("META-INF/wireup/wireup.configuration", "app.Traced");

    let bootstrap = Bootstrap::new(BootstrapSettings::default(), discovery(registry, resources)).unwrap();

    assert_eq!(bootstrap.trace_provider().name(), "recording");
    let lines = recording.lines.lock().unwrap();
    assert!(lines[0].starts_with(&format!("service layer {} ready", bootstrap.instance_id())));
}

#[test]
fn test_unusable_trace_factory_falls_back_to_default() {
    let broken = TypeDescriptor::concrete("app.BrokenTraceFactory").implements::<dyn TraceProviderFactory, _>(|| {
        Err("tracing backend offline".into())
    });
    let custom = ServiceLayerConfiguration::unset().with_trace_provider_factory(broken.into());
    let registry = registry_with(vec![TypeDescriptor::concrete("app.Broken").with_configuration(custom)]);
    let resources = StaticResources::new().with("META-INF/wireup/wireup.configuration", "app.Broken");

    let bootstrap = Bootstrap::new(BootstrapSettings::default(), discovery(registry, resources)).unwrap();

    assert_eq!(bootstrap.trace_provider().name(), "tracing");
    assert_eq!(bootstrap.tracing_state(), SlotState::Resolved);
}

#[test]
fn test_unusable_trace_factories_degrade_to_builtin_tracing() {
    let mut registry = TypeRegistry::new();
    let default = register_builtins(&mut registry);
    let broken = registry.register(
        TypeDescriptor::concrete("app.OfflineTraceFactory")
            .implements::<dyn TraceProviderFactory, _>(|| Err("tracing backend offline".into())),
    );
    let layer = default
        .configuration::<ServiceLayerConfiguration>()
        .cloned()
        .unwrap()
        .with_trace_provider_factory(broken);
    registry.register(TypeDescriptor::concrete("app.Offline").with_configuration(layer));

    let resources = StaticResources::new().with("META-INF/wireup/wireup.configuration", "app.Offline");
    let settings = BootstrapSettings::default().with_default_configuration("app.NoDefault");
    let bootstrap = Bootstrap::new(settings, discovery(registry, resources)).unwrap();

    // Neither the custom factory nor a default one can supply tracing
    assert!(!bootstrap.configuration().is_default_available());
    assert_eq!(bootstrap.tracing_state(), SlotState::Unresolved);

    assert_eq!(bootstrap.trace_provider().name(), "tracing");
    assert_eq!(bootstrap.tracing_state(), SlotState::Resolved);
    assert_eq!(bootstrap.trace_provider().name(), "tracing");
}

#[test]
fn test_reload_builds_a_new_instance() {
    let bootstrap = Bootstrap::new(
        BootstrapSettings::default(),
        discovery(registry_with(vec![]), StaticResources::new()),
    )
    .unwrap();

    let reloaded = bootstrap.reload().unwrap();
    assert_ne!(reloaded.instance_id(), bootstrap.instance_id());
    assert_eq!(reloaded.bindings(), bootstrap.bindings());
}

#[test]
fn test_report_serializes() {
    let bootstrap = Bootstrap::new(
        BootstrapSettings::default(),
        discovery(registry_with(vec![]), StaticResources::new()),
    )
    .unwrap();

    let report = bootstrap.report();
    assert!(report.is_clean());
    assert!(!report.custom_configuration.resource_exists);

    let yaml = report.to_yaml().unwrap();
    assert!(yaml.contains("default_configuration"));
    assert!(yaml.contains("wireup.DefaultServiceLayer"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["tracing"], "resolved");
    assert_eq!(json["settings"]["exception_on_error"], false);
}
