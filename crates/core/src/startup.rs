//! Startup notification: observers fired once per milestone.

use crate::discovery::TypeDiscovery;
use crate::errors::CoreError;
use crate::foundation::CapabilityId;
use crate::instantiation::{create_many, FactoryBinding};
use crate::services::{Milestone, StartupWriter, TraceProvider};
use crate::trace::{EmergencyLogger, EmergencyTraceProvider};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Something able to hand out the current tracing service
pub trait TraceSource {
    fn try_trace_provider(&self) -> Result<Arc<dyn TraceProvider>, CoreError>;
}

#[derive(Clone)]
struct RegisteredWriter {
    name: String,
    writer: Arc<dyn StartupWriter>,
}

/// Startup writers grouped by the milestone they observe
#[derive(Clone, Default)]
pub struct StartupWriterRegistry {
    writers: HashMap<Milestone, Vec<RegisteredWriter>>,
    order: Vec<String>,
}

impl StartupWriterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from every writer type listed in the resource at `path`
    pub fn discover(discovery: &TypeDiscovery, path: &str, strict: bool) -> Result<Self, CoreError> {
        let types = discovery.read_many(path, Some(CapabilityId::of::<dyn StartupWriter>()));
        let mut registry = Self::new();
        registry.extend(create_many::<dyn StartupWriter>(Some(&types), strict)?);

        tracing::debug!(path, count = registry.len(), "Discovered startup writers");
        Ok(registry)
    }

    /// Append writers after the ones already registered
    pub fn extend(&mut self, bindings: impl IntoIterator<Item = FactoryBinding<dyn StartupWriter>>) {
        for binding in bindings {
            let entry = RegisteredWriter {
                name: binding.type_name().to_string(),
                writer: binding.into_instance(),
            };
            self.order.push(entry.name.clone());
            self.writers
                .entry(entry.writer.milestone())
                .or_default()
                .push(entry);
        }
    }

    /// Register a writer ahead of every other writer of its milestone
    pub fn prepend(&mut self, name: impl Into<String>, writer: Arc<dyn StartupWriter>) {
        let entry = RegisteredWriter {
            name: name.into(),
            writer,
        };
        self.order.insert(0, entry.name.clone());
        self.writers
            .entry(entry.writer.milestone())
            .or_default()
            .insert(0, entry);
    }

    /// Writers observing a milestone, in firing order
    pub fn writers_for(&self, milestone: Milestone) -> Vec<Arc<dyn StartupWriter>> {
        self.writers
            .get(&milestone)
            .map(|entries| entries.iter().map(|e| Arc::clone(&e.writer)).collect())
            .unwrap_or_default()
    }

    /// Names of all registered writers, in registration order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Notify every writer observing `milestone`.
    ///
    /// When the tracing service cannot be resolved the writers get the
    /// emergency provider instead.
    pub fn fire(&self, milestone: Milestone, level: Level, source: &dyn TraceSource) {
        let writers = self.writers_for(milestone);
        if writers.is_empty() {
            return;
        }

        let trace: Arc<dyn TraceProvider> = match source.try_trace_provider() {
            Ok(trace) => trace,
            Err(e) => {
                EmergencyLogger::warn(&format!(
                    "unable to resolve tracing service, startup diagnostics are degraded: {}",
                    e
                ));
                Arc::new(EmergencyTraceProvider)
            }
        };

        for writer in writers {
            writer.write(trace.as_ref(), level);
        }
    }
}

impl fmt::Debug for StartupWriterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartupWriterRegistry")
            .field("writers", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{StaticResources, TypeDescriptor, TypeRegistry};
    use std::sync::Mutex;

    struct Started;
    struct Stopped;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
    }

    impl TraceProvider for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn trace(&self, level: Level, message: &str) {
            self.lines.lock().unwrap().push(format!("{} {}", level, message));
        }
    }

    struct Fixed(Arc<Recorder>);

    impl TraceSource for Fixed {
        fn try_trace_provider(&self) -> Result<Arc<dyn TraceProvider>, CoreError> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl TraceSource for Broken {
        fn try_trace_provider(&self) -> Result<Arc<dyn TraceProvider>, CoreError> {
            Err(CoreError::bootstrap("no tracing"))
        }
    }

    struct Named(&'static str, Milestone);

    impl StartupWriter for Named {
        fn milestone(&self) -> Milestone {
            self.1
        }

        fn write(&self, trace: &dyn TraceProvider, level: Level) {
            trace.trace(level, self.0);
        }
    }

    /// Records which tracing service each write went to
    struct SeenBy {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl StartupWriter for SeenBy {
        fn milestone(&self) -> Milestone {
            Milestone::of::<Started>()
        }

        fn write(&self, trace: &dyn TraceProvider, _level: Level) {
            self.seen.lock().unwrap().push(trace.name().to_string());
        }
    }

    fn discovery(listing: &str) -> TypeDiscovery {
        let registry = TypeRegistry::new()
            .with(TypeDescriptor::concrete("w.First").implements::<dyn StartupWriter, _>(|| {
                Ok(Arc::new(Named("first", Milestone::of::<Started>())))
            }))
            .with(TypeDescriptor::concrete("w.Second").implements::<dyn StartupWriter, _>(|| {
                Ok(Arc::new(Named("second", Milestone::of::<Started>())))
            }))
            .with(TypeDescriptor::concrete("w.Late").implements::<dyn StartupWriter, _>(|| {
                Ok(Arc::new(Named("late", Milestone::of::<Stopped>())))
            }))
            .with(TypeDescriptor::concrete("w.NotAWriter"));
        let resources = StaticResources::new().with("writers", listing);
        TypeDiscovery::new(Arc::new(registry), Arc::new(resources))
    }

    #[test]
    fn test_discover_groups_by_milestone_in_order() {
        let registry =
            StartupWriterRegistry::discover(&discovery("w.Second\nw.Late\nw.First\nw.Missing\nw.NotAWriter"), "writers", false)
                .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), ["w.Second", "w.Late", "w.First"]);
        assert_eq!(registry.writers_for(Milestone::of::<Started>()).len(), 2);
        assert_eq!(registry.writers_for(Milestone::of::<Stopped>()).len(), 1);
    }

    #[test]
    fn test_fire_invokes_writers_in_order() {
        let mut registry =
            StartupWriterRegistry::discover(&discovery("w.First\nw.Second\nw.Late"), "writers", false).unwrap();
        registry.prepend("self", Arc::new(Named("self", Milestone::of::<Started>())));

        let recorder = Arc::new(Recorder::default());
        registry.fire(Milestone::of::<Started>(), Level::INFO, &Fixed(recorder.clone()));

        assert_eq!(
            *recorder.lines.lock().unwrap(),
            vec!["INFO self", "INFO first", "INFO second"]
        );
        assert_eq!(registry.names()[0], "self");
    }

    #[test]
    fn test_fire_without_writers_is_noop() {
        let registry = StartupWriterRegistry::new();
        let recorder = Arc::new(Recorder::default());
        registry.fire(Milestone::of::<Started>(), Level::INFO, &Fixed(recorder.clone()));
        assert!(recorder.lines.lock().unwrap().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_fire_degrades_to_emergency_provider() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = StartupWriterRegistry::new();
        registry.prepend(
            "seen",
            Arc::new(SeenBy {
                seen: seen.clone(),
            }),
        );

        registry.fire(Milestone::of::<Started>(), Level::DEBUG, &Broken);
        assert_eq!(*seen.lock().unwrap(), vec!["emergency"]);

        let recorder = Arc::new(Recorder::default());
        registry.fire(Milestone::of::<Started>(), Level::DEBUG, &Fixed(recorder));
        assert_eq!(*seen.lock().unwrap(), vec!["emergency", "recorder"]);
    }

    #[test]
    fn test_missing_resource_yields_empty_registry() {
        let registry = StartupWriterRegistry::discover(&discovery(""), "absent", true).unwrap();
        assert!(registry.is_empty());
    }
}
