//! Type discovery from resource files.
//!
//! A discovery resource lists one fully-qualified type name per line. Names
//! are loaded from the [`TypeRegistry`] and optionally checked against a
//! required capability.
//!
//! Plural lookups ([`TypeDiscovery::read_many`]) are best effort and drop
//! entries that cannot be loaded or do not satisfy the capability. Singular
//! lookups ([`TypeDiscovery::read_one`]) never guess: more than one entry,
//! an unloadable entry or a non-conforming entry is a configuration error.

use crate::errors::CoreError;
use crate::foundation::{parse_entries, parse_lines, CapabilityId, ResourceSource, TypeRef, TypeRegistry};
use std::fmt;
use std::sync::Arc;

/// Resolves resource files into registered types
#[derive(Clone)]
pub struct TypeDiscovery {
    registry: Arc<TypeRegistry>,
    resources: Arc<dyn ResourceSource>,
}

impl TypeDiscovery {
    /// Create a new discovery over a registry and a resource source
    pub fn new(registry: Arc<TypeRegistry>, resources: Arc<dyn ResourceSource>) -> Self {
        Self {
            registry,
            resources,
        }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn resources(&self) -> &Arc<dyn ResourceSource> {
        &self.resources
    }

    /// Raw entries listed in the resource; a missing resource has none
    pub fn entries(&self, path: &str) -> Vec<String> {
        self.resources
            .read(path)
            .map(|content| parse_entries(&content))
            .unwrap_or_default()
    }

    /// Check if the resource is reachable
    pub fn exists(&self, path: &str) -> bool {
        self.resources.exists(path)
    }

    /// Load the single type named by the resource.
    ///
    /// Returns `Ok(None)` when the resource is missing or lists no entry. A
    /// name listed twice still counts as two entries.
    pub fn read_one(
        &self,
        path: &str,
        capability: Option<CapabilityId>,
    ) -> Result<Option<TypeRef>, CoreError> {
        let entries = self
            .resources
            .read(path)
            .map(|content| parse_lines(&content))
            .unwrap_or_default();
        match entries.as_slice() {
            [] => Ok(None),
            [name] => {
                let type_ref = self.registry.load_by_name(name).ok_or_else(|| {
                    CoreError::configuration(format!(
                        "class {} listed in file {} could not be loaded",
                        name, path
                    ))
                })?;

                if let Some(capability) = capability {
                    if !type_ref.satisfies(capability) {
                        return Err(CoreError::configuration(format!(
                            "class {} listed in file {} does not implement {}",
                            name, path, capability
                        )));
                    }
                }

                tracing::debug!(path, type_name = %type_ref, "Discovered single type");
                Ok(Some(type_ref))
            }
            _ => Err(CoreError::configuration(format!(
                "file {} contains more than one class name: {}",
                path,
                entries.join(", ")
            ))),
        }
    }

    /// Load every type named by the resource, in listed order.
    ///
    /// Entries that cannot be loaded or do not satisfy the capability are
    /// dropped.
    pub fn read_many(&self, path: &str, capability: Option<CapabilityId>) -> Vec<TypeRef> {
        self.entries(path)
            .into_iter()
            .filter_map(|name| match self.registry.load_by_name(&name) {
                Some(type_ref) => Some(type_ref),
                None => {
                    tracing::debug!(path, type_name = %name, "Skipping unloadable entry");
                    None
                }
            })
            .filter(|type_ref| match capability {
                Some(capability) if !type_ref.satisfies(capability) => {
                    tracing::debug!(
                        path,
                        type_name = %type_ref,
                        capability = %capability,
                        "Skipping entry without required capability"
                    );
                    false
                }
                _ => true,
            })
            .collect()
    }
}

impl fmt::Debug for TypeDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDiscovery")
            .field("registry", &self.registry.len())
            .field("resources", &self.resources.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{StaticResources, TypeDescriptor};

    trait Plugin: Send + Sync {}

    crate::capability! {
        dyn Plugin => "test.Plugin",
    }

    struct PluginA;

    impl Plugin for PluginA {}

    fn discovery(resources: StaticResources) -> TypeDiscovery {
        let registry = TypeRegistry::new()
            .with(TypeDescriptor::concrete("test.A").implements::<dyn Plugin, _>(|| Ok(Arc::new(PluginA))))
            .with(TypeDescriptor::concrete("test.B").implements::<dyn Plugin, _>(|| Ok(Arc::new(PluginA))))
            .with(TypeDescriptor::concrete("test.Plain"));
        TypeDiscovery::new(Arc::new(registry), Arc::new(resources))
    }

    #[test]
    fn test_read_one_empty_and_missing() {
        let discovery = discovery(StaticResources::new().with("CONFIG", "# nothing here\n"));
        assert!(discovery.read_one("CONFIG", None).unwrap().is_none());
        assert!(discovery.read_one("MISSING", None).unwrap().is_none());
    }

    #[test]
    fn test_read_one_single_entry() {
        let discovery = discovery(StaticResources::new().with("CONFIG", "test.A\n"));
        let found = discovery
            .read_one("CONFIG", Some(CapabilityId::of::<dyn Plugin>()))
            .unwrap()
            .unwrap();
        assert_eq!(found.name(), "test.A");
    }

    #[test]
    fn test_read_one_rejects_multiple_entries() {
        let discovery = discovery(StaticResources::new().with("CONFIG", "test.A\ntest.B\n"));
        let err = discovery.read_one("CONFIG", None).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("contains more than one class name"));
        assert!(err.to_string().contains("CONFIG"));
    }

    #[test]
    fn test_read_one_rejects_repeated_entry() {
        let discovery = discovery(StaticResources::new().with("CONFIG", "test.A\ntest.A\n"));
        let err = discovery.read_one("CONFIG", None).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("test.A, test.A"));

        assert_eq!(discovery.read_many("CONFIG", None).len(), 1);
    }

    #[test]
    fn test_read_one_rejects_unloadable_and_nonconforming() {
        let discovery = discovery(
            StaticResources::new()
                .with("UNKNOWN", "test.Missing")
                .with("PLAIN", "test.Plain"),
        );
        assert!(discovery.read_one("UNKNOWN", None).unwrap_err().is_configuration());
        assert!(discovery.read_one("PLAIN", None).unwrap().is_some());
        let err = discovery
            .read_one("PLAIN", Some(CapabilityId::of::<dyn Plugin>()))
            .unwrap_err();
        assert!(err.to_string().contains("does not implement test.Plugin"));
    }

    #[test]
    fn test_read_many_drops_bad_entries() {
        let discovery = discovery(
            StaticResources::new().with("PLUGINS", "test.B\ntest.Missing\ntest.Plain\ntest.A\n"),
        );
        let names: Vec<String> = discovery
            .read_many("PLUGINS", Some(CapabilityId::of::<dyn Plugin>()))
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(names, vec!["test.B", "test.A"]);

        assert_eq!(discovery.read_many("PLUGINS", None).len(), 3);
        assert!(discovery.read_many("MISSING", None).is_empty());
    }

    #[test]
    fn test_exists() {
        let discovery = discovery(StaticResources::new().with("CONFIG", ""));
        assert!(discovery.exists("CONFIG"));
        assert!(!discovery.exists("OTHER"));
    }
}
