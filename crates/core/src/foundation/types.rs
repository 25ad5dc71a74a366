use crate::errors::BoxError;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// An abstraction that configured types can implement.
///
/// Implemented for `dyn Trait` objects so that the capability and the trait
/// object it produces are the same type:
///
/// ```ignore
/// impl Capability for dyn TraceProviderFactory {
///     const NAME: &'static str = "wireup.TraceProviderFactory";
/// }
/// ```
pub trait Capability: 'static {
    /// Fully-qualified name of the abstraction
    const NAME: &'static str;
}

/// Declares [`Capability`] for one or more trait objects.
#[macro_export]
macro_rules! capability {
    ($($target:ty => $name:expr),* $(,)?) => {
        $(
            impl $crate::foundation::Capability for $target {
                const NAME: &'static str = $name;
            }
        )*
    };
}

/// Runtime identity of a capability
#[derive(Debug, Clone, Copy)]
pub struct CapabilityId {
    type_id: TypeId,
    name: &'static str,
}

impl CapabilityId {
    /// Identity of the capability `C`
    pub fn of<C: Capability + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: C::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl PartialEq for CapabilityId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for CapabilityId {}

impl Hash for CapabilityId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What kind of type a descriptor stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A concrete type that may carry constructors
    Concrete,
    /// An abstraction; never instantiable. Used as the "not configured" sentinel.
    Interface,
    /// A partial implementation; never instantiable
    Abstract,
}

/// Zero-argument constructor producing the capability `C`
pub type CapabilityConstructor<C> = Arc<dyn Fn() -> Result<Arc<C>, BoxError> + Send + Sync>;

struct ConstructorEntry {
    capability: CapabilityId,
    constructor: Option<Box<dyn Any + Send + Sync>>,
}

/// Everything the engine knows about one named type
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    capabilities: Vec<ConstructorEntry>,
    configuration: Option<Arc<dyn Any + Send + Sync>>,
}

impl TypeDescriptor {
    /// Describe a concrete type
    pub fn concrete(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Concrete)
    }

    /// Describe an abstract type
    pub fn abstract_type(name: impl Into<String>) -> Self {
        Self::with_kind(name, TypeKind::Abstract)
    }

    /// Describe the abstraction `C` itself
    pub fn interface<C: Capability + ?Sized>() -> Self {
        Self::with_kind(C::NAME, TypeKind::Interface).declares::<C>()
    }

    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            capabilities: Vec::new(),
            configuration: None,
        }
    }

    /// Declare that this type implements `C` and how to build it
    pub fn implements<C, F>(mut self, constructor: F) -> Self
    where
        C: Capability + ?Sized,
        F: Fn() -> Result<Arc<C>, BoxError> + Send + Sync + 'static,
    {
        let constructor: CapabilityConstructor<C> = Arc::new(constructor);
        self.capabilities.retain(|entry| entry.capability != CapabilityId::of::<C>());
        self.capabilities.push(ConstructorEntry {
            capability: CapabilityId::of::<C>(),
            constructor: Some(Box::new(constructor)),
        });
        self
    }

    /// Declare that this type implements `C` without an accessible constructor
    pub fn declares<C: Capability + ?Sized>(mut self) -> Self {
        if !self.satisfies(CapabilityId::of::<C>()) {
            self.capabilities.push(ConstructorEntry {
                capability: CapabilityId::of::<C>(),
                constructor: None,
            });
        }
        self
    }

    /// Attach the configuration record this type carries
    pub fn with_configuration<R: Any + Send + Sync>(mut self, record: R) -> Self {
        self.configuration = Some(Arc::new(record));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Check if the type can ever be instantiated
    pub fn is_instantiable(&self) -> bool {
        self.kind == TypeKind::Concrete
    }

    /// Check if the type declares the capability
    pub fn satisfies(&self, capability: CapabilityId) -> bool {
        self.capabilities
            .iter()
            .any(|entry| entry.capability == capability)
    }

    /// Capabilities declared by this type, in declaration order
    pub fn capabilities(&self) -> impl Iterator<Item = CapabilityId> + '_ {
        self.capabilities.iter().map(|entry| entry.capability)
    }

    /// Constructor producing `C`, if the type has an accessible one
    pub fn constructor<C: Capability + ?Sized>(&self) -> Option<&CapabilityConstructor<C>> {
        self.capabilities
            .iter()
            .find(|entry| entry.capability == CapabilityId::of::<C>())
            .and_then(|entry| entry.constructor.as_ref())
            .and_then(|constructor| constructor.downcast_ref::<CapabilityConstructor<C>>())
    }

    /// Configuration record of type `R` carried by this type
    pub fn configuration<R: Any + Send + Sync>(&self) -> Option<&R> {
        self.configuration
            .as_ref()
            .and_then(|record| record.downcast_ref::<R>())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field(
                "capabilities",
                &self.capabilities().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("configuration", &self.configuration.is_some())
            .finish()
    }
}

/// Shared reference to a described type.
///
/// Two references are equal when they name the same type.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeDescriptor>);

impl TypeRef {
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self(Arc::new(descriptor))
    }

    /// The "not configured" sentinel for fields of capability `C`
    pub fn sentinel<C: Capability + ?Sized>() -> Self {
        Self::new(TypeDescriptor::interface::<C>())
    }

    /// Check if this is the sentinel of any capability
    pub fn is_sentinel(&self) -> bool {
        self.0.kind == TypeKind::Interface
    }
}

impl Deref for TypeRef {
    type Target = TypeDescriptor;

    fn deref(&self) -> &TypeDescriptor {
        &self.0
    }
}

impl From<TypeDescriptor> for TypeRef {
    fn from(descriptor: TypeDescriptor) -> Self {
        Self::new(descriptor)
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for TypeRef {}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.0.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Name-addressed registry of loadable types.
///
/// Stands in for a runtime type registry: a type is "loadable" exactly when
/// a descriptor with its fully-qualified name was registered.
#[derive(Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeRef>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type, replacing any earlier registration with the same name
    pub fn register(&mut self, descriptor: impl Into<TypeRef>) -> TypeRef {
        let type_ref = descriptor.into();
        if self
            .types
            .insert(type_ref.name().to_string(), type_ref.clone())
            .is_some()
        {
            tracing::debug!(type_name = %type_ref, "Replaced registered type");
        }
        type_ref
    }

    /// Builder-style registration
    pub fn with(mut self, descriptor: impl Into<TypeRef>) -> Self {
        self.register(descriptor);
        self
    }

    /// Load a type by its fully-qualified name
    pub fn load_by_name(&self, name: &str) -> Option<TypeRef> {
        self.types.get(name).cloned()
    }

    /// Check if a type name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// All registered types satisfying the capability
    pub fn implementations_of(&self, capability: CapabilityId) -> Vec<TypeRef> {
        self.types
            .values()
            .filter(|t| t.is_instantiable() && t.satisfies(capability))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    trait Other: Send + Sync {}

    crate::capability! {
        dyn Greeter => "test.Greeter",
        dyn Other => "test.Other",
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn test_constructor_lookup_by_capability() {
        let descriptor = TypeDescriptor::concrete("test.English")
            .implements::<dyn Greeter, _>(|| Ok(Arc::new(English)));

        assert!(descriptor.satisfies(CapabilityId::of::<dyn Greeter>()));
        assert!(!descriptor.satisfies(CapabilityId::of::<dyn Other>()));

        let constructor = descriptor.constructor::<dyn Greeter>().unwrap();
        assert_eq!(constructor().unwrap().greet(), "hello");
        assert!(descriptor.constructor::<dyn Other>().is_none());
    }

    #[test]
    fn test_declared_capability_without_constructor() {
        let descriptor = TypeDescriptor::concrete("test.NoCtor").declares::<dyn Greeter>();
        assert!(descriptor.satisfies(CapabilityId::of::<dyn Greeter>()));
        assert!(descriptor.constructor::<dyn Greeter>().is_none());
    }

    #[test]
    fn test_sentinel_is_interface_of_capability() {
        let sentinel = TypeRef::sentinel::<dyn Greeter>();
        assert!(sentinel.is_sentinel());
        assert!(!sentinel.is_instantiable());
        assert_eq!(sentinel.name(), "test.Greeter");
        assert_eq!(sentinel, TypeRef::sentinel::<dyn Greeter>());
    }

    #[test]
    fn test_configuration_downcast() {
        let descriptor = TypeDescriptor::concrete("test.Configured").with_configuration(42u32);
        assert_eq!(descriptor.configuration::<u32>(), Some(&42));
        assert!(descriptor.configuration::<String>().is_none());
    }

    #[test]
    fn test_registry_load_and_replace() {
        let mut registry = TypeRegistry::new()
            .with(TypeDescriptor::concrete("test.A"))
            .with(TypeDescriptor::abstract_type("test.B"));

        assert_eq!(registry.len(), 2);
        assert!(registry.load_by_name("test.A").is_some());
        assert!(registry.load_by_name("test.C").is_none());

        registry.register(
            TypeDescriptor::concrete("test.A").implements::<dyn Greeter, _>(|| Ok(Arc::new(English))),
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.implementations_of(CapabilityId::of::<dyn Greeter>()),
            vec![registry.load_by_name("test.A").unwrap()]
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["test.A", "test.B"]);
    }
}
