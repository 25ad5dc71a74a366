//! Safe instantiation of configured types.
//!
//! Every ordinary failure is classified as an [`InstantiationError`]. A panic
//! raised by a constructor is a fatal construction error and is never caught
//! here, whatever the mode.

use crate::errors::{CoreError, InstantiationError};
use crate::foundation::{Capability, TypeKind, TypeRef};
use std::fmt;
use std::sync::Arc;

/// An instance created from a configured type, together with that type
pub struct FactoryBinding<C: ?Sized> {
    type_ref: TypeRef,
    instance: Arc<C>,
}

impl<C: ?Sized> FactoryBinding<C> {
    pub fn new(type_ref: TypeRef, instance: Arc<C>) -> Self {
        Self { type_ref, instance }
    }

    /// The type the instance was created from
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn type_name(&self) -> &str {
        self.type_ref.name()
    }

    pub fn instance(&self) -> &Arc<C> {
        &self.instance
    }

    pub fn into_instance(self) -> Arc<C> {
        self.instance
    }
}

impl<C: ?Sized> Clone for FactoryBinding<C> {
    fn clone(&self) -> Self {
        Self {
            type_ref: self.type_ref.clone(),
            instance: Arc::clone(&self.instance),
        }
    }
}

impl<C: ?Sized> fmt::Debug for FactoryBinding<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBinding")
            .field("type", &self.type_ref.name())
            .finish()
    }
}

/// Try to create an instance of `C` from a configured type
pub fn try_create<C: Capability + ?Sized>(
    type_ref: Option<&TypeRef>,
) -> Result<FactoryBinding<C>, InstantiationError> {
    let type_ref = type_ref.ok_or(InstantiationError::NullReference)?;

    match type_ref.kind() {
        TypeKind::Interface => {
            return Err(InstantiationError::Interface {
                type_name: type_ref.name().to_string(),
            })
        }
        TypeKind::Abstract => {
            return Err(InstantiationError::Abstract {
                type_name: type_ref.name().to_string(),
            })
        }
        TypeKind::Concrete => {}
    }

    let constructor =
        type_ref
            .constructor::<C>()
            .ok_or_else(|| InstantiationError::MissingConstructor {
                capability: C::NAME,
                type_name: type_ref.name().to_string(),
            })?;

    let instance = constructor().map_err(|source| InstantiationError::ConstructorFailed {
        capability: C::NAME,
        type_name: type_ref.name().to_string(),
        source,
    })?;

    Ok(FactoryBinding::new(type_ref.clone(), instance))
}

/// Create an instance, recording the failure message instead of failing
pub fn create_or_accumulate<C: Capability + ?Sized>(
    type_ref: Option<&TypeRef>,
    errors: &mut Vec<String>,
) -> Option<FactoryBinding<C>> {
    match try_create::<C>(type_ref) {
        Ok(binding) => Some(binding),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    }
}

/// Create an instance; on failure return `None`, or a bootstrap failure when `strict`
pub fn create_or_throw<C: Capability + ?Sized>(
    type_ref: Option<&TypeRef>,
    strict: bool,
) -> Result<Option<FactoryBinding<C>>, CoreError> {
    match try_create::<C>(type_ref) {
        Ok(binding) => Ok(Some(binding)),
        Err(e) if strict => Err(CoreError::bootstrap(e.to_string())),
        Err(_) => Ok(None),
    }
}

/// Two-tier resolution: the custom type unless it is unset or fails, then the default.
///
/// When both tiers fail in strict mode the bootstrap failure names both
/// causes.
pub fn resolve_with_fallback<C: Capability + ?Sized>(
    custom: Option<&TypeRef>,
    default: Option<&TypeRef>,
    strict: bool,
) -> Result<Option<FactoryBinding<C>>, CoreError> {
    let mut custom_failure = None;
    if let Some(custom) = custom.filter(|t| !t.is_sentinel()) {
        match try_create::<C>(Some(custom)) {
            Ok(binding) => return Ok(Some(binding)),
            Err(e) => {
                tracing::warn!(
                    capability = C::NAME,
                    error = %e,
                    "Custom implementation unusable, falling back to default"
                );
                custom_failure = Some(e);
            }
        }
    }

    match try_create::<C>(default) {
        Ok(binding) => Ok(Some(binding)),
        Err(e) if strict => Err(match custom_failure {
            Some(custom_err) => CoreError::bootstrap(format!(
                "{}; custom implementation {} unusable: {}",
                e,
                custom_err.type_name().unwrap_or(C::NAME),
                custom_err
            )),
            None => CoreError::bootstrap(e.to_string()),
        }),
        Err(_) => Ok(None),
    }
}

/// Create an instance for every listed type, in order
pub fn create_many<C: Capability + ?Sized>(
    type_refs: Option<&[TypeRef]>,
    strict: bool,
) -> Result<Vec<FactoryBinding<C>>, CoreError> {
    let mut created = Vec::new();
    for type_ref in type_refs.unwrap_or_default() {
        if let Some(binding) = create_or_throw::<C>(Some(type_ref), strict)? {
            created.push(binding);
        }
    }
    Ok(created)
}

/// Convert a fixed array of values into an owned list.
///
/// `None` stays `None`, an empty slice becomes an empty list.
pub fn as_list<T: Clone>(values: Option<&[T]>) -> Option<Vec<T>> {
    values.map(<[T]>::to_vec)
}
