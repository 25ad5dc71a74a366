//! Process-wide access to the service layer.
//!
//! Holds at most one [`Bootstrap`]. Readers load it without locking;
//! [`initialize`] is serialized and idempotent. [`reload`] swaps in a fresh
//! instance, and a reader racing with it may observe either one.

use crate::bootstrap::Bootstrap;
use crate::config::{BootstrapSettings, EnvironmentSettings};
use crate::discovery::TypeDiscovery;
use crate::errors::CoreError;
use crate::foundation::{FileSystemResources, TypeRegistry};
use crate::layer::ServiceLayerConfiguration;
use crate::services::*;
use crate::trace::EmergencyTraceProvider;
use arc_swap::ArcSwapOption;
use serde::Serialize;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

static CURRENT: ArcSwapOption<Bootstrap> = ArcSwapOption::const_empty();
static INIT: Mutex<()> = Mutex::new(());
static PHASE: AtomicU8 = AtomicU8::new(Phase::Uninitialized as u8);

/// Lifecycle of the process-wide service layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Phase {
    Uninitialized = 0,
    Constructing = 1,
    Ready = 2,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::Constructing,
            2 => Phase::Ready,
            _ => Phase::Uninitialized,
        }
    }
}

fn set_phase(phase: Phase) {
    PHASE.store(phase as u8, Ordering::SeqCst);
}

pub fn phase() -> Phase {
    Phase::from_u8(PHASE.load(Ordering::SeqCst))
}

/// Resets the phase when construction fails or unwinds
struct Constructing {
    done: bool,
}

impl Drop for Constructing {
    fn drop(&mut self) {
        if !self.done {
            set_phase(Phase::Uninitialized);
        }
    }
}

/// Bootstrap the process-wide service layer, unless already done.
///
/// On failure nothing is installed and the error is returned.
pub fn initialize(settings: BootstrapSettings, discovery: TypeDiscovery) -> Result<Arc<Bootstrap>, CoreError> {
    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(current) = CURRENT.load_full() {
        return Ok(current);
    }

    set_phase(Phase::Constructing);
    let mut constructing = Constructing { done: false };

    let bootstrap = Arc::new(Bootstrap::new(settings, discovery)?);
    CURRENT.store(Some(Arc::clone(&bootstrap)));
    set_phase(Phase::Ready);
    constructing.done = true;

    tracing::info!(instance = %bootstrap.instance_id(), "Service layer initialized");
    Ok(bootstrap)
}

/// Bootstrap from the process environment, reading resources below the
/// working directory.
pub fn initialize_from_env(registry: TypeRegistry) -> Result<Arc<Bootstrap>, CoreError> {
    let settings = BootstrapSettings::from_env()?;
    let discovery = TypeDiscovery::new(Arc::new(registry), Arc::new(FileSystemResources::current_dir()));
    initialize(settings, discovery)
}

/// Install an already constructed bootstrap, replacing any current one
pub fn install(bootstrap: Bootstrap) -> Arc<Bootstrap> {
    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    let bootstrap = Arc::new(bootstrap);
    CURRENT.store(Some(Arc::clone(&bootstrap)));
    set_phase(Phase::Ready);
    bootstrap
}

pub fn current() -> Option<Arc<Bootstrap>> {
    CURRENT.load_full()
}

/// The current bootstrap, or an error if none is installed
pub fn try_current() -> Result<Arc<Bootstrap>, CoreError> {
    current().ok_or_else(|| CoreError::bootstrap("service layer has not been initialized"))
}

/// Replace the current bootstrap with a freshly constructed one
pub fn reload() -> Result<Arc<Bootstrap>, CoreError> {
    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    let previous = try_current()?;
    let next = Arc::new(previous.reload()?);
    CURRENT.store(Some(Arc::clone(&next)));
    Ok(next)
}

/// Remove the current bootstrap
pub fn reset() -> Option<Arc<Bootstrap>> {
    let _init = INIT.lock().unwrap_or_else(PoisonError::into_inner);
    set_phase(Phase::Uninitialized);
    CURRENT.swap(None)
}

/// The tracing service; a stateless fallback before initialization
pub fn trace() -> Arc<dyn TraceProvider> {
    match current() {
        Some(bootstrap) => bootstrap.trace_provider(),
        None => Arc::new(EmergencyTraceProvider),
    }
}

/// The authoritative configuration record
pub fn configuration() -> Result<ServiceLayerConfiguration, CoreError> {
    Ok(try_current()?.configuration().authoritative().clone())
}

pub fn message_repository() -> Option<Arc<dyn MessageRepository>> {
    current()?.message_repository()
}

pub fn verifier() -> Option<Arc<dyn Verifier>> {
    current()?.verifier()
}

pub fn configuration_provider() -> Option<Arc<dyn ConfigurationProvider>> {
    current()?.configuration_provider()
}

pub fn locale_provider() -> Option<Arc<dyn LocaleProvider>> {
    current()?.locale_provider()
}

pub fn principal_provider() -> Option<Arc<dyn PrincipalProvider>> {
    current()?.principal_provider()
}

pub fn info_provider() -> Option<Arc<dyn InfoProvider>> {
    current()?.info_provider()
}

pub fn datatype_converter_registry() -> Option<Arc<dyn DatatypeConverterRegistry>> {
    current()?.datatype_converter_registry()
}
