pub mod check;
pub mod discover;

use std::path::Path;
use std::sync::Arc;
use wireup_core::{
    builtin_registry, BootstrapSettings, EnvironmentSettings, FileSystemResources, TypeDiscovery,
};

/// Settings from the environment with command-line overrides applied
pub fn settings(base_path: Option<&str>, strict: bool) -> anyhow::Result<BootstrapSettings> {
    let mut settings = BootstrapSettings::from_env()?;
    if let Some(base_path) = base_path {
        settings = settings.with_base_path(base_path);
    }
    if strict {
        settings = settings.strict(true);
    }
    Ok(settings)
}

/// Discovery over the built-in registry and a resource directory
pub fn discovery(root: &Path) -> TypeDiscovery {
    TypeDiscovery::new(
        Arc::new(builtin_registry()),
        Arc::new(FileSystemResources::new(root)),
    )
}
