use std::path::Path;
use wireup_core::foundation::resource_path;
use wireup_core::TypeDiscovery;

/// One listed entry, whether the registry knows it and whether it can be instantiated
#[derive(Debug)]
pub struct Entry {
    pub name: String,
    pub loadable: bool,
    pub instantiable: bool,
    pub capabilities: Vec<&'static str>,
}

pub fn entries(discovery: &TypeDiscovery, path: &str) -> Vec<Entry> {
    discovery
        .entries(path)
        .into_iter()
        .map(|name| {
            let loaded = discovery.registry().load_by_name(&name);
            Entry {
                loadable: loaded.is_some(),
                instantiable: loaded.as_ref().is_some_and(|t| t.is_instantiable()),
                capabilities: loaded
                    .map(|t| t.capabilities().map(|c| c.name()).collect())
                    .unwrap_or_default(),
                name,
            }
        })
        .collect()
}

pub fn run(root: &Path, base_path: Option<&str>, resource: &str, json: bool) -> anyhow::Result<()> {
    let settings = super::settings(base_path, false)?;
    let discovery = super::discovery(root);
    let path = resource_path(&settings.base_path, resource);

    if !discovery.exists(&path) {
        anyhow::bail!("resource {} not found below {}", path, root.display());
    }

    let entries = entries(&discovery, &path);
    if json {
        let listed: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.name,
                    "loadable": e.loadable,
                    "instantiable": e.instantiable,
                    "capabilities": e.capabilities,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listed)?);
        return Ok(());
    }

    println!("{} ({} entries)", path, entries.len());
    for entry in &entries {
        if entry.loadable {
            let marker = if entry.instantiable { "" } else { " (not instantiable)" };
            println!("  ✓ {} [{}]{}", entry.name, entry.capabilities.join(", "), marker);
        } else {
            println!("  ✗ {} (not loadable)", entry.name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use wireup_core::providers::{RUNTIME_INFO_STARTUP_WRITER, VERIFIER_FACTORY};
    use wireup_core::{builtin_registry, FileSystemResources, TypeDescriptor};

    #[test]
    fn test_entries_mark_unloadable_types() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("writers"),
            format!("{}\napp.Missing\n{}\n", RUNTIME_INFO_STARTUP_WRITER, VERIFIER_FACTORY),
        )
        .unwrap();

        let listed = entries(&crate::commands::discovery(dir.path()), "writers");
        assert_eq!(listed.len(), 3);
        assert!(listed[0].loadable);
        assert!(listed[0].instantiable);
        assert_eq!(listed[0].capabilities, vec!["wireup.StartupWriter"]);
        assert!(!listed[1].loadable);
        assert!(listed[1].capabilities.is_empty());
        assert_eq!(listed[2].capabilities, vec!["wireup.VerifierFactory"]);
    }

    #[test]
    fn test_entries_keep_registered_abstract_types_loadable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("writers"), "app.BaseWriter
").unwrap();

        let registry = builtin_registry().with(TypeDescriptor::abstract_type("app.BaseWriter"));
        let discovery = TypeDiscovery::new(
            Arc::new(registry),
            Arc::new(FileSystemResources::new(dir.path())),
        );

        let listed = entries(&discovery, "writers");
        assert_eq!(listed.len(), 1);
        assert!(listed[0].loadable);
        assert!(!listed[0].instantiable);
    }
}
