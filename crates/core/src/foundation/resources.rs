use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Where discovery resource files are read from
pub trait ResourceSource: Send + Sync {
    /// Read the whole resource, `None` when it is missing or unreadable
    fn read(&self, path: &str) -> Option<String>;

    /// Check if the resource is reachable, without parsing it
    fn exists(&self, path: &str) -> bool;

    /// Human-readable description for diagnostics
    fn describe(&self) -> String;
}

/// Resources stored as files below a root directory
#[derive(Debug, Clone)]
pub struct FileSystemResources {
    root: PathBuf,
}

impl FileSystemResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resources relative to the process working directory
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceSource for FileSystemResources {
    fn read(&self, path: &str) -> Option<String> {
        let file = self.root.join(path);
        match std::fs::read_to_string(&file) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::debug!(path = %file.display(), error = %e, "Unreadable resource treated as empty");
                None
            }
        }
    }

    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn describe(&self) -> String {
        format!("file system ({})", self.root.display())
    }
}

/// In-memory resources, keyed by full path
#[derive(Debug, Clone, Default)]
pub struct StaticResources {
    entries: HashMap<String, String>,
}

impl StaticResources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource
    pub fn with(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(path.into(), content.into());
    }
}

impl ResourceSource for StaticResources {
    fn read(&self, path: &str) -> Option<String> {
        self.entries.get(path).cloned()
    }

    fn exists(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    fn describe(&self) -> String {
        format!("static ({} resources)", self.entries.len())
    }
}

impl fmt::Debug for dyn ResourceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceSource")
            .field("source", &self.describe())
            .finish()
    }
}

/// Join a base path and a resource name
pub fn resource_path(base_path: &str, resource_name: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        resource_name.to_string()
    } else {
        format!("{}/{}", base, resource_name)
    }
}

/// Every non-comment line of a resource, trimmed, in order.
///
/// Repeated names are kept so callers can tell how many entries a resource
/// really lists.
pub fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        })
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Type names listed in a resource, in order.
///
/// Each line names one type. Blank lines and `#` comments are ignored and
/// repeated names are kept once.
pub fn parse_entries(content: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for name in parse_lines(content) {
        if !entries.contains(&name) {
            entries.push(name);
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entries_skips_comments_and_duplicates() {
        let content = "# header\n\n  acme.A  \nacme.B # trailing\nacme.A\n   \n#acme.C\n";
        assert_eq!(parse_entries(content), vec!["acme.A", "acme.B"]);
        assert!(parse_entries("").is_empty());
    }

    #[test]
    fn test_parse_lines_keeps_repeated_names() {
        let content = "acme.A\n# acme.B\n  acme.A # again\n\n";
        assert_eq!(parse_lines(content), vec!["acme.A", "acme.A"]);
        assert_eq!(parse_entries(content), vec!["acme.A"]);
    }

    #[test]
    fn test_resource_path_joins_base() {
        assert_eq!(resource_path("META-INF/wireup", "x"), "META-INF/wireup/x");
        assert_eq!(resource_path("META-INF/wireup/", "x"), "META-INF/wireup/x");
        assert_eq!(resource_path("", "x"), "x");
    }

    #[test]
    fn test_file_system_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("conf")).unwrap();
        std::fs::write(dir.path().join("conf/types"), "acme.A\n").unwrap();

        let resources = FileSystemResources::new(dir.path());
        assert!(resources.exists("conf/types"));
        assert_eq!(resources.read("conf/types").as_deref(), Some("acme.A\n"));
        assert!(!resources.exists("conf/missing"));
        assert!(resources.read("conf/missing").is_none());
        assert!(!resources.exists("conf"));
    }

    #[test]
    fn test_static_resources() {
        let resources = StaticResources::new().with("a/b", "acme.A");
        assert!(resources.exists("a/b"));
        assert_eq!(resources.read("a/b").as_deref(), Some("acme.A"));
        assert!(resources.read("a/c").is_none());
    }
}
