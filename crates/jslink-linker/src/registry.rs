//! Module properties and resources.
//!
//! [`ResourceRegistry`] is built once per module session from a
//! [`ModuleDefinition`] and never changes afterwards. Every collection is a
//! `BTreeMap`, so iteration is ordered by property name or partial path.
//! Resources whose location cannot be resolved are dropped with a warning.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{LinkError, LinkResult};

// ══════════════════════════════════════════════════════════════════════════════
// Properties
// ══════════════════════════════════════════════════════════════════════════════

/// A deferred-binding property whose value is chosen at load time.
#[derive(Debug, Clone)]
pub struct SelectionProperty {
    pub name: String,
    /// Legal values, in declaration order, without duplicates.
    values: Vec<String>,
    /// Used when the provider computes a value outside `values`.
    pub fallback: Option<String>,
    /// JavaScript function body that computes the value at load time.
    pub provider: String,
}

impl SelectionProperty {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut deduped: Vec<String> = Vec::new();
        for value in values {
            let value = value.into();
            if !deduped.contains(&value) {
                deduped.push(value);
            }
        }
        Self {
            name: name.into(),
            values: deduped,
            fallback: None,
            provider: String::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The value, if only one is legal.
    pub fn try_get_value(&self) -> Option<&str> {
        match self.values.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

impl PartialEq for SelectionProperty {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for SelectionProperty {}

impl PartialOrd for SelectionProperty {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SelectionProperty {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

/// A build-time configuration property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationProperty {
    pub name: String,
    pub values: Vec<String>,
}

impl ConfigurationProperty {
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Resources
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    /// Files from the module's public directories.
    Public,
    /// Files produced by generators during compilation.
    Generated,
    /// `<script>` references.
    Script,
    /// Stylesheet references.
    Stylesheet,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::Public,
        ResourceKind::Generated,
        ResourceKind::Script,
        ResourceKind::Stylesheet,
    ];
}

/// A file a linker may copy or reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub kind: ResourceKind,
    /// `/`-separated path relative to the output root.
    pub partial_path: String,
    /// Where the bytes live.
    pub location: PathBuf,
}

impl Resource {
    pub fn read(&self) -> LinkResult<Vec<u8>> {
        fs::read(&self.location).map_err(|e| LinkError::io(&self.location, e))
    }
}

/// Whether `path` is a relative, `/`-separated path with no empty, `.` or
/// `..` segments.
pub fn is_valid_partial_path(path: &str) -> bool {
    !path.is_empty()
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}

// ══════════════════════════════════════════════════════════════════════════════
// Module definition
// ══════════════════════════════════════════════════════════════════════════════

/// Raw module declarations, as read by the front end.
#[derive(Debug, Clone, Default)]
pub struct ModuleDefinition {
    pub properties: Vec<SelectionProperty>,
    pub configuration: Vec<ConfigurationProperty>,
    /// `(partial path, location)` pairs.
    pub scripts: Vec<(String, PathBuf)>,
    pub stylesheets: Vec<(String, PathBuf)>,
    /// Enumerated recursively; an earlier directory wins on conflicts.
    pub public_dirs: Vec<PathBuf>,
    pub generated_dirs: Vec<PathBuf>,
}

// ══════════════════════════════════════════════════════════════════════════════
// ResourceRegistry
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    properties: BTreeMap<String, SelectionProperty>,
    configuration: BTreeMap<String, ConfigurationProperty>,
    resources: BTreeMap<ResourceKind, BTreeMap<String, Resource>>,
}

impl ResourceRegistry {
    /// Build the registry. Unresolvable resources are skipped, never fatal.
    pub fn build(module: &ModuleDefinition) -> Self {
        let mut registry = Self::default();
        for property in &module.properties {
            registry
                .properties
                .entry(property.name.clone())
                .or_insert_with(|| property.clone());
        }
        for property in &module.configuration {
            registry
                .configuration
                .entry(property.name.clone())
                .or_insert_with(|| property.clone());
        }
        for (path, location) in &module.scripts {
            registry.add_file(ResourceKind::Script, path, location);
        }
        for (path, location) in &module.stylesheets {
            registry.add_file(ResourceKind::Stylesheet, path, location);
        }
        for dir in &module.public_dirs {
            registry.add_dir(ResourceKind::Public, dir);
        }
        for dir in &module.generated_dirs {
            registry.add_dir(ResourceKind::Generated, dir);
        }
        debug!(
            properties = registry.properties.len(),
            public = registry.resources(ResourceKind::Public).count(),
            generated = registry.resources(ResourceKind::Generated).count(),
            scripts = registry.resources(ResourceKind::Script).count(),
            stylesheets = registry.resources(ResourceKind::Stylesheet).count(),
            "built resource registry"
        );
        registry
    }

    fn add_file(&mut self, kind: ResourceKind, partial_path: &str, location: &Path) {
        if !is_valid_partial_path(partial_path) {
            warn!(?kind, partial_path, "dropping resource with an invalid partial path");
            return;
        }
        if !location.is_file() {
            warn!(?kind, partial_path, location = %location.display(), "dropping resource with no backing file");
            return;
        }
        let collection = self.resources.entry(kind).or_default();
        if collection.contains_key(partial_path) {
            debug!(?kind, partial_path, "resource already registered; keeping the first");
            return;
        }
        collection.insert(
            partial_path.to_string(),
            Resource {
                kind,
                partial_path: partial_path.to_string(),
                location: location.to_path_buf(),
            },
        );
    }

    fn add_dir(&mut self, kind: ResourceKind, dir: &Path) {
        let mut files = Vec::new();
        if let Err(err) = collect_files(dir, "", &mut files) {
            warn!(?kind, dir = %dir.display(), error = %err, "cannot enumerate resource directory");
        }
        for (partial_path, location) in files {
            self.add_file(kind, &partial_path, &location);
        }
    }

    // ── Properties ───────────────────────────────────────────────────────────

    /// Selection properties, ordered by name.
    pub fn properties(&self) -> impl Iterator<Item = &SelectionProperty> {
        self.properties.values()
    }

    pub fn property(&self, name: &str) -> Option<&SelectionProperty> {
        self.properties.get(name)
    }

    /// Configuration properties, ordered by name.
    pub fn configuration_properties(&self) -> impl Iterator<Item = &ConfigurationProperty> {
        self.configuration.values()
    }

    pub fn configuration_property(&self, name: &str) -> Option<&ConfigurationProperty> {
        self.configuration.get(name)
    }

    // ── Resources ────────────────────────────────────────────────────────────

    /// Resources of one kind, ordered by partial path.
    pub fn resources(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.resources.get(&kind).into_iter().flat_map(|c| c.values())
    }

    pub fn resource(&self, kind: ResourceKind, partial_path: &str) -> Option<&Resource> {
        self.resources.get(&kind)?.get(partial_path)
    }
}

/// Every file below `dir`, as `(partial path, location)`, in name order.
/// Only a failure to list `dir` itself is returned; entries below it that
/// cannot be read are skipped with a warning.
fn collect_files(dir: &Path, prefix: &str, out: &mut Vec<(String, PathBuf)>) -> std::io::Result<()> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        match entry {
            Ok(entry) => entries.push(entry),
            Err(err) => warn!(dir = %dir.display(), error = %err, "skipping unreadable directory entry"),
        }
    }
    entries.sort_by_key(|e| e.file_name());
    for entry in entries {
        let path = entry.path();
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "skipping file with a non-UTF-8 name");
            continue;
        };
        let partial = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping entry of unknown type");
                continue;
            }
        };
        if !file_type.is_dir() {
            out.push((partial, path));
        } else if let Err(err) = collect_files(&path, &partial, out) {
            warn!(dir = %path.display(), error = %err, "skipping unreadable directory");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_property_values() {
        let p = SelectionProperty::new("user.agent", ["safari", "gecko", "safari"]);
        assert_eq!(p.values(), ["safari", "gecko"]);
        assert_eq!(p.try_get_value(), None);
        let single = SelectionProperty::new("locale", ["default"]);
        assert_eq!(single.try_get_value(), Some("default"));
    }

    #[test]
    fn test_properties_order_by_name() {
        let a = SelectionProperty::new("a", ["1"]);
        let b = SelectionProperty::new("b", ["0"]);
        assert!(a < b);
        assert_eq!(a, SelectionProperty::new("a", ["2"]));
    }

    #[test]
    fn test_partial_path_validation() {
        assert!(is_valid_partial_path("css/app.css"));
        assert!(!is_valid_partial_path(""));
        assert!(!is_valid_partial_path("/abs"));
        assert!(!is_valid_partial_path("a/../b"));
        assert!(!is_valid_partial_path("a//b"));
        assert!(!is_valid_partial_path("a\\b"));
    }
}
