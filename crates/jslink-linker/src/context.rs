//! Linker orchestration.
//!
//! [`LinkerContext`] owns one module session: its registry, its compilation
//! cache and the staging area. [`LinkerContext::invoke_linker`] hands each
//! [`Linker`] a [`LinkContext`], the linker's read-only view of the session
//! plus the staging primitives for its own target directory.

use std::path::Path;
use std::sync::Arc;

use jslink_compiler::{optimize_javascript, OptimizedJs, OutputMode};
use tracing::{info, warn};

use crate::cache::{CompilationResult, CompilationResultCache, PermutationMap};
use crate::error::LinkResult;
use crate::options::{LinkOptions, CHUNK_SIZE_PROPERTY};
use crate::registry::{ConfigurationProperty, Resource, ResourceKind, ResourceRegistry, SelectionProperty};
use crate::staging::{ArtifactBuffer, ArtifactStagingArea, OpenOutcome, StagingSession};

/// An output generator run once per target.
pub trait Linker {
    /// Short identifier; also the directory for non-public artifacts.
    fn name(&self) -> &str;

    fn link(&self, ctx: &mut LinkContext<'_>) -> LinkResult<()>;
}

/// Where an artifact lands inside the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// At its partial path; served to clients.
    #[default]
    Public,
    /// Under `<linker name>/`; deployed to the server but not served.
    Deploy,
    /// Under `<linker name>/`; kept for build tooling only.
    Private,
}

// ══════════════════════════════════════════════════════════════════════════════
// LinkerContext
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct LinkerContext {
    module_name: String,
    module_function_name: String,
    options: LinkOptions,
    registry: ResourceRegistry,
    cache: CompilationResultCache,
    staging: ArtifactStagingArea,
}

impl LinkerContext {
    /// Start a module session. The compilation cache is backed by
    /// `<work dir>/compilations`, which is wiped first.
    pub fn new(
        module_name: impl Into<String>,
        options: LinkOptions,
        registry: ResourceRegistry,
    ) -> LinkResult<Self> {
        let cache = CompilationResultCache::with_dir(options.compilations_dir())?;
        Ok(Self::with_cache(module_name, options, registry, cache))
    }

    /// Start a module session around an existing cache.
    pub fn with_cache(
        module_name: impl Into<String>,
        options: LinkOptions,
        registry: ResourceRegistry,
        cache: CompilationResultCache,
    ) -> Self {
        let module_name = module_name.into();
        let module_function_name = module_function_name(&module_name);
        let staging = ArtifactStagingArea::new(options.out_dir.clone());
        Self {
            module_name,
            module_function_name,
            options,
            registry,
            cache,
            staging,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn module_function_name(&self) -> &str {
        &self.module_function_name
    }

    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &CompilationResultCache {
        &self.cache
    }

    /// The cache, for gathering permutations before any linker runs.
    pub fn cache_mut(&mut self) -> &mut CompilationResultCache {
        &mut self.cache
    }

    /// Run `linker` against a freshly wiped `<out dir>/<target>`.
    ///
    /// Staging bookkeeping is released whether the linker succeeds or not.
    pub fn invoke_linker(&mut self, target: &str, linker: &dyn Linker) -> LinkResult<()> {
        info!(linker = linker.name(), target, module = %self.module_name, "invoking linker");
        let session = self.staging.begin(target)?;
        let mut ctx = LinkContext {
            module_name: &self.module_name,
            module_function_name: &self.module_function_name,
            linker_name: linker.name(),
            options: &self.options,
            registry: &self.registry,
            cache: &self.cache,
            session,
        };
        let result = linker.link(&mut ctx);
        drop(ctx);

        match &result {
            Ok(()) => info!(linker = linker.name(), target, "linker finished"),
            Err(err) => warn!(linker = linker.name(), target, error = %err, "linker failed"),
        }
        result
    }
}

/// A JavaScript identifier for `module_name`: every character that cannot
/// appear in an identifier becomes `_`.
pub fn module_function_name(module_name: &str) -> String {
    let mut name: String = module_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

// ══════════════════════════════════════════════════════════════════════════════
// LinkContext
// ══════════════════════════════════════════════════════════════════════════════

/// One linker's view of the session.
#[derive(Debug)]
pub struct LinkContext<'a> {
    module_name: &'a str,
    module_function_name: &'a str,
    linker_name: &'a str,
    options: &'a LinkOptions,
    registry: &'a ResourceRegistry,
    cache: &'a CompilationResultCache,
    session: StagingSession<'a>,
}

impl LinkContext<'_> {
    pub fn module_name(&self) -> &str {
        self.module_name
    }

    pub fn module_function_name(&self) -> &str {
        self.module_function_name
    }

    pub fn output_mode(&self) -> OutputMode {
        self.options.output_mode
    }

    /// The target directory of this run.
    pub fn target_dir(&self) -> &Path {
        self.session.dir()
    }

    // ── Registry ─────────────────────────────────────────────────────────────

    pub fn properties(&self) -> impl Iterator<Item = &SelectionProperty> {
        self.registry.properties()
    }

    pub fn property(&self, name: &str) -> Option<&SelectionProperty> {
        self.registry.property(name)
    }

    pub fn configuration_properties(&self) -> impl Iterator<Item = &ConfigurationProperty> {
        self.registry.configuration_properties()
    }

    pub fn configuration_property(&self, name: &str) -> Option<&ConfigurationProperty> {
        self.registry.configuration_property(name)
    }

    pub fn resources(&self, kind: ResourceKind) -> impl Iterator<Item = &Resource> {
        self.registry.resources(kind)
    }

    pub fn resource(&self, kind: ResourceKind, partial_path: &str) -> Option<&Resource> {
        self.registry.resource(kind, partial_path)
    }

    // ── Compilations ─────────────────────────────────────────────────────────

    /// Every distinct compilation, ordered by strong name.
    pub fn compilation_results(&self) -> impl Iterator<Item = &Arc<CompilationResult>> {
        self.cache.results()
    }

    pub fn selection_permutations(&self, strong_name: &str) -> impl Iterator<Item = &PermutationMap> {
        self.cache.selection_permutations(strong_name)
    }

    /// Bytes of statements per script chunk, or `-1` for no chunking.
    ///
    /// An explicit option wins; otherwise the first value of the
    /// chunk-size configuration property is used.
    pub fn script_chunk_size(&self) -> i64 {
        if let Some(size) = self.options.script_chunk_size {
            return size;
        }
        let Some(value) = self
            .registry
            .configuration_property(CHUNK_SIZE_PROPERTY)
            .and_then(ConfigurationProperty::first_value)
        else {
            return -1;
        };
        match value.trim().parse() {
            Ok(size) => size,
            Err(_) => {
                warn!(property = CHUNK_SIZE_PROPERTY, value, "chunk size is not an integer; chunking disabled");
                -1
            }
        }
    }

    pub fn script_chunk_separator(&self) -> &str {
        &self.options.script_chunk_separator
    }

    /// Rewrite `js` with the module function as entry point, in the
    /// configured output mode.
    pub fn optimize_javascript(&self, js: &str) -> LinkResult<OptimizedJs> {
        let file = format!("{}.js", self.module_name);
        Ok(optimize_javascript(
            &file,
            js,
            self.module_function_name,
            self.options.output_mode,
        )?)
    }

    // ── Staging ──────────────────────────────────────────────────────────────

    /// Open a public artifact.
    pub fn open(&mut self, partial_path: &str) -> OpenOutcome {
        self.session.open(partial_path)
    }

    pub fn open_with_visibility(&mut self, partial_path: &str, visibility: Visibility) -> OpenOutcome {
        match visibility {
            Visibility::Public => self.session.open(partial_path),
            Visibility::Deploy | Visibility::Private => {
                let path = format!("{}/{partial_path}", self.linker_name);
                self.session.open(&path)
            }
        }
    }

    pub fn commit(&mut self, buffer: &mut ArtifactBuffer) -> LinkResult<()> {
        self.session.commit(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_function_name() {
        assert_eq!(module_function_name("com.example.Hello"), "com_example_Hello");
        assert_eq!(module_function_name("app"), "app");
        assert_eq!(module_function_name("9lives"), "_9lives");
        assert_eq!(module_function_name(""), "_");
    }

    #[test]
    fn test_visibility_defaults_to_public() {
        assert_eq!(Visibility::default(), Visibility::Public);
    }
}
