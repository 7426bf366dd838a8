//! Content-addressed store of compiled permutation text.
//!
//! Permutations that compile to byte-identical JavaScript share one
//! [`CompilationResult`]. The key is the strong name: the SHA-256 digest of
//! the UTF-8 text as 64 upper-case hex characters.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use jslink_types::StatementRanges;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::error::{LinkError, LinkResult};
use crate::registry::SelectionProperty;

/// Property name → value for one permutation.
pub type PermutationMap = BTreeMap<String, String>;

/// One distinct compiled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationResult {
    pub strong_name: String,
    pub js: String,
    /// Top-level statement spans of `js`, when the front end supplied them.
    pub statement_ranges: Option<StatementRanges>,
    /// `<cache dir>/<strong name>.js`, for a directory-backed cache.
    pub location: Option<PathBuf>,
}

/// Strong name of `js`.
pub fn strong_name(js: &str) -> String {
    let digest = Sha256::digest(js.as_bytes());
    digest.iter().map(|b| format!("{b:02X}")).collect()
}

// ══════════════════════════════════════════════════════════════════════════════
// CompilationResultCache
// ══════════════════════════════════════════════════════════════════════════════

/// Deduplicating store of [`CompilationResult`]s for one module session.
///
/// Calls take `&mut self`; callers that compile permutations in parallel
/// must serialise their calls.
#[derive(Debug, Default)]
pub struct CompilationResultCache {
    dir: Option<PathBuf>,
    results: BTreeMap<String, Arc<CompilationResult>>,
    permutations: BTreeMap<String, BTreeSet<PermutationMap>>,
}

impl CompilationResultCache {
    /// A cache that keeps results in memory only.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A cache persisting each new result under `dir`. The directory is
    /// wiped first: strong names from an earlier session are not reused.
    pub fn with_dir(dir: impl Into<PathBuf>) -> LinkResult<Self> {
        let dir = dir.into();
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|e| LinkError::io(&dir, e))?;
        }
        fs::create_dir_all(&dir).map_err(|e| LinkError::io(&dir, e))?;
        debug!(dir = %dir.display(), "created compilation cache");
        Ok(Self {
            dir: Some(dir),
            ..Self::default()
        })
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Return the result for `js`, creating and persisting it on first use.
    /// Identical text always yields the identical `Arc`.
    pub fn get_or_create(&mut self, js: &str) -> LinkResult<Arc<CompilationResult>> {
        self.get_or_create_with_ranges(js, None)
    }

    /// As [`get_or_create`](Self::get_or_create), attaching statement ranges
    /// to a newly created result. An existing result is returned unchanged.
    pub fn get_or_create_with_ranges(
        &mut self,
        js: &str,
        statement_ranges: Option<StatementRanges>,
    ) -> LinkResult<Arc<CompilationResult>> {
        let strong_name = strong_name(js);
        if let Some(existing) = self.results.get(&strong_name) {
            debug!(strong_name = %strong_name, "compilation cache hit");
            return Ok(Arc::clone(existing));
        }

        let location = match &self.dir {
            Some(dir) => {
                let path = dir.join(format!("{strong_name}.js"));
                fs::write(&path, js).map_err(|e| LinkError::io(&path, e))?;
                Some(path)
            }
            None => None,
        };
        trace!(strong_name = %strong_name, bytes = js.len(), "new compilation result");

        let result = Arc::new(CompilationResult {
            strong_name: strong_name.clone(),
            js: js.to_string(),
            statement_ranges,
            location,
        });
        self.results.insert(strong_name, Arc::clone(&result));
        Ok(result)
    }

    /// Record that a permutation with these property values compiled to
    /// `strong_name`. Properties with a single legal value are left out.
    pub fn add_selection_permutation<'a>(
        &mut self,
        strong_name: &str,
        values: impl IntoIterator<Item = (&'a SelectionProperty, &'a str)>,
    ) -> LinkResult<()> {
        if !self.results.contains_key(strong_name) {
            return Err(LinkError::UnknownStrongName(strong_name.to_string()));
        }
        let map: PermutationMap = values
            .into_iter()
            .filter(|(property, _)| property.try_get_value().is_none())
            .map(|(property, value)| (property.name.clone(), value.to_string()))
            .collect();
        self.permutations
            .entry(strong_name.to_string())
            .or_default()
            .insert(map);
        Ok(())
    }

    /// Permutations recorded for `strong_name`, in a stable order.
    pub fn selection_permutations(&self, strong_name: &str) -> impl Iterator<Item = &PermutationMap> {
        self.permutations.get(strong_name).into_iter().flatten()
    }

    /// All results, ordered by strong name.
    pub fn results(&self) -> impl Iterator<Item = &Arc<CompilationResult>> {
        self.results.values()
    }

    pub fn get(&self, strong_name: &str) -> Option<&Arc<CompilationResult>> {
        self.results.get(strong_name)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
