//! jslink linker: turns compiled permutations into deployable artifacts.
//!
//! ```text
//! ModuleDefinition ─→ ResourceRegistry ─┐
//! permutation JS ──→ CompilationResultCache ─┼─→ LinkerContext::invoke_linker
//!                                       │        └─ Linker::link(LinkContext)
//!                                       │             ├─ optimize_javascript
//!                                       └─────────────└─ open / commit → <out>/<target>/
//! ```

pub mod cache;
pub mod chunk;
pub mod context;
pub mod error;
pub mod options;
pub mod registry;
pub mod staging;
pub mod standard;

pub use cache::{strong_name, CompilationResult, CompilationResultCache, PermutationMap};
pub use chunk::split_primary_javascript;
pub use context::{LinkContext, Linker, LinkerContext, Visibility};
pub use error::{LinkError, LinkResult};
pub use options::LinkOptions;
pub use registry::{
    ConfigurationProperty, ModuleDefinition, Resource, ResourceKind, ResourceRegistry, SelectionProperty,
};
pub use staging::{ArtifactBuffer, ArtifactStagingArea, OpenOutcome, Refusal, StagingSession};
pub use standard::StandardLinker;
