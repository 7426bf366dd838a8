//! Link options.

use std::path::PathBuf;

use jslink_compiler::OutputMode;
use serde::{Deserialize, Serialize};

use crate::error::LinkResult;

/// Configuration property consulted when no chunk size is set explicitly.
pub const CHUNK_SIZE_PROPERTY: &str = "iframe.linker.script.chunk.size";

/// Options for one module's link session.
///
/// Every field has a default, so `{}` is a valid configuration:
///
/// ```json
/// { "out_dir": "war", "output_mode": "pretty", "script_chunk_size": 30000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LinkOptions {
    /// Linker targets are written to `<out_dir>/<target>/`.
    pub out_dir: PathBuf,
    /// Private working files, including `compilations/`.
    pub work_dir: PathBuf,
    pub output_mode: OutputMode,
    /// Bytes of statements per script chunk; `-1` disables chunking.
    /// When unset, the module's chunk-size configuration property decides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_chunk_size: Option<i64>,
    /// Inserted between script chunks.
    pub script_chunk_separator: String,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("war"),
            work_dir: PathBuf::from("work"),
            output_mode: OutputMode::Compact,
            script_chunk_size: None,
            script_chunk_separator: "</script><script>".to_string(),
        }
    }
}

impl LinkOptions {
    /// Parse options from JSON text. Unknown keys are rejected.
    pub fn from_json(text: &str) -> LinkResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn compilations_dir(&self) -> PathBuf {
        self.work_dir.join("compilations")
    }
}
