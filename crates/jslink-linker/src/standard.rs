//! The standard selection-script linker.
//!
//! Output, per target:
//!
//! ```text
//! <STRONG>.cache.js      one per compilation result, chunked and wrapped
//! <module>.nocache.js    picks a permutation at load time and loads it
//! <public resources>     copied as-is unless something already claimed the path
//! ```

use std::io::Write;

use tracing::{debug, info, warn};

use crate::cache::CompilationResult;
use crate::chunk::split_primary_javascript;
use crate::context::{LinkContext, Linker};
use crate::error::{LinkError, LinkResult};
use crate::registry::{ResourceKind, SelectionProperty};
use crate::staging::OpenOutcome;

const MODULE_FUNC: &str = "__MODULE_FUNC__";
const STRONG_NAME: &str = "__STRONG_NAME__";

pub const DEFAULT_PREFIX: &str = "var $strongName = '__STRONG_NAME__';\n";
pub const DEFAULT_SUFFIX: &str = "\n__MODULE_FUNC__.onScriptLoad($strongName);\n";

const SELECTION_SCRIPT: &str = r#"function __MODULE_FUNC__() {
  var providers = {};
  var values = {};
  var fallbacks = {};
  var strongNames = {};
  function computePropValue(name) {
    var value = providers[name]();
    var legal = values[name];
    for (var i = 0; i < legal.length; i++) {
      if (legal[i] == value) {
        return value;
      }
    }
    if (fallbacks[name] != null) {
      return fallbacks[name];
    }
    throw new Error("unexpected value " + value + " for property " + name);
  }
  function keyPart(value) {
    return ("" + value).split("\\").join("\\\\").split(",").join("\\,");
  }
__PROPERTIES__
__PERMUTATIONS__
  var strongName = strongNames[__PERMUTATION_KEY__];
  if (strongName == null) {
    throw new Error("no permutation matches this client");
  }
  __MODULE_FUNC__.onScriptLoad = function(loaded) {
    __MODULE_FUNC__.loaded = loaded;
  };
  var script = document.createElement("script");
  script.src = strongName + ".cache.js";
  document.getElementsByTagName("head")[0].appendChild(script);
}
__MODULE_FUNC__();
"#;

/// Emits one cache script per compilation and a selection script that
/// chooses among them.
#[derive(Debug, Clone)]
pub struct StandardLinker {
    /// Written before each compilation; `__STRONG_NAME__` and
    /// `__MODULE_FUNC__` are substituted.
    pub prefix: String,
    /// Written after each compilation, with the same substitutions.
    pub suffix: String,
}

impl Default for StandardLinker {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl StandardLinker {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit_compilation(&self, ctx: &mut LinkContext<'_>, result: &CompilationResult) -> LinkResult<()> {
        let path = format!("{}.cache.js", result.strong_name);
        let mut buffer = match ctx.open(&path) {
            OpenOutcome::Opened(buffer) => buffer,
            OpenOutcome::Refused(reason) => {
                debug!(path, %reason, "compilation already emitted");
                return Ok(());
            }
        };

        let substitute = |template: &str| {
            template
                .replace(STRONG_NAME, &result.strong_name)
                .replace(MODULE_FUNC, ctx.module_function_name())
        };
        let prefix = substitute(&self.prefix);
        let suffix = substitute(&self.suffix);
        let body = split_primary_javascript(
            result.statement_ranges.as_ref(),
            &result.js,
            ctx.script_chunk_size(),
            ctx.script_chunk_separator(),
        );

        buffer.push_str(&prefix);
        buffer.push_str(&body);
        buffer.push_str(&suffix);
        info!(strong_name = %result.strong_name, bytes = buffer.bytes().len(), "emitted permutation");
        ctx.commit(&mut buffer)
    }

    fn emit_selection_script(&self, ctx: &mut LinkContext<'_>) -> LinkResult<()> {
        let script = selection_script(ctx);
        let optimized = ctx.optimize_javascript(&script)?;

        let path = format!("{}.nocache.js", ctx.module_name());
        let mut buffer = match ctx.open(&path) {
            OpenOutcome::Opened(buffer) => buffer,
            OpenOutcome::Refused(reason) => {
                return Err(LinkError::Linker {
                    linker: self.name().to_string(),
                    message: format!("cannot write {path}: {reason}"),
                });
            }
        };
        buffer.push_str(&optimized.js);
        ctx.commit(&mut buffer)
    }

    fn copy_public_resources(&self, ctx: &mut LinkContext<'_>) -> LinkResult<()> {
        let resources: Vec<_> = ctx.resources(ResourceKind::Public).cloned().collect();
        for resource in resources {
            let mut buffer = match ctx.open(&resource.partial_path) {
                OpenOutcome::Opened(buffer) => buffer,
                OpenOutcome::Refused(reason) => {
                    debug!(path = %resource.partial_path, %reason, "skipping public resource");
                    continue;
                }
            };
            let bytes = resource.read()?;
            buffer
                .write_all(&bytes)
                .map_err(|e| LinkError::io(&resource.location, e))?;
            ctx.commit(&mut buffer)?;
        }
        Ok(())
    }
}

impl Linker for StandardLinker {
    fn name(&self) -> &str {
        "std"
    }

    fn link(&self, ctx: &mut LinkContext<'_>) -> LinkResult<()> {
        let results: Vec<_> = ctx.compilation_results().cloned().collect();
        for result in &results {
            self.emit_compilation(ctx, result)?;
        }
        self.emit_selection_script(ctx)?;
        self.copy_public_resources(ctx)
    }
}

// ── Selection script ─────────────────────────────────────────────────────────

/// Properties that vary between permutations, ordered by name.
fn varying_properties<'a>(ctx: &'a LinkContext<'_>) -> Vec<&'a SelectionProperty> {
    ctx.properties()
        .filter(|p| p.try_get_value().is_none())
        .collect()
}

fn selection_script(ctx: &LinkContext<'_>) -> String {
    let varying = varying_properties(ctx);

    let mut properties = String::new();
    for property in &varying {
        let name = js_string(&property.name);
        let provider = property.provider.trim();
        if provider.is_empty() {
            properties.push_str(&format!("  providers[{name}] = function() {{\n  }};\n"));
        } else {
            properties.push_str(&format!("  providers[{name}] = function() {{\n{provider}\n  }};\n"));
        }
        let legal: Vec<String> = property.values().iter().map(|v| js_string(v)).collect();
        properties.push_str(&format!("  values[{name}] = [{}];\n", legal.join(", ")));
        if let Some(fallback) = &property.fallback {
            properties.push_str(&format!("  fallbacks[{name}] = {};\n", js_string(fallback)));
        }
    }

    let mut permutations = String::new();
    for result in ctx.compilation_results() {
        for map in ctx.selection_permutations(&result.strong_name) {
            let key: Option<Vec<String>> = varying
                .iter()
                .map(|p| map.get(&p.name).map(|v| key_part(v)))
                .collect();
            let Some(key) = key else {
                warn!(strong_name = %result.strong_name, "permutation is missing a property value; skipping");
                continue;
            };
            permutations.push_str(&format!(
                "  strongNames[{}] = {};\n",
                js_string(&key.join(",")),
                js_string(&result.strong_name)
            ));
        }
    }

    let key = if varying.is_empty() {
        "\"\"".to_string()
    } else {
        varying
            .iter()
            .map(|p| format!("keyPart(computePropValue({}))", js_string(&p.name)))
            .collect::<Vec<_>>()
            .join(" + \",\" + ")
    };

    SELECTION_SCRIPT
        .replace("__PROPERTIES__\n", &properties)
        .replace("__PERMUTATIONS__\n", &permutations)
        .replace("__PERMUTATION_KEY__", &key)
        .replace(MODULE_FUNC, ctx.module_function_name())
}

/// One property value of a permutation key. Backslashes and commas are
/// escaped so that joining parts with `,` cannot make two keys equal. The
/// selection script's `keyPart` does the same at load time.
fn key_part(value: &str) -> String {
    value.replace('\\', "\\\\").replace(',', "\\,")
}

/// `text` as a double-quoted JavaScript string literal.
fn js_string(text: &str) -> String {
    serde_json::to_string(text)
        .unwrap_or_else(|_| String::from("\"\""))
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}
