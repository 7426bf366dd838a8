//! The optimization pipeline.
//!
//! ```text
//! JS text → Lexer → Parser → resolve → remove unused functions
//!         → [intern strings] → rename → print (+ statement ranges)
//! ```

use jslink_codegen::{print_program, PrintStyle};
use jslink_lexer::Lexer;
use jslink_parser::Parser;
use jslink_types::ast::Program;
use jslink_types::{SourceFile, StatementRanges};
use tracing::{debug, info};

use crate::dce::remove_unused_functions;
use crate::error::{OptimizeError, OptimizeResult};
use crate::intern::intern_strings;
use crate::mode::OutputMode;
use crate::rename::{rename_symbols, NamingStrategy};
use crate::resolve::resolve_program;
use crate::scope::ScopeTree;

/// Counters reported by one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptimizeStats {
    pub functions_removed: usize,
    pub strings_interned: usize,
    pub symbols_renamed: usize,
}

/// Optimized program text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedJs {
    pub js: String,
    /// Spans of the top-level statements of `js`.
    pub statement_ranges: StatementRanges,
    pub stats: OptimizeStats,
}

/// Lex and parse `source`, failing with every collected error.
pub fn parse_program(file_name: &str, source: &str) -> OptimizeResult<Program> {
    let source_file = SourceFile::new(file_name, source);
    let lex = Lexer::new(&source_file).lex();
    if lex.errors.has_errors() {
        return Err(OptimizeError::Syntax {
            file: file_name.to_string(),
            errors: lex.errors,
        });
    }
    let parsed = Parser::new(lex.tokens, &source_file).parse();
    match parsed.program {
        Some(program) if !parsed.errors.has_errors() => Ok(program),
        _ => Err(OptimizeError::Syntax {
            file: file_name.to_string(),
            errors: parsed.errors,
        }),
    }
}

/// Run the full pipeline over `source`.
///
/// `entry_point` names the module function that outside code calls; it is
/// always kept and never renamed.
pub fn optimize_javascript(
    file_name: &str,
    source: &str,
    entry_point: &str,
    mode: OutputMode,
) -> OptimizeResult<OptimizedJs> {
    let mut program = parse_program(file_name, source)?;
    debug!(file = file_name, statements = program.body.len(), "parsed");

    let mut tree = ScopeTree::new(entry_point);
    resolve_program(&mut program, &mut tree);
    debug!(
        scopes = tree.scope_count(),
        symbols = tree.symbol_count(),
        dynamic = tree.scope(tree.global()).dynamic,
        "resolved"
    );

    let mut stats = OptimizeStats {
        functions_removed: remove_unused_functions(&mut program, &tree),
        ..OptimizeStats::default()
    };

    let (strategy, style) = match mode {
        OutputMode::Compact => (NamingStrategy::Obfuscated, PrintStyle::Compact),
        OutputMode::Pretty => (NamingStrategy::Pretty, PrintStyle::Pretty),
        OutputMode::Detailed => (NamingStrategy::Verbose, PrintStyle::Pretty),
    };
    if mode.interns_strings() {
        stats.strings_interned = intern_strings(&mut program, &mut tree);
    }
    stats.symbols_renamed = rename_symbols(&mut program, &tree, strategy);

    let printed = print_program(&program, style);
    info!(
        file = file_name,
        %mode,
        input_bytes = source.len(),
        output_bytes = printed.js.len(),
        functions_removed = stats.functions_removed,
        strings_interned = stats.strings_interned,
        symbols_renamed = stats.symbols_renamed,
        "optimized javascript"
    );
    Ok(OptimizedJs {
        js: printed.js,
        statement_ranges: printed.statement_ranges,
        stats,
    })
}
