//! jslink optimizer: rewrites generated JavaScript before it is linked.
//!
//! ```text
//! JS text → Lexer → Parser → Resolver → Unused-function removal
//!         → String interning → Renamer → Printer → JS text + statement ranges
//! ```
//!
//! The output mode ([`OutputMode`]) decides the last three steps:
//!
//! | mode       | interning | names               | layout   |
//! |------------|-----------|---------------------|----------|
//! | `compact`  | yes       | shortest available  | minified |
//! | `pretty`   | no        | original            | indented |
//! | `detailed` | yes       | `<original>_<N>`    | indented |

pub mod dce;
pub mod error;
pub mod intern;
pub mod mode;
pub mod pipeline;
pub mod rename;
pub mod resolve;
pub mod scope;

pub use error::{OptimizeError, OptimizeResult};
pub use mode::OutputMode;
pub use pipeline::{optimize_javascript, parse_program, OptimizeStats, OptimizedJs};
