//! Per-column generation rules.
//!
//! A rule is a small expression such as `range(1, 100)` or
//! `concat('user-', seq())`. It is parsed once into an [`Expr`], then
//! compiled against the column's [`BasicType`](sync_core::BasicType) into a
//! [`Rule`] that is evaluated for every row.
//!
//! ```text
//! rule    := expr
//! expr    := literal | call
//! call    := IDENT '(' [ expr { ',' expr } ] ')'
//! literal := INTEGER | FLOAT | STRING | 'true' | 'false'
//! ```

mod compile;
mod parser;

pub use compile::{compile, NumericTarget, Rule, TextTarget};
pub use parser::{parse, Expr};

use sync_core::BasicType;

/// Errors raised while parsing or compiling a rule.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleError {
    #[error("empty rule")]
    Empty,

    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("expected {expected} at offset {offset}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unexpected input after the rule at offset {offset}")]
    TrailingInput { offset: usize },

    #[error("unknown function '{name}' at offset {offset}")]
    UnknownFunction { name: String, offset: usize },

    #[error("{function}() takes {expected} argument(s), got {found}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("invalid argument to {function}(): {message}")]
    InvalidArgument {
        function: &'static str,
        message: String,
    },

    #[error("{value} is out of range for a {target} column")]
    OutOfRange { value: i64, target: BasicType },

    #[error("{value} is out of range for a {target} column")]
    FloatOutOfRange { value: f64, target: BasicType },

    #[error("rule nests more than {limit} calls at offset {offset}")]
    TooDeep { limit: usize, offset: usize },

    #[error("rule produces {produced} values, which cannot be stored in a {target} column")]
    TypeMismatch {
        produced: &'static str,
        target: BasicType,
    },
}

/// Parse and compile `source` for a column of type `target`.
pub fn compile_rule(source: &str, target: BasicType) -> Result<Rule, RuleError> {
    let expr = parse(source)?;
    compile(&expr, target)
}
