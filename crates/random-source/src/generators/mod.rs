//! Per-field value generators.
//!
//! Every field of a table gets one [`FieldGenerator`]: the compiled rule
//! configured for the column, or the default for its [`BasicType`].

mod text;

pub use text::{random_ascii_string, random_bytes, DEFAULT_LENGTH};

use rand::Rng;
use sync_core::{BasicType, Value};

use crate::rule::Rule;

/// Generator for one field: `(row_number, rng) -> value`.
///
/// Holds no mutable state, so the same row number and random stream state
/// always produce the same value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldGenerator {
    /// Native random value of the column type
    Default(BasicType),
    /// Compiled per-column rule
    Rule(Rule),
}

impl FieldGenerator {
    /// Generate the value for a 1-based row number.
    pub fn generate<R: Rng>(&self, row_number: u64, rng: &mut R) -> Value {
        match self {
            FieldGenerator::Default(basic_type) => generate_default(*basic_type, rng),
            FieldGenerator::Rule(rule) => rule.eval(row_number, rng),
        }
    }
}

/// Select the default generator of a column type.
///
/// Defined for every [`BasicType`].
pub fn default_generator(basic_type: BasicType) -> FieldGenerator {
    FieldGenerator::Default(basic_type)
}

fn generate_default<R: Rng>(basic_type: BasicType, rng: &mut R) -> Value {
    // Every BasicType needs a default here
    match basic_type {
        BasicType::Boolean => Value::Bool(rng.random()),
        BasicType::Int => Value::Int(rng.random()),
        BasicType::Long => Value::Long(rng.random()),
        BasicType::Float => Value::Float(rng.random()),
        BasicType::Double => Value::Double(rng.random()),
        BasicType::String => Value::String(random_ascii_string(rng, DEFAULT_LENGTH)),
        BasicType::Binary => Value::Binary(random_bytes(rng, DEFAULT_LENGTH)),
    }
}
