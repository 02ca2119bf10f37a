//! Type-checks a parsed rule against its column and evaluates it per row.

use rand::distr::{Distribution, Uniform};
use rand::Rng;
use sync_core::{BasicType, Value};

use super::{Expr, RuleError};
use crate::generators::{random_ascii_string, random_bytes};

/// Numeric column a rule writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericTarget {
    Int,
    Long,
    Float,
    Double,
}

impl NumericTarget {
    fn for_integers(target: BasicType) -> Result<Self, RuleError> {
        match target {
            BasicType::Int => Ok(Self::Int),
            BasicType::Long => Ok(Self::Long),
            BasicType::Float => Ok(Self::Float),
            BasicType::Double => Ok(Self::Double),
            other => Err(mismatch("integer", other)),
        }
    }

    fn for_floats(target: BasicType) -> Result<Self, RuleError> {
        match target {
            BasicType::Float => Ok(Self::Float),
            BasicType::Double => Ok(Self::Double),
            other => Err(mismatch("float", other)),
        }
    }

    /// Integers wrap into `Int` columns.
    fn from_i64(self, v: i64) -> Value {
        match self {
            Self::Int => Value::Int(v as i32),
            Self::Long => Value::Long(v),
            Self::Float => Value::Float(v as f32),
            Self::Double => Value::Double(v as f64),
        }
    }

    fn from_f64(self, v: f64) -> Value {
        match self {
            Self::Float => Value::Float(v as f32),
            Self::Double => Value::Double(v),
            Self::Int => Value::Int(v as i32),
            Self::Long => Value::Long(v as i64),
        }
    }
}

/// Text column a rule writes into; binary columns store UTF-8 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTarget {
    String,
    Binary,
}

impl TextTarget {
    fn for_text(target: BasicType) -> Result<Self, RuleError> {
        match target {
            BasicType::String => Ok(Self::String),
            BasicType::Binary => Ok(Self::Binary),
            other => Err(mismatch("string", other)),
        }
    }

    fn wrap(self, s: String) -> Value {
        match self {
            Self::String => Value::String(s),
            Self::Binary => Value::Binary(s.into_bytes()),
        }
    }
}

/// Compiled rule, bound to the column type it was compiled for.
///
/// Evaluation never fails: every type and argument check happens in
/// [`compile`].
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// A constant
    Literal(Value),
    /// `start + (row - 1) * step`
    Sequence {
        start: i64,
        step: i64,
        target: NumericTarget,
    },
    /// Uniform integer in `[min, max]`
    IntRange {
        min: i64,
        max: i64,
        target: NumericTarget,
    },
    /// Uniform float in `[min, max]`
    FloatRange {
        dist: Uniform<f64>,
        target: NumericTarget,
    },
    /// Printable ASCII string of fixed length
    RandomString { len: usize, target: TextTarget },
    /// Random bytes of fixed length
    RandomBytes { len: usize },
    /// `true` with the given probability
    RandomBool { probability: f64 },
    /// Version 4 UUID drawn from the row's random stream
    Uuid { target: TextTarget },
    /// One uniformly chosen alternative
    Choice(Vec<Rule>),
    /// Textual concatenation of every part
    Concat {
        parts: Vec<Rule>,
        target: TextTarget,
    },
}

impl Rule {
    /// Evaluate the rule for a 1-based row number.
    pub fn eval<R: Rng>(&self, row_number: u64, rng: &mut R) -> Value {
        match self {
            Rule::Literal(value) => value.clone(),
            Rule::Sequence {
                start,
                step,
                target,
            } => {
                let offset = (row_number.saturating_sub(1) as i64).wrapping_mul(*step);
                target.from_i64(start.wrapping_add(offset))
            }
            Rule::IntRange { min, max, target } => target.from_i64(rng.random_range(*min..=*max)),
            Rule::FloatRange { dist, target } => target.from_f64(dist.sample(rng)),
            Rule::RandomString { len, target } => target.wrap(random_ascii_string(rng, *len)),
            Rule::RandomBytes { len } => Value::Binary(random_bytes(rng, *len)),
            Rule::RandomBool { probability } => Value::Bool(rng.random_bool(*probability)),
            Rule::Uuid { target } => {
                let mut bytes = [0u8; 16];
                rng.fill(&mut bytes);
                let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
                target.wrap(uuid.to_string())
            }
            Rule::Choice(options) => {
                let index = rng.random_range(0..options.len());
                options[index].eval(row_number, rng)
            }
            Rule::Concat { parts, target } => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&part.eval(row_number, rng).to_string());
                }
                target.wrap(out)
            }
        }
    }
}

fn mismatch(produced: &'static str, target: BasicType) -> RuleError {
    RuleError::TypeMismatch { produced, target }
}

fn invalid(function: &'static str, message: impl Into<String>) -> RuleError {
    RuleError::InvalidArgument {
        function,
        message: message.into(),
    }
}

fn arity(
    function: &'static str,
    args: &[Expr],
    allowed: std::ops::RangeInclusive<usize>,
    expected: &'static str,
) -> Result<(), RuleError> {
    if allowed.contains(&args.len()) {
        Ok(())
    } else {
        Err(RuleError::Arity {
            function,
            expected,
            found: args.len(),
        })
    }
}

fn int_arg(function: &'static str, expr: &Expr) -> Result<i64, RuleError> {
    match expr {
        Expr::Int(v) => Ok(*v),
        _ => Err(invalid(function, "expected an integer literal")),
    }
}

fn number_arg(function: &'static str, expr: &Expr) -> Result<f64, RuleError> {
    match expr {
        Expr::Int(v) => Ok(*v as f64),
        Expr::Float(v) => Ok(*v),
        _ => Err(invalid(function, "expected a numeric literal")),
    }
}

fn len_arg(function: &'static str, expr: &Expr) -> Result<usize, RuleError> {
    let len = int_arg(function, expr)?;
    usize::try_from(len).map_err(|_| invalid(function, "length must not be negative"))
}

fn fits_int(v: i64) -> Result<(), RuleError> {
    i32::try_from(v)
        .map(|_| ())
        .map_err(|_| RuleError::OutOfRange {
            value: v,
            target: BasicType::Int,
        })
}

/// Floats must stay finite once narrowed to the column type.
fn fits_float(v: f64, target: NumericTarget) -> Result<(), RuleError> {
    let stored = match target {
        NumericTarget::Float => v as f32 as f64,
        _ => v,
    };
    if stored.is_finite() {
        Ok(())
    } else {
        Err(RuleError::FloatOutOfRange {
            value: v,
            target: match target {
                NumericTarget::Float => BasicType::Float,
                _ => BasicType::Double,
            },
        })
    }
}

/// The column type a `concat` part is rendered from.
fn natural_type(expr: &Expr) -> BasicType {
    match expr {
        Expr::Int(_) => BasicType::Long,
        Expr::Float(_) => BasicType::Double,
        Expr::Bool(_) => BasicType::Boolean,
        Expr::Str(_) => BasicType::String,
        Expr::Call { name, args, .. } => match name.as_str() {
            "seq" => BasicType::Long,
            "range" if args.iter().any(|a| matches!(a, Expr::Float(_))) => BasicType::Double,
            "range" => BasicType::Long,
            "bool" => BasicType::Boolean,
            "bytes" => BasicType::Binary,
            "choice" => args.first().map(natural_type).unwrap_or(BasicType::String),
            _ => BasicType::String,
        },
    }
}

/// Compile a parsed rule for a column of type `target`.
pub fn compile(expr: &Expr, target: BasicType) -> Result<Rule, RuleError> {
    match expr {
        Expr::Int(v) => {
            let target = NumericTarget::for_integers(target)?;
            if target == NumericTarget::Int {
                fits_int(*v)?;
            }
            Ok(Rule::Literal(target.from_i64(*v)))
        }
        Expr::Float(v) => {
            let target = NumericTarget::for_floats(target)?;
            fits_float(*v, target)?;
            Ok(Rule::Literal(target.from_f64(*v)))
        }
        Expr::Str(s) => Ok(Rule::Literal(TextTarget::for_text(target)?.wrap(s.clone()))),
        Expr::Bool(b) => match target {
            BasicType::Boolean => Ok(Rule::Literal(Value::Bool(*b))),
            other => Err(mismatch("boolean", other)),
        },
        Expr::Call { name, args, offset } => compile_call(name, args, *offset, target),
    }
}

fn compile_call(
    name: &str,
    args: &[Expr],
    offset: usize,
    target: BasicType,
) -> Result<Rule, RuleError> {
    match name {
        "seq" => {
            arity("seq", args, 0..=2, "0 to 2")?;
            let start = args.first().map(|a| int_arg("seq", a)).transpose()?;
            let step = args.get(1).map(|a| int_arg("seq", a)).transpose()?;
            Ok(Rule::Sequence {
                start: start.unwrap_or(1),
                step: step.unwrap_or(1),
                target: NumericTarget::for_integers(target)?,
            })
        }
        "range" => {
            arity("range", args, 2..=2, "2")?;
            let floats = args.iter().any(|a| matches!(a, Expr::Float(_)));
            if floats {
                let min = number_arg("range", &args[0])?;
                let max = number_arg("range", &args[1])?;
                if !(min.is_finite() && max.is_finite()) {
                    return Err(invalid("range", "bounds must be finite"));
                }
                if min > max {
                    return Err(invalid("range", format!("min {min} is greater than max {max}")));
                }
                let target = NumericTarget::for_floats(target)?;
                fits_float(min, target)?;
                fits_float(max, target)?;
                let dist = Uniform::new_inclusive(min, max).map_err(|e| {
                    invalid("range", format!("cannot sample [{min}, {max}]: {e}"))
                })?;
                Ok(Rule::FloatRange { dist, target })
            } else {
                let min = int_arg("range", &args[0])?;
                let max = int_arg("range", &args[1])?;
                if min > max {
                    return Err(invalid("range", format!("min {min} is greater than max {max}")));
                }
                let target = NumericTarget::for_integers(target)?;
                if target == NumericTarget::Int {
                    fits_int(min)?;
                    fits_int(max)?;
                }
                Ok(Rule::IntRange { min, max, target })
            }
        }
        "string" => {
            arity("string", args, 1..=1, "1")?;
            Ok(Rule::RandomString {
                len: len_arg("string", &args[0])?,
                target: TextTarget::for_text(target)?,
            })
        }
        "bytes" => {
            arity("bytes", args, 1..=1, "1")?;
            let len = len_arg("bytes", &args[0])?;
            match target {
                BasicType::Binary => Ok(Rule::RandomBytes { len }),
                other => Err(mismatch("binary", other)),
            }
        }
        "bool" => {
            arity("bool", args, 0..=1, "0 or 1")?;
            let probability = match args.first() {
                Some(arg) => number_arg("bool", arg)?,
                None => 0.5,
            };
            if !(0.0..=1.0).contains(&probability) {
                return Err(invalid(
                    "bool",
                    format!("probability {probability} is outside [0, 1]"),
                ));
            }
            match target {
                BasicType::Boolean => Ok(Rule::RandomBool { probability }),
                other => Err(mismatch("boolean", other)),
            }
        }
        "uuid" => {
            arity("uuid", args, 0..=0, "0")?;
            Ok(Rule::Uuid {
                target: TextTarget::for_text(target)?,
            })
        }
        "choice" => {
            if args.is_empty() {
                return Err(RuleError::Arity {
                    function: "choice",
                    expected: "at least 1",
                    found: 0,
                });
            }
            let options = args
                .iter()
                .map(|arg| compile(arg, target))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rule::Choice(options))
        }
        "concat" => {
            if args.is_empty() {
                return Err(RuleError::Arity {
                    function: "concat",
                    expected: "at least 1",
                    found: 0,
                });
            }
            let target = TextTarget::for_text(target)?;
            let parts = args
                .iter()
                .map(|arg| compile(arg, natural_type(arg)))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Rule::Concat { parts, target })
        }
        other => Err(RuleError::UnknownFunction {
            name: other.to_string(),
            offset,
        }),
    }
}
