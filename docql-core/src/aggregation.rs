//! Aggregate field specs: `SUM(amount) AS total`, `COUNT(*) AS cnt`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::expression::function_argument;
use crate::outcome::Translation;

/// Accumulator computed per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Accumulator {
    Sum(String),
    CountAll,
}

impl Accumulator {
    pub fn to_document(&self) -> Value {
        match self {
            Accumulator::Sum(field) => json!({ "$sum": format!("${}", field) }),
            Accumulator::CountAll => json!({ "$sum": 1 }),
        }
    }
}

/// Split `expr AS alias` on the first ` AS ` (any case). Without an alias the
/// alias is the whole spec.
pub fn split_alias(spec: &str) -> (&str, &str) {
    let spec = spec.trim();
    let upper = spec.to_ascii_uppercase();

    match upper.find(" AS ") {
        Some(pos) => (spec[..pos].trim(), spec[pos + 4..].trim()),
        None => (spec, spec),
    }
}

/// Resolve an aggregate function expression.
pub fn resolve_aggregate(expression: &str) -> Translation<Accumulator> {
    let expression = expression.trim();

    if let Some(field) = function_argument(expression, "SUM") {
        return Translation::Parsed(Accumulator::Sum(field.to_string()));
    }

    if function_argument(expression, "COUNT").is_some() {
        return Translation::Parsed(Accumulator::CountAll);
    }

    Translation::Unsupported(expression.to_string())
}

/// Resolve a full spec into `(alias, accumulator)`.
pub fn resolve_spec(spec: &str) -> Translation<(String, Accumulator)> {
    let (expression, alias) = split_alias(spec);
    match resolve_aggregate(expression) {
        Translation::Parsed(acc) => Translation::Parsed((alias.to_string(), acc)),
        Translation::Fallback(acc) => Translation::Fallback((alias.to_string(), acc)),
        Translation::Unsupported(reason) => Translation::Unsupported(reason),
    }
}
