//! Filter predicates and computed operands, plus their store-native rendering.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::operators::Operator;
use crate::value::Scalar;

/// Aggregate functions supported in expressions and group stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateKind {
    Sum,
    CountAll,
}

/// One side of a computed comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Literal(Scalar),
    FieldRef(String),
    Aggregate {
        kind: AggregateKind,
        field: Option<String>,
    },
    /// A single arithmetic step, e.g. `SUM(amount) / COUNT(*)`.
    Computed {
        op: Operator,
        left: Box<Operand>,
        right: Box<Operand>,
    },
}

impl Operand {
    pub fn field(name: &str) -> Self {
        Operand::FieldRef(name.to_string())
    }

    pub fn sum(field: &str) -> Self {
        Operand::Aggregate {
            kind: AggregateKind::Sum,
            field: Some(field.to_string()),
        }
    }

    pub fn count_all() -> Self {
        Operand::Aggregate {
            kind: AggregateKind::CountAll,
            field: None,
        }
    }

    pub fn to_document(&self) -> Value {
        match self {
            Operand::Literal(scalar) => scalar.to_value(),
            Operand::FieldRef(name) => Value::String(format!("${}", name)),
            Operand::Aggregate {
                kind: AggregateKind::Sum,
                field,
            } => json!({ "$sum": format!("${}", field.as_deref().unwrap_or_default()) }),
            Operand::Aggregate {
                kind: AggregateKind::CountAll,
                ..
            } => json!({ "$sum": 1 }),
            Operand::Computed { op, left, right } => {
                json!({ op.tag(): [left.to_document(), right.to_document()] })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprComparison {
    pub left: Operand,
    pub op: Operator,
    pub right: Operand,
}

/// A boolean filter over document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Comparison {
        field: String,
        op: Operator,
        value: Scalar,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Expr(ExprComparison),
    /// Empty filter; matches every document.
    Always,
}

impl Predicate {
    pub fn comparison(field: &str, op: Operator, value: impl Into<Scalar>) -> Self {
        Predicate::Comparison {
            field: field.to_string(),
            op,
            value: value.into(),
        }
    }

    /// True when this predicate, or any child, is the empty fallback filter.
    pub fn is_degraded(&self) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().any(Predicate::is_degraded)
            }
            _ => false,
        }
    }

    pub fn to_document(&self) -> Value {
        match self {
            Predicate::Comparison { field, op, value } => {
                json!({ field.as_str(): { op.tag(): value.to_value() } })
            }
            Predicate::And(children) => {
                json!({ "$and": children.iter().map(Predicate::to_document).collect::<Vec<_>>() })
            }
            Predicate::Or(children) => {
                json!({ "$or": children.iter().map(Predicate::to_document).collect::<Vec<_>>() })
            }
            Predicate::Expr(expr) => json!({
                "$expr": { expr.op.tag(): [expr.left.to_document(), expr.right.to_document()] }
            }),
            Predicate::Always => Value::Object(Map::new()),
        }
    }
}
