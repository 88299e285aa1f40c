//! Literal coercion.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A scalar literal taken from a condition or expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Int(n) => Value::from(*n),
            // coerce() never produces a non-finite float
            Scalar::Float(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Float(n)
    }
}

/// Convert a literal token (quotes already stripped) to its best-fit scalar:
/// integer, then float, then string.
pub fn coerce(token: &str) -> Scalar {
    if let Ok(n) = token.parse::<i64>() {
        return Scalar::Int(n);
    }

    match token.parse::<f64>() {
        Ok(n) if n.is_finite() => Scalar::Float(n),
        _ => Scalar::String(token.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce("42"), Scalar::Int(42));
        assert_eq!(coerce("-7"), Scalar::Int(-7));
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(coerce("4.5"), Scalar::Float(4.5));
        assert_eq!(coerce("1e3"), Scalar::Float(1000.0));
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(coerce("active"), Scalar::String("active".to_string()));
        assert_eq!(coerce("4,5"), Scalar::String("4,5".to_string()));
        assert_eq!(coerce(""), Scalar::String(String::new()));
    }

    #[test]
    fn test_non_finite_stays_string() {
        assert_eq!(coerce("inf"), Scalar::String("inf".to_string()));
        assert_eq!(coerce("NaN"), Scalar::String("NaN".to_string()));
    }

    #[test]
    fn test_to_value() {
        assert_eq!(Scalar::Int(5000).to_value(), json!(5000));
        assert_eq!(Scalar::Float(4.5).to_value(), json!(4.5));
        assert_eq!(Scalar::from("a").to_value(), json!("a"));
    }
}
