//! Mapping from SQL-like operator symbols to store-native operator tags.

use serde::{Deserialize, Serialize};

/// Comparison and arithmetic operators understood by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Lte,
    Gte,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 10] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Gt,
        Operator::Lte,
        Operator::Gte,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    /// Parse a symbolic operator token. Returns `None` for anything outside
    /// `= != < > <= >= + - * /`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Operator::Eq),
            "!=" => Some(Operator::Ne),
            "<" => Some(Operator::Lt),
            ">" => Some(Operator::Gt),
            "<=" => Some(Operator::Lte),
            ">=" => Some(Operator::Gte),
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            _ => None,
        }
    }

    /// Store-native operator tag, e.g. `$gte`.
    pub const fn tag(self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Ne => "$ne",
            Operator::Lt => "$lt",
            Operator::Gt => "$gt",
            Operator::Lte => "$lte",
            Operator::Gte => "$gte",
            Operator::Add => "$add",
            Operator::Subtract => "$subtract",
            Operator::Multiply => "$multiply",
            Operator::Divide => "$divide",
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::Lte => "<=",
            Operator::Gte => ">=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Operator::Eq | Operator::Ne | Operator::Lt | Operator::Gt | Operator::Lte | Operator::Gte
        )
    }

    pub const fn is_arithmetic(self) -> bool {
        !self.is_comparison()
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Map a symbolic operator to its store-native tag.
pub fn map_operator(symbol: &str) -> Option<&'static str> {
    Operator::from_symbol(symbol).map(Operator::tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_symbols_map() {
        for (symbol, tag) in [
            ("=", "$eq"),
            ("!=", "$ne"),
            ("<", "$lt"),
            (">", "$gt"),
            ("<=", "$lte"),
            (">=", "$gte"),
        ] {
            assert_eq!(map_operator(symbol), Some(tag), "symbol {}", symbol);
        }
    }

    #[test]
    fn test_arithmetic_symbols_map() {
        assert_eq!(map_operator("+"), Some("$add"));
        assert_eq!(map_operator("-"), Some("$subtract"));
        assert_eq!(map_operator("*"), Some("$multiply"));
        assert_eq!(map_operator("/"), Some("$divide"));
    }

    #[test]
    fn test_unknown_symbols() {
        for symbol in ["==", "<>", "=>", "LIKE", "", "%", "!"] {
            assert_eq!(map_operator(symbol), None, "symbol {:?}", symbol);
        }
    }

    #[test]
    fn test_symbol_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn test_operator_classes() {
        assert!(Operator::Gte.is_comparison());
        assert!(!Operator::Gte.is_arithmetic());
        assert!(Operator::Divide.is_arithmetic());
        assert_eq!(
            Operator::ALL.iter().filter(|op| op.is_comparison()).count(),
            6
        );
    }
}
