//! Condition parser: `amount > 1000 AND status = 'active'`.
//!
//! Conditions are flat. A condition is split on `AND` when one appears,
//! otherwise on `OR`; the two connectives are never combined in one tree, and
//! parentheses are not interpreted. Every part must be exactly
//! `<field> <op> <value>`.

use crate::error::{DocqlError, DocqlResult};
use crate::operators::Operator;
use crate::options::ParseMode;
use crate::predicate::Predicate;
use crate::value::coerce;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionParser {
    mode: ParseMode,
}

impl ConditionParser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    /// Parse a condition string into a predicate.
    ///
    /// In lenient mode this never fails; malformed parts become
    /// [`Predicate::Always`].
    pub fn parse(&self, input: &str) -> DocqlResult<Predicate> {
        let tokens: Vec<&str> = input.split_whitespace().collect();

        if tokens.iter().any(|t| t.eq_ignore_ascii_case("AND")) {
            return Ok(Predicate::And(self.parse_parts(&tokens, "AND")?));
        }

        if tokens.iter().any(|t| t.eq_ignore_ascii_case("OR")) {
            return Ok(Predicate::Or(self.parse_parts(&tokens, "OR")?));
        }

        self.parse_single(&tokens)
    }

    fn parse_parts(&self, tokens: &[&str], connective: &str) -> DocqlResult<Vec<Predicate>> {
        tokens
            .split(|t| t.eq_ignore_ascii_case(connective))
            .map(|part| self.parse_single(part))
            .collect()
    }

    fn parse_single(&self, tokens: &[&str]) -> DocqlResult<Predicate> {
        match parse_comparison(tokens) {
            Some(predicate) => Ok(predicate),
            None if self.mode.is_strict() => Err(DocqlError::InvalidCondition(tokens.join(" "))),
            None => Ok(Predicate::Always),
        }
    }
}

/// Lenient condition parse.
pub fn parse_conditions(input: &str) -> Predicate {
    ConditionParser::new(ParseMode::Lenient)
        .parse(input)
        .unwrap_or(Predicate::Always)
}

fn parse_comparison(tokens: &[&str]) -> Option<Predicate> {
    let [field, operator, value] = tokens else {
        return None;
    };

    let op = Operator::from_symbol(operator).filter(|op| op.is_comparison())?;
    let value = value.trim_matches('\'');

    Some(Predicate::Comparison {
        field: field.to_string(),
        op,
        value: coerce(value),
    })
}
