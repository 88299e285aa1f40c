//! Expression parser for computed comparisons such as
//! `SUM(amount) / COUNT(*) > 1000`.

use std::sync::OnceLock;

use regex::Regex;

use crate::condition::ConditionParser;
use crate::error::{DocqlError, DocqlResult};
use crate::operators::Operator;
use crate::options::ParseMode;
use crate::outcome::Translation;
use crate::predicate::{AggregateKind, ExprComparison, Operand, Predicate};
use crate::value::coerce;

fn expression_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^([\w()*]+)\s*([+\-*/><=]+)\s*([\w()*]+)(?:\s*([+\-*/><=]+)\s*([\w()*]+))?$",
        )
        .expect("expression pattern is valid")
    })
}

/// Parse `<operand> <op> <operand>` or `<operand> <arith> <operand> <cmp> <operand>`
/// into an [`Predicate::Expr`].
///
/// Returns [`DocqlError::NotAnExpression`] or [`DocqlError::UnsupportedOperator`]
/// when the input is not an expression; callers fall back to the condition parser.
pub fn parse_expression(input: &str) -> DocqlResult<Predicate> {
    let input = input.trim();
    let caps = expression_regex()
        .captures(input)
        .ok_or_else(|| DocqlError::NotAnExpression(input.to_string()))?;

    let first = operator(&caps[2])?;
    let left = parse_operand(&caps[1]);
    let middle = parse_operand(&caps[3]);

    let expr = match (caps.get(4), caps.get(5)) {
        (Some(op), Some(operand)) => {
            let second = operator(op.as_str())?;
            if !first.is_arithmetic() || !second.is_comparison() {
                return Err(DocqlError::NotAnExpression(input.to_string()));
            }
            ExprComparison {
                left: Operand::Computed {
                    op: first,
                    left: Box::new(left),
                    right: Box::new(middle),
                },
                op: second,
                right: parse_operand(operand.as_str()),
            }
        }
        _ => ExprComparison {
            left,
            op: first,
            right: middle,
        },
    };

    Ok(Predicate::Expr(expr))
}

fn operator(symbol: &str) -> DocqlResult<Operator> {
    Operator::from_symbol(symbol).ok_or_else(|| DocqlError::UnsupportedOperator(symbol.to_string()))
}

/// Resolve one operand: numeric literal, `SUM(field)`, `COUNT(..)` or a field.
pub fn parse_operand(input: &str) -> Operand {
    let input = input.trim();

    let literal = coerce(input);
    if literal.is_numeric() {
        return Operand::Literal(literal);
    }

    if let Some(inner) = function_argument(input, "SUM") {
        return Operand::Aggregate {
            kind: AggregateKind::Sum,
            field: Some(inner.to_string()),
        };
    }

    if function_argument(input, "COUNT").is_some() {
        return Operand::count_all();
    }

    Operand::FieldRef(input.to_string())
}

/// Argument of `NAME(arg)`, matching the name case-insensitively.
pub(crate) fn function_argument<'a>(input: &'a str, name: &str) -> Option<&'a str> {
    let head = input.get(..name.len())?;
    if !head.eq_ignore_ascii_case(name) {
        return None;
    }
    let rest = input[name.len()..].strip_prefix('(')?;
    Some(rest.strip_suffix(')').unwrap_or(rest).trim())
}

/// Parse a filter the way WHERE, HAVING and MATCH do: as an expression first,
/// then as plain conditions.
pub fn translate_filter(input: &str, mode: ParseMode) -> DocqlResult<Translation<Predicate>> {
    match parse_expression(input) {
        Ok(predicate) => Ok(Translation::Parsed(predicate)),
        Err(_) => ConditionParser::new(mode)
            .parse(input)
            .map(Translation::Fallback),
    }
}
