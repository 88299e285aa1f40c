use crate::aggregation::split_alias;
use crate::builder::QueryBuilder;
use crate::error::DocqlResult;
use crate::options::CompilerOptions;

use super::clauses::extract_clauses;

/// Parse a statement into a [`QueryBuilder`] with default (lenient) options.
pub fn parse_sql(statement: &str) -> DocqlResult<QueryBuilder> {
    parse_sql_with(statement, CompilerOptions::default())
}

/// Parse a statement into a [`QueryBuilder`].
///
/// Builder calls are made in clause order: select, from, where, group by,
/// having, order by, limit, offset. With a GROUP BY and aggregate specs in the
/// select list, the projection is replaced by a single accumulating group.
///
/// ```rust
/// use docql_core::parse_sql;
///
/// let query = parse_sql("SELECT name FROM users WHERE age > 30 LIMIT 5")
///     .unwrap()
///     .build()
///     .unwrap();
/// assert_eq!(query.pipeline.len(), 3);
/// ```
pub fn parse_sql_with(statement: &str, options: CompilerOptions) -> DocqlResult<QueryBuilder> {
    let clauses = extract_clauses(statement)?;

    // Function calls in the select list; unsupported ones are left to
    // `nested_group_by`, which skips or rejects them per parse mode.
    let aggregates: Vec<&str> = clauses
        .fields
        .iter()
        .map(String::as_str)
        .filter(|f| split_alias(f).0.contains('('))
        .collect();
    let grouped = clauses.group_by.is_some() && !aggregates.is_empty();

    let mut builder = QueryBuilder::with_options(options);

    if !grouped {
        builder = builder.select(&clauses.fields);
    }
    if let Some(collection) = &clauses.from {
        builder = builder.from(collection);
    }
    if let Some(condition) = &clauses.where_clause {
        builder = builder.where_clause(condition);
    }
    if let Some(key) = &clauses.group_by {
        builder = if grouped {
            builder.nested_group_by(key, aggregates)
        } else {
            builder.group_by(key)
        };
    }
    if let Some(condition) = &clauses.having {
        builder = builder.having(condition);
    }
    if let Some(order) = &clauses.order_by {
        builder = builder.order_by(order);
    }
    if let Some(n) = clauses.limit {
        builder = builder.limit(n);
    }
    if let Some(n) = clauses.offset {
        builder = builder.offset(n);
    }

    Ok(builder)
}
