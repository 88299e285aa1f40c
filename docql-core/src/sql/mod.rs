//! SQL-like statements: `SELECT .. FROM .. [WHERE ..] [GROUP BY ..] [HAVING ..]
//! [ORDER BY ..] [LIMIT n] [OFFSET n]`.

pub mod clauses;
mod translator;

pub use clauses::{extract_clauses, Clause, Clauses};
pub use translator::{parse_sql, parse_sql_with};
