//! Clause extraction: splits a statement at its keywords.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{DocqlError, DocqlResult};

fn keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(SELECT|FROM|WHERE|GROUP\s+BY|HAVING|ORDER\s+BY|LIMIT|OFFSET)\b")
            .expect("keyword pattern is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Clause {
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Limit,
    Offset,
}

impl Clause {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let normalized = keyword.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "SELECT" => Some(Clause::Select),
            "FROM" => Some(Clause::From),
            "WHERE" => Some(Clause::Where),
            "GROUP BY" => Some(Clause::GroupBy),
            "HAVING" => Some(Clause::Having),
            "ORDER BY" => Some(Clause::OrderBy),
            "LIMIT" => Some(Clause::Limit),
            "OFFSET" => Some(Clause::Offset),
            _ => None,
        }
    }

    /// Position in the statement. LIMIT and OFFSET share a rank.
    fn rank(self) -> u8 {
        match self {
            Clause::Select => 0,
            Clause::From => 1,
            Clause::Where => 2,
            Clause::GroupBy => 3,
            Clause::Having => 4,
            Clause::OrderBy => 5,
            Clause::Limit | Clause::Offset => 6,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
            Clause::Offset => "OFFSET",
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Clause texts of one statement, trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clauses {
    pub fields: Vec<String>,
    pub from: Option<String>,
    pub where_clause: Option<String>,
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Byte ranges covered by single-quoted literals.
fn quoted_ranges(statement: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;
    for (i, ch) in statement.char_indices() {
        if ch == '\'' {
            match open.take() {
                Some(start) => ranges.push((start, i)),
                None => open = Some(i),
            }
        }
    }
    if let Some(start) = open {
        ranges.push((start, statement.len()));
    }
    ranges
}

/// Locate every clause keyword outside quotes, in statement order.
fn keyword_positions(statement: &str) -> Vec<(Clause, usize, usize)> {
    let quoted = quoted_ranges(statement);
    keyword_regex()
        .find_iter(statement)
        .filter(|m| !quoted.iter().any(|&(s, e)| m.start() > s && m.start() < e))
        .filter_map(|m| Clause::from_keyword(m.as_str()).map(|c| (c, m.start(), m.end())))
        .collect()
}

fn parse_count(text: &str, clause: Clause) -> DocqlResult<u64> {
    text.trim().parse::<u64>().map_err(|_| match clause {
        Clause::Offset => DocqlError::InvalidOffset(text.trim().to_string()),
        _ => DocqlError::InvalidLimit(text.trim().to_string()),
    })
}

/// Split `statement` into its clauses.
pub fn extract_clauses(statement: &str) -> DocqlResult<Clauses> {
    let statement = statement.trim().trim_end_matches(';').trim_end();
    let positions = keyword_positions(statement);

    match positions.first() {
        Some((Clause::Select, 0, _)) => {}
        _ => return Err(DocqlError::ExpectedSelect),
    }

    let mut clauses = Clauses::default();
    let mut seen: Vec<Clause> = Vec::with_capacity(positions.len());

    for (i, &(clause, _, body_start)) in positions.iter().enumerate() {
        if seen.contains(&clause) {
            return Err(DocqlError::DuplicateClause(clause.to_string()));
        }
        if let Some(&last) = seen.iter().max_by_key(|c| c.rank()) {
            if clause.rank() < last.rank() {
                return Err(DocqlError::ClauseOutOfOrder {
                    clause: clause.to_string(),
                    after: last.to_string(),
                });
            }
        }
        seen.push(clause);

        let body_end = positions
            .get(i + 1)
            .map(|&(_, start, _)| start)
            .unwrap_or(statement.len());
        let body = statement[body_start..body_end].trim();
        let text = (!body.is_empty()).then(|| body.to_string());

        match clause {
            Clause::Select => {
                clauses.fields = body
                    .split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            Clause::From => {
                clauses.from = body.split_whitespace().next().map(str::to_string);
            }
            Clause::Where => clauses.where_clause = text,
            Clause::GroupBy => clauses.group_by = text,
            Clause::Having => clauses.having = text,
            Clause::OrderBy => clauses.order_by = text,
            Clause::Limit => clauses.limit = Some(parse_count(body, clause)?),
            Clause::Offset => clauses.offset = Some(parse_count(body, clause)?),
        }
    }

    Ok(clauses)
}
