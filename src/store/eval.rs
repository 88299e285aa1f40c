//! Pipeline evaluation over JSON documents.
//!
//! - get_field_value: dot-path lookup
//! - values_equal / compare_values: comparison with numbers compared as f64
//! - matches: predicate evaluation, including `$expr`
//! - apply_stage: one pipeline stage over a document batch

use std::cmp::Ordering;

use docql_core::{Accumulator, AggregateKind, Group, Lookup, Operand, Operator, Predicate, SortKey, Stage};
use serde_json::{Map, Number, Value};

/// Extract a nested field value. Missing paths yield `Value::Null`.
#[inline]
pub fn get_field_value(value: &Value, field_path: &str) -> Value {
    let mut current = value;

    for part in field_path.split('.') {
        match current.get(part) {
            Some(val) => current = val,
            None => return Value::Null,
        }
    }

    current.clone()
}

/// Set a nested field, creating intermediate objects as needed.
pub fn set_field_value(target: &mut Map<String, Value>, field_path: &str, value: Value) {
    match field_path.split_once('.') {
        None => {
            target.insert(field_path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                set_field_value(map, rest, value);
            }
        }
    }
}

/// Numbers compare by their f64 value, so `5` equals `5.0`.
#[inline]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

#[inline]
pub fn number_from_f64(n: f64) -> Number {
    Number::from_f64(n).unwrap_or_else(|| Number::from(0))
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order: Null < Bool < Number < String < Array < Object.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Number(a), Value::Number(b)) => {
            let a_f64 = a.as_f64().unwrap_or(0.0);
            let b_f64 = b.as_f64().unwrap_or(0.0);
            a_f64.partial_cmp(&b_f64).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare(left: &Value, op: Operator, right: &Value) -> bool {
    // Ordering operators only apply within one type.
    let comparable = type_rank(left) == type_rank(right);
    match op {
        Operator::Eq => values_equal(left, right),
        Operator::Ne => !values_equal(left, right),
        Operator::Lt => comparable && compare_values(left, right) == Ordering::Less,
        Operator::Lte => comparable && compare_values(left, right) != Ordering::Greater,
        Operator::Gt => comparable && compare_values(left, right) == Ordering::Greater,
        Operator::Gte => comparable && compare_values(left, right) != Ordering::Less,
        _ => false,
    }
}

fn arithmetic(left: &Value, op: Operator, right: &Value) -> Value {
    let (Some(a), Some(b)) = (left.as_f64(), right.as_f64()) else {
        return Value::Null;
    };

    if let (Some(x), Some(y)) = (left.as_i64(), right.as_i64()) {
        let exact = match op {
            Operator::Add => x.checked_add(y),
            Operator::Subtract => x.checked_sub(y),
            Operator::Multiply => x.checked_mul(y),
            _ => None,
        };
        if let Some(n) = exact {
            return Value::from(n);
        }
    }

    let result = match op {
        Operator::Add => a + b,
        Operator::Subtract => a - b,
        Operator::Multiply => a * b,
        Operator::Divide if b == 0.0 => return Value::Null,
        Operator::Divide => a / b,
        _ => return Value::Null,
    };
    Value::Number(number_from_f64(result))
}

/// Evaluate an operand against one document.
///
/// Outside a `$group`, `{"$sum": "$f"}` is the field itself and
/// `{"$sum": 1}` is 1.
pub fn eval_operand(doc: &Value, operand: &Operand) -> Value {
    match operand {
        Operand::Literal(scalar) => scalar.to_value(),
        Operand::FieldRef(field) => get_field_value(doc, field),
        Operand::Aggregate {
            kind: AggregateKind::Sum,
            field,
        } => match field {
            Some(field) => get_field_value(doc, field),
            None => Value::Null,
        },
        Operand::Aggregate {
            kind: AggregateKind::CountAll,
            ..
        } => Value::from(1),
        Operand::Computed { op, left, right } => {
            arithmetic(&eval_operand(doc, left), *op, &eval_operand(doc, right))
        }
    }
}

pub fn matches(doc: &Value, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Always => true,
        Predicate::Comparison { field, op, value } => {
            compare(&get_field_value(doc, field), *op, &value.to_value())
        }
        Predicate::And(children) => children.iter().all(|c| matches(doc, c)),
        Predicate::Or(children) => children.iter().any(|c| matches(doc, c)),
        Predicate::Expr(expr) => compare(
            &eval_operand(doc, &expr.left),
            expr.op,
            &eval_operand(doc, &expr.right),
        ),
    }
}

/// Running `$sum`: stays an integer until a float or an overflow shows up.
#[derive(Debug, Clone, Copy)]
enum Total {
    Int(i64),
    Float(f64),
}

impl Total {
    fn add(self, value: &Value) -> Self {
        let Value::Number(n) = value else {
            return self;
        };
        match (self, n.as_i64()) {
            (Total::Int(acc), Some(x)) => match acc.checked_add(x) {
                Some(sum) => Total::Int(sum),
                None => Total::Float(acc as f64 + x as f64),
            },
            (Total::Int(acc), None) => Total::Float(acc as f64 + n.as_f64().unwrap_or(0.0)),
            (Total::Float(acc), _) => Total::Float(acc + n.as_f64().unwrap_or(0.0)),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Total::Int(n) => Value::from(n),
            Total::Float(f) => Value::Number(number_from_f64(f)),
        }
    }
}

fn project(doc: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id".to_string(), id.clone());
    }
    for field in fields {
        let value = get_field_value(doc, field);
        if !value.is_null() {
            set_field_value(&mut out, field, value);
        }
    }
    Value::Object(out)
}

fn group(docs: Vec<Value>, group: &Group) -> Vec<Value> {
    // Keys in first-seen order.
    let mut buckets: Vec<(Value, Vec<Total>)> = Vec::new();

    for doc in &docs {
        let key = get_field_value(doc, &group.key);
        let index = match buckets.iter().position(|(k, _)| values_equal(k, &key)) {
            Some(i) => i,
            None => {
                buckets.push((key, vec![Total::Int(0); group.accumulators.len()]));
                buckets.len() - 1
            }
        };
        let totals = &mut buckets[index].1;
        for (total, (_, acc)) in totals.iter_mut().zip(&group.accumulators) {
            *total = match acc {
                Accumulator::Sum(field) => total.add(&get_field_value(doc, field)),
                Accumulator::CountAll => total.add(&Value::from(1)),
            };
        }
    }

    buckets
        .into_iter()
        .map(|(key, totals)| {
            let mut out = Map::new();
            out.insert("_id".to_string(), key);
            for ((alias, _), total) in group.accumulators.iter().zip(totals) {
                out.insert(alias.clone(), total.into_value());
            }
            Value::Object(out)
        })
        .collect()
}

fn sort(mut docs: Vec<Value>, keys: &[SortKey]) -> Vec<Value> {
    docs.sort_by(|a, b| {
        for key in keys {
            let ord = compare_values(&get_field_value(a, &key.field), &get_field_value(b, &key.field));
            let ord = if key.direction.as_i32() < 0 { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    docs
}

fn lookup<F>(docs: Vec<Value>, lookup: &Lookup, foreign: F) -> Vec<Value>
where
    F: Fn(&str) -> Vec<Value>,
{
    let candidates = foreign(&lookup.from);
    docs.into_iter()
        .map(|mut doc| {
            let local = get_field_value(&doc, &lookup.local_field);
            let joined: Vec<Value> = candidates
                .iter()
                .filter(|f| values_equal(&get_field_value(f, &lookup.foreign_field), &local))
                .cloned()
                .collect();
            if let Value::Object(map) = &mut doc {
                set_field_value(map, &lookup.as_field, Value::Array(joined));
            }
            doc
        })
        .collect()
}

/// Apply one stage. `foreign` resolves a collection name for `$lookup`.
pub fn apply_stage<F>(docs: Vec<Value>, stage: &Stage, foreign: F) -> Vec<Value>
where
    F: Fn(&str) -> Vec<Value>,
{
    match stage {
        Stage::Project(fields) => docs.iter().map(|d| project(d, fields)).collect(),
        Stage::Lookup(spec) => lookup(docs, spec, foreign),
        Stage::Match(predicate) => docs.into_iter().filter(|d| matches(d, predicate)).collect(),
        Stage::Group(spec) => group(docs, spec),
        Stage::Sort(keys) => sort(docs, keys),
        Stage::Skip(n) => docs.into_iter().skip(usize::try_from(*n).unwrap_or(usize::MAX)).collect(),
        Stage::Limit(n) => docs.into_iter().take(usize::try_from(*n).unwrap_or(usize::MAX)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docql_core::{parse_expression, parse_conditions, SortDirection};
    use serde_json::json;

    #[test]
    fn test_get_field_value_paths() {
        let doc = json!({"address": {"city": "Lyon"}, "n": 1});
        assert_eq!(get_field_value(&doc, "address.city"), json!("Lyon"));
        assert_eq!(get_field_value(&doc, "address.zip"), Value::Null);
        assert_eq!(get_field_value(&doc, "n"), json!(1));
    }

    #[test]
    fn test_numbers_compare_across_int_and_float() {
        assert!(values_equal(&json!(5), &json!(5.0)));
        assert_eq!(compare_values(&json!(2), &json!(10.5)), Ordering::Less);
        assert_eq!(compare_values(&Value::Null, &json!(false)), Ordering::Less);
        assert_eq!(compare_values(&json!(3), &json!("3")), Ordering::Less);
    }

    #[test]
    fn test_matches_conditions() {
        let doc = json!({"price": 150.0, "stock": 20, "status": "active"});
        assert!(matches(&doc, &parse_conditions("price > 100 AND status = 'active'")));
        assert!(!matches(&doc, &parse_conditions("price > 100 AND stock > 50")));
        assert!(matches(&doc, &parse_conditions("price > 500 OR stock <= 20")));
        // strings never order against numbers
        assert!(!matches(&doc, &parse_conditions("status > 5")));
    }

    #[test]
    fn test_matches_computed_expression() {
        let doc = json!({"total": 9000, "cnt": 3});
        let expr = parse_expression("total / cnt > 2000").unwrap();
        assert!(matches(&doc, &expr));

        let expr = parse_expression("total / missing > 0").unwrap();
        assert!(!matches(&doc, &expr));
    }

    #[test]
    fn test_group_sums_and_counts() {
        let docs = vec![
            json!({"region": "eu", "amount": 10}),
            json!({"region": "us", "amount": 2.5}),
            json!({"region": "eu", "amount": 5}),
            json!({"region": "us", "amount": "n/a"}),
        ];
        let mut spec = Group::new("region");
        spec.insert("total".into(), Accumulator::Sum("amount".into()));
        spec.insert("cnt".into(), Accumulator::CountAll);

        let out = apply_stage(docs, &Stage::Group(spec), |_| vec![]);
        assert_eq!(
            out,
            vec![
                json!({"_id": "eu", "total": 15, "cnt": 2}),
                json!({"_id": "us", "total": 2.5, "cnt": 2}),
            ]
        );
    }

    #[test]
    fn test_sort_is_stable_and_directional() {
        let docs = vec![
            json!({"k": 1, "tag": "a"}),
            json!({"k": 2, "tag": "b"}),
            json!({"k": 1, "tag": "c"}),
        ];
        let keys = vec![SortKey {
            field: "k".into(),
            direction: SortDirection::Descending,
        }];
        let out = apply_stage(docs, &Stage::Sort(keys), |_| vec![]);
        let tags: Vec<_> = out.iter().map(|d| d["tag"].clone()).collect();
        assert_eq!(tags, vec![json!("b"), json!("a"), json!("c")]);
    }

    #[test]
    fn test_project_keeps_id_and_nested_paths() {
        let docs = vec![json!({"_id": 7, "a": {"b": 1, "c": 2}, "d": 3})];
        let out = apply_stage(docs, &Stage::Project(vec!["a.b".into(), "zz".into()]), |_| vec![]);
        assert_eq!(out, vec![json!({"_id": 7, "a": {"b": 1}})]);
    }

    #[test]
    fn test_lookup_joins_on_equality() {
        let orders = vec![json!({"customer_id": 1}), json!({"customer_id": 9})];
        let stage = Stage::Lookup(Lookup {
            local_field: "customer_id".into(),
            from: "customers".into(),
            foreign_field: "_id".into(),
            as_field: "customer".into(),
        });
        let out = apply_stage(orders, &stage, |name| {
            assert_eq!(name, "customers");
            vec![json!({"_id": 1.0, "name": "Ada"})]
        });
        assert_eq!(out[0]["customer"], json!([{"_id": 1.0, "name": "Ada"}]));
        assert_eq!(out[1]["customer"], json!([]));
    }

    #[test]
    fn test_skip_and_limit() {
        let docs: Vec<Value> = (0..5).map(|i| json!({ "i": i })).collect();
        let docs = apply_stage(docs, &Stage::Skip(1), |_| vec![]);
        let docs = apply_stage(docs, &Stage::Limit(2), |_| vec![]);
        assert_eq!(docs, vec![json!({"i": 1}), json!({"i": 2})]);
    }
}
