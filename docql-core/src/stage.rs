//! Pipeline stages and their store-native documents.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::aggregation::Accumulator;
use crate::predicate::Predicate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `DESC` in any case is descending; anything else is ascending.
    pub fn from_keyword(keyword: &str) -> Self {
        if keyword.eq_ignore_ascii_case("DESC") {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lookup {
    pub local_field: String,
    pub from: String,
    pub foreign_field: String,
    pub as_field: String,
}

/// `$group` keyed by one field, with accumulators in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Group {
    pub key: String,
    pub accumulators: Vec<(String, Accumulator)>,
}

impl Group {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            accumulators: Vec::new(),
        }
    }

    /// Add an accumulator, replacing an existing one with the same alias.
    pub fn insert(&mut self, alias: String, accumulator: Accumulator) {
        match self.accumulators.iter_mut().find(|(a, _)| *a == alias) {
            Some(entry) => entry.1 = accumulator,
            None => self.accumulators.push((alias, accumulator)),
        }
    }

    pub fn get(&self, alias: &str) -> Option<&Accumulator> {
        self.accumulators
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, acc)| acc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    Project(Vec<String>),
    Lookup(Lookup),
    Match(Predicate),
    Group(Group),
    /// Empty keys render as an empty `$sort` document.
    Sort(Vec<SortKey>),
    Skip(u64),
    Limit(u64),
}

impl Stage {
    /// Stage operator name, e.g. `$match`.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Project(_) => "$project",
            Stage::Lookup(_) => "$lookup",
            Stage::Match(_) => "$match",
            Stage::Group(_) => "$group",
            Stage::Sort(_) => "$sort",
            Stage::Skip(_) => "$skip",
            Stage::Limit(_) => "$limit",
        }
    }

    pub fn to_document(&self) -> Value {
        let body = match self {
            Stage::Project(fields) => {
                let mut projection = Map::new();
                for field in fields {
                    projection.insert(field.clone(), json!(1));
                }
                Value::Object(projection)
            }
            Stage::Lookup(lookup) => json!({
                "from": lookup.from,
                "localField": lookup.local_field,
                "foreignField": lookup.foreign_field,
                "as": lookup.as_field,
            }),
            Stage::Match(predicate) => predicate.to_document(),
            Stage::Group(group) => {
                let mut body = Map::new();
                body.insert("_id".to_string(), json!(format!("${}", group.key)));
                for (alias, acc) in &group.accumulators {
                    body.insert(alias.clone(), acc.to_document());
                }
                Value::Object(body)
            }
            Stage::Sort(keys) => {
                let mut sort = Map::new();
                for key in keys {
                    sort.insert(key.field.clone(), json!(key.direction.as_i32()));
                }
                Value::Object(sort)
            }
            Stage::Skip(n) | Stage::Limit(n) => json!(n),
        };

        let mut doc = Map::new();
        doc.insert(self.name().to_string(), body);
        Value::Object(doc)
    }
}

/// Ordered stage sequence handed to a store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stage> {
        self.stages.iter()
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }

    pub fn to_documents(&self) -> Vec<Value> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

impl From<Vec<Stage>> for Pipeline {
    fn from(stages: Vec<Stage>) -> Self {
        Self { stages }
    }
}

impl<'a> IntoIterator for &'a Pipeline {
    type Item = &'a Stage;
    type IntoIter = std::slice::Iter<'a, Stage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
