use serde_json::{Map, Value, json};

/// A single predicate on one (possibly dotted) record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
    Range {
        field: String,
        gt: Option<Value>,
        lt: Option<Value>,
    },
}

impl Clause {
    pub fn field(&self) -> &str {
        match self {
            Clause::Eq { field, .. }
            | Clause::In { field, .. }
            | Clause::Range { field, .. } => field,
        }
    }

    fn to_condition(&self) -> Value {
        match self {
            Clause::Eq { value, .. } => value.clone(),
            Clause::In { values, .. } => json!({ "$in": values }),
            Clause::Range { gt, lt, .. } => {
                let mut condition = Map::new();
                if let Some(gt) = gt {
                    condition.insert("$gt".to_string(), gt.clone());
                }
                if let Some(lt) = lt {
                    condition.insert("$lt".to_string(), lt.clone());
                }
                Value::Object(condition)
            }
        }
    }

    fn matches(&self, record: &Value) -> bool {
        let found = resolve_path(record, self.field());
        match self {
            Clause::Eq { value, .. } => found.iter().any(|candidate| same_value(candidate, value)),
            Clause::In { values, .. } => found
                .iter()
                .any(|candidate| values.iter().any(|value| same_value(candidate, value))),
            Clause::Range { gt, lt, .. } => found.iter().any(|candidate| {
                let Some(number) = candidate.as_f64() else {
                    return false;
                };
                let above = gt
                    .as_ref()
                    .and_then(Value::as_f64)
                    .is_none_or(|bound| number > bound);
                let below = lt
                    .as_ref()
                    .and_then(Value::as_f64)
                    .is_none_or(|bound| number < bound);
                above && below
            }),
        }
    }
}

/// Request-scoped translation of tool arguments into the upstream's
/// MongoDB-style filter document. Clauses are ANDed; one clause per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    clauses: Vec<Clause>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Clause::Eq {
            field: field.into(),
            value: value.into(),
        })
    }

    pub fn one_of<I, V>(self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.with(Clause::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Strict `lower < field < upper`.
    pub fn between_exclusive(
        self,
        field: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        self.with(Clause::Range {
            field: field.into(),
            gt: Some(lower.into()),
            lt: Some(upper.into()),
        })
    }

    fn with(mut self, clause: Clause) -> Self {
        self.clauses.retain(|existing| existing.field() != clause.field());
        self.clauses.push(clause);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn to_document(&self) -> Value {
        let document: Map<String, Value> = self
            .clauses
            .iter()
            .map(|clause| (clause.field().to_string(), clause.to_condition()))
            .collect();
        Value::Object(document)
    }

    /// Serialised `filter` query parameter, `None` when nothing is filtered.
    pub fn to_query_string(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_document().to_string())
        }
    }

    /// Evaluates the filter locally with the upstream's array semantics: a
    /// clause on an array field holds when any element satisfies it.
    pub fn matches(&self, record: &Value) -> bool {
        self.clauses.iter().all(|clause| clause.matches(record))
    }
}

fn resolve_path<'a>(record: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![record];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in current {
            match value {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child);
                    }
                }
                Value::Array(items) => {
                    next.extend(items.iter().filter_map(|item| item.get(segment)));
                }
                _ => {}
            }
        }
        current = next;
    }

    current
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

fn same_value(candidate: &Value, expected: &Value) -> bool {
    match (candidate.as_f64(), expected.as_f64()) {
        (Some(left), Some(right)) => left == right,
        _ => candidate == expected,
    }
}
