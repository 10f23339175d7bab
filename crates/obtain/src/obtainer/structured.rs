// ABOUTME: Policies for list-shaped kinds (array, table, link, image).
// ABOUTME: Scalars are coerced to one-element lists so scalar rules also serve list jobs.

use serde_json::Value;

use crate::obtainer::{Cleaner, ObtainerKind, Outcome, Validator};

/// Coerces scalars to lists and trims every string leaf.
#[derive(Debug, Default, Clone, Copy)]
pub struct ListCleaner;

fn trim_leaves(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.trim().to_string()),
        Value::Array(items) => Value::Array(items.into_iter().map(trim_leaves).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, trim_leaves(v))).collect()),
        other => other,
    }
}

impl Cleaner for ListCleaner {
    fn clean(&self, raw: Outcome) -> Outcome {
        match raw {
            Outcome::Text(s) | Outcome::Tag(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Outcome::Records(Vec::new())
                } else {
                    Outcome::Records(vec![Value::String(s.to_string())])
                }
            }
            Outcome::Records(items) => Outcome::Records(items.into_iter().map(trim_leaves).collect()),
        }
    }
}

/// Requires a non-empty list whose items have the kind's record shape.
pub struct ListValidator {
    kind: ObtainerKind,
}

impl ListValidator {
    pub fn for_kind(kind: ObtainerKind) -> Self {
        Self { kind }
    }

    fn item_ok(&self, item: &Value) -> bool {
        let has_string = |key: &str| item.get(key).is_some_and(Value::is_string);
        match self.kind {
            ObtainerKind::Table => match item {
                Value::String(_) => true,
                Value::Array(cells) => cells.iter().all(Value::is_string),
                _ => false,
            },
            ObtainerKind::Link => item.is_string() || has_string("href"),
            ObtainerKind::Image => item.is_string() || has_string("src"),
            _ => item.is_string(),
        }
    }
}

impl Validator for ListValidator {
    fn validate(&self, value: &Outcome) -> bool {
        match value {
            Outcome::Records(items) => !items.is_empty() && items.iter().all(|i| self.item_ok(i)),
            _ => false,
        }
    }
}
