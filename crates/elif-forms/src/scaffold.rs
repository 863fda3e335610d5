//! Scaffold data handed to the rendering layer

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Flat `"{rule}_{attribute}"` → value mapping
pub type ScaffoldMap = BTreeMap<String, Value>;

/// Prefix every key of `fields` with the rule name
pub fn sanitize(rule_name: &str, fields: ScaffoldMap) -> ScaffoldMap {
    fields
        .into_iter()
        .map(|(key, value)| (format!("{}_{}", rule_name, key), value))
        .collect()
}

/// Scaffold data for every field of a form, grouped by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Scaffold {
    fields: BTreeMap<String, ScaffoldMap>,
}

impl Scaffold {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge entries for a field; empty maps are skipped
    pub fn extend(&mut self, field: &str, entries: ScaffoldMap) {
        if entries.is_empty() {
            return;
        }
        self.fields
            .entry(field.to_string())
            .or_default()
            .extend(entries);
    }

    pub fn field(&self, field: &str) -> Option<&ScaffoldMap> {
        self.fields.get(field)
    }

    /// Look up a single scaffold value, e.g. `get("email", "email_domain")`
    pub fn get(&self, field: &str, key: &str) -> Option<&Value> {
        self.fields.get(field).and_then(|map| map.get(key))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScaffoldMap)> {
        self.fields.iter()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
