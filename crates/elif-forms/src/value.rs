//! Structured form values

use chrono::{NaiveDate, NaiveTime};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// A node of decoded request data.
///
/// The flattener only produces `Scalar`, `Array` and `Object`. The other
/// variants come from the JSON fallback or from validators that replace a
/// string leaf with a parsed value.
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Scalar(String),
    Date(NaiveDate),
    Time(NaiveTime),
    Array(Vec<FormValue>),
    Object(BTreeMap<String, FormValue>),
}

impl FormValue {
    /// Create an empty object node
    pub fn object() -> Self {
        FormValue::Object(BTreeMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FormValue::Null)
    }

    /// Borrow the string of a `Scalar` leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FormValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<FormValue>> {
        match self {
            FormValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, FormValue>> {
        match self {
            FormValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child of an object node
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Text form of a single leaf, `None` for containers and `Null`
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FormValue::Scalar(s) => Some(Cow::Borrowed(s)),
            FormValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            FormValue::Number(n) => Some(Cow::Owned(n.to_string())),
            FormValue::Date(d) => Some(Cow::Owned(d.format("%Y-%m-%d").to_string())),
            FormValue::Time(t) => Some(Cow::Owned(t.format("%H:%M:%S%.f").to_string())),
            FormValue::Null | FormValue::Array(_) | FormValue::Object(_) => None,
        }
    }

    /// Truthiness used by filter policies: empty text, empty containers,
    /// `Null`, `false` and zero are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FormValue::Null => false,
            FormValue::Bool(b) => *b,
            FormValue::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
            FormValue::Scalar(s) => !s.is_empty(),
            FormValue::Date(_) | FormValue::Time(_) => true,
            FormValue::Array(items) => !items.is_empty(),
            FormValue::Object(map) => !map.is_empty(),
        }
    }

    /// Convert to a plain JSON value
    pub fn to_json(&self) -> Value {
        match self {
            FormValue::Null => Value::Null,
            FormValue::Bool(b) => Value::Bool(*b),
            FormValue::Number(n) => Value::Number(n.clone()),
            FormValue::Scalar(s) => Value::String(s.clone()),
            FormValue::Date(_) | FormValue::Time(_) => {
                Value::String(self.as_text().map(Cow::into_owned).unwrap_or_default())
            }
            FormValue::Array(items) => Value::Array(items.iter().map(FormValue::to_json).collect()),
            FormValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Flatten back into dotted key/value pairs.
    ///
    /// Arrays emit their positions as numeric segments. Empty containers
    /// and `Null` leaves produce no pairs.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        match self {
            FormValue::Object(map) => {
                for (key, value) in map {
                    value.collect_pairs(key.clone(), &mut pairs);
                }
            }
            other => other.collect_pairs(String::new(), &mut pairs),
        }
        pairs
    }

    fn collect_pairs(&self, prefix: String, out: &mut Vec<(String, String)>) {
        match self {
            FormValue::Object(map) => {
                for (key, value) in map {
                    value.collect_pairs(join(&prefix, key), out);
                }
            }
            FormValue::Array(items) => {
                for (index, value) in items.iter().enumerate() {
                    value.collect_pairs(join(&prefix, &index.to_string()), out);
                }
            }
            leaf => {
                if let Some(text) = leaf.as_text() {
                    out.push((prefix, text.into_owned()));
                }
            }
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}

impl Default for FormValue {
    fn default() -> Self {
        FormValue::Null
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{:?}", text),
            None => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<Value> for FormValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => FormValue::Null,
            Value::Bool(b) => FormValue::Bool(b),
            Value::Number(n) => FormValue::Number(n),
            Value::String(s) => FormValue::Scalar(s),
            Value::Array(items) => FormValue::Array(items.into_iter().map(FormValue::from).collect()),
            Value::Object(map) => {
                FormValue::Object(map.into_iter().map(|(k, v)| (k, FormValue::from(v))).collect())
            }
        }
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Scalar(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Scalar(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        FormValue::Bool(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        FormValue::Number(value.into())
    }
}

impl From<NaiveDate> for FormValue {
    fn from(value: NaiveDate) -> Self {
        FormValue::Date(value)
    }
}

impl From<NaiveTime> for FormValue {
    fn from(value: NaiveTime) -> Self {
        FormValue::Time(value)
    }
}

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FormValue::Null, Into::into)
    }
}

impl<T: Into<FormValue>> From<Vec<T>> for FormValue {
    fn from(values: Vec<T>) -> Self {
        FormValue::Array(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_shape() {
        let value = FormValue::from(json!({"a": ["x", 1, true, null], "b": {"c": "d"}}));
        let a = value.get("a").and_then(FormValue::as_array).unwrap();
        assert_eq!(a[0], FormValue::Scalar("x".to_string()));
        assert_eq!(a[1], FormValue::from(1i64));
        assert_eq!(a[2], FormValue::Bool(true));
        assert!(a[3].is_null());
        assert_eq!(value.get("b").and_then(|b| b.get("c")), Some(&FormValue::from("d")));
    }

    #[test]
    fn test_truthiness() {
        assert!(FormValue::from("x").is_truthy());
        assert!(!FormValue::from("").is_truthy());
        assert!(!FormValue::from(0i64).is_truthy());
        assert!(!FormValue::Null.is_truthy());
        assert!(!FormValue::Array(vec![]).is_truthy());
        assert!(FormValue::from(vec!["a"]).is_truthy());
    }

    #[test]
    fn test_to_pairs_uses_dotted_indices() {
        let value = FormValue::from(json!({
            "input": {"test_list": ["a", "b"], "name": "n"},
            "empty": [],
        }));
        let pairs = value.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("input.name".to_string(), "n".to_string()),
                ("input.test_list.0".to_string(), "a".to_string()),
                ("input.test_list.1".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_dates_render_as_iso_text() {
        let date = NaiveDate::from_ymd_opt(2020, 4, 10).unwrap();
        assert_eq!(FormValue::from(date).to_json(), json!("2020-04-10"));
    }
}
