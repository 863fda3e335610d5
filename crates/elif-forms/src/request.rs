//! Per-request form input

use crate::error::{FormError, FormResult};
use crate::flatten::{decode_urlencoded, unflatten};
use crate::value::FormValue;
use http::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::OnceCell;
use std::collections::{BTreeMap, HashSet};

/// Whether a request carries a form to validate or wants a form rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Decode and validate the submitted body
    Form,
    /// Collect scaffold data for rendering
    Scaffold,
}

/// Decoded input of one request.
///
/// The mode is decided the first time it is asked for and stays fixed
/// for the rest of the request.
#[derive(Debug)]
pub struct FormRequest {
    method: Method,
    form: Option<FormValue>,
    json: Option<Map<String, Value>>,
    mode: OnceCell<FormMode>,
}

impl FormRequest {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            form: None,
            json: None,
            mode: OnceCell::new(),
        }
    }

    /// Attach a form body given as flat key/value pairs
    pub fn with_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.form = Some(unflatten(pairs));
        self
    }

    /// Attach an `application/x-www-form-urlencoded` body
    pub fn with_urlencoded(mut self, body: &[u8]) -> FormResult<Self> {
        self.form = Some(decode_urlencoded(body)?);
        Ok(self)
    }

    /// Attach a parsed JSON body; anything but an object is ignored
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = match body {
            Value::Object(map) => Some(map),
            _ => None,
        };
        self
    }

    /// Attach a raw JSON body
    pub fn with_json_bytes(self, body: &[u8]) -> FormResult<Self> {
        let value: Value = serde_json::from_slice(body).map_err(|e| FormError::MalformedBody(e.to_string()))?;
        Ok(self.with_json(value))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The mode for this request, decided once
    pub fn mode(&self, form_methods: &HashSet<Method>) -> FormMode {
        *self.mode.get_or_init(|| {
            if form_methods.contains(&self.method) {
                FormMode::Form
            } else {
                FormMode::Scaffold
            }
        })
    }

    /// Find a top-level field, form body first, then the JSON body.
    /// A JSON `null` counts as absent.
    pub fn lookup(&self, name: &str) -> Option<FormValue> {
        if let Some(value) = self.form.as_ref().and_then(|form| form.get(name)) {
            return Some(value.clone());
        }
        self.json
            .as_ref()
            .and_then(|json| json.get(name))
            .filter(|value| !value.is_null())
            .cloned()
            .map(FormValue::from)
    }

    /// Everything that was submitted, for diagnostics
    pub fn input(&self) -> FormValue {
        let mut input = match self.json {
            Some(ref json) => FormValue::from(Value::Object(json.clone())),
            None => FormValue::object(),
        };
        if let (FormValue::Object(merged), Some(FormValue::Object(form))) = (&mut input, &self.form) {
            for (key, value) in form {
                merged.insert(key.clone(), value.clone());
            }
        }
        input
    }
}

/// Validated fields of a submitted form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedForm {
    values: BTreeMap<String, FormValue>,
}

impl ValidatedForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormValue)> {
        self.values.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, FormValue> {
        self.values
    }

    /// The validated fields as one object node
    pub fn to_value(&self) -> FormValue {
        FormValue::Object(self.values.clone())
    }
}
