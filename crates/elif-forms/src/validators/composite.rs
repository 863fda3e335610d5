//! Validators over nested values
//!
//! Each composite applies child rule chains to the pieces of an array or
//! object node. Child failures are collected into a single
//! `ValidationErrors` keyed by the dotted child path (`tags.1`,
//! `address.city`). Structural faults such as a missing or unrecognized
//! dict key stop immediately.

use crate::error::{FormError, FormResult, MissingFieldError, ValidationErrors};
use crate::scaffold::{sanitize, ScaffoldMap};
use crate::traits::{FormContext, RuleChain, ValidationRule};
use crate::value::FormValue;
use std::collections::BTreeMap;

fn child_path(field: &str, key: &str) -> String {
    format!("{}.{}", field, key)
}

/// Run a chain over one child, folding validation failures into `errors`
fn run_child(
    chain: &RuleChain,
    ctx: &FormContext<'_>,
    path: &str,
    value: &FormValue,
    errors: &mut ValidationErrors,
) -> FormResult<Option<FormValue>> {
    match chain.run(ctx, path, value.clone()) {
        Ok(validated) => Ok(Some(validated)),
        Err(FormError::Invalid(child_errors)) => {
            errors.merge(child_errors);
            Ok(None)
        }
        Err(other) => Err(other),
    }
}

#[derive(Debug, Clone)]
enum ListRules {
    Each(RuleChain),
    Positional(Vec<RuleChain>),
}

/// Validator for array values
#[derive(Debug, Clone)]
pub struct ListValidator {
    rules: ListRules,
}

impl ListValidator {
    /// Validate every element with the same chain
    pub fn each(chain: impl Into<RuleChain>) -> Self {
        Self {
            rules: ListRules::Each(chain.into()),
        }
    }

    /// Validate element `i` with chain `i`; the array must have exactly
    /// as many elements as there are chains
    pub fn positional<I, C>(chains: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<RuleChain>,
    {
        Self {
            rules: ListRules::Positional(chains.into_iter().map(Into::into).collect()),
        }
    }

    fn chain_for(&self, index: usize) -> Option<&RuleChain> {
        match self.rules {
            ListRules::Each(ref chain) => Some(chain),
            ListRules::Positional(ref chains) => chains.get(index),
        }
    }
}

impl ValidationRule for ListValidator {
    fn validate(&self, ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let Some(items) = value.as_array() else {
            return Err(self.raise_error(field, value).message("expected a list").into());
        };

        if let ListRules::Positional(ref chains) = self.rules {
            if chains.len() != items.len() {
                return Err(self
                    .raise_error(field, value)
                    .message(format!("expected {} elements, got {}", chains.len(), items.len()))
                    .into());
            }
        }

        let mut errors = ValidationErrors::new();
        let mut validated = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let Some(chain) = self.chain_for(index) else {
                continue;
            };
            let path = child_path(field, &index.to_string());
            if let Some(item) = run_child(chain, ctx, &path, item, &mut errors)? {
                validated.push(item);
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok(Some(FormValue::Array(validated)))
    }

    fn rule_name(&self) -> &'static str {
        "list"
    }

    fn populate(&self, ctx: &FormContext<'_>, field: &str) -> ScaffoldMap {
        match self.rules {
            ListRules::Each(ref chain) => chain.populate(ctx, field),
            ListRules::Positional(ref chains) => {
                let mut scaffold = ScaffoldMap::new();
                for (index, chain) in chains.iter().enumerate() {
                    let key = index.to_string();
                    scaffold.extend(sanitize(&key, chain.populate(ctx, &child_path(field, &key))));
                }
                scaffold
            }
        }
    }
}

/// Validator for objects with a fixed set of keys.
///
/// Keys the schema does not know are rejected rather than dropped, so no
/// unvalidated field can ride along with a trusted one.
#[derive(Debug, Clone, Default)]
pub struct DictValidator {
    schema: BTreeMap<String, RuleChain>,
}

impl DictValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key validated by `chain`
    pub fn field(mut self, key: impl Into<String>, chain: impl Into<RuleChain>) -> Self {
        self.schema.entry(key.into()).or_default().extend(chain.into());
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.schema.keys()
    }
}

impl ValidationRule for DictValidator {
    fn validate(&self, ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let Some(map) = value.as_object() else {
            return Err(self.raise_error(field, value).message("expected an object").into());
        };

        if let Some(unknown) = map.keys().find(|key| !self.schema.contains_key(*key)) {
            return Err(MissingFieldError::unrecognized(child_path(field, unknown), value.clone()).into());
        }
        if let Some(absent) = self.schema.keys().find(|key| !map.contains_key(*key)) {
            return Err(MissingFieldError::absent(child_path(field, absent), value.clone()).into());
        }

        let mut errors = ValidationErrors::new();
        let mut validated = BTreeMap::new();
        for (key, chain) in &self.schema {
            let path = child_path(field, key);
            if let Some(item) = run_child(chain, ctx, &path, &map[key], &mut errors)? {
                validated.insert(key.clone(), item);
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok(Some(FormValue::Object(validated)))
    }

    fn rule_name(&self) -> &'static str {
        "dict"
    }

    fn populate(&self, ctx: &FormContext<'_>, field: &str) -> ScaffoldMap {
        let mut scaffold = ScaffoldMap::new();
        for (key, chain) in &self.schema {
            scaffold.extend(sanitize(key, chain.populate(ctx, &child_path(field, key))));
        }
        scaffold
    }
}

/// Validator applying one chain to every value of an object, whatever
/// its keys
#[derive(Debug, Clone)]
pub struct MapValidator {
    chain: RuleChain,
}

impl MapValidator {
    pub fn new(chain: impl Into<RuleChain>) -> Self {
        Self { chain: chain.into() }
    }
}

impl ValidationRule for MapValidator {
    fn validate(&self, ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let Some(map) = value.as_object() else {
            return Err(self.raise_error(field, value).message("expected an object").into());
        };

        let mut errors = ValidationErrors::new();
        let mut validated = BTreeMap::new();
        for (key, item) in map {
            let path = child_path(field, key);
            if let Some(item) = run_child(&self.chain, ctx, &path, item, &mut errors)? {
                validated.insert(key.clone(), item);
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }
        Ok(Some(FormValue::Object(validated)))
    }

    fn rule_name(&self) -> &'static str {
        "map"
    }

    fn populate(&self, ctx: &FormContext<'_>, field: &str) -> ScaffoldMap {
        self.chain.populate(ctx, field)
    }
}
