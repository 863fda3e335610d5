//! Core validation traits for elif forms

use crate::error::{FormResult, ValidationError};
use crate::scaffold::{sanitize, ScaffoldMap};
use crate::session::{NullSession, SessionStore};
use crate::value::FormValue;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Per-request collaborators available to validators
#[derive(Clone, Copy)]
pub struct FormContext<'a> {
    session: &'a dyn SessionStore,
}

impl<'a> FormContext<'a> {
    pub fn new(session: &'a dyn SessionStore) -> Self {
        Self { session }
    }

    /// Context for handlers without a session
    pub fn without_session() -> FormContext<'static> {
        FormContext { session: &NullSession }
    }

    pub fn session(&self) -> &'a dyn SessionStore {
        self.session
    }
}

impl fmt::Debug for FormContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormContext").finish_non_exhaustive()
    }
}

/// Core validation trait that all validators must implement
pub trait ValidationRule: Send + Sync {
    /// Validate the value found at `field`.
    ///
    /// `Ok(None)` accepts the value unchanged, `Ok(Some(v))` replaces it
    /// with `v` for the rest of the chain.
    fn validate(&self, ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>>;

    /// Rule name, used as the scaffold key prefix
    fn rule_name(&self) -> &'static str;

    /// Data a renderer can use to build the widget for `field`
    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        ScaffoldMap::new()
    }

    /// Build the error for a rejected value.
    ///
    /// Every `ValidationError` goes through here so that it carries the
    /// path, the raw value and the rejecting rule.
    fn raise_error(&self, field: &str, value: &FormValue) -> ValidationError {
        ValidationError::new(field, value.clone(), self.rule_name())
    }

    /// Text of a single leaf value, rejecting containers and `Null`
    fn expect_text<'v>(&self, field: &str, value: &'v FormValue) -> Result<Cow<'v, str>, ValidationError> {
        value
            .as_text()
            .ok_or_else(|| self.raise_error(field, value).message("expected a single value"))
    }
}

/// Ordered rules applied to one field, each fed the previous output
#[derive(Clone, Default)]
pub struct RuleChain {
    rules: Vec<Arc<dyn ValidationRule>>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the chain
    pub fn then<R>(mut self, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Append an already shared rule
    pub fn then_shared(mut self, rule: Arc<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push(&mut self, rule: Arc<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn extend(&mut self, other: RuleChain) {
        self.rules.extend(other.rules);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.rule_name()).collect()
    }

    /// Run every rule in order and return the final value
    pub fn run(&self, ctx: &FormContext<'_>, field: &str, value: FormValue) -> FormResult<FormValue> {
        let mut current = value;
        for rule in &self.rules {
            if let Some(replacement) = rule.validate(ctx, field, &current)? {
                current = replacement;
            }
        }
        Ok(current)
    }

    /// Scaffold data of every rule, each prefixed with its rule name
    pub fn populate(&self, ctx: &FormContext<'_>, field: &str) -> ScaffoldMap {
        let mut scaffold = ScaffoldMap::new();
        for rule in &self.rules {
            scaffold.extend(sanitize(rule.rule_name(), rule.populate(ctx, field)));
        }
        scaffold
    }
}

impl<R> From<R> for RuleChain
where
    R: ValidationRule + 'static,
{
    fn from(rule: R) -> Self {
        RuleChain::new().then(rule)
    }
}

impl fmt::Debug for RuleChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleChain")
            .field("rules", &self.rule_names())
            .finish()
    }
}
