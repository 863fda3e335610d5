//! Closure-backed validators

use crate::error::{BoxError, FormResult};
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use std::fmt;
use std::sync::Arc;

/// Fallible conversion applied by [`LambdaMapValidator`]
pub type MapFn = Arc<dyn Fn(&FormValue) -> Result<FormValue, BoxError> + Send + Sync>;

/// Check applied by [`LambdaFilterValidator`]
pub type FilterFn = Arc<dyn Fn(&FormValue) -> Result<FormValue, BoxError> + Send + Sync>;

/// Runs a closure over the value and replaces the value with its result.
///
/// A closure error becomes a `ValidationError` with the error as cause.
#[derive(Clone)]
pub struct LambdaMapValidator {
    map: MapFn,
}

impl LambdaMapValidator {
    pub fn new<F, E>(map: F) -> Self
    where
        F: Fn(&FormValue) -> Result<FormValue, E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self {
            map: Arc::new(move |value: &FormValue| -> Result<FormValue, BoxError> {
                map(value).map_err(Into::into)
            }),
        }
    }
}

impl fmt::Debug for LambdaMapValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaMapValidator").finish_non_exhaustive()
    }
}

impl ValidationRule for LambdaMapValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        match (self.map)(value) {
            Ok(mapped) => Ok(Some(mapped)),
            Err(cause) => Err(self.raise_error(field, value).caused_by(cause).into()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "lambdamap"
    }
}

/// How a filter result is judged
#[derive(Debug, Clone, PartialEq)]
pub enum Matches {
    Truthy,
    Falsy,
    Null,
    NotNull,
    /// The result must equal this value
    Equals(FormValue),
}

impl Matches {
    fn accepts(&self, result: &FormValue) -> bool {
        match self {
            Matches::Truthy => result.is_truthy(),
            Matches::Falsy => !result.is_truthy(),
            Matches::Null => result.is_null(),
            Matches::NotNull => !result.is_null(),
            Matches::Equals(expected) => result == expected,
        }
    }
}

impl fmt::Display for Matches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matches::Truthy => write!(f, "TRUTHY"),
            Matches::Falsy => write!(f, "FALSY"),
            Matches::Null => write!(f, "NONE"),
            Matches::NotNull => write!(f, "NOT_NONE"),
            Matches::Equals(expected) => write!(f, "{}", expected),
        }
    }
}

/// Runs a closure over the value and checks its result against a
/// [`Matches`] policy. The value itself is left unchanged.
#[derive(Clone)]
pub struct LambdaFilterValidator {
    filter: FilterFn,
    matches: Matches,
}

impl LambdaFilterValidator {
    /// Accept when the closure result is truthy
    pub fn new<F, R>(filter: F) -> Self
    where
        F: Fn(&FormValue) -> R + Send + Sync + 'static,
        R: Into<FormValue>,
    {
        Self {
            filter: Arc::new(move |value: &FormValue| -> Result<FormValue, BoxError> { Ok(filter(value).into()) }),
            matches: Matches::Truthy,
        }
    }

    /// Like [`new`](Self::new) for a closure that can fail; an error
    /// rejects the value with the error as cause
    pub fn try_new<F, R, E>(filter: F) -> Self
    where
        F: Fn(&FormValue) -> Result<R, E> + Send + Sync + 'static,
        R: Into<FormValue>,
        E: Into<BoxError>,
    {
        Self {
            filter: Arc::new(move |value: &FormValue| -> Result<FormValue, BoxError> {
                filter(value).map(Into::into).map_err(Into::into)
            }),
            matches: Matches::Truthy,
        }
    }

    pub fn matches(mut self, matches: Matches) -> Self {
        self.matches = matches;
        self
    }
}

impl fmt::Debug for LambdaFilterValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambdaFilterValidator")
            .field("matches", &self.matches)
            .finish_non_exhaustive()
    }
}

impl ValidationRule for LambdaFilterValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let result = match (self.filter)(value) {
            Ok(result) => result,
            Err(cause) => return Err(self.raise_error(field, value).caused_by(cause).into()),
        };
        if self.matches.accepts(&result) {
            return Ok(None);
        }
        Err(self
            .raise_error(field, value)
            .message(format!("failed to match {}", self.matches))
            .into())
    }

    fn rule_name(&self) -> &'static str {
        "lambdafilter"
    }
}
