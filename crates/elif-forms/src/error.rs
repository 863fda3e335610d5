//! Form fault types

use crate::value::FormValue;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Boxed underlying cause attached to a validation failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type FormResult<T> = Result<T, FormError>;

/// Every fault the form layer can raise while handling a request.
///
/// A single framework-level handler is expected to turn these into a
/// 400-class response.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),

    #[error(transparent)]
    MissingField(#[from] MissingFieldError),

    /// The session holds no CSRF token to compare against
    #[error("Invalid or missing session for request")]
    InvalidSession,

    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl FormError {
    /// The validation failures, if this is a validation fault
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            FormError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<ValidationError> for FormError {
    fn from(error: ValidationError) -> Self {
        FormError::Invalid(ValidationErrors::from_error(error))
    }
}

/// A single failed constraint on a value at a key path
#[derive(Debug, Error)]
pub struct ValidationError {
    /// Dotted key path of the offending value
    pub field: String,
    /// The raw value that was rejected
    pub value: FormValue,
    /// Name of the rule that rejected it. Rules are shared behind `Arc`
    /// and carry no per-request state, so the name identifies the
    /// rejecting validator instead of a reference to it.
    pub rule: &'static str,
    /// Human-readable detail
    pub message: Option<String>,
    #[source]
    pub cause: Option<BoxError>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, value: FormValue, rule: &'static str) -> Self {
        Self {
            field: field.into(),
            value,
            rule,
            message: None,
            cause: None,
        }
    }

    /// Attach a human-readable message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach the underlying error that caused the rejection
    pub fn caused_by(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    /// JSON shape used in error responses
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "field": self.field,
            "value": self.value.to_json(),
            "rule": self.rule,
            "message": self.message,
            "cause": self.cause.as_ref().map(|c| c.to_string()),
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {} failed test for {}", self.field, self.value, self.rule)?;
        if let Some(ref message) = self.message {
            write!(f, " ({})", message)?;
        }
        if let Some(ref cause) = self.cause {
            write!(f, " <{}>", cause)?;
        }
        Ok(())
    }
}

/// Collection of validation errors keyed by field path
#[derive(Debug, Default, Error)]
pub struct ValidationErrors {
    pub errors: BTreeMap<String, Vec<ValidationError>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single validation error
    pub fn add(&mut self, error: ValidationError) {
        self.errors
            .entry(error.field.clone())
            .or_default()
            .push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Total number of errors across all fields
    pub fn total_errors(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    pub fn get_field_errors(&self, field: &str) -> Option<&Vec<ValidationError>> {
        self.errors.get(field)
    }

    pub fn has_field_errors(&self, field: &str) -> bool {
        self.errors.get(field).map_or(false, |errors| !errors.is_empty())
    }

    /// The first error by field path order
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.values().flat_map(|errors| errors.iter()).next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values().flat_map(|errors| errors.iter())
    }

    /// Merge another collection into this one
    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, errors) in other.errors {
            self.errors.entry(field).or_default().extend(errors);
        }
    }

    pub fn from_error(error: ValidationError) -> Self {
        let mut errors = Self::new();
        errors.add(error);
        errors
    }

    /// Convert to a JSON-serializable format for API responses
    pub fn to_json(&self) -> serde_json::Value {
        let fields: serde_json::Map<String, serde_json::Value> = self
            .errors
            .iter()
            .map(|(field, errors)| {
                (
                    field.clone(),
                    serde_json::Value::Array(errors.iter().map(ValidationError::to_json).collect()),
                )
            })
            .collect();

        json!({
            "error": {
                "code": "validation_failed",
                "message": "Validation failed",
                "fields": fields
            }
        })
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "No validation errors")
        } else {
            write!(f, "Validation failed for {} field(s):", self.errors.len())?;
            for error in self.iter() {
                write!(f, "\n  {}", error)?;
            }
            Ok(())
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self::from_error(error)
    }
}

/// Why a field counted as missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    /// Expected by the schema but absent from the input
    Absent,
    /// Present in the input but unknown to the schema
    Unrecognized,
}

/// Schema mismatch between the configured fields and the decoded input
#[derive(Debug, Error)]
pub struct MissingFieldError {
    pub key: String,
    pub reason: MissingReason,
    /// The input the key was looked up in
    pub input: FormValue,
}

impl MissingFieldError {
    pub fn absent(key: impl Into<String>, input: FormValue) -> Self {
        Self {
            key: key.into(),
            reason: MissingReason::Absent,
            input,
        }
    }

    pub fn unrecognized(key: impl Into<String>, input: FormValue) -> Self {
        Self {
            key: key.into(),
            reason: MissingReason::Unrecognized,
            input,
        }
    }
}

impl fmt::Display for MissingFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            MissingReason::Absent => write!(f, "Expected key {:?} for form", self.key),
            MissingReason::Unrecognized => write!(f, "Unexpected key {:?} in form", self.key),
        }
    }
}

/// A validator or rule set was built with an invalid configuration.
///
/// Raised at construction time, never while handling a request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Neither a format nor ISO mode was configured")]
    MissingFormat,

    #[error("At least one address family must be configured")]
    NoAddressFamilies,

    #[error("Select requires at least one option")]
    NoOptions,

    #[error("Minimum length {min} exceeds maximum length {max}")]
    InvertedBounds { min: usize, max: usize },

    #[error("Invalid HTTP method: {0:?}")]
    InvalidMethod(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_creation() {
        let error = ValidationError::new("email", FormValue::from("bad"), "email").message("invalid email");
        assert_eq!(error.field, "email");
        assert_eq!(error.rule, "email");
        assert_eq!(error.message.as_deref(), Some("invalid email"));
        assert!(error.cause.is_none());
        assert_eq!(error.to_string(), r#""email": "bad" failed test for email (invalid email)"#);
    }

    #[test]
    fn test_validation_error_keeps_cause() {
        let cause = "x".parse::<i32>().unwrap_err();
        let error = ValidationError::new("n", FormValue::from("x"), "lambdamap").caused_by(cause);
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_validation_errors_collection() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::new("email", FormValue::from("a"), "email"));
        errors.add(ValidationError::new("age", FormValue::from("b"), "regex"));
        errors.add(ValidationError::new("email", FormValue::from("c"), "length"));

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.total_errors(), 3);
        assert!(errors.has_field_errors("email"));
        assert!(!errors.has_field_errors("name"));
        assert_eq!(errors.first().map(|e| e.field.as_str()), Some("age"));
    }

    #[test]
    fn test_validation_errors_merge() {
        let mut errors1 = ValidationErrors::from_error(ValidationError::new("f1", FormValue::Null, "exists"));
        let mut errors2 = ValidationErrors::new();
        errors2.add(ValidationError::new("f2", FormValue::Null, "exists"));
        errors2.add(ValidationError::new("f1", FormValue::Null, "exists"));

        errors1.merge(errors2);
        assert_eq!(errors1.len(), 2);
        assert_eq!(errors1.get_field_errors("f1").map(Vec::len), Some(2));
        assert_eq!(errors1.to_json()["error"]["fields"]["f2"][0]["rule"], "exists");
    }

    #[test]
    fn test_missing_field_display() {
        let error = MissingFieldError::absent("email", FormValue::object());
        assert_eq!(error.to_string(), r#"Expected key "email" for form"#);
        let error = MissingFieldError::unrecognized("extra", FormValue::object());
        assert_eq!(error.reason, MissingReason::Unrecognized);
    }
}
