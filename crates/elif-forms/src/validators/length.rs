//! Length validator for text values

use crate::error::{ConfigError, FormResult};
use crate::scaffold::ScaffoldMap;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use serde_json::{json, Value};

/// Validator for character count bounds (inclusive)
#[derive(Debug, Clone, Default)]
pub struct LengthValidator {
    min: Option<usize>,
    max: Option<usize>,
}

impl LengthValidator {
    /// Create a new length validator with no constraints
    pub fn new() -> Self {
        Self::default()
    }

    /// Set minimum length constraint
    pub fn min(mut self, min: usize) -> Self {
        self.min = Some(min);
        self
    }

    /// Set maximum length constraint
    pub fn max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Set both bounds, rejecting an empty range
    pub fn range(min: usize, max: usize) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedBounds { min, max });
        }
        Ok(Self::new().min(min).max(max))
    }
}

impl ValidationRule for LengthValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let length = self.expect_text(field, value)?.chars().count();

        if let Some(min) = self.min {
            if length < min {
                return Err(self
                    .raise_error(field, value)
                    .message(format!("value too short ({} < {})", length, min))
                    .into());
            }
        }
        if let Some(max) = self.max {
            if length > max {
                return Err(self
                    .raise_error(field, value)
                    .message(format!("value too long ({} > {})", length, max))
                    .into());
            }
        }

        Ok(None)
    }

    fn rule_name(&self) -> &'static str {
        "length"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        ScaffoldMap::from([
            ("min".to_string(), self.min.map_or(Value::Null, |min| json!(min))),
            ("max".to_string(), self.max.map_or(Value::Null, |max| json!(max))),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(validator: &LengthValidator, text: &str) -> Option<String> {
        validator
            .validate(&FormContext::without_session(), "username", &FormValue::from(text))
            .err()
            .and_then(|err| err.validation_errors().and_then(|e| e.first()).and_then(|e| e.message.clone()))
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let validator = LengthValidator::range(6, 30).unwrap();
        assert_eq!(message(&validator, "abcdef"), None);
        assert_eq!(message(&validator, &"a".repeat(30)), None);
        assert_eq!(message(&validator, "abc").as_deref(), Some("value too short (3 < 6)"));
        assert_eq!(message(&validator, &"a".repeat(31)).as_deref(), Some("value too long (31 > 30)"));
    }

    #[test]
    fn test_length_counts_characters() {
        let validator = LengthValidator::new().max(2);
        assert_eq!(message(&validator, "éé"), None);
    }

    #[test]
    fn test_unbounded_accepts_anything() {
        let validator = LengthValidator::new();
        assert_eq!(message(&validator, ""), None);
        assert_eq!(message(&validator, &"x".repeat(1000)), None);
    }

    #[test]
    fn test_inverted_range_fails_construction() {
        assert!(matches!(
            LengthValidator::range(5, 2),
            Err(ConfigError::InvertedBounds { min: 5, max: 2 })
        ));
    }

    #[test]
    fn test_populate_reports_bounds() {
        let scaffold = LengthValidator::new().min(6).populate(&FormContext::without_session(), "f");
        assert_eq!(scaffold["min"], 6);
        assert_eq!(scaffold["max"], Value::Null);
    }
}
