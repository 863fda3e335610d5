//! Pattern-based validator using regular expressions

use crate::error::{ConfigError, FormResult};
use crate::scaffold::ScaffoldMap;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use regex::Regex;
use serde_json::Value;

/// Validator for regular expression patterns.
///
/// The match is anchored at the start of the value only, like a prefix
/// match. Anchor the pattern with `^` and `$` to require an exact match.
/// Keep to the common regex subset so the browser can reuse the pattern.
#[derive(Debug, Clone)]
pub struct PatternValidator {
    /// Pattern as configured, reported to renderers
    source: String,
    /// Compiled pattern, anchored at the start
    anchored: Regex,
}

impl PatternValidator {
    /// Compile a new pattern validator
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let anchored = Regex::new(&format!("^(?:{})", pattern))?;
        Ok(Self {
            source: pattern.to_string(),
            anchored,
        })
    }

    /// Get the pattern string
    pub fn pattern_string(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.anchored.is_match(text)
    }
}

impl ValidationRule for PatternValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let text = self.expect_text(field, value)?;
        if !self.is_match(&text) {
            return Err(self.raise_error(field, value).message(self.source.clone()).into());
        }
        Ok(None)
    }

    fn rule_name(&self) -> &'static str {
        "regex"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        ScaffoldMap::from([("pattern".to_string(), Value::String(self.source.clone()))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(validator: &PatternValidator, text: &str) -> bool {
        let ctx = FormContext::without_session();
        validator.validate(&ctx, "username", &FormValue::from(text)).is_ok()
    }

    #[test]
    fn test_username_pattern_boundaries() {
        let validator = PatternValidator::new("^[a-z][a-z0-9]{0,29}$").unwrap();

        let thirty = "a".repeat(30);
        for name in ["bob", "daaaaaaaave", "test12345", thirty.as_str()] {
            assert!(check(&validator, name), "{:?} should match", name);
        }

        let thirty_one = "a".repeat(31);
        for name in ["_", "", thirty_one.as_str(), "A", "\\"] {
            assert!(!check(&validator, name), "{:?} should not match", name);
        }
    }

    #[test]
    fn test_match_is_anchored_at_start_only() {
        let validator = PatternValidator::new("[0-9]{1,4}").unwrap();
        assert!(check(&validator, "123"));
        assert!(check(&validator, "123abc"));
        assert!(!check(&validator, "abc123"));
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let validator = PatternValidator::new("a|b").unwrap();
        assert!(check(&validator, "b"));
        assert!(!check(&validator, "cb"));
    }

    #[test]
    fn test_error_reports_pattern() {
        let ctx = FormContext::without_session();
        let validator = PatternValidator::new("^x$").unwrap();
        let err = validator.validate(&ctx, "f", &FormValue::from("y")).unwrap_err();
        let error = err.validation_errors().and_then(|e| e.first()).unwrap();
        assert_eq!(error.message.as_deref(), Some("^x$"));
        assert_eq!(error.value, FormValue::from("y"));
    }

    #[test]
    fn test_populate_reports_pattern() {
        let validator = PatternValidator::new("[a-z]+").unwrap();
        let scaffold = validator.populate(&FormContext::without_session(), "f");
        assert_eq!(scaffold["pattern"], "[a-z]+");
    }

    #[test]
    fn test_invalid_pattern_fails_construction() {
        assert!(matches!(PatternValidator::new("(unclosed"), Err(ConfigError::InvalidPattern(_))));
    }
}
