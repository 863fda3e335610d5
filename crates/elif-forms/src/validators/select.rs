//! Fixed option set validator

use crate::error::{ConfigError, FormResult};
use crate::scaffold::ScaffoldMap;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use serde_json::Value;

/// Validator requiring the value to be one of a fixed set of options.
///
/// Options keep their configured order for rendering; duplicates are
/// dropped.
#[derive(Debug, Clone)]
pub struct SelectValidator {
    options: Vec<String>,
}

impl SelectValidator {
    pub fn new<I, S>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for option in options {
            let option = option.into();
            if !unique.contains(&option) {
                unique.push(option);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoOptions);
        }
        Ok(Self { options: unique })
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl ValidationRule for SelectValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let text = self.expect_text(field, value)?;
        if !self.options.iter().any(|option| *option == text) {
            return Err(self.raise_error(field, value).into());
        }
        Ok(None)
    }

    fn rule_name(&self) -> &'static str {
        "select"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        let options = self.options.iter().cloned().map(Value::String).collect();
        ScaffoldMap::from([("options".to_string(), Value::Array(options))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_membership() {
        let ctx = FormContext::without_session();
        let validator = SelectValidator::new(["apples", "oranges", "bananas"]).unwrap();
        assert!(validator.validate(&ctx, "fruit", &FormValue::from("oranges")).is_ok());
        assert!(validator.validate(&ctx, "fruit", &FormValue::from("grapes")).is_err());
        assert!(validator.validate(&ctx, "fruit", &FormValue::from("Apples")).is_err());
    }

    #[test]
    fn test_options_keep_order_without_duplicates() {
        let validator = SelectValidator::new(["b", "a", "b"]).unwrap();
        let scaffold = validator.populate(&FormContext::without_session(), "x");
        assert_eq!(scaffold["options"], json!(["b", "a"]));
    }

    #[test]
    fn test_empty_options_fail_construction() {
        assert!(matches!(SelectValidator::new(Vec::<String>::new()), Err(ConfigError::NoOptions)));
    }
}
