//! Email shape validator

use crate::error::FormResult;
use crate::scaffold::ScaffoldMap;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use serde_json::Value;

/// Validator for a plausible email address.
///
/// Only the shape is checked: one `@` with a non-empty local part and
/// domain. An optional domain must match exactly; subdomains are not
/// accepted. Use a confirmation mail for real verification.
#[derive(Debug, Clone, Default)]
pub struct EmailValidator {
    domain: Option<String>,
}

impl EmailValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require addresses in exactly this domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

impl ValidationRule for EmailValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let email = self.expect_text(field, value)?;

        let (local, domain) = email.rsplit_once('@').unwrap_or(("", ""));
        if local.is_empty() || domain.is_empty() || local.contains('@') {
            return Err(self.raise_error(field, value).message("invalid email").into());
        }

        if let Some(ref expected) = self.domain {
            if domain != expected {
                return Err(self
                    .raise_error(field, value)
                    .message(format!("invalid domain ({:?})", expected))
                    .into());
            }
        }

        Ok(None)
    }

    fn rule_name(&self) -> &'static str {
        "email"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        let domain = self.domain.clone().map_or(Value::Null, Value::String);
        ScaffoldMap::from([("domain".to_string(), domain)])
    }
}
