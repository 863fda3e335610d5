//! Presence-only validator

use crate::error::FormResult;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;

/// Accepts any value. The dispatcher already faults on absent fields, so
/// this only declares that a field must be submitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExistsValidator;

impl ExistsValidator {
    pub fn new() -> Self {
        Self
    }
}

impl ValidationRule for ExistsValidator {
    fn validate(&self, _ctx: &FormContext<'_>, _field: &str, _value: &FormValue) -> FormResult<Option<FormValue>> {
        Ok(None)
    }

    fn rule_name(&self) -> &'static str {
        "exists"
    }
}
