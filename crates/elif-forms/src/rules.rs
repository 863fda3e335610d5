//! Form rule sets and request dispatch

use crate::config::{parse_methods, FormConfig};
use crate::error::{ConfigError, FormResult, MissingFieldError};
use crate::request::{FormMode, FormRequest, ValidatedForm};
use crate::scaffold::Scaffold;
use crate::traits::{FormContext, RuleChain, ValidationRule};
use http::Method;
use std::collections::HashSet;
use std::sync::Arc;

/// What handling a request produced
#[derive(Debug)]
pub enum FormOutcome {
    /// The request carried a form and every field passed
    Submitted(ValidatedForm),
    /// The request wants the form rendered
    Render(Scaffold),
}

/// Named fields and the rules validating them.
///
/// Built once when a route is registered and shared by every request
/// that route handles.
#[derive(Clone)]
pub struct FormRules {
    fields: Vec<(String, RuleChain)>,
    methods: Arc<HashSet<Method>>,
}

impl std::fmt::Debug for FormRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormRules")
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish()
    }
}

impl FormRules {
    /// Create an empty rule set validating `POST` requests
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            methods: Arc::new(HashSet::from([Method::POST])),
        }
    }

    /// Create an empty rule set from configuration
    pub fn with_config(config: &FormConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            fields: Vec::new(),
            methods: Arc::new(config.form_methods()?),
        })
    }

    /// Replace the form-bearing methods
    pub fn methods<S: AsRef<str>>(mut self, methods: &[S]) -> Result<Self, ConfigError> {
        self.methods = Arc::new(parse_methods(methods)?);
        Ok(self)
    }

    /// Add a validation rule for a specific field
    pub fn field<R>(self, field: impl Into<String>, rule: R) -> Self
    where
        R: ValidationRule + 'static,
    {
        self.field_chain(field, RuleChain::from(rule))
    }

    /// Add multiple validation rules for a specific field
    pub fn field_rules<R>(self, field: impl Into<String>, rules: Vec<R>) -> Self
    where
        R: ValidationRule + 'static,
    {
        let chain = rules
            .into_iter()
            .fold(RuleChain::new(), |chain, rule| chain.then(rule));
        self.field_chain(field, chain)
    }

    /// Append a chain to a field's rules
    pub fn field_chain(mut self, field: impl Into<String>, chain: RuleChain) -> Self {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => existing.extend(chain),
            None => self.fields.push((field, chain)),
        }
        self
    }

    /// Get rules for a specific field
    pub fn get_field_rules(&self, field: &str) -> Option<&RuleChain> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, chain)| chain)
    }

    /// All field names in configured order
    pub fn get_validated_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn form_methods(&self) -> &HashSet<Method> {
        &self.methods
    }

    /// Mode of `request` under these rules
    pub fn mode(&self, request: &FormRequest) -> FormMode {
        request.mode(&self.methods)
    }

    /// Validate the form, or collect scaffold data, depending on the mode
    pub fn handle(&self, request: &FormRequest, ctx: &FormContext<'_>) -> FormResult<FormOutcome> {
        let mode = self.mode(request);
        tracing::debug!(method = %request.method(), ?mode, "dispatching form request");
        match mode {
            FormMode::Form => self.validate_form(request, ctx).map(FormOutcome::Submitted),
            FormMode::Scaffold => Ok(FormOutcome::Render(self.scaffold(ctx))),
        }
    }

    /// Validate every configured field of a submitted form.
    ///
    /// Fields run in configured order and the first fault stops the
    /// request.
    pub fn validate_form(&self, request: &FormRequest, ctx: &FormContext<'_>) -> FormResult<ValidatedForm> {
        let mut form = ValidatedForm::new();

        for (name, chain) in &self.fields {
            let Some(value) = request.lookup(name) else {
                return Err(MissingFieldError::absent(name.clone(), request.input()).into());
            };
            tracing::debug!(field = %name, rules = ?chain.rule_names(), "validating form field");
            let validated = chain.run(ctx, name, value)?;
            form.insert(name.clone(), validated);
        }

        Ok(form)
    }

    /// Collect scaffold data from every configured rule
    pub fn scaffold(&self, ctx: &FormContext<'_>) -> Scaffold {
        let mut scaffold = Scaffold::new();
        for (name, chain) in &self.fields {
            scaffold.extend(name, chain.populate(ctx, name));
        }
        scaffold
    }
}

impl Default for FormRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormError;
    use crate::validators::*;
    use serde_json::json;

    fn ctx() -> FormContext<'static> {
        FormContext::without_session()
    }

    #[test]
    fn test_rules_creation() {
        let rules = FormRules::new()
            .field("email", EmailValidator::new())
            .field("email", LengthValidator::new().max(64))
            .field("age", PatternValidator::new("^[0-9]+$").unwrap());

        assert_eq!(rules.get_validated_fields(), vec!["email", "age"]);
        assert_eq!(
            rules.get_field_rules("email").map(RuleChain::rule_names),
            Some(vec!["email", "length"])
        );
        assert!(rules.get_field_rules("name").is_none());
    }

    #[test]
    fn test_validate_form_collects_fields() {
        let rules = FormRules::new()
            .field("email", EmailValidator::new().domain("example.com"))
            .field("when", DateValidator::iso().keep_object(true));
        let request = FormRequest::new(Method::POST)
            .with_pairs([("email", "test@example.com"), ("when", "2020-04-10"), ("extra", "x")]);

        let form = rules.validate_form(&request, &ctx()).unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("email").map(|v| v.to_json()), Some(json!("test@example.com")));
        assert!(matches!(form.get("when"), Some(crate::FormValue::Date(_))));
    }

    #[test]
    fn test_missing_field_names_the_key() {
        let rules = FormRules::new().field("email", EmailValidator::new());
        let request = FormRequest::new(Method::POST).with_pairs([("other", "x")]);

        match rules.validate_form(&request, &ctx()).unwrap_err() {
            FormError::MissingField(missing) => {
                assert_eq!(missing.key, "email");
                assert_eq!(missing.input.to_json(), json!({"other": "x"}));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_json_fallback() {
        let rules = FormRules::new().field("example", ExistsValidator::new());
        let request = FormRequest::new(Method::POST).with_json(json!({"example": "hello"}));
        assert!(rules.validate_form(&request, &ctx()).is_ok());

        let request = FormRequest::new(Method::POST).with_json(json!({"nothing": "works"}));
        assert!(matches!(
            rules.validate_form(&request, &ctx()),
            Err(FormError::MissingField(_))
        ));
    }

    #[test]
    fn test_handle_switches_on_method() {
        let rules = FormRules::new().field("username", PatternValidator::new("^[a-z]+$").unwrap());

        let get = FormRequest::new(Method::GET);
        match rules.handle(&get, &ctx()).unwrap() {
            FormOutcome::Render(scaffold) => {
                assert_eq!(scaffold.get("username", "regex_pattern"), Some(&json!("^[a-z]+$")));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let post = FormRequest::new(Method::POST).with_pairs([("username", "bob")]);
        assert!(matches!(rules.handle(&post, &ctx()), Ok(FormOutcome::Submitted(_))));
    }

    #[test]
    fn test_custom_methods() {
        let rules = FormRules::new()
            .methods(&["post", "put"])
            .unwrap()
            .field("a", ExistsValidator::new());
        let put = FormRequest::new(Method::PUT);
        assert_eq!(rules.mode(&put), FormMode::Form);
        assert!(matches!(rules.handle(&put, &ctx()), Err(FormError::MissingField(_))));

        let config = FormConfig {
            methods: vec!["PATCH".to_string()],
            ..FormConfig::default()
        };
        let rules = FormRules::with_config(&config).unwrap();
        assert_eq!(rules.mode(&FormRequest::new(Method::POST)), FormMode::Scaffold);
    }

    #[test]
    fn test_scaffold_skips_empty_populate() {
        let rules = FormRules::new()
            .field("name", ExistsValidator::new())
            .field_rules("code", vec![LengthValidator::new().max(4), LengthValidator::new().min(2)]);
        let scaffold = rules.scaffold(&ctx());
        assert!(scaffold.field("name").is_none());
        assert_eq!(scaffold.get("code", "length_min"), Some(&json!(2)));
    }
}
