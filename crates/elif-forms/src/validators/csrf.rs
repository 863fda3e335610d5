//! CSRF token validator
//!
//! Rendering a form stores a random token in the session and exposes it
//! as scaffold data; submitting the form must echo that token back.

use crate::config::CsrfConfig;
use crate::error::{FormError, FormResult};
use crate::scaffold::ScaffoldMap;
use crate::session::SessionStore;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{thread_rng, RngCore};
use serde_json::Value;

/// Validator checking a submitted token against the session token
#[derive(Debug, Clone, Default)]
pub struct CsrfValidator {
    config: CsrfConfig,
}

impl CsrfValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CsrfConfig) -> Self {
        Self { config }
    }

    pub fn session_key(&self) -> &str {
        &self.config.session_key
    }

    /// Token for the session, generating and storing one if absent
    pub fn ensure_token(&self, session: &dyn SessionStore) -> String {
        if let Some(token) = session.get(&self.config.session_key) {
            return token;
        }
        let token = generate_token(self.config.token_bytes);
        session.set(&self.config.session_key, token.clone());
        tracing::trace!(key = %self.config.session_key, "stored new CSRF token in session");
        token
    }
}

/// Generate a new random token, URL-safe base64 without padding
pub fn generate_token(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes.max(1)];
    thread_rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}

/// Hidden input carrying the token
fn hidden_input(name: &str, token: &str) -> String {
    format!(
        r#"<input type="hidden" name="{}" value="{}" />"#,
        html_escape::encode_double_quoted_attribute(name),
        html_escape::encode_double_quoted_attribute(token)
    )
}

impl ValidationRule for CsrfValidator {
    fn validate(&self, ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let Some(token) = ctx.session().get(&self.config.session_key) else {
            return Err(FormError::InvalidSession);
        };

        match value.as_str() {
            Some(submitted) if submitted == token => Ok(None),
            _ => Err(self.raise_error(field, value).message("CSRF token mismatch").into()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "csrf"
    }

    fn populate(&self, ctx: &FormContext<'_>, field: &str) -> ScaffoldMap {
        let token = self.ensure_token(ctx.session());
        ScaffoldMap::from([
            ("name".to_string(), Value::String(field.to_string())),
            ("tag".to_string(), Value::String(hidden_input(field, &token))),
            ("token".to_string(), Value::String(token)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySession;

    #[test]
    fn test_missing_session_token_is_a_session_fault() {
        let session = MemorySession::new();
        let ctx = FormContext::new(&session);
        let err = CsrfValidator::new()
            .validate(&ctx, "csrf", &FormValue::from(""))
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidSession));
    }

    #[test]
    fn test_populate_creates_token_once() {
        let session = MemorySession::new();
        let ctx = FormContext::new(&session);
        let validator = CsrfValidator::new();

        let first = validator.populate(&ctx, "csrf");
        let second = validator.populate(&ctx, "csrf");
        assert_eq!(first, second);
        assert_eq!(
            first.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["name", "tag", "token"]
        );

        let token = session.get("_csrf_token").unwrap();
        assert_eq!(first["token"], token.as_str());
        assert_eq!(
            first["tag"],
            format!(r#"<input type="hidden" name="csrf" value="{}" />"#, token).as_str()
        );
    }

    #[test]
    fn test_matching_and_mismatching_tokens() {
        let session = MemorySession::new();
        let ctx = FormContext::new(&session);
        let validator = CsrfValidator::new();
        let token = validator.ensure_token(&session);

        assert!(matches!(validator.validate(&ctx, "csrf", &FormValue::from(token.as_str())), Ok(None)));

        let reversed: String = token.chars().rev().collect();
        let err = validator
            .validate(&ctx, "csrf", &FormValue::from(reversed.as_str()))
            .unwrap_err();
        let error = err.validation_errors().and_then(|e| e.first()).unwrap();
        assert_eq!(error.value, FormValue::from(reversed));
    }

    #[test]
    fn test_tag_escapes_field_name() {
        assert_eq!(
            hidden_input(r#"a"b"#, "t"),
            r#"<input type="hidden" name="a&quot;b" value="t" />"#
        );
    }

    #[test]
    fn test_custom_session_key_and_length() {
        let session = MemorySession::new();
        let validator = CsrfValidator::with_config(CsrfConfig {
            session_key: "token".to_string(),
            token_bytes: 24,
        });
        let token = validator.ensure_token(&session);
        assert_eq!(session.get("token"), Some(token.clone()));
        assert_eq!(token.len(), 32);
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_token(32), generate_token(32));
    }
}
