//! Form configuration types

use crate::error::ConfigError;
use http::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Form handling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// HTTP methods whose requests carry a form to validate
    pub methods: Vec<String>,

    /// CSRF token configuration
    pub csrf: CsrfConfig,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            methods: vec!["POST".to_string()],
            csrf: CsrfConfig::default(),
        }
    }
}

impl FormConfig {
    /// Parse the configured method names
    pub fn form_methods(&self) -> Result<HashSet<Method>, ConfigError> {
        parse_methods(&self.methods)
    }
}

pub(crate) fn parse_methods<S: AsRef<str>>(names: &[S]) -> Result<HashSet<Method>, ConfigError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            Method::from_bytes(name.to_ascii_uppercase().as_bytes())
                .map_err(|_| ConfigError::InvalidMethod(name.to_string()))
        })
        .collect()
}

/// CSRF token configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    /// Session key the token is stored under
    pub session_key: String,

    /// Number of random bytes in a generated token
    pub token_bytes: usize,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            session_key: "_csrf_token".to_string(),
            token_bytes: 32,
        }
    }
}
