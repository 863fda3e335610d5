//! # elif-forms
//!
//! Form decoding and composable request validation for the elif framework.
//! Flat `a.b.0` style form keys are rebuilt into nested values, each field
//! runs through a chain of rules that may transform it, and requests that
//! don't carry a form get scaffold data for rendering one instead.

pub mod config;
pub mod error;
pub mod flatten;
pub mod request;
pub mod rules;
pub mod scaffold;
pub mod session;
pub mod traits;
pub mod validators;
pub mod value;

// Re-exports for easy access
pub use config::{CsrfConfig, FormConfig};
pub use error::{
    BoxError, ConfigError, FormError, FormResult, MissingFieldError, MissingReason, ValidationError,
    ValidationErrors,
};
pub use flatten::{decode_urlencoded, unflatten};
pub use request::{FormMode, FormRequest, ValidatedForm};
pub use rules::{FormOutcome, FormRules};
pub use scaffold::{Scaffold, ScaffoldMap};
pub use session::{MemorySession, NullSession, SessionStore};
pub use traits::{FormContext, RuleChain, ValidationRule};
pub use value::FormValue;

// Built-in validators
pub use validators::{
    AddressFamily, CsrfValidator, DateValidator, DictValidator, EmailValidator, ExistsValidator,
    IpAddressValidator, LambdaFilterValidator, LambdaMapValidator, LengthValidator, ListValidator,
    MapValidator, Matches, PatternValidator, SelectValidator, TimeValidator,
};
