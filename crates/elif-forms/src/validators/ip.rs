//! IP address validator

use crate::error::{ConfigError, FormResult};
use crate::scaffold::ScaffoldMap;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::{AddrParseError, Ipv4Addr, Ipv6Addr};

/// Address families an [`IpAddressValidator`] can accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }

    fn parse(&self, text: &str) -> Result<(), AddrParseError> {
        match self {
            AddressFamily::Ipv4 => text.parse::<Ipv4Addr>().map(|_| ()),
            AddressFamily::Ipv6 => text.parse::<Ipv6Addr>().map(|_| ()),
        }
    }
}

/// Validator for textual IP addresses.
///
/// A value passes if any configured family's strict parser accepts it.
/// IPv4 octets with leading zeroes are rejected.
#[derive(Debug, Clone)]
pub struct IpAddressValidator {
    families: Vec<AddressFamily>,
}

impl IpAddressValidator {
    /// Accept IPv4 only
    pub fn new() -> Self {
        Self {
            families: vec![AddressFamily::Ipv4],
        }
    }

    /// Accept any of the given families
    pub fn families<I>(families: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = AddressFamily>,
    {
        let mut unique = Vec::new();
        for family in families {
            if !unique.contains(&family) {
                unique.push(family);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoAddressFamilies);
        }
        Ok(Self { families: unique })
    }
}

impl Default for IpAddressValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRule for IpAddressValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let text = self.expect_text(field, value)?;

        let mut last_error = None;
        for family in &self.families {
            match family.parse(&text) {
                Ok(()) => return Ok(None),
                Err(err) => last_error = Some(err),
            }
        }

        let mut error = self.raise_error(field, value);
        if let Some(cause) = last_error {
            error = error.caused_by(cause);
        }
        Err(error.into())
    }

    fn rule_name(&self) -> &'static str {
        "ipaddress"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        let families = self
            .families
            .iter()
            .map(|family| Value::String(family.as_str().to_string()))
            .collect();
        ScaffoldMap::from([("type".to_string(), Value::Array(families))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(validator: &IpAddressValidator, text: &str) -> bool {
        validator
            .validate(&FormContext::without_session(), "addr", &FormValue::from(text))
            .is_ok()
    }

    #[test]
    fn test_ipv4() {
        let validator = IpAddressValidator::new();
        for ip in ["127.127.127.127", "1.1.1.1"] {
            assert!(accepts(&validator, ip), "{} should pass", ip);
        }
        for ip in ["256.0.0.0", "1.1.1", "1.1.1.1.1", "127.127.127.", "::1"] {
            assert!(!accepts(&validator, ip), "{} should fail", ip);
        }
    }

    #[test]
    fn test_ipv6() {
        let validator = IpAddressValidator::families([AddressFamily::Ipv6]).unwrap();
        for ip in [
            "2001:db8:0:0:1:0:0:1",
            "2001:0db8:0:0:1:0:0:1",
            "2001:db8::1:0:0:1",
            "2001:db8::0:1:0:0:1",
            "2001:0db8::1:0:0:1",
            "2001:db8:0:0:1::1",
            "2001:db8:0000:0:1::1",
            "2001:DB8:0:0:1::1",
        ] {
            assert!(accepts(&validator, ip), "{} should pass", ip);
        }
        for ip in ["2001:db8::1::1", "2001:db8:a:b:c:d:e:a:b", "::g", "1.1.1.1"] {
            assert!(!accepts(&validator, ip), "{} should fail", ip);
        }
    }

    #[test]
    fn test_dual_family() {
        let validator = IpAddressValidator::families([AddressFamily::Ipv4, AddressFamily::Ipv6]).unwrap();
        assert!(accepts(&validator, "127.0.0.1"));
        assert!(accepts(&validator, "2001:db8::1"));
        assert!(!accepts(&validator, "not-an-ip"));
        assert!(!accepts(&validator, "1.1.1.1.1"));
    }

    #[test]
    fn test_failure_carries_parse_error() {
        let validator = IpAddressValidator::new();
        let err = validator
            .validate(&FormContext::without_session(), "addr", &FormValue::from("nope"))
            .unwrap_err();
        let error = err.validation_errors().and_then(|e| e.first()).unwrap();
        assert!(error.cause.is_some());
        assert_eq!(error.value, FormValue::from("nope"));
    }

    #[test]
    fn test_empty_families_fail_construction() {
        assert!(matches!(
            IpAddressValidator::families(Vec::new()),
            Err(ConfigError::NoAddressFamilies)
        ));
    }

    #[test]
    fn test_populate_lists_families() {
        let validator = IpAddressValidator::families([AddressFamily::Ipv4, AddressFamily::Ipv6]).unwrap();
        let scaffold = validator.populate(&FormContext::without_session(), "addr");
        assert_eq!(scaffold["type"], serde_json::json!(["ipv4", "ipv6"]));
    }
}
