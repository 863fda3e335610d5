//! Date and time validators
//!
//! Both validators run in exactly one of two modes: an explicit
//! `strftime`-style format, or ISO 8601. Building one with neither is a
//! configuration error.

use crate::error::{ConfigError, FormResult};
use crate::scaffold::ScaffoldMap;
use crate::traits::{FormContext, ValidationRule};
use crate::value::FormValue;
use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const ISO_DATE: &str = "%Y-%m-%d";
const ISO_TIMES: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

// chrono accepts short, signed and space-padded fields, so the exact
// ISO layout is checked first
const ISO_DATE_SHAPE: &str = r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$";
const ISO_TIME_SHAPE: &str = r"^[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]{1,6})?)?$";

static ISO_DATE_RE: OnceLock<Option<Regex>> = OnceLock::new();
static ISO_TIME_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn has_shape(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Format(String),
    Iso,
}

impl Mode {
    fn pick(format: Option<&str>, use_isoformat: bool) -> Result<Self, ConfigError> {
        match format {
            Some(fmt) if !fmt.is_empty() => Ok(Mode::Format(fmt.to_string())),
            _ if use_isoformat => Ok(Mode::Iso),
            _ => Err(ConfigError::MissingFormat),
        }
    }

    fn populate(&self) -> ScaffoldMap {
        let (fmt, iso) = match self {
            Mode::Format(fmt) => (Value::String(fmt.clone()), false),
            Mode::Iso => (Value::Null, true),
        };
        ScaffoldMap::from([
            ("fmt".to_string(), fmt),
            ("use_isoformat".to_string(), Value::Bool(iso)),
        ])
    }
}

/// Validator for calendar dates.
///
/// With `keep_object` set the parsed date replaces the submitted string;
/// otherwise the string is kept once it parses.
#[derive(Debug, Clone)]
pub struct DateValidator {
    mode: Mode,
    keep_object: bool,
}

impl DateValidator {
    /// Validate against a `chrono` format string such as `%m/%d/%Y`
    pub fn format(fmt: &str) -> Result<Self, ConfigError> {
        Self::new(Some(fmt), false)
    }

    /// Validate ISO 8601 dates (`2020-04-10`)
    pub fn iso() -> Self {
        Self {
            mode: Mode::Iso,
            keep_object: false,
        }
    }

    /// Pick the mode from optional settings; a format wins over ISO
    pub fn new(format: Option<&str>, use_isoformat: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: Mode::pick(format, use_isoformat)?,
            keep_object: false,
        })
    }

    /// Replace the submitted string with the parsed date
    pub fn keep_object(mut self, keep: bool) -> Self {
        self.keep_object = keep;
        self
    }

    fn parse(&self, text: &str) -> Result<NaiveDate, String> {
        match self.mode {
            Mode::Iso => Some(text)
                .filter(|text| has_shape(&ISO_DATE_RE, ISO_DATE_SHAPE, text))
                .and_then(|text| NaiveDate::parse_from_str(text, ISO_DATE).ok())
                .ok_or_else(|| "invalid value for ISO date format".to_string()),
            Mode::Format(ref fmt) => NaiveDate::parse_from_str(text, fmt)
                .map_err(|_| format!("invalid value for format {:?}", fmt)),
        }
    }
}

impl ValidationRule for DateValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let text = self.expect_text(field, value)?;
        match self.parse(&text) {
            Ok(date) if self.keep_object => Ok(Some(FormValue::Date(date))),
            Ok(_) => Ok(None),
            Err(message) => Err(self.raise_error(field, value).message(message).into()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "date"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        self.mode.populate()
    }
}

/// Validator for wall-clock times.
///
/// ISO mode accepts `HH:MM`, `HH:MM:SS` and `HH:MM:SS.ffffff` (up to six
/// fractional digits) with two-digit fields. UTC offsets such as `+00:00`
/// are rejected since the parsed value carries no zone. For AM/PM input
/// use a format such as `%I:%M %p`.
#[derive(Debug, Clone)]
pub struct TimeValidator {
    mode: Mode,
    keep_object: bool,
}

impl TimeValidator {
    pub fn format(fmt: &str) -> Result<Self, ConfigError> {
        Self::new(Some(fmt), false)
    }

    pub fn iso() -> Self {
        Self {
            mode: Mode::Iso,
            keep_object: false,
        }
    }

    pub fn new(format: Option<&str>, use_isoformat: bool) -> Result<Self, ConfigError> {
        Ok(Self {
            mode: Mode::pick(format, use_isoformat)?,
            keep_object: false,
        })
    }

    /// Replace the submitted string with the parsed time
    pub fn keep_object(mut self, keep: bool) -> Self {
        self.keep_object = keep;
        self
    }

    fn parse(&self, text: &str) -> Result<NaiveTime, String> {
        match self.mode {
            Mode::Iso => Some(text)
                .filter(|text| has_shape(&ISO_TIME_RE, ISO_TIME_SHAPE, text))
                .and_then(|text| {
                    ISO_TIMES
                        .iter()
                        .find_map(|fmt| NaiveTime::parse_from_str(text, fmt).ok())
                })
                .ok_or_else(|| "invalid value for ISO time format".to_string()),
            Mode::Format(ref fmt) => NaiveTime::parse_from_str(text, fmt)
                .map_err(|_| format!("invalid value for format {:?}", fmt)),
        }
    }
}

impl ValidationRule for TimeValidator {
    fn validate(&self, _ctx: &FormContext<'_>, field: &str, value: &FormValue) -> FormResult<Option<FormValue>> {
        let text = self.expect_text(field, value)?;
        match self.parse(&text) {
            Ok(time) if self.keep_object => Ok(Some(FormValue::Time(time))),
            Ok(_) => Ok(None),
            Err(message) => Err(self.raise_error(field, value).message(message).into()),
        }
    }

    fn rule_name(&self) -> &'static str {
        "time"
    }

    fn populate(&self, _ctx: &FormContext<'_>, _field: &str) -> ScaffoldMap {
        self.mode.populate()
    }
}
