//! Value validation and string coercion for typed settings.
//!
//! Validation checks a [`SettingValue`] against a [`SettingType`] and its
//! constraints. Coercion turns a raw command-line string into a value of the
//! declared type. Both return a plain reason string on failure; the registry
//! wraps it into [`SettingsError::InvalidValue`](crate::SettingsError).
//!
//! # Examples
//!
//! ```
//! use optbind_core::{SettingType, SettingValue, coerce_str, validate_value};
//!
//! let port = SettingType::Integer { min: Some(1), max: Some(65535) };
//! assert_eq!(coerce_str(&port, "9600"), Ok(SettingValue::Integer(9600)));
//! assert!(validate_value(&port, SettingValue::Integer(0)).is_err());
//! ```

use std::path::PathBuf;

use crate::{SettingType, SettingValue};

/// Checks `value` against `setting_type`, returning the value to store.
///
/// Integers are widened for float settings and strings are accepted as
/// paths; every other kind mismatch is rejected.
pub fn validate_value(
    setting_type: &SettingType,
    value: SettingValue,
) -> Result<SettingValue, String> {
    match (setting_type, value) {
        (SettingType::Boolean, v @ SettingValue::Bool(_)) => Ok(v),
        (SettingType::Integer { min, max }, SettingValue::Integer(n)) => {
            if let Some(lower) = min {
                if n < *lower {
                    return Err(format!("{n} is below the minimum of {lower}"));
                }
            }
            if let Some(upper) = max {
                if n > *upper {
                    return Err(format!("{n} is above the maximum of {upper}"));
                }
            }
            Ok(SettingValue::Integer(n))
        }
        (SettingType::Float, SettingValue::Float(x)) => {
            if x.is_finite() {
                Ok(SettingValue::Float(x))
            } else {
                Err(format!("{x} is not a finite number"))
            }
        }
        (SettingType::Float, SettingValue::Integer(n)) => Ok(SettingValue::Float(n as f64)),
        (SettingType::String { choices }, SettingValue::String(s)) => {
            if choices.is_empty() || choices.iter().any(|c| c == &s) {
                Ok(SettingValue::String(s))
            } else {
                Err(format!(
                    "'{s}' is not one of the accepted values: {}",
                    choices.join(", ")
                ))
            }
        }
        (SettingType::Path, v @ SettingValue::Path(_)) => Ok(v),
        (SettingType::Path, SettingValue::String(s)) => Ok(SettingValue::Path(PathBuf::from(s))),
        (SettingType::List, v @ SettingValue::List(_)) => Ok(v),
        (expected, got) => Err(format!(
            "expected {}, got {} '{got}'",
            type_name(expected),
            got.kind()
        )),
    }
}

/// Converts a raw string into a value of `setting_type` and validates it.
///
/// Booleans accept exactly `true` or `false`. A raw string written to a list
/// setting becomes a single-element list.
pub fn coerce_str(setting_type: &SettingType, raw: &str) -> Result<SettingValue, String> {
    let value = match setting_type {
        SettingType::Boolean => match raw {
            "true" => SettingValue::Bool(true),
            "false" => SettingValue::Bool(false),
            other => return Err(format!("'{other}' is not a boolean (use true or false)")),
        },
        SettingType::Integer { .. } => raw
            .trim()
            .parse::<i64>()
            .map(SettingValue::Integer)
            .map_err(|_| format!("'{raw}' is not an integer"))?,
        SettingType::Float => raw
            .trim()
            .parse::<f64>()
            .map(SettingValue::Float)
            .map_err(|_| format!("'{raw}' is not a number"))?,
        SettingType::String { .. } => SettingValue::String(raw.to_string()),
        SettingType::Path => SettingValue::Path(PathBuf::from(raw)),
        SettingType::List => SettingValue::List(vec![raw.to_string()]),
    };
    validate_value(setting_type, value)
}

fn type_name(setting_type: &SettingType) -> &'static str {
    match setting_type {
        SettingType::Boolean => "boolean",
        SettingType::Integer { .. } => "integer",
        SettingType::Float => "float",
        SettingType::String { .. } => "string",
        SettingType::Path => "path",
        SettingType::List => "list",
    }
}
