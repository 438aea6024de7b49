//! YAML settings file: the middle layer of value precedence.
//!
//! A settings file overrides compiled-in defaults and is itself overridden by
//! command-line options. Nested mappings are flattened with `.` so both forms
//! below set `path.data`:
//!
//! ```yaml
//! path.data: /var/lib/app
//! path:
//!   data: /var/lib/app
//! ```
//!
//! Every key must name a registered setting.

use std::io::BufReader;
use std::path::Path;

use serde_yaml::Value;
use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::validate::{coerce_str, validate_value};
use crate::{SettingType, SettingValue, SettingsRegistry, ValueSource};

/// Loads a YAML settings file into `registry`.
///
/// Returns the number of settings applied. An empty file applies nothing.
///
/// # Errors
///
/// Returns [`SettingsError::Io`] if the file cannot be opened,
/// [`SettingsError::Yaml`] if it is not valid YAML,
/// [`SettingsError::UnknownSetting`] for keys that are not registered, and
/// [`SettingsError::InvalidValue`] for values the setting rejects.
///
/// # Examples
///
/// ```no_run
/// use optbind_core::{Setting, SettingsRegistry, load_settings_file};
///
/// let mut registry = SettingsRegistry::new();
/// registry.register(Setting::integer("pipeline.workers", 1)).unwrap();
/// let applied = load_settings_file(&mut registry, "config/settings.yml").unwrap();
/// println!("applied {applied} setting(s)");
/// ```
pub fn load_settings_file(registry: &mut SettingsRegistry, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let document: Value = serde_yaml::from_reader(BufReader::new(file))?;
    let applied = apply_settings(registry, &document)?;
    debug!(path = %path.display(), applied, "Loaded settings file");
    Ok(applied)
}

/// Parses YAML text and applies it to `registry`.
///
/// Same contract as [`load_settings_file`] without the file I/O.
pub fn load_settings_str(registry: &mut SettingsRegistry, yaml: &str) -> Result<usize> {
    let document: Value = serde_yaml::from_str(yaml)?;
    apply_settings(registry, &document)
}

fn apply_settings(registry: &mut SettingsRegistry, document: &Value) -> Result<usize> {
    let mut entries = Vec::new();
    match document {
        Value::Null => return Ok(0),
        Value::Mapping(_) => flatten(String::new(), document, &mut entries)?,
        _ => {
            return Err(SettingsError::invalid(
                "<settings file>",
                "top level must be a mapping",
            ));
        }
    }

    // Validate every entry before writing any, so a bad file changes nothing.
    let mut resolved = Vec::with_capacity(entries.len());
    for (name, raw) in entries {
        let setting = registry.get(&name)?;
        let value = convert(&name, setting.setting_type(), raw)?;
        let value = validate_value(setting.setting_type(), value)
            .map_err(|reason| SettingsError::invalid(&name, reason))?;
        resolved.push((name, value));
    }

    let applied = resolved.len();
    for (name, value) in resolved {
        registry.set_value_from(&name, value, ValueSource::SettingsFile)?;
    }
    Ok(applied)
}

fn flatten<'a>(prefix: String, value: &'a Value, out: &mut Vec<(String, &'a Value)>) -> Result<()> {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = match key {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => {
                        return Err(SettingsError::invalid(
                            &prefix,
                            "setting names must be scalar",
                        ));
                    }
                };
                let name = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(name, child, out)?;
            }
            Ok(())
        }
        leaf => {
            out.push((prefix, leaf));
            Ok(())
        }
    }
}

fn convert(name: &str, setting_type: &SettingType, raw: &Value) -> Result<SettingValue> {
    let value = match (setting_type, raw) {
        (SettingType::Boolean, Value::Bool(b)) => SettingValue::Bool(*b),
        (SettingType::Integer { .. }, Value::Number(n)) => n
            .as_i64()
            .map(SettingValue::Integer)
            .ok_or_else(|| SettingsError::invalid(name, format!("{n} is not an integer")))?,
        (SettingType::Float, Value::Number(n)) => n
            .as_f64()
            .map(SettingValue::Float)
            .ok_or_else(|| SettingsError::invalid(name, format!("{n} is not a number")))?,
        (SettingType::String { .. }, Value::String(s)) => SettingValue::String(s.clone()),
        (SettingType::String { .. }, Value::Number(n)) => SettingValue::String(n.to_string()),
        (SettingType::Path, Value::String(s)) => SettingValue::Path(s.into()),
        (SettingType::List, Value::Sequence(items)) => SettingValue::List(
            items
                .iter()
                .map(|item| scalar_string(name, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        (SettingType::List, scalar) => SettingValue::List(vec![scalar_string(name, scalar)?]),
        // Quoted scalars ("4", "true") go through the same coercion as CLI input.
        (_, Value::String(s)) => {
            return coerce_str(setting_type, s).map_err(|reason| SettingsError::invalid(name, reason));
        }
        (_, other) => {
            return Err(SettingsError::invalid(
                name,
                format!("unsupported value {other:?}"),
            ));
        }
    };
    Ok(value)
}

fn scalar_string(name: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(SettingsError::invalid(
            name,
            format!("list items must be scalars, got {other:?}"),
        )),
    }
}
