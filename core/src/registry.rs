//! The settings registry: single source of truth for option values.
//!
//! A [`SettingsRegistry`] is constructed once at startup, populated with
//! [`Setting`] definitions, and passed by reference to whatever needs to read
//! or write values. There is no global instance.
//!
//! # Example
//!
//! ```
//! use optbind_core::{Setting, SettingValue, SettingsRegistry};
//!
//! let mut registry = SettingsRegistry::new();
//! registry.register(Setting::integer("pipeline.workers", 4)).unwrap();
//!
//! assert_eq!(registry.get_value("pipeline.workers").unwrap(), &SettingValue::Integer(4));
//! registry.set_value("pipeline.workers", SettingValue::Integer(8)).unwrap();
//! assert_eq!(registry.get_value("pipeline.workers").unwrap(), &SettingValue::Integer(8));
//! assert!(registry.get("pipeline.batch").is_err());
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SettingsError};
use crate::validate::{coerce_str, validate_value};
use crate::{Setting, SettingValue, ValueSource};

/// Store mapping setting names to typed, validated values.
///
/// Writes through [`set_value`](Self::set_value) are attributed to
/// [`ValueSource::CommandLine`]; use [`set_value_from`](Self::set_value_from)
/// to record another source.
#[derive(Debug, Default, Clone)]
pub struct SettingsRegistry {
    settings: BTreeMap<String, Setting>,
}

impl SettingsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a setting.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::DuplicateSetting`] if the name is taken, or
    /// [`SettingsError::InvalidValue`] if the default fails the setting's own
    /// validation.
    pub fn register(&mut self, setting: Setting) -> Result<()> {
        if self.settings.contains_key(setting.name()) {
            return Err(SettingsError::DuplicateSetting(setting.name().to_string()));
        }
        validate_value(setting.setting_type(), setting.default_value().clone())
            .map_err(|reason| SettingsError::invalid(setting.name(), reason))?;
        self.settings.insert(setting.name().to_string(), setting);
        Ok(())
    }

    /// Returns `true` if `name` is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.settings.contains_key(name)
    }

    /// Looks up a setting definition.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSetting`] if `name` is not registered.
    pub fn get(&self, name: &str) -> Result<&Setting> {
        self.settings
            .get(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Setting> {
        self.settings
            .get_mut(name)
            .ok_or_else(|| SettingsError::UnknownSetting(name.to_string()))
    }

    /// Returns the current value, or the default when unset.
    pub fn get_value(&self, name: &str) -> Result<&SettingValue> {
        Ok(self.get(name)?.value())
    }

    /// Returns `true` if the setting was written since registration.
    pub fn is_set(&self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.is_set())
    }

    /// Returns where the current value of `name` came from.
    pub fn source_of(&self, name: &str) -> Result<ValueSource> {
        Ok(self.get(name)?.source())
    }

    /// Validates and stores a value, attributing it to the command line.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::UnknownSetting`] or
    /// [`SettingsError::InvalidValue`]. A rejected value leaves the stored
    /// value untouched.
    pub fn set_value(&mut self, name: &str, value: SettingValue) -> Result<()> {
        self.set_value_from(name, value, ValueSource::CommandLine)
    }

    /// Validates and stores a value with an explicit source.
    pub fn set_value_from(
        &mut self,
        name: &str,
        value: SettingValue,
        source: ValueSource,
    ) -> Result<()> {
        let setting = self.get_mut(name)?;
        let value = validate_value(setting.setting_type(), value)
            .map_err(|reason| SettingsError::invalid(name, reason))?;
        debug!(setting = name, value = %value, source = ?source, "Setting value");
        setting.store(value, source);
        Ok(())
    }

    /// Stores a value under a dynamically chosen name.
    ///
    /// Same contract as [`set_value`](Self::set_value); used where the target
    /// is decided at runtime, such as a deprecated option's redirect.
    pub fn set(&mut self, name: &str, value: SettingValue) -> Result<()> {
        self.set_value(name, value)
    }

    /// Converts a raw string into a value of the setting's declared type.
    ///
    /// Nothing is stored.
    pub fn coerce(&self, name: &str, raw: &str) -> Result<SettingValue> {
        let setting = self.get(name)?;
        coerce_str(setting.setting_type(), raw).map_err(|reason| SettingsError::invalid(name, reason))
    }

    /// Appends an item to a list setting in place.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotAppendable`] if the current value is not a
    /// list; the value is left unchanged.
    pub fn append(&mut self, name: &str, item: impl Into<String>) -> Result<()> {
        let setting = self.get_mut(name)?;
        if !setting.value().is_appendable() {
            return Err(SettingsError::NotAppendable(name.to_string()));
        }
        let item = item.into();
        debug!(setting = name, item = %item, "Appending to setting");
        if let SettingValue::List(items) = setting.value_mut() {
            items.push(item);
        }
        setting.mark_source(ValueSource::CommandLine);
        Ok(())
    }

    /// Restores a setting to its default.
    pub fn reset(&mut self, name: &str) -> Result<()> {
        self.get_mut(name)?.clear();
        Ok(())
    }

    /// Iterates over registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }

    /// Number of registered settings.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Returns `true` if no settings are registered.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Snapshot of every current value, keyed by name.
    pub fn to_map(&self) -> BTreeMap<String, SettingValue> {
        self.settings
            .iter()
            .map(|(name, setting)| (name.clone(), setting.value().clone()))
            .collect()
    }
}
