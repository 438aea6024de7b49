//! Deprecated options and their redirects.
//!
//! A deprecated option replaces the normal writer with one that records a
//! warning in the [`DeprecationLog`] and forwards the value to a replacement
//! setting, or, in passthrough mode, to the option's own setting.
//!
//! # Example
//!
//! ```
//! use optbind_cli::{DeprecationBinding, DeprecationOptions, OptionDefinition};
//! use optbind_core::{DeprecationLog, Setting, SettingValue, SettingsRegistry};
//!
//! let mut registry = SettingsRegistry::new();
//! registry.register(Setting::string("log.level", "info")).unwrap();
//! let log = DeprecationLog::new();
//!
//! let verbose = DeprecationBinding::new(
//!     &registry,
//!     OptionDefinition::new(&["--verbose"], "", "Increase verbosity").flag(),
//!     DeprecationOptions::redirect_to("log.level").with_new_value("debug"),
//! )
//! .unwrap();
//!
//! verbose.invoke(&mut registry, &log, "true").unwrap();
//! assert_eq!(registry.get_value("log.level").unwrap(), &SettingValue::from("debug"));
//! assert_eq!(log.len(), 1);
//! ```

use optbind_core::{DeprecationLog, SettingValue, SettingsRegistry, validate_value};
use tracing::debug;

use crate::OptionDefinition;
use crate::error::{CliError, Result};

/// Redirect configuration for a deprecated option.
///
/// `new_value` uses explicit inclusion: `Some(SettingValue::Bool(false))` is
/// a real replacement value, not "absent".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeprecationOptions {
    /// Setting (and long switch) that replaces the deprecated option.
    pub new_flag: Option<String>,
    /// Literal value written instead of the user's value.
    pub new_value: Option<SettingValue>,
    /// Write the user's value to the option's own setting instead.
    pub passthrough: bool,
    /// Version in which the option will be removed.
    pub obsoleted_version: Option<String>,
}

impl DeprecationOptions {
    /// Redirects writes to `new_flag`.
    pub fn redirect_to(new_flag: &str) -> Self {
        Self {
            new_flag: Some(new_flag.to_string()),
            ..Self::default()
        }
    }

    /// Keeps writing the option's own setting.
    pub fn passthrough() -> Self {
        Self {
            passthrough: true,
            ..Self::default()
        }
    }

    /// Writes `value` to the replacement instead of the user's value.
    pub fn with_new_value(mut self, value: impl Into<SettingValue>) -> Self {
        self.new_value = Some(value.into());
        self
    }

    /// Names the version in which the option will be removed.
    pub fn obsoleted_in(mut self, version: &str) -> Self {
        self.obsoleted_version = Some(version.to_string());
        self
    }
}

/// A deprecated option bound to its redirect.
#[derive(Debug, Clone)]
pub struct DeprecationBinding {
    definition: OptionDefinition,
    options: DeprecationOptions,
}

impl DeprecationBinding {
    /// Declares a deprecated option.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::MissingRedirectTarget`] when neither `new_flag`
    /// nor passthrough is set, an unknown-setting error when the write
    /// target is not registered, and [`CliError::InvalidRedirectValue`] when
    /// `new_value` does not fit the target setting.
    pub fn new(
        registry: &SettingsRegistry,
        definition: OptionDefinition,
        mut options: DeprecationOptions,
    ) -> Result<Self> {
        definition.validate_switches()?;
        let target = if options.passthrough {
            definition.setting()
        } else {
            options
                .new_flag
                .as_deref()
                .ok_or_else(|| CliError::MissingRedirectTarget(definition.switches_display()))?
        };
        let declared = registry.get(target)?;
        if !options.passthrough {
            if let Some(value) = options.new_value.take() {
                let value = validate_value(declared.setting_type(), value).map_err(|reason| {
                    CliError::InvalidRedirectValue {
                        switch: definition.canonical_switch().to_string(),
                        reason,
                    }
                })?;
                options.new_value = Some(value);
            }
        }
        Ok(Self {
            definition,
            options,
        })
    }

    /// The deprecated option's definition.
    pub fn definition(&self) -> &OptionDefinition {
        &self.definition
    }

    /// Redirect configuration.
    pub fn options(&self) -> &DeprecationOptions {
        &self.options
    }

    /// Setting written on invocation.
    pub fn target_setting(&self) -> &str {
        match (&self.options.new_flag, self.options.passthrough) {
            (Some(new_flag), false) => new_flag,
            _ => self.definition.setting(),
        }
    }

    /// Composes the warning for an invocation with `raw` as the user's value.
    pub fn message(&self, raw: &str) -> String {
        let mut msg = format!(
            "DEPRECATION WARNING: The flag {} has been deprecated",
            self.definition.switches_display()
        );
        match &self.options.obsoleted_version {
            Some(version) => msg.push_str(&format!(" and will be removed in version {version}")),
            None => msg.push_str(" and may be removed in a future release"),
        }
        match &self.options.new_flag {
            Some(new_flag) => {
                let shown = match &self.options.new_value {
                    Some(value) => value.to_string(),
                    None => raw.to_string(),
                };
                msg.push_str(&format!(", please use \"--{new_flag}={shown}\" instead."));
            }
            None => msg.push('.'),
        }
        msg
    }

    /// Records the warning and forwards the value.
    ///
    /// Every call appends one message; repeated invocations are not
    /// collapsed.
    pub fn invoke(
        &self,
        registry: &mut SettingsRegistry,
        log: &DeprecationLog,
        raw: &str,
    ) -> Result<()> {
        log.push(self.message(raw));
        debug!(
            option = self.definition.canonical_switch(),
            target = self.target_setting(),
            passthrough = self.options.passthrough,
            "Deprecated option invoked"
        );

        let target = self.target_setting();
        let value = match (&self.options.new_value, self.options.passthrough) {
            (Some(replacement), false) => replacement.clone(),
            _ => match self.definition.conversion() {
                Some(conversion) => {
                    conversion
                        .apply(raw)
                        .map_err(|reason| CliError::InvalidArgument {
                            switch: self.definition.canonical_switch().to_string(),
                            reason,
                        })?
                }
                None => registry.coerce(target, raw)?,
            },
        };
        registry.set(target, value)?;
        Ok(())
    }
}
