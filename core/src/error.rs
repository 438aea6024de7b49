//! Error types for settings registry operations.
//!
//! Covers lookup failures, validation rejections, list appends on scalar
//! settings, and settings-file I/O and parsing.

use thiserror::Error;

/// Errors that can occur while registering, reading, or writing settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A read, write, or binding targeted a name absent from the registry.
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// A setting with the same name is already registered.
    #[error("setting already registered: {0}")]
    DuplicateSetting(String),

    /// The registry rejected a value on type or constraint grounds.
    #[error("invalid value for setting '{name}': {reason}")]
    InvalidValue {
        /// Name of the setting that rejected the value.
        name: String,
        /// Human-readable rejection reason.
        reason: String,
    },

    /// Append attempted on a setting whose value is not a list.
    #[error("setting '{0}' does not hold an appendable list")]
    NotAppendable(String),

    /// Settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl SettingsError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for results with [`SettingsError`].
pub type Result<T> = std::result::Result<T, SettingsError>;
