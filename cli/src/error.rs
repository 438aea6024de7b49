//! Error types for option declaration and argument parsing.

use optbind_core::SettingsError;
use thiserror::Error;

/// Errors raised while declaring options or parsing a command line.
///
/// Declaration-time variants point at a defect in the command's own option
/// definitions. Runtime variants come from user input; see
/// [`is_usage_error`](CliError::is_usage_error).
#[derive(Debug, Error)]
pub enum CliError {
    /// Registry failure: unknown setting, rejected value, or list append on
    /// a scalar.
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// A deprecated option has neither a replacement nor passthrough.
    #[error("deprecated option {0} needs a new_flag or passthrough")]
    MissingRedirectTarget(String),

    /// A switch is already declared on this command.
    #[error("option already declared: {0}")]
    DuplicateOption(String),

    /// No option is bound to the switch.
    #[error("no option declared for switch: {0}")]
    UnknownOption(String),

    /// Short switch is not a single dash followed by one character.
    #[error("invalid short switch format: {0}")]
    InvalidShortSwitch(String),

    /// Long switch does not start with `--` or is too short.
    #[error("invalid long switch format: {0}")]
    InvalidLongSwitch(String),

    /// A deprecated option's replacement value does not fit the target
    /// setting.
    #[error("invalid replacement value for deprecated option {switch}: {reason}")]
    InvalidRedirectValue {
        /// Canonical switch of the deprecated option.
        switch: String,
        /// Validation failure for the target setting.
        reason: String,
    },

    /// An option was declared without any switches.
    #[error("option must define at least one switch")]
    MissingSwitch,

    /// A strict command received leftover positional arguments.
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    /// An option's conversion block rejected the raw argument.
    #[error("invalid value for {switch}: {reason}")]
    InvalidArgument {
        /// Canonical switch of the option.
        switch: String,
        /// Rejection reason from the conversion block.
        reason: String,
    },

    /// Serializing resolved settings failed.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Tokenizer error, including `--help` and `--version` requests.
    #[error(transparent)]
    Clap(#[from] clap::Error),
}

impl CliError {
    /// Returns `true` for errors caused by user input rather than by the
    /// command's definition.
    ///
    /// Usage errors are rendered as a message and a non-zero exit; the rest
    /// indicate a bug in the option declarations.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            CliError::Settings(SettingsError::InvalidValue { .. })
                | CliError::UnknownCommand(_)
                | CliError::InvalidArgument { .. }
                | CliError::Clap(_)
        )
    }
}

/// Convenience alias for results with [`CliError`].
pub type Result<T> = std::result::Result<T, CliError>;
