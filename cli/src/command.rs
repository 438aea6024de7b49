//! Settings-backed commands.
//!
//! A [`SettingsCommand`] owns the accessor table for its options and builds
//! a `clap` command from it on demand. Parsing tokenizes with `clap`, then
//! replays every matched value through the table in argument order, so the
//! last occurrence of a setting on the command line wins.
//!
//! # Example
//!
//! ```
//! use optbind_cli::{CliError, OptionDefinition, SettingsCommand};
//! use optbind_core::{DeprecationLog, Setting, SettingValue, SettingsRegistry};
//!
//! let mut registry = SettingsRegistry::new();
//! registry.register(Setting::integer("pipeline.workers", 1)).unwrap();
//!
//! let command = SettingsCommand::strict("run")
//!     .option(&registry, OptionDefinition::new(&["-w", "--pipeline.workers"], "COUNT", ""))
//!     .unwrap();
//!
//! let log = DeprecationLog::new();
//! command.parse(&mut registry, &log, ["-w", "3"]).unwrap();
//! assert_eq!(registry.get_value("pipeline.workers").unwrap(), &SettingValue::Integer(3));
//!
//! let err = command.parse(&mut registry, &log, ["-w", "3", "extra"]).unwrap_err();
//! assert!(matches!(err, CliError::UnknownCommand(token) if token == "extra"));
//! ```

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Arg, ArgAction};
use optbind_core::{DeprecationLog, SettingType, SettingValue, SettingsRegistry, load_settings_file};
use tracing::debug;

use crate::binding::{BoundOption, OptionBindings, REMAINING_ID};
use crate::error::{CliError, Result};
use crate::{DeprecationOptions, OptionDefinition};

/// Result of a successful parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Leftover positional arguments (always empty for strict commands).
    pub remaining: Vec<String>,
    /// Settings file applied before command-line values, if any.
    pub settings_file: Option<PathBuf>,
    /// Number of option values written through the accessor table.
    pub applied: usize,
}

/// A command whose options read and write a [`SettingsRegistry`].
#[derive(Debug, Clone)]
pub struct SettingsCommand {
    name: String,
    about: Option<String>,
    version: Option<String>,
    strict: bool,
    bindings: OptionBindings,
    settings_file: Option<String>,
}

impl SettingsCommand {
    /// Creates a command that returns leftover positional arguments.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            about: None,
            version: None,
            strict: false,
            bindings: OptionBindings::new(),
            settings_file: None,
        }
    }

    /// Creates a command that rejects leftover positional arguments with
    /// [`CliError::UnknownCommand`].
    pub fn strict(name: &str) -> Self {
        Self {
            strict: true,
            ..Self::new(name)
        }
    }

    /// Returns `true` for strict commands.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a one-line description shown in help output.
    pub fn about(mut self, about: &str) -> Self {
        self.about = Some(about.to_string());
        self
    }

    /// Enables `--version` with the given version string.
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// Declares an option bound to a registered setting.
    ///
    /// # Errors
    ///
    /// See [`OptionBindings::bind`].
    pub fn option(mut self, registry: &SettingsRegistry, definition: OptionDefinition) -> Result<Self> {
        self.bindings.bind(registry, definition)?;
        Ok(self)
    }

    /// Declares a deprecated option.
    ///
    /// # Errors
    ///
    /// See [`OptionBindings::bind_deprecated`].
    pub fn deprecated_option(
        mut self,
        registry: &SettingsRegistry,
        definition: OptionDefinition,
        options: DeprecationOptions,
    ) -> Result<Self> {
        self.bindings.bind_deprecated(registry, definition, options)?;
        Ok(self)
    }

    /// Names the path setting that locates the settings file.
    ///
    /// During [`parse`](Self::parse) the file is applied before any
    /// command-line value. A path given on the command line must exist; the
    /// setting's default is only used when the file is present.
    ///
    /// # Errors
    ///
    /// Fails if `setting` is not registered or is not a path setting.
    pub fn settings_file_from(mut self, registry: &SettingsRegistry, setting: &str) -> Result<Self> {
        let declared = registry.get(setting)?;
        if declared.setting_type() != &SettingType::Path {
            return Err(optbind_core::SettingsError::InvalidValue {
                name: setting.to_string(),
                reason: "settings file location must be a path setting".to_string(),
            }
            .into());
        }
        self.settings_file = Some(setting.to_string());
        Ok(self)
    }

    /// The command's accessor table.
    pub fn bindings(&self) -> &OptionBindings {
        &self.bindings
    }

    /// Reads the setting behind `switch`.
    pub fn read<'r>(&self, registry: &'r SettingsRegistry, switch: &str) -> Result<&'r SettingValue> {
        self.bindings.read(registry, switch)
    }

    /// Builds the `clap` command used to tokenize arguments.
    ///
    /// Arguments exclude the binary name.
    pub fn to_clap(&self) -> clap::Command {
        let mut cmd = clap::Command::new(self.name.clone()).no_binary_name(true);
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }
        if let Some(version) = &self.version {
            cmd = cmd.version(version.clone());
        }
        for option in self.bindings.iter() {
            cmd = cmd.arg(option.definition().to_arg(option.id()));
        }
        cmd.arg(
            Arg::new(REMAINING_ID)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_name("ARGS")
                .hide(true),
        )
    }

    /// Parses `args` (without the binary name) into `registry`.
    ///
    /// Deprecated options push their warnings to `log`. For strict commands
    /// leftover positionals are reported after option values are written,
    /// so deprecation warnings for the same line are still recorded.
    ///
    /// # Errors
    ///
    /// Tokenizer errors (including `--help`) surface as [`CliError::Clap`];
    /// rejected values, settings-file failures, and strict-mode leftovers as
    /// their own variants.
    pub fn parse<I, T>(
        &self,
        registry: &mut SettingsRegistry,
        log: &DeprecationLog,
        args: I,
    ) -> Result<ParseOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.to_clap().try_get_matches_from(args)?;

        let mut occurrences: Vec<(usize, &BoundOption, &str)> = Vec::new();
        for option in self.bindings.iter() {
            let (Some(values), Some(indices)) = (
                matches.get_many::<String>(option.id()),
                matches.indices_of(option.id()),
            ) else {
                continue;
            };
            for (index, value) in indices.zip(values) {
                occurrences.push((index, option, value.as_str()));
            }
        }
        occurrences.sort_by_key(|(index, _, _)| *index);

        let settings_file = match &self.settings_file {
            Some(setting) => self.apply_settings_file(registry, setting, &occurrences)?,
            None => None,
        };

        for (_, option, raw) in &occurrences {
            self.bindings.dispatch(option, registry, log, raw)?;
        }

        let remaining: Vec<String> = matches
            .get_many::<String>(REMAINING_ID)
            .map(|values| values.cloned().collect())
            .unwrap_or_default();
        if self.strict {
            if let Some(first) = remaining.first() {
                return Err(CliError::UnknownCommand(first.clone()));
            }
        }

        debug!(
            command = %self.name,
            applied = occurrences.len(),
            remaining = remaining.len(),
            "Parsed command line"
        );
        Ok(ParseOutcome {
            remaining,
            settings_file,
            applied: occurrences.len(),
        })
    }

    fn apply_settings_file(
        &self,
        registry: &mut SettingsRegistry,
        setting: &str,
        occurrences: &[(usize, &BoundOption, &str)],
    ) -> Result<Option<PathBuf>> {
        let explicit = occurrences
            .iter()
            .rev()
            .find(|(_, option, _)| !option.is_deprecated() && option.definition().setting() == setting);

        let path = match explicit {
            Some((_, option, raw)) => path_of(option.convert(registry, raw)?),
            None => {
                let path = path_of(registry.get_value(setting)?.clone());
                if !path.is_file() {
                    debug!(path = %path.display(), "No settings file at default location");
                    return Ok(None);
                }
                path
            }
        };

        load_settings_file(registry, &path)?;
        Ok(Some(path))
    }
}

fn path_of(value: SettingValue) -> PathBuf {
    match value {
        SettingValue::Path(path) => path,
        other => PathBuf::from(other.to_string()),
    }
}
