//! Option definitions: switches, target setting, and value conversion.
//!
//! An [`OptionDefinition`] describes one command-line option and the
//! setting it is bound to. It carries no value of its own; values live in
//! the [`SettingsRegistry`](optbind_core::SettingsRegistry).

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use clap::{Arg, ArgAction};
use optbind_core::SettingValue;

use crate::error::{CliError, Result};

/// User-supplied conversion from a raw argument to a setting value.
pub type ConversionFn = dyn Fn(&str) -> std::result::Result<SettingValue, String> + Send + Sync;

/// Shared handle to a conversion block.
#[derive(Clone)]
pub struct Conversion(Arc<ConversionFn>);

impl Conversion {
    /// Wraps a conversion closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<SettingValue, String> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Applies the conversion.
    pub fn apply(&self, raw: &str) -> std::result::Result<SettingValue, String> {
        (self.0)(raw)
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Conversion(..)")
    }
}

/// Schema for a command-line option bound to a setting.
///
/// The setting name defaults to the first long switch without its leading
/// dashes, so `--pipeline.workers` binds to `pipeline.workers`.
///
/// # Examples
///
/// ```
/// use optbind_cli::OptionDefinition;
///
/// let workers = OptionDefinition::new(&["-w", "--pipeline.workers"], "COUNT", "Worker threads");
/// assert_eq!(workers.setting(), "pipeline.workers");
/// assert_eq!(workers.canonical_switch(), "--pipeline.workers");
/// assert!(workers.matches("-w"));
///
/// let debug = OptionDefinition::new(&["--config.debug"], "", "Print the compiled config").flag();
/// assert!(debug.is_flag());
/// ```
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    switches: Vec<String>,
    setting: String,
    label: String,
    description: String,
    is_flag: bool,
    is_appendable: bool,
    conversion: Option<Conversion>,
}

impl OptionDefinition {
    /// Creates an option with the given switches, value label, and help text.
    pub fn new(switches: &[&str], label: &str, description: &str) -> Self {
        let switches: Vec<String> = switches.iter().map(|s| s.to_string()).collect();
        let setting = switches
            .iter()
            .find(|s| s.starts_with("--"))
            .or(switches.first())
            .map(|s| s.trim_start_matches('-').to_string())
            .unwrap_or_default();
        Self {
            switches,
            setting,
            label: label.to_string(),
            description: description.to_string(),
            is_flag: false,
            is_appendable: false,
            conversion: None,
        }
    }

    /// Binds the option to a setting other than its long switch name.
    pub fn with_setting(mut self, setting: &str) -> Self {
        self.setting = setting.to_string();
        self
    }

    /// Marks the option as a boolean flag.
    ///
    /// Flags take an optional `true`/`false` argument and default to `true`
    /// when given bare.
    pub fn flag(mut self) -> Self {
        self.is_flag = true;
        self
    }

    /// Marks the option as repeatable; each occurrence appends to a list
    /// setting.
    pub fn appendable(mut self) -> Self {
        self.is_appendable = true;
        self
    }

    /// Converts raw arguments with `f` instead of the setting's own coercion.
    pub fn with_conversion<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<SettingValue, String> + Send + Sync + 'static,
    {
        self.conversion = Some(Conversion::new(f));
        self
    }

    /// All switches, in declaration order.
    pub fn switches(&self) -> &[String] {
        &self.switches
    }

    /// Name of the bound setting.
    pub fn setting(&self) -> &str {
        &self.setting
    }

    /// Value label shown in help output.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Help text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` for boolean flags.
    pub fn is_flag(&self) -> bool {
        self.is_flag
    }

    /// Returns `true` for repeatable, list-appending options.
    pub fn is_appendable(&self) -> bool {
        self.is_appendable
    }

    pub(crate) fn conversion(&self) -> Option<&Conversion> {
        self.conversion.as_ref()
    }

    /// Returns the canonical switch (first long form, else the first switch).
    pub fn canonical_switch(&self) -> &str {
        self.switches
            .iter()
            .find(|s| s.starts_with("--"))
            .or(self.switches.first())
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    /// Checks if `switch` is one of this option's switches.
    pub fn matches(&self, switch: &str) -> bool {
        self.switches.iter().any(|s| s == switch)
    }

    /// Renders the switches for messages, e.g. `--verbose, -v`.
    pub fn switches_display(&self) -> String {
        self.switches.join(", ")
    }

    /// Default taken from the process environment: always `None`.
    ///
    /// Values come only from compiled-in defaults, the settings file, and the
    /// command line, so this hook never reads environment variables.
    pub fn default_from_environment(&self) -> Option<SettingValue> {
        None
    }

    /// Checks switch formats and duplicates within this option.
    pub(crate) fn validate_switches(&self) -> Result<()> {
        if self.switches.is_empty() {
            return Err(CliError::MissingSwitch);
        }
        let mut seen = HashSet::new();
        for switch in &self.switches {
            if switch.starts_with("--") {
                if switch.len() < 3 {
                    return Err(CliError::InvalidLongSwitch(switch.clone()));
                }
            } else if !switch.starts_with('-') || switch.chars().count() != 2 {
                return Err(CliError::InvalidShortSwitch(switch.clone()));
            }
            if !seen.insert(switch.as_str()) {
                return Err(CliError::DuplicateOption(switch.clone()));
            }
        }
        Ok(())
    }

    /// Builds the tokenizer argument for this option.
    ///
    /// The argument never has an environment fallback; see
    /// [`default_from_environment`](Self::default_from_environment).
    pub(crate) fn to_arg(&self, id: &str) -> Arg {
        let mut arg = Arg::new(id.to_string())
            .help(self.description.clone())
            .action(ArgAction::Append);

        let mut longs = self
            .switches
            .iter()
            .filter_map(|s| s.strip_prefix("--"));
        if let Some(long) = longs.next() {
            arg = arg.long(long.to_string());
        }
        for alias in longs {
            arg = arg.visible_alias(alias.to_string());
        }
        let mut shorts = self
            .switches
            .iter()
            .filter(|s| !s.starts_with("--"))
            .filter_map(|s| s.chars().nth(1));
        if let Some(short) = shorts.next() {
            arg = arg.short(short);
        }
        for alias in shorts {
            arg = arg.visible_short_alias(alias);
        }

        if self.is_flag {
            // `--flag`, `--flag true`, `--flag=false`; never swallows `-x`.
            arg.num_args(0..=1)
                .default_missing_value("true")
                .value_parser(["true", "false"])
        } else {
            let label = if self.label.is_empty() {
                "VALUE".to_string()
            } else {
                self.label.clone()
            };
            // The next token is always the value, even `-edge` or `-1`.
            arg.num_args(1)
                .value_name(label)
                .allow_hyphen_values(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_defaults_to_long_switch() {
        let opt = OptionDefinition::new(&["-f", "--path.config"], "CONFIG_PATH", "");
        assert_eq!(opt.setting(), "path.config");
        assert_eq!(opt.canonical_switch(), "--path.config");

        let short_only = OptionDefinition::new(&["-t"], "", "");
        assert_eq!(short_only.setting(), "t");
        assert_eq!(short_only.canonical_switch(), "-t");
    }

    #[test]
    fn test_with_setting_overrides_binding() {
        let opt = OptionDefinition::new(&["--workers"], "N", "").with_setting("pipeline.workers");
        assert_eq!(opt.setting(), "pipeline.workers");
    }

    #[test]
    fn test_validate_switches() {
        assert!(OptionDefinition::new(&["-w", "--workers"], "", "").validate_switches().is_ok());
        assert!(matches!(
            OptionDefinition::new(&["w"], "", "").validate_switches(),
            Err(CliError::InvalidShortSwitch(_))
        ));
        assert!(matches!(
            OptionDefinition::new(&["-wx"], "", "").validate_switches(),
            Err(CliError::InvalidShortSwitch(_))
        ));
        assert!(matches!(
            OptionDefinition::new(&["--"], "", "").validate_switches(),
            Err(CliError::InvalidLongSwitch(_))
        ));
        assert!(matches!(
            OptionDefinition::new(&[], "", "").validate_switches(),
            Err(CliError::MissingSwitch)
        ));
        assert!(matches!(
            OptionDefinition::new(&["--a", "--a"], "", "").validate_switches(),
            Err(CliError::DuplicateOption(_))
        ));
    }

    #[test]
    fn test_conversion_block_is_applied() {
        let opt = OptionDefinition::new(&["--size"], "SIZE", "").with_conversion(|raw| {
            raw.strip_suffix('k')
                .and_then(|n| n.parse::<i64>().ok())
                .map(|n| SettingValue::Integer(n * 1024))
                .ok_or_else(|| format!("'{raw}' is not a size"))
        });
        let conversion = opt.conversion().unwrap();
        assert_eq!(conversion.apply("2k"), Ok(SettingValue::Integer(2048)));
        assert!(conversion.apply("two").is_err());
    }

    #[test]
    fn test_environment_never_supplies_defaults() {
        let opt = OptionDefinition::new(&["--node.name"], "NAME", "");
        assert_eq!(opt.default_from_environment(), None);
    }

    #[test]
    fn test_to_arg_maps_switches() {
        let arg = OptionDefinition::new(&["-w", "--pipeline.workers", "--workers"], "COUNT", "")
            .to_arg("pipeline.workers");
        assert_eq!(arg.get_long(), Some("pipeline.workers"));
        assert_eq!(arg.get_short(), Some('w'));
        assert_eq!(arg.get_visible_aliases(), Some(vec!["workers"]));
    }

    #[test]
    fn test_to_arg_keeps_every_short_switch() {
        let arg = OptionDefinition::new(&["-n", "-N", "--node.name"], "NAME", "").to_arg("node.name");
        assert_eq!(arg.get_short(), Some('n'));
        assert_eq!(arg.get_visible_short_aliases(), Some(vec!['N']));
    }

    #[test]
    fn test_to_arg_value_options_accept_hyphen_values() {
        let arg = OptionDefinition::new(&["--node.name"], "NAME", "").to_arg("node.name");
        assert!(arg.is_allow_hyphen_values_set());

        let flag = OptionDefinition::new(&["--config.debug"], "", "").flag().to_arg("config.debug");
        assert!(!flag.is_allow_hyphen_values_set());
    }
}
