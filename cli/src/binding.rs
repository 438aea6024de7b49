//! Accessor table binding options to registry settings.
//!
//! Each declared option gets a table entry listing its accessors: a reader
//! and a writer for plain options, a reader and an appender for repeatable
//! ones, and a redirecting writer for deprecated ones. A single dispatch
//! path consults the table; no per-option code is generated.

use std::collections::HashMap;

use optbind_core::{DeprecationLog, SettingValue, SettingsRegistry};
use tracing::debug;

use crate::error::{CliError, Result};
use crate::{DeprecationBinding, DeprecationOptions, OptionDefinition};

/// Tokenizer id of the catch-all positional holding leftover arguments.
pub(crate) const REMAINING_ID: &str = "__remaining";

/// What an accessor does with its setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    /// Returns the setting's current value.
    Reader,
    /// Converts and stores a value.
    Writer,
    /// Appends to a list setting.
    Appender,
}

/// How an option's writes reach the registry.
#[derive(Debug, Clone)]
enum WriteTarget {
    Setting,
    Deprecated(DeprecationBinding),
}

/// One row of the accessor table.
#[derive(Debug, Clone)]
pub struct BoundOption {
    id: String,
    definition: OptionDefinition,
    accessors: Vec<AccessorKind>,
    target: WriteTarget,
}

impl BoundOption {
    /// Tokenizer id for this option.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The option's definition.
    pub fn definition(&self) -> &OptionDefinition {
        &self.definition
    }

    /// Accessors bound for this option.
    pub fn accessors(&self) -> &[AccessorKind] {
        &self.accessors
    }

    /// Returns `true` if the option was declared deprecated.
    pub fn is_deprecated(&self) -> bool {
        matches!(self.target, WriteTarget::Deprecated(_))
    }

    fn has(&self, kind: AccessorKind) -> bool {
        self.accessors.contains(&kind)
    }

    pub(crate) fn convert(&self, registry: &SettingsRegistry, raw: &str) -> Result<SettingValue> {
        match self.definition.conversion() {
            Some(conversion) => conversion
                .apply(raw)
                .map_err(|reason| CliError::InvalidArgument {
                    switch: self.definition.canonical_switch().to_string(),
                    reason,
                }),
            None => Ok(registry.coerce(self.definition.setting(), raw)?),
        }
    }
}

/// Accessor table for every option declared on a command.
///
/// # Examples
///
/// ```
/// use optbind_cli::{OptionBindings, OptionDefinition};
/// use optbind_core::{DeprecationLog, Setting, SettingValue, SettingsRegistry};
///
/// let mut registry = SettingsRegistry::new();
/// registry.register(Setting::integer("pipeline.workers", 1)).unwrap();
///
/// let mut bindings = OptionBindings::new();
/// bindings
///     .bind(&registry, OptionDefinition::new(&["-w", "--pipeline.workers"], "COUNT", ""))
///     .unwrap();
///
/// let log = DeprecationLog::new();
/// bindings.write(&mut registry, &log, "-w", "8").unwrap();
/// assert_eq!(bindings.read(&registry, "--pipeline.workers").unwrap(), &SettingValue::Integer(8));
/// ```
#[derive(Debug, Clone, Default)]
pub struct OptionBindings {
    options: Vec<BoundOption>,
    by_switch: HashMap<String, usize>,
}

impl OptionBindings {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a plain option to its setting.
    ///
    /// Appendable options get an appender in place of the writer.
    ///
    /// # Errors
    ///
    /// Fails with an unknown-setting error if the option's setting is not
    /// registered, [`CliError::DuplicateOption`] if a switch is already
    /// bound, or a switch-format error.
    pub fn bind(&mut self, registry: &SettingsRegistry, definition: OptionDefinition) -> Result<&BoundOption> {
        definition.validate_switches()?;
        registry.get(definition.setting())?;
        let write = if definition.is_appendable() {
            AccessorKind::Appender
        } else {
            AccessorKind::Writer
        };
        self.insert(definition, vec![AccessorKind::Reader, write], WriteTarget::Setting)
    }

    /// Binds a deprecated option.
    ///
    /// Only a writer is bound; it warns and forwards per `options`.
    pub fn bind_deprecated(
        &mut self,
        registry: &SettingsRegistry,
        definition: OptionDefinition,
        options: DeprecationOptions,
    ) -> Result<&BoundOption> {
        let binding = DeprecationBinding::new(registry, definition.clone(), options)?;
        self.insert(
            definition,
            vec![AccessorKind::Writer],
            WriteTarget::Deprecated(binding),
        )
    }

    fn insert(
        &mut self,
        definition: OptionDefinition,
        accessors: Vec<AccessorKind>,
        target: WriteTarget,
    ) -> Result<&BoundOption> {
        if let Some(taken) = definition
            .switches()
            .iter()
            .find(|s| self.by_switch.contains_key(s.as_str()))
        {
            return Err(CliError::DuplicateOption(taken.clone()));
        }
        // `-x` and `--x` would share a tokenizer id.
        let id = definition.canonical_switch().trim_start_matches('-').to_string();
        if id == REMAINING_ID || self.options.iter().any(|option| option.id == id) {
            return Err(CliError::DuplicateOption(definition.canonical_switch().to_string()));
        }

        let index = self.options.len();
        for switch in definition.switches() {
            self.by_switch.insert(switch.clone(), index);
        }
        debug!(
            option = definition.canonical_switch(),
            setting = definition.setting(),
            accessors = ?accessors,
            "Bound option"
        );
        self.options.push(BoundOption {
            id,
            definition,
            accessors,
            target,
        });
        Ok(&self.options[index])
    }

    /// Looks up an option by any of its switches.
    pub fn lookup(&self, switch: &str) -> Option<&BoundOption> {
        self.by_switch.get(switch).map(|&i| &self.options[i])
    }

    /// Iterates over bound options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundOption> {
        self.options.iter()
    }

    /// Number of bound options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if no options are bound.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn require(&self, switch: &str) -> Result<&BoundOption> {
        self.lookup(switch)
            .ok_or_else(|| CliError::UnknownOption(switch.to_string()))
    }

    /// Reads the setting behind `switch`.
    ///
    /// Deprecated options have no reader; reading one fails like an
    /// undeclared switch.
    pub fn read<'r>(&self, registry: &'r SettingsRegistry, switch: &str) -> Result<&'r SettingValue> {
        let option = self.require(switch)?;
        if !option.has(AccessorKind::Reader) {
            return Err(CliError::UnknownOption(switch.to_string()));
        }
        Ok(registry.get_value(option.definition.setting())?)
    }

    /// Writes a raw argument through the option bound to `switch`.
    pub fn write(
        &self,
        registry: &mut SettingsRegistry,
        log: &DeprecationLog,
        switch: &str,
        raw: &str,
    ) -> Result<()> {
        let option = self.require(switch)?;
        self.dispatch(option, registry, log, raw)
    }

    /// Routes a raw argument to the option's writer, appender, or redirect.
    pub(crate) fn dispatch(
        &self,
        option: &BoundOption,
        registry: &mut SettingsRegistry,
        log: &DeprecationLog,
        raw: &str,
    ) -> Result<()> {
        let setting = option.definition.setting();
        match &option.target {
            WriteTarget::Deprecated(binding) => binding.invoke(registry, log, raw),
            WriteTarget::Setting if option.has(AccessorKind::Appender) => {
                let item = match option.definition.conversion() {
                    Some(_) => option.convert(registry, raw)?.to_string(),
                    None => raw.to_string(),
                };
                Ok(registry.append(setting, item)?)
            }
            WriteTarget::Setting => {
                let value = option.convert(registry, raw)?;
                Ok(registry.set_value(setting, value)?)
            }
        }
    }
}
