//! Setting type definitions.
//!
//! A [`Setting`] is a named, typed configuration value with a compiled-in
//! default. Settings are owned by a
//! [`SettingsRegistry`](crate::SettingsRegistry) and change only through its
//! validated setters.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// A typed setting value.
///
/// Serializes untagged, so a snapshot of the registry renders as plain JSON
/// or YAML scalars and sequences.
///
/// # Examples
///
/// ```
/// use optbind_core::SettingValue;
///
/// assert_eq!(SettingValue::Bool(false).to_string(), "false");
/// assert_eq!(SettingValue::from("main").to_string(), "main");
/// assert!(SettingValue::List(vec![]).is_appendable());
/// assert!(!SettingValue::Integer(4).is_appendable());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean value.
    Bool(bool),
    /// Signed integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// Free-form string value.
    String(String),
    /// Filesystem path.
    Path(PathBuf),
    /// Ordered, appendable sequence of strings.
    List(Vec<String>),
}

impl SettingValue {
    /// Returns `true` if new items can be appended to this value in place.
    pub fn is_appendable(&self) -> bool {
        matches!(self, SettingValue::List(_))
    }

    /// Short name of the value's kind, used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Integer(_) => "integer",
            SettingValue::Float(_) => "float",
            SettingValue::String(_) => "string",
            SettingValue::Path(_) => "path",
            SettingValue::List(_) => "list",
        }
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SettingValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Integer(n) => write!(f, "{n}"),
            SettingValue::Float(x) => write!(f, "{x}"),
            SettingValue::String(s) => f.write_str(s),
            SettingValue::Path(p) => write!(f, "{}", p.display()),
            SettingValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        SettingValue::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::String(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::String(value)
    }
}

impl From<PathBuf> for SettingValue {
    fn from(value: PathBuf) -> Self {
        SettingValue::Path(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

/// Declared type of a setting, including its constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingType {
    /// `true` / `false`.
    Boolean,
    /// Integer with optional inclusive bounds.
    Integer {
        /// Smallest accepted value.
        min: Option<i64>,
        /// Largest accepted value.
        max: Option<i64>,
    },
    /// Finite floating point number.
    Float,
    /// String, optionally restricted to a fixed set of choices.
    String {
        /// Accepted values (empty = any string).
        choices: Vec<String>,
    },
    /// Filesystem path (existence is not checked).
    Path,
    /// Ordered list of strings.
    List,
}

/// Where a setting's current value came from.
///
/// Sources are listed in increasing precedence: compiled-in defaults are
/// overridden by the settings file, which is overridden by the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Default)]
pub enum ValueSource {
    /// Compiled-in default (the setting was never written).
    #[default]
    Default,
    /// Loaded from a settings file.
    SettingsFile,
    /// Supplied on the command line.
    CommandLine,
}

/// A named, typed, validated configuration value.
///
/// Build settings with the typed constructors and register them with
/// [`SettingsRegistry::register`](crate::SettingsRegistry::register).
///
/// # Examples
///
/// ```
/// use optbind_core::{Setting, SettingValue};
///
/// let workers = Setting::integer("pipeline.workers", 4)
///     .with_range(Some(1), None)
///     .with_description("Number of pipeline workers");
/// assert_eq!(workers.name(), "pipeline.workers");
/// assert_eq!(workers.value(), &SettingValue::Integer(4));
/// assert!(!workers.is_set());
/// ```
#[derive(Debug, Clone)]
pub struct Setting {
    name: String,
    setting_type: SettingType,
    default: SettingValue,
    value: Option<SettingValue>,
    source: ValueSource,
    description: Option<String>,
}

impl Setting {
    /// Creates a setting with an explicit type and default.
    pub fn new(name: &str, setting_type: SettingType, default: SettingValue) -> Self {
        Self {
            name: name.to_string(),
            setting_type,
            default,
            value: None,
            source: ValueSource::Default,
            description: None,
        }
    }

    /// Creates a boolean setting.
    pub fn boolean(name: &str, default: bool) -> Self {
        Self::new(name, SettingType::Boolean, SettingValue::Bool(default))
    }

    /// Creates an unbounded integer setting.
    pub fn integer(name: &str, default: i64) -> Self {
        Self::new(
            name,
            SettingType::Integer {
                min: None,
                max: None,
            },
            SettingValue::Integer(default),
        )
    }

    /// Creates a floating point setting.
    pub fn float(name: &str, default: f64) -> Self {
        Self::new(name, SettingType::Float, SettingValue::Float(default))
    }

    /// Creates a free-form string setting.
    pub fn string(name: &str, default: &str) -> Self {
        Self::new(
            name,
            SettingType::String {
                choices: Vec::new(),
            },
            SettingValue::from(default),
        )
    }

    /// Creates a path setting.
    pub fn path(name: &str, default: impl Into<PathBuf>) -> Self {
        Self::new(name, SettingType::Path, SettingValue::Path(default.into()))
    }

    /// Creates a list setting that starts empty.
    pub fn list(name: &str) -> Self {
        Self::new(name, SettingType::List, SettingValue::List(Vec::new()))
    }

    /// Restricts an integer setting to an inclusive range.
    ///
    /// Has no effect on settings of other types.
    pub fn with_range(mut self, lower: Option<i64>, upper: Option<i64>) -> Self {
        if let SettingType::Integer { min, max } = &mut self.setting_type {
            *min = lower;
            *max = upper;
        }
        self
    }

    /// Restricts a string setting to a fixed set of choices.
    ///
    /// Has no effect on settings of other types.
    pub fn with_choices(mut self, accepted: &[&str]) -> Self {
        if let SettingType::String { choices } = &mut self.setting_type {
            *choices = accepted.iter().map(|c| c.to_string()).collect();
        }
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Setting name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    pub fn setting_type(&self) -> &SettingType {
        &self.setting_type
    }

    /// Compiled-in default value.
    pub fn default_value(&self) -> &SettingValue {
        &self.default
    }

    /// Current value, falling back to the default when unset.
    pub fn value(&self) -> &SettingValue {
        self.value.as_ref().unwrap_or(&self.default)
    }

    /// Returns `true` if the setting has been written since registration.
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Source of the current value.
    pub fn source(&self) -> ValueSource {
        self.source
    }

    /// Optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn store(&mut self, value: SettingValue, source: ValueSource) {
        self.value = Some(value);
        self.source = source;
    }

    pub(crate) fn value_mut(&mut self) -> &mut SettingValue {
        self.value.get_or_insert_with(|| self.default.clone())
    }

    pub(crate) fn mark_source(&mut self, source: ValueSource) {
        self.source = source;
    }

    pub(crate) fn clear(&mut self) {
        self.value = None;
        self.source = ValueSource::Default;
    }
}
