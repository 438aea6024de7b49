//! Validated settings registry for settings-backed command-line tools.
//!
//! This crate holds the state side of option handling:
//!
//! - [`Setting`] — a named, typed value with a compiled-in default.
//! - [`SettingsRegistry`] — the single store every option reads from and
//!   writes to, with validation on every write.
//! - [`load_settings_file`] — YAML settings file applied between defaults
//!   and command-line values.
//! - [`DeprecationLog`] — append-only sink for deprecation warnings.
//!
//! Values come from exactly three places, in increasing precedence:
//! compiled-in defaults, the settings file, and the command line. Nothing is
//! read from environment variables.
//!
//! # Example
//!
//! ```
//! use optbind_core::*;
//!
//! let mut registry = SettingsRegistry::new();
//! registry.register(Setting::boolean("config.debug", false)).unwrap();
//! registry.register(Setting::integer("pipeline.workers", 2)).unwrap();
//!
//! load_settings_str(&mut registry, "pipeline:\n  workers: 4\n").unwrap();
//! registry.set_value("config.debug", SettingValue::Bool(true)).unwrap();
//!
//! assert_eq!(registry.source_of("pipeline.workers").unwrap(), ValueSource::SettingsFile);
//! assert_eq!(registry.source_of("config.debug").unwrap(), ValueSource::CommandLine);
//! ```

mod config;
mod deprecation;
mod error;
mod registry;
mod types;
mod validate;

pub use config::{load_settings_file, load_settings_str};
pub use deprecation::DeprecationLog;
pub use error::{Result, SettingsError};
pub use registry::SettingsRegistry;
pub use types::*;
pub use validate::{coerce_str, validate_value};
