//! Command-line options backed by a validated settings registry.
//!
//! Options declared here hold no values of their own. Every parsed value is
//! written to, and read back from, an
//! [`optbind_core::SettingsRegistry`]:
//!
//! - [`OptionDefinition`] — switches, target setting, and conversion.
//! - [`OptionBindings`] — accessor table (reader, writer, appender) checked
//!   against the registry when each option is declared.
//! - [`DeprecationBinding`] — deprecated option that warns and redirects.
//! - [`SettingsCommand`] — `clap`-tokenized command, optionally strict about
//!   leftover arguments.
//!
//! # Example
//!
//! ```
//! use optbind_cli::*;
//! use optbind_core::{DeprecationLog, Setting, SettingValue, SettingsRegistry};
//!
//! let mut registry = SettingsRegistry::new();
//! registry.register(Setting::string("log.level", "info")).unwrap();
//!
//! let command = SettingsCommand::strict("run")
//!     .option(&registry, OptionDefinition::new(&["--log.level"], "LEVEL", "Log level"))
//!     .unwrap()
//!     .deprecated_option(
//!         &registry,
//!         OptionDefinition::new(&["--debug"], "", "Debug logging").flag(),
//!         DeprecationOptions::redirect_to("log.level").with_new_value("debug"),
//!     )
//!     .unwrap();
//!
//! let log = DeprecationLog::new();
//! command.parse(&mut registry, &log, ["--debug"]).unwrap();
//!
//! assert_eq!(registry.get_value("log.level").unwrap(), &SettingValue::from("debug"));
//! assert!(log.messages()[0].contains("--log.level=debug"));
//! ```

mod binding;
mod command;
mod deprecated;
mod error;
mod option;

pub use binding::{AccessorKind, BoundOption, OptionBindings};
pub use command::{ParseOutcome, SettingsCommand};
pub use deprecated::{DeprecationBinding, DeprecationOptions};
pub use error::{CliError, Result};
pub use option::{Conversion, ConversionFn, OptionDefinition};
