use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use optbind_cli::{CliError, DeprecationOptions, OptionDefinition, SettingsCommand};
use optbind_core::{DeprecationLog, Setting, SettingValue, SettingsRegistry, ValueSource};
use serde::Serialize;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit code for errors caused by the command line itself.
const USAGE_EXIT_CODE: i32 = 2;

fn main() {
    let log = DeprecationLog::new();
    let result = run(&log, std::env::args_os().skip(1));

    for message in log.drain() {
        eprintln!("{message}");
    }

    match result {
        Ok(output) => println!("{output}"),
        Err(CliError::Clap(err)) => err.exit(),
        Err(err) if err.is_usage_error() => {
            eprintln!("error: {err}");
            eprintln!("Run 'optbind --help' for usage.");
            std::process::exit(USAGE_EXIT_CODE);
        }
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

fn run(log: &DeprecationLog, args: impl IntoIterator<Item = OsString>) -> Result<String, CliError> {
    let mut registry = default_settings()?;
    let command = build_command(&registry)?;
    let outcome = command.parse(&mut registry, log, args)?;

    if registry.get_value("config.test_and_exit")?.as_bool() == Some(true) {
        return Ok("Configuration OK".to_string());
    }

    #[derive(Serialize)]
    struct Resolved {
        #[serde(skip_serializing_if = "Option::is_none")]
        settings_file: Option<PathBuf>,
        settings: BTreeMap<String, SettingValue>,
        sources: BTreeMap<String, ValueSource>,
    }

    let mut sources = BTreeMap::new();
    for name in registry.names() {
        sources.insert(name.to_string(), registry.source_of(name)?);
    }
    let resolved = Resolved {
        settings_file: outcome.settings_file,
        settings: registry.to_map(),
        sources,
    };
    Ok(serde_json::to_string_pretty(&resolved)?)
}

// ---------------------------------------------------------------------------
// Settings and options
// ---------------------------------------------------------------------------

fn default_settings() -> optbind_core::Result<SettingsRegistry> {
    let mut registry = SettingsRegistry::new();
    registry.register(Setting::string("node.name", "optbind").with_description("Node name"))?;
    registry.register(Setting::path("path.settings", "config/optbind.yml"))?;
    registry.register(Setting::list("path.plugins"))?;
    registry.register(Setting::integer("pipeline.workers", 1).with_range(Some(1), None))?;
    registry.register(Setting::integer("pipeline.batch.size", 125).with_range(Some(1), None))?;
    registry.register(Setting::float("pipeline.batch.delay", 50.0))?;
    registry.register(
        Setting::string("log.level", "info")
            .with_choices(&["fatal", "error", "warn", "info", "debug", "trace"]),
    )?;
    registry.register(Setting::boolean("config.debug", false))?;
    registry.register(Setting::boolean("config.test_and_exit", false))?;
    registry.register(Setting::boolean("api.enabled", true))?;
    registry.register(Setting::string("api.http.host", "127.0.0.1"))?;
    registry.register(Setting::integer("api.http.port", 9600).with_range(Some(1), Some(65535)))?;
    Ok(registry)
}

fn build_command(registry: &SettingsRegistry) -> optbind_cli::Result<SettingsCommand> {
    SettingsCommand::strict("optbind")
        .about("Resolve settings from defaults, a settings file, and the command line")
        .version(PACKAGE_VERSION)
        .option(
            registry,
            OptionDefinition::new(&["-n", "--node.name"], "NAME", "Name of this node"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["--path.settings"], "SETTINGS_FILE", "YAML settings file"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["-p", "--path.plugins"], "PATH", "Plugin directory (repeatable)")
                .appendable(),
        )?
        .option(
            registry,
            OptionDefinition::new(&["-w", "--pipeline.workers"], "COUNT", "Pipeline worker count"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["-b", "--pipeline.batch.size"], "SIZE", "Events per batch"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["-u", "--pipeline.batch.delay"], "DELAY_IN_MS", "Batch delay"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["--log.level"], "LEVEL", "Log level"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["--config.debug"], "", "Print the resolved configuration").flag(),
        )?
        .option(
            registry,
            OptionDefinition::new(&["-t", "--config.test_and_exit"], "", "Check settings and exit")
                .flag(),
        )?
        .option(
            registry,
            OptionDefinition::new(&["--api.enabled"], "", "Enable the monitoring API").flag(),
        )?
        .option(
            registry,
            OptionDefinition::new(&["--api.http.host"], "HOST", "Monitoring API bind address"),
        )?
        .option(
            registry,
            OptionDefinition::new(&["--api.http.port"], "PORT", "Monitoring API port"),
        )?
        .deprecated_option(
            registry,
            OptionDefinition::new(&["--http.enabled"], "", "Enable the monitoring API").flag(),
            DeprecationOptions::redirect_to("api.enabled"),
        )?
        .deprecated_option(
            registry,
            OptionDefinition::new(&["--http.host"], "HOST", "Monitoring API bind address"),
            DeprecationOptions::redirect_to("api.http.host"),
        )?
        .deprecated_option(
            registry,
            OptionDefinition::new(&["--http.port"], "PORT", "Monitoring API port"),
            DeprecationOptions::redirect_to("api.http.port"),
        )?
        .deprecated_option(
            registry,
            OptionDefinition::new(&["--verbose"], "", "Verbose logging").flag(),
            DeprecationOptions::redirect_to("log.level")
                .with_new_value("info")
                .obsoleted_in("2.0.0"),
        )?
        .deprecated_option(
            registry,
            OptionDefinition::new(&["--debug"], "", "Debug logging").flag(),
            DeprecationOptions::redirect_to("log.level")
                .with_new_value("debug")
                .obsoleted_in("2.0.0"),
        )?
        .deprecated_option(
            registry,
            OptionDefinition::new(&["--quiet"], "", "Errors only").flag(),
            DeprecationOptions::redirect_to("log.level")
                .with_new_value("error")
                .obsoleted_in("2.0.0"),
        )?
        .settings_file_from(registry, "path.settings")
}
