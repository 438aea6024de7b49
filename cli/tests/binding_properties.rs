use optbind_cli::{CliError, DeprecationOptions, OptionDefinition, SettingsCommand};
use optbind_core::{DeprecationLog, Setting, SettingValue, SettingsError, SettingsRegistry};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn registry() -> SettingsRegistry {
    let mut registry = SettingsRegistry::new();
    registry.register(Setting::boolean("a", true)).unwrap();
    registry.register(Setting::boolean("b", true)).unwrap();
    registry.register(Setting::string("host", "localhost")).unwrap();
    registry.register(Setting::string("node.name", "local")).unwrap();
    registry.register(Setting::integer("count", 0)).unwrap();
    registry
}

fn flag_a() -> OptionDefinition {
    OptionDefinition::new(&["--a"], "", "Deprecated switch").flag()
}

// ---------------------------------------------------------------------------
// Registry round trip
// ---------------------------------------------------------------------------

#[test]
fn accepted_values_round_trip() {
    let mut registry = registry();
    let cases = [
        ("a", SettingValue::Bool(false)),
        ("host", SettingValue::from("example.org")),
        ("count", SettingValue::Integer(-3)),
    ];
    for (name, value) in cases {
        registry.set_value(name, value.clone()).unwrap();
        assert_eq!(registry.get_value(name).unwrap(), &value);
    }
}

// ---------------------------------------------------------------------------
// Binding
// ---------------------------------------------------------------------------

#[test]
fn binding_to_unregistered_setting_fails_before_any_write() {
    let registry = registry();
    let before = registry.to_map();

    let err = SettingsCommand::strict("run")
        .option(&registry, OptionDefinition::new(&["--missing"], "X", ""))
        .unwrap_err();
    assert!(matches!(err, CliError::Settings(SettingsError::UnknownSetting(ref s)) if s == "missing"));
    assert!(!err.is_usage_error());
    assert_eq!(registry.to_map(), before);
}

#[test]
fn append_to_scalar_setting_fails_unchanged() {
    let mut registry = registry();
    let log = DeprecationLog::new();
    let cmd = SettingsCommand::strict("run")
        .option(&registry, OptionDefinition::new(&["--host"], "HOST", "").appendable())
        .unwrap();

    let err = cmd.parse(&mut registry, &log, ["--host", "x"]).unwrap_err();
    assert!(matches!(err, CliError::Settings(SettingsError::NotAppendable(ref s)) if s == "host"));
    assert_eq!(registry.get_value("host").unwrap(), &SettingValue::from("localhost"));
}

// ---------------------------------------------------------------------------
// Deprecation redirects
// ---------------------------------------------------------------------------

#[test]
fn passthrough_writes_original_and_leaves_new_flag_untouched() {
    let mut registry = registry();
    let log = DeprecationLog::new();
    let cmd = SettingsCommand::strict("run")
        .deprecated_option(
            &registry,
            flag_a(),
            DeprecationOptions {
                new_flag: Some("b".into()),
                passthrough: true,
                ..DeprecationOptions::default()
            },
        )
        .unwrap();

    cmd.parse(&mut registry, &log, ["--a", "false"]).unwrap();
    assert_eq!(registry.get_value("a").unwrap(), &SettingValue::Bool(false));
    assert!(!registry.is_set("b").unwrap());
}

#[test]
fn redirect_without_new_value_forwards_user_value() {
    let mut registry = registry();
    let log = DeprecationLog::new();
    let cmd = SettingsCommand::strict("run")
        .deprecated_option(&registry, flag_a(), DeprecationOptions::redirect_to("b"))
        .unwrap();

    cmd.parse(&mut registry, &log, ["--a=false"]).unwrap();
    assert_eq!(registry.get_value("b").unwrap(), &SettingValue::Bool(false));
    assert!(!registry.is_set("a").unwrap());

    let messages = log.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("--a"));
    assert!(messages[0].ends_with("please use \"--b=false\" instead."));
}

#[test]
fn explicit_false_new_value_is_not_treated_as_absent() {
    let mut registry = registry();
    let log = DeprecationLog::new();
    let cmd = SettingsCommand::strict("run")
        .deprecated_option(
            &registry,
            flag_a(),
            DeprecationOptions::redirect_to("b").with_new_value(false),
        )
        .unwrap();

    cmd.parse(&mut registry, &log, ["--a", "true"]).unwrap();
    assert_eq!(registry.get_value("b").unwrap(), &SettingValue::Bool(false));
}

#[test]
fn deprecated_option_without_target_is_a_definition_error() {
    let registry = registry();
    let err = SettingsCommand::strict("run")
        .deprecated_option(&registry, flag_a(), DeprecationOptions::default())
        .unwrap_err();
    assert!(matches!(err, CliError::MissingRedirectTarget(_)));
    assert!(!err.is_usage_error());
}

#[test]
fn repeated_deprecated_option_warns_per_occurrence() {
    let mut registry = registry();
    let log = DeprecationLog::new();
    let cmd = SettingsCommand::strict("run")
        .deprecated_option(
            &registry,
            OptionDefinition::new(&["--name"], "NAME", ""),
            DeprecationOptions::redirect_to("node.name").obsoleted_in("3.0"),
        )
        .unwrap();

    cmd.parse(&mut registry, &log, ["--name", "one", "--name", "two"]).unwrap();
    assert_eq!(registry.get_value("node.name").unwrap(), &SettingValue::from("two"));
    let messages = log.drain();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m.contains("will be removed in version 3.0")));
}

// ---------------------------------------------------------------------------
// Strict commands
// ---------------------------------------------------------------------------

#[test]
fn strict_command_rejects_first_stray_token() {
    let mut registry = registry();
    let log = DeprecationLog::new();
    let cmd = SettingsCommand::strict("run")
        .option(&registry, OptionDefinition::new(&["--node.name"], "NAME", ""))
        .unwrap();

    let err = cmd
        .parse(&mut registry, &log, ["--node.name", "n1", "first", "second"])
        .unwrap_err();
    assert!(matches!(err, CliError::UnknownCommand(ref t) if t == "first"));

    let outcome = cmd.parse(&mut registry, &log, ["--node.name", "n1"]).unwrap();
    assert!(outcome.remaining.is_empty());
    assert_eq!(registry.get_value("node.name").unwrap(), &SettingValue::from("n1"));
}
