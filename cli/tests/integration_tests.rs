use std::fs;
use std::path::PathBuf;
use std::process::Output;

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("optbind_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the binary inside `dir` so the default settings file path resolves
/// relative to it.
fn run_in(dir: &TempDir, args: &[&str]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_optbind"))
        .current_dir(dir.path())
        .args(args)
        .output()
        .expect("failed to run optbind")
}

fn resolved(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "optbind failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// Defaults and command-line values
// ---------------------------------------------------------------------------

#[test]
fn defaults_are_reported_without_arguments() {
    let dir = TempDir::new("defaults");
    let json = resolved(&run_in(&dir, &[]));
    assert_eq!(json["settings"]["pipeline.workers"], 1);
    assert_eq!(json["settings"]["log.level"], "info");
    assert_eq!(json["sources"]["pipeline.workers"], "Default");
    assert!(json.get("settings_file").is_none());
}

#[test]
fn command_line_values_are_validated_and_stored() {
    let dir = TempDir::new("cli_values");
    let json = resolved(&run_in(
        &dir,
        &["-w", "4", "--log.level", "debug", "-p", "/opt/a", "-p", "/opt/b", "--api.enabled", "false"],
    ));
    assert_eq!(json["settings"]["pipeline.workers"], 4);
    assert_eq!(json["settings"]["log.level"], "debug");
    assert_eq!(json["settings"]["path.plugins"], serde_json::json!(["/opt/a", "/opt/b"]));
    assert_eq!(json["settings"]["api.enabled"], false);
    assert_eq!(json["sources"]["log.level"], "CommandLine");
}

#[test]
fn option_value_may_start_with_hyphen() {
    let dir = TempDir::new("hyphen_value");
    let json = resolved(&run_in(&dir, &["-n", "-edge", "-w", "2"]));
    assert_eq!(json["settings"]["node.name"], "-edge");
    assert_eq!(json["settings"]["pipeline.workers"], 2);
}

#[test]
fn environment_variables_are_ignored() {
    let dir = TempDir::new("env_ignored");
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_optbind"))
        .current_dir(dir.path())
        .env("pipeline.workers", "7")
        .env("PIPELINE_WORKERS", "7")
        .env("LOG_LEVEL", "debug")
        .output()
        .expect("failed to run optbind");
    let json = resolved(&output);
    assert_eq!(json["settings"]["pipeline.workers"], 1);
    assert_eq!(json["settings"]["log.level"], "info");
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

#[test]
fn stray_argument_is_unknown_command() {
    let dir = TempDir::new("stray");
    let output = run_in(&dir, &["-w", "2", "bogus"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown command 'bogus'"), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"));
}

#[test]
fn rejected_value_exits_non_zero() {
    let dir = TempDir::new("rejected");
    let output = run_in(&dir, &["--log.level", "loud"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("log.level"), "stderr: {stderr}");
}

#[test]
fn unknown_switch_exits_non_zero() {
    let dir = TempDir::new("unknown_switch");
    let output = run_in(&dir, &["--no.such.flag"]);
    assert!(!output.status.success());
}

#[test]
fn test_and_exit_flag() {
    let dir = TempDir::new("test_and_exit");
    let output = run_in(&dir, &["-t"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Configuration OK");
}

// ---------------------------------------------------------------------------
// Deprecated options
// ---------------------------------------------------------------------------

#[test]
fn deprecated_option_redirects_and_warns_on_stderr() {
    let dir = TempDir::new("deprecated");
    let output = run_in(&dir, &["--http.port", "9700", "--debug"]);
    let json = resolved(&output);
    assert_eq!(json["settings"]["api.http.port"], 9700);
    assert_eq!(json["settings"]["log.level"], "debug");

    let stderr = String::from_utf8_lossy(&output.stderr);
    let warnings: Vec<&str> = stderr
        .lines()
        .filter(|l| l.starts_with("DEPRECATION WARNING"))
        .collect();
    assert_eq!(warnings.len(), 2, "stderr: {stderr}");
    assert!(warnings[0].contains("--http.port"));
    assert!(warnings[0].contains("\"--api.http.port=9700\""));
    assert!(warnings[1].contains("will be removed in version 2.0.0"));
    assert!(warnings[1].contains("\"--log.level=debug\""));
}

#[test]
fn deprecation_warning_printed_even_when_command_fails() {
    let dir = TempDir::new("deprecated_fail");
    let output = run_in(&dir, &["extra", "--verbose"]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--verbose"), "stderr: {stderr}");
    assert!(stderr.contains("Unknown command 'extra'"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// Settings file precedence
// ---------------------------------------------------------------------------

#[test]
fn default_settings_file_is_loaded_when_present() {
    let dir = TempDir::new("default_file");
    fs::create_dir_all(dir.join("config")).unwrap();
    fs::write(
        dir.join("config/optbind.yml"),
        "pipeline:\n  workers: 3\n  batch.size: 500\n",
    )
    .unwrap();

    let json = resolved(&run_in(&dir, &["-b", "250"]));
    assert_eq!(json["settings_file"], "config/optbind.yml");
    assert_eq!(json["settings"]["pipeline.workers"], 3);
    assert_eq!(json["sources"]["pipeline.workers"], "SettingsFile");
    assert_eq!(json["settings"]["pipeline.batch.size"], 250);
    assert_eq!(json["sources"]["pipeline.batch.size"], "CommandLine");
}

#[test]
fn explicit_settings_file_overrides_default_location() {
    let dir = TempDir::new("explicit_file");
    let path = dir.join("custom.yml");
    fs::write(&path, "node.name: edge-1\n").unwrap();

    let json = resolved(&run_in(&dir, &["--path.settings", path.to_str().unwrap()]));
    assert_eq!(json["settings"]["node.name"], "edge-1");
}

#[test]
fn settings_file_with_unknown_key_fails() {
    let dir = TempDir::new("bad_file");
    let path = dir.join("bad.yml");
    fs::write(&path, "pipeline.wrokers: 3\n").unwrap();

    let output = run_in(&dir, &["--path.settings", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown setting: pipeline.wrokers"), "stderr: {stderr}");
}
