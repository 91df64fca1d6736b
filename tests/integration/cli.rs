//! The `stop` binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn stop(
    args: &[&str],
    dir: &Path,
) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stop"))
        .args(args)
        .current_dir(dir)
        .env_remove("STOP_DEV")
        .env("XDG_CONFIG_HOME", dir)
        .output()
        .expect("Failed to spawn stop")
}

#[test]
fn test_build_then_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("add.stop"), "push 5\npush 3\nadd\nputn\nhlt\n").unwrap();

    let output = stop(&["build", "add.stop"], dir.path());
    assert!(output.status.success());
    assert!(dir.path().join("add.stop.bc").exists());

    let output = stop(&["run", "add.stop.bc"], dir.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "8\n");
}

#[test]
fn test_run_dev_mode() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("hi.stop"), "push 104\nputc\npush 105\nputc\n").unwrap();

    let output = stop(&["run", "--dev", "hi.stop"], dir.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "hi");
    assert!(dir.path().join("hi.stop.bc").exists());
}

#[test]
fn test_dev_mode_from_env() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one.stop"), "push 1\nputn\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_stop"))
        .args(["run", "one.stop"])
        .current_dir(dir.path())
        .env("STOP_DEV", "1")
        .env("XDG_CONFIG_HOME", dir.path())
        .output()
        .expect("Failed to spawn stop");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "1\n");
}

#[test]
fn test_explain_dev_mode() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("p.stop"), "push 5\nputn\n").unwrap();

    let output = stop(&["explain", "--dev", "p.stop"], dir.path());
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "[   0] 10 PUSH     (literal 5)\n[   9] b0 PUTN\n"
    );
}

#[test]
fn test_explain_json() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("p.bc"), [0x00]).unwrap();

    let output = stop(&["explain", "--json", "p.bc"], dir.path());
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["lines"][0]["name"], "HLT");
}

#[test]
fn test_assembly_error_exits_one() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.stop"), "push 1\nfrobnicate\n").unwrap();

    let output = stop(&["build", "bad.stop"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error on line 2"), "{}", stderr);
}

#[test]
fn test_runtime_error_exits_one() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("zero.stop"), "push 0\npush 1\ndiv\n").unwrap();

    let output = stop(&["run", "--dev", "zero.stop"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Division by zero"), "{}", stderr);
}

#[test]
fn test_config_limits_stack() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cfg.toml"), "[vm]\nstack_size = 1\n").unwrap();
    fs::write(dir.path().join("two.stop"), "push 1\npush 2\n").unwrap();

    let output = stop(
        &["--config", "cfg.toml", "run", "--dev", "two.stop"],
        dir.path(),
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Stack overflow"));
}

#[test]
fn test_trace_execution_logs_instructions() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("cfg.toml"), "[vm]\ntrace_execution = true\n").unwrap();
    fs::write(dir.path().join("seven.stop"), "push 7\nputn\n").unwrap();

    let output = stop(
        &["--config", "cfg.toml", "run", "--dev", "seven.stop"],
        dir.path(),
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "7\n");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("TRACE"), "{}", stderr);
    assert!(stderr.contains("push 7"), "{}", stderr);
}

#[test]
fn test_version() {
    let dir = tempdir().unwrap();
    let output = stop(&["version"], dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
