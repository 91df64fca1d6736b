//! File helpers: build_file, build_file_to, run_file, explain_file

use std::fs;

use stop::vm::{VMConfig, VMStatus};
use stop::{build_file, build_file_to, bytecode_path, explain_file, run_file};
use tempfile::tempdir;

#[test]
fn test_bytecode_path_appends_extension() {
    let path = bytecode_path(std::path::Path::new("dir/prog.stop"));
    assert_eq!(path, std::path::Path::new("dir/prog.stop.bc"));
}

#[test]
fn test_build_file_writes_bc() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("add.stop");
    fs::write(&source, "push 5\npush 3\nadd\nputn\n").unwrap();

    let output = build_file(&source).unwrap();
    assert_eq!(output, dir.path().join("add.stop.bc"));

    let bytes = fs::read(&output).unwrap();
    assert_eq!(bytes.len(), 20);
    assert_eq!(bytes[0], 0x10);
    assert_eq!(&bytes[18..], &[0x30, 0xB0]);
}

#[test]
fn test_build_file_to_explicit_output() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("prog.stop");
    let output = dir.path().join("out.bin");
    fs::write(&source, "hlt\n").unwrap();

    build_file_to(&source, &output).unwrap();
    assert_eq!(fs::read(&output).unwrap(), vec![0x00]);
    assert!(!dir.path().join("prog.stop.bc").exists());
}

#[test]
fn test_build_file_reports_assembly_error() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("bad.stop");
    fs::write(&source, "push\n").unwrap();

    let err = build_file(&source).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Failed to assemble"), "{}", message);
    assert!(message.contains("line 1"), "{}", message);
    assert!(!dir.path().join("bad.stop.bc").exists());
}

#[test]
fn test_build_missing_source() {
    let dir = tempdir().unwrap();
    let err = build_file(&dir.path().join("missing.stop")).unwrap_err();
    assert!(err.to_string().contains("Failed to read source"));
}

#[test]
fn test_run_file_status() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("halt.stop");
    fs::write(&source, "push 1\ndrop\nhlt\n").unwrap();
    let output = build_file(&source).unwrap();

    let status = run_file(&output, &VMConfig::default()).unwrap();
    assert_eq!(status, VMStatus::Halted);
}

#[test]
fn test_run_file_runtime_error() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("underflow.stop");
    fs::write(&source, "drop\n").unwrap();
    let output = build_file(&source).unwrap();

    let err = run_file(&output, &VMConfig::default()).unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Stack underflow"), "{}", message);
    assert!(message.contains("offset 0x0"), "{}", message);
}

#[test]
fn test_explain_file_accepts_garbage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("junk.bc");
    fs::write(&path, [0xFF, 0xEE, 0x00]).unwrap();

    explain_file(&path, false).unwrap();
    explain_file(&path, true).unwrap();
}
