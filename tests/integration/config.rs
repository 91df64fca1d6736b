//! Configuration loading

use std::fs;

use stop::util::config::{load_config, parse_config, StopConfig};
use stop::util::logger::LogLevel;
use stop::vm::VMConfig;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = StopConfig::default();
    assert_eq!(config.vm.stack_size, 1024);
    assert_eq!(config.vm.call_stack_size, 64);
    assert!(!config.vm.trace_execution);
    assert_eq!(config.log.level, LogLevel::Warn);
}

#[test]
fn test_empty_document_uses_defaults() {
    assert_eq!(parse_config("").unwrap(), StopConfig::default());
}

#[test]
fn test_partial_sections() {
    let config = parse_config("[vm]\nstack_size = 16\n\n[log]\nlevel = \"debug\"\n").unwrap();
    assert_eq!(config.vm.stack_size, 16);
    assert_eq!(config.vm.call_stack_size, 64);
    assert_eq!(config.log.level, LogLevel::Debug);
}

#[test]
fn test_invalid_document() {
    let err = parse_config("[vm]\nstack_size = \"big\"\n").unwrap_err();
    assert!(err.to_string().starts_with("Config parse error"));
}

#[test]
fn test_load_explicit_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[vm]\ncall_stack_size = 8\ntrace_execution = true\n").unwrap();

    let config = load_config(Some(&path)).unwrap();
    let vm_config = VMConfig::from(&config.vm);
    assert_eq!(vm_config.call_stack_size, 8);
    assert_eq!(vm_config.stack_size, 1024);
    assert!(vm_config.trace_execution);
}

#[test]
fn test_load_missing_explicit_path() {
    let dir = tempdir().unwrap();
    let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
    assert!(err.to_string().starts_with("IO error"));
}

#[test]
fn test_log_level_from_str() {
    assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
    assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
    assert!("loud".parse::<LogLevel>().is_err());
}

#[test]
fn test_effective_log_level() {
    let mut config = StopConfig::default();
    assert_eq!(config.log_level(false), LogLevel::Warn);
    assert_eq!(config.log_level(true), LogLevel::Debug);

    config.log.level = LogLevel::Trace;
    assert_eq!(config.log_level(true), LogLevel::Trace);

    config.log.level = LogLevel::Error;
    config.vm.trace_execution = true;
    assert_eq!(config.log_level(false), LogLevel::Trace);
}
