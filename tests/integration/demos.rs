//! Sample programs under demos/

use std::fs;
use std::path::PathBuf;

use stop::build;
use stop::vm::{VMStatus, VM};

fn demo_output(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join(name);
    let source = fs::read_to_string(&path).unwrap();
    let program = build(&source).unwrap();

    let mut vm = VM::new();
    let mut out = Vec::new();
    assert_eq!(vm.run(&program, &mut out).unwrap(), VMStatus::Halted);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_hello() {
    assert_eq!(demo_output("hello.stop"), "Hi!\n");
}

#[test]
fn test_countdown() {
    assert_eq!(demo_output("countdown.stop"), "3\n2\n1\n");
}

#[test]
fn test_factorial() {
    assert_eq!(demo_output("factorial.stop"), "120\n");
}

#[test]
fn test_square() {
    assert_eq!(demo_output("square.stop"), "49\n");
}
