//! End-to-end pipeline: source -> instructions -> bytes -> VM

use stop::frontend::{AsmErrorKind, Assembler};
use stop::vm::{Instruction, LabelId, VMError, VMStatus, VM};
use stop::{assemble, build, decode, disassemble, encode};

fn run_to_string(source: &str) -> (Result<VMStatus, VMError>, String) {
    let program = build(source).unwrap();
    let mut vm = VM::new();
    let mut out = Vec::new();
    let result = vm.run(&program, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_build_matches_assemble_then_encode() {
    let source = "push 5\npush 3\nadd\nputn\nhlt\n";
    let bytes = build(source).unwrap();
    assert_eq!(bytes, encode(&assemble(source).unwrap()));
    assert_eq!(bytes.len(), 21);
}

#[test]
fn test_add_example_prints_eight() {
    let (result, out) = run_to_string("push 5\npush 3\nadd\nputn\nhlt\n");
    assert_eq!(result.unwrap(), VMStatus::Halted);
    assert_eq!(out, "8\n");
}

#[test]
fn test_decode_inverts_encode() {
    let source = ":a\nmov r1 -9\nmov r2 r1\nld r2\njmpn a\ncall a\nret\n";
    let program = assemble(source).unwrap();
    assert_eq!(decode(&encode(&program)).unwrap(), program);
}

#[test]
fn test_forward_jump_skips_code() {
    let (result, out) = run_to_string("jmp skip\npush 1\nputn\n:skip\npush 2\nputn\n");
    assert_eq!(result.unwrap(), VMStatus::Finished);
    assert_eq!(out, "2\n");
}

#[test]
fn test_runtime_error_keeps_vm_inspectable() {
    let program = build("push 1\npush 2\ndiv\nputn\ndrop\n").unwrap();
    let mut vm = VM::new();
    let mut out = Vec::new();
    let err = vm.run(&program, &mut out).unwrap_err();
    assert!(matches!(err, VMError::StackUnderflow));
    assert_eq!(vm.status(), VMStatus::Error);
    // 2 / 1 = 2 was printed before the failing drop
    assert_eq!(out, b"2\n");
    assert_eq!(vm.fault_ip(), Some(20));
}

#[test]
fn test_assembler_error_surface() {
    let err = build("push 1\njmp missing\n").unwrap_err();
    assert!(err.to_string().contains("line 2"));

    let mut assembler = Assembler::new(":x\n:x\n");
    let err = assembler.collect_labels().unwrap_err();
    assert_eq!(err.kind, AsmErrorKind::DuplicateLabel("x".to_string()));
}

#[test]
fn test_disassembly_of_built_program() {
    let program = build(":top\npush 1\njmpz top\n").unwrap();
    let listing = disassemble(&program);
    let offsets: Vec<usize> = listing.lines.iter().map(|line| line.offset).collect();
    assert_eq!(offsets, vec![0, 3, 12]);
    assert_eq!(listing.invalid_count(), 0);
    assert_eq!(
        decode(&program).unwrap()[2],
        Instruction::JumpIfZero { target: LabelId(0) }
    );
}
