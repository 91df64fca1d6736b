//! Virtual Machine and bytecode execution
//!
//! This module contains the instruction format, the bytecode interpreter
//! and the disassembler.

pub use disasm::{disassemble, explain, DisasmLine, Disassembly};
pub use errors::{VMError, VMResult};
pub use executor::{RegisterFile, VMConfig, VMStatus, CALL_STACK_SIZE, STACK_SIZE, VM};
pub use instructions::{decode, Instruction, LabelId, Register};
pub use jump_table::JumpTable;
pub use opcode::Opcode;

pub mod disasm;
mod errors;
mod executor;
pub mod instructions;
mod jump_table;
pub mod opcode;
mod stack;

#[cfg(test)]
mod tests;
