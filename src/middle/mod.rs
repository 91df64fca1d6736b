//! Code generation
//!
//! This module handles the transformation from the assembled instruction
//! sequence to the bytecode buffer consumed by the VM.

pub mod bytecode;

pub use bytecode::{encode, encoded_len, offsets};

#[cfg(test)]
mod tests;
