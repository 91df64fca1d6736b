//! Assembler frontend
//!
//! This module contains the line lexer, the label table and the two-pass
//! assembler. The frontend transforms assembly source into an instruction
//! sequence; encoding to bytes happens in [`middle`](crate::middle).

pub mod assembler;
mod errors;
pub mod labels;
pub mod lexer;

pub use assembler::{assemble, Assembler};
pub use errors::{AsmError, AsmErrorKind, AsmResult};
pub use labels::{LabelTable, MAX_LABELS};

#[cfg(test)]
mod tests;
