//! VM errors

use thiserror::Error;

/// VM result
pub type VMResult<T> = Result<T, VMError>;

/// VM errors
///
/// 解码与执行共用同一错误类型：任何一条都会让当前 VM 实例停机，
/// 但不会终止进程。
#[derive(Debug, Error)]
pub enum VMError {
    #[error("Invalid opcode: {opcode:#04x} at offset {offset:#x}")]
    InvalidOpcode { opcode: u8, offset: usize },

    #[error("Truncated instruction {opcode:#04x} at offset {offset:#x}: needs {needed} bytes, {available} available")]
    TruncatedInstruction {
        opcode: u8,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Invalid register: r{0}")]
    InvalidRegister(u8),

    #[error("Undefined label: {0}")]
    UndefinedLabel(u16),

    #[error("Stack underflow")]
    StackUnderflow,

    #[error("Stack overflow")]
    StackOverflow,

    #[error("Call stack underflow")]
    CallStackUnderflow,

    #[error("Call stack overflow")]
    CallStackOverflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
