//! VMError 单元测试

use crate::vm::errors::VMError;

#[cfg(test)]
mod display_tests {
    use super::*;

    #[test]
    fn test_invalid_opcode_display() {
        let err = VMError::InvalidOpcode {
            opcode: 0xFF,
            offset: 0x12,
        };
        assert_eq!(err.to_string(), "Invalid opcode: 0xff at offset 0x12");
    }

    #[test]
    fn test_truncated_display() {
        let err = VMError::TruncatedInstruction {
            opcode: 0x10,
            offset: 4,
            needed: 9,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Truncated instruction 0x10 at offset 0x4: needs 9 bytes, 3 available"
        );
    }

    #[test]
    fn test_runtime_error_display() {
        assert_eq!(VMError::StackUnderflow.to_string(), "Stack underflow");
        assert_eq!(VMError::StackOverflow.to_string(), "Stack overflow");
        assert_eq!(
            VMError::CallStackOverflow.to_string(),
            "Call stack overflow"
        );
        assert_eq!(VMError::DivisionByZero.to_string(), "Division by zero");
        assert_eq!(VMError::InvalidRegister(16).to_string(), "Invalid register: r16");
        assert_eq!(VMError::UndefinedLabel(7).to_string(), "Undefined label: 7");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err: VMError = io.into();
        assert!(matches!(err, VMError::Io(_)));
        assert!(err.to_string().starts_with("Output error:"));
    }
}
