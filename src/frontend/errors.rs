//! 汇编期错误
//!
//! 每个错误都带有出错的源码行号（从 1 开始）。汇编在遇到第一个错误时立即停止。

use thiserror::Error;

/// 汇编结果
pub type AsmResult<T> = Result<T, AsmError>;

/// 带行号的汇编错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("error on line {line}: {kind}")]
pub struct AsmError {
    /// 源码行号（从 1 开始）
    pub line: usize,
    /// 错误原因
    pub kind: AsmErrorKind,
}

impl AsmError {
    pub fn new(
        line: usize,
        kind: AsmErrorKind,
    ) -> Self {
        Self { line, kind }
    }
}

/// 汇编错误原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmErrorKind {
    #[error("too many labels (at most 65536)")]
    TooManyLabels,

    #[error("label must have a name")]
    EmptyLabelName,

    #[error("label `{0}` must be a valid identifier ([a-z]+)")]
    InvalidLabelName(String),

    #[error("label `{0}` already defined")]
    DuplicateLabel(String),

    #[error("unknown instruction `{0}`")]
    UnknownInstruction(String),

    #[error("`{mnemonic}` takes {expected} argument(s), found {found}")]
    ArgumentCount {
        mnemonic: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("`{mnemonic}` expects a register (r0-r15), found `{found}`")]
    ExpectedRegister {
        mnemonic: &'static str,
        found: String,
    },

    #[error("`{mnemonic}` expects an integer literal, found `{found}`")]
    ExpectedLiteral {
        mnemonic: &'static str,
        found: String,
    },

    #[error("`mov` source must be a register or an integer literal, found `{0}`")]
    ExpectedRegisterOrLiteral(String),

    #[error("`{mnemonic}` target `{name}` is not a declared label")]
    UndefinedLabel {
        mnemonic: &'static str,
        name: String,
    },
}
