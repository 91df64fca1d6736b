//! 按行切分汇编源码
//!
//! 汇编语言以行为单位：每行是空行、注释（`;` 开头）、标签声明（`:` 开头）
//! 或一条 `助记符 参数...` 形式的指令。这里只负责分类与切分，
//! 参数的含义由 [`assembler`](super::assembler) 决定。

use smallvec::SmallVec;

use crate::vm::instructions::Register;

/// 注释起始字符
pub const COMMENT_PREFIX: char = ';';

/// 标签声明起始字符
pub const LABEL_PREFIX: char = ':';

/// 一行源码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 行号（从 1 开始）
    pub number: usize,
    pub kind: LineKind<'a>,
}

/// 行的种类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// 空行
    Blank,
    /// 注释
    Comment,
    /// 标签声明，内容为 `:` 之后去掉空白的部分（可能为空）
    Label(&'a str),
    /// 指令
    Instruction {
        mnemonic: &'a str,
        args: SmallVec<[&'a str; 2]>,
    },
}

/// 切分整个源码
pub fn tokenize(source: &str) -> Vec<SourceLine<'_>> {
    source
        .split('\n')
        .enumerate()
        .map(|(idx, raw)| SourceLine {
            number: idx + 1,
            kind: classify(raw),
        })
        .collect()
}

/// 对单行分类
pub fn classify(raw: &str) -> LineKind<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with(COMMENT_PREFIX) {
        return LineKind::Comment;
    }
    if let Some(name) = line.strip_prefix(LABEL_PREFIX) {
        return LineKind::Label(name.trim());
    }

    let mut parts = line.split_whitespace();
    // 非空行至少有一个 token
    let mnemonic = parts.next().unwrap_or_default();
    LineKind::Instruction {
        mnemonic,
        args: parts.collect(),
    }
}

/// 检查是否是合法的标签名（`[a-z]+`）
pub fn is_label_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase())
}

/// 解析寄存器 token
///
/// 合法形式为 `r` 加一位数字（`r0`-`r9`），或 `r` 加两位数字且数值不超过 15（`r10`-`r15`）。
pub fn parse_register(token: &str) -> Option<Register> {
    let digits = token.strip_prefix('r')?;
    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index: u8 = digits.parse().ok()?;
    Register::new(index)
}

/// 解析十进制有符号 64 位整数
pub fn parse_literal(token: &str) -> Option<i64> {
    token.parse().ok()
}
