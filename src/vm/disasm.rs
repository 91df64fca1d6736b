//! 反汇编器
//!
//! 与跳转表扫描走同样的定长解码路径，但不执行，而是把每条指令渲染为
//! `[偏移] 操作码 名称 操作数` 的文本行，供调试检查字节码使用。
//!
//! 与执行器不同，遇到未知操作码或被截断的指令时不会中止：输出 `INVALID` 行并
//! 前进一个字节，尽力继续往后解读。越界的寄存器字节照常显示编号。

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::vm::instructions::{read_i64, read_label};
use crate::vm::opcode::Opcode;

/// 反汇编出的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisasmLine {
    /// 指令起始偏移
    pub offset: usize,
    /// 原始操作码字节
    pub opcode: u8,
    /// 显示名称
    pub name: &'static str,
    /// 可读的操作数描述
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operands: Option<String>,
}

impl DisasmLine {
    /// 检查是否为无法解码的字节
    pub fn is_invalid(&self) -> bool {
        self.name == INVALID
    }

    /// 按原始字节渲染，`payload` 长度恰好为 `opcode.size() - 1`
    ///
    /// 寄存器字节不做范围检查，越界编号原样显示。
    fn decoded(
        offset: usize,
        opcode: Opcode,
        payload: &[u8],
    ) -> Self {
        let operands = match opcode {
            Opcode::MovLiteral => Some(format!(
                "(literal {} -> register {})",
                read_i64(&payload[1..]),
                payload[0]
            )),
            Opcode::MovRegister => Some(format!(
                "(register {} -> register {})",
                payload[1], payload[0]
            )),
            Opcode::Push => Some(format!("(literal {})", read_i64(payload))),
            Opcode::Ld | Opcode::St => Some(format!("(register {})", payload[0])),
            op if op.has_label_operand() => {
                Some(format!("(label {})", read_label(payload).id()))
            }
            _ => None,
        };
        Self {
            offset,
            opcode: opcode.as_u8(),
            name: opcode.name(),
            operands,
        }
    }

    fn invalid(
        offset: usize,
        byte: u8,
    ) -> Self {
        Self {
            offset,
            opcode: byte,
            name: INVALID,
            operands: Some(format!("{:x}", byte)),
        }
    }
}

const INVALID: &str = "INVALID";

impl fmt::Display for DisasmLine {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.operands {
            Some(operands) => write!(
                f,
                "[{:4x}] {:2x} {:<8} {}",
                self.offset, self.opcode, self.name, operands
            ),
            None => write!(f, "[{:4x}] {:2x} {}", self.offset, self.opcode, self.name),
        }
    }
}

/// 整个程序的反汇编结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Disassembly {
    pub lines: Vec<DisasmLine>,
}

impl Disassembly {
    /// 无法解码的行数
    pub fn invalid_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_invalid()).count()
    }

    /// 渲染为 JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Disassembly {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// 反汇编字节码
///
/// 只有未知操作码或操作数越过末尾时才输出 `INVALID` 并前进一个字节，
/// 其余情况按操作码长度前进。
pub fn disassemble(bytes: &[u8]) -> Disassembly {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < bytes.len() {
        let header = bytes[offset];
        match Opcode::try_from(header) {
            Ok(opcode) if bytes.len() - offset >= opcode.size() => {
                let size = opcode.size();
                let payload = &bytes[offset + 1..offset + size];
                lines.push(DisasmLine::decoded(offset, opcode, payload));
                offset += size;
            }
            _ => {
                lines.push(DisasmLine::invalid(offset, header));
                offset += 1;
            }
        }
    }

    Disassembly { lines }
}

/// 反汇编并写出文本
pub fn explain<W: Write>(
    bytes: &[u8],
    out: &mut W,
) -> io::Result<()> {
    write!(out, "{}", disassemble(bytes))?;
    out.flush()
}
