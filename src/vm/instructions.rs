//! VM instructions
//!
//! 指令的内存表示及其定长二进制编码/解码。
//!
//! ```text
//! MovLiteral   [0x08, reg, value[8]]   10 字节
//! MovRegister  [0x09, dst, src]         3 字节
//! Push         [0x10, value[8]]         9 字节
//! Ld / St      [op, reg]                2 字节
//! Label / 跳转  [op, label[2]]           3 字节
//! 其余指令      [op]                     1 字节
//! ```

use std::fmt;

use crate::vm::errors::{VMError, VMResult};
use crate::vm::opcode::Opcode;

/// 寄存器编号（0-15）
///
/// 只能通过 [`Register::new`] 构造，越界编号无法表示。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(u8);

impl Register {
    /// 寄存器数量
    pub const COUNT: usize = 16;

    /// 创建寄存器，编号超出范围时返回 None
    pub fn new(index: u8) -> Option<Self> {
        if (index as usize) < Self::COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// 寄存器编号
    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Register {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// 标签 ID（汇编时按出现顺序分配）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u16);

impl LabelId {
    /// 获取标签 ID
    #[inline]
    pub fn id(self) -> u16 {
        self.0
    }

    /// 由 ID 生成可被汇编器接受的小写标签名
    ///
    /// 双射 26 进制：0 → `a`，25 → `z`，26 → `aa`。
    pub fn name(self) -> String {
        let mut n = self.0 as u32 + 1;
        let mut letters = Vec::new();
        while n > 0 {
            n -= 1;
            letters.push(b'a' + (n % 26) as u8);
            n /= 26;
        }
        letters.iter().rev().map(|&b| b as char).collect()
    }
}

impl fmt::Display for LabelId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// 指令
///
/// 每个变体只携带其操作码需要的操作数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 停机
    Halt,
    /// 输出 VM 状态
    Debug,
    /// dst = value
    MoveLiteral { dst: Register, value: i64 },
    /// dst = src
    MoveRegister { dst: Register, src: Register },
    /// 压栈立即数
    Push { value: i64 },
    Dup,
    Drop,
    Swap,
    /// 寄存器值压栈
    Load { reg: Register },
    /// 弹栈写入寄存器
    Store { reg: Register },
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// 跳转目标标记，执行时为空操作
    Label { id: LabelId },
    Call { target: LabelId },
    Jump { target: LabelId },
    JumpIfZero { target: LabelId },
    JumpIfNotZero { target: LabelId },
    JumpIfPositive { target: LabelId },
    JumpIfNegative { target: LabelId },
    Return,
    PutNumber,
    PutChar,
}

impl Instruction {
    /// 指令对应的操作码
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Halt => Opcode::Hlt,
            Instruction::Debug => Opcode::Dbg,
            Instruction::MoveLiteral { .. } => Opcode::MovLiteral,
            Instruction::MoveRegister { .. } => Opcode::MovRegister,
            Instruction::Push { .. } => Opcode::Push,
            Instruction::Dup => Opcode::Dup,
            Instruction::Drop => Opcode::Drop,
            Instruction::Swap => Opcode::Swap,
            Instruction::Load { .. } => Opcode::Ld,
            Instruction::Store { .. } => Opcode::St,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Mod => Opcode::Mod,
            Instruction::Label { .. } => Opcode::Label,
            Instruction::Call { .. } => Opcode::Call,
            Instruction::Jump { .. } => Opcode::Jmp,
            Instruction::JumpIfZero { .. } => Opcode::JmpZ,
            Instruction::JumpIfNotZero { .. } => Opcode::JmpNZ,
            Instruction::JumpIfPositive { .. } => Opcode::JmpP,
            Instruction::JumpIfNegative { .. } => Opcode::JmpN,
            Instruction::Return => Opcode::Ret,
            Instruction::PutNumber => Opcode::PutN,
            Instruction::PutChar => Opcode::PutC,
        }
    }

    /// 编码后的字节长度
    #[inline]
    pub fn size(&self) -> usize {
        self.opcode().size()
    }

    /// 追加编码到缓冲区
    pub fn encode_into(
        &self,
        out: &mut Vec<u8>,
    ) {
        out.push(self.opcode().as_u8());
        match *self {
            Instruction::MoveLiteral { dst, value } => {
                out.push(dst.index());
                out.extend_from_slice(&value.to_le_bytes());
            }
            Instruction::MoveRegister { dst, src } => {
                out.push(dst.index());
                out.push(src.index());
            }
            Instruction::Push { value } => out.extend_from_slice(&value.to_le_bytes()),
            Instruction::Load { reg } | Instruction::Store { reg } => out.push(reg.index()),
            Instruction::Label { id: label }
            | Instruction::Call { target: label }
            | Instruction::Jump { target: label }
            | Instruction::JumpIfZero { target: label }
            | Instruction::JumpIfNotZero { target: label }
            | Instruction::JumpIfPositive { target: label }
            | Instruction::JumpIfNegative { target: label } => {
                out.extend_from_slice(&label.0.to_le_bytes())
            }
            Instruction::Halt
            | Instruction::Debug
            | Instruction::Dup
            | Instruction::Drop
            | Instruction::Swap
            | Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Mod
            | Instruction::Return
            | Instruction::PutNumber
            | Instruction::PutChar => {}
        }
    }

    /// 编码单条指令
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        self.encode_into(&mut out);
        out
    }

    /// 从 `offset` 处解码一条指令
    ///
    /// 未知操作码、操作数越过缓冲区末尾、寄存器编号越界均返回错误。
    pub fn decode_at(
        bytes: &[u8],
        offset: usize,
    ) -> VMResult<Instruction> {
        let header = *bytes
            .get(offset)
            .ok_or(VMError::TruncatedInstruction {
                opcode: 0,
                offset,
                needed: 1,
                available: 0,
            })?;
        let opcode =
            Opcode::try_from(header).map_err(|opcode| VMError::InvalidOpcode { opcode, offset })?;

        let size = opcode.size();
        let available = bytes.len() - offset;
        if available < size {
            return Err(VMError::TruncatedInstruction {
                opcode: header,
                offset,
                needed: size,
                available,
            });
        }
        let payload = &bytes[offset + 1..offset + size];

        let instr = match opcode {
            Opcode::Hlt => Instruction::Halt,
            Opcode::Dbg => Instruction::Debug,
            Opcode::MovLiteral => Instruction::MoveLiteral {
                dst: read_register(payload[0])?,
                value: read_i64(&payload[1..]),
            },
            Opcode::MovRegister => Instruction::MoveRegister {
                dst: read_register(payload[0])?,
                src: read_register(payload[1])?,
            },
            Opcode::Push => Instruction::Push {
                value: read_i64(payload),
            },
            Opcode::Dup => Instruction::Dup,
            Opcode::Drop => Instruction::Drop,
            Opcode::Swap => Instruction::Swap,
            Opcode::Ld => Instruction::Load {
                reg: read_register(payload[0])?,
            },
            Opcode::St => Instruction::Store {
                reg: read_register(payload[0])?,
            },
            Opcode::Add => Instruction::Add,
            Opcode::Sub => Instruction::Sub,
            Opcode::Mul => Instruction::Mul,
            Opcode::Div => Instruction::Div,
            Opcode::Mod => Instruction::Mod,
            Opcode::Label => Instruction::Label {
                id: read_label(payload),
            },
            Opcode::Call => Instruction::Call {
                target: read_label(payload),
            },
            Opcode::Jmp => Instruction::Jump {
                target: read_label(payload),
            },
            Opcode::JmpZ => Instruction::JumpIfZero {
                target: read_label(payload),
            },
            Opcode::JmpNZ => Instruction::JumpIfNotZero {
                target: read_label(payload),
            },
            Opcode::JmpP => Instruction::JumpIfPositive {
                target: read_label(payload),
            },
            Opcode::JmpN => Instruction::JumpIfNegative {
                target: read_label(payload),
            },
            Opcode::Ret => Instruction::Return,
            Opcode::PutN => Instruction::PutNumber,
            Opcode::PutC => Instruction::PutChar,
        };
        Ok(instr)
    }
}

impl fmt::Display for Instruction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Instruction::Halt => write!(f, "hlt"),
            Instruction::Debug => write!(f, "dbg"),
            Instruction::MoveLiteral { dst, value } => write!(f, "mov {} {}", dst, value),
            Instruction::MoveRegister { dst, src } => write!(f, "mov {} {}", dst, src),
            Instruction::Push { value } => write!(f, "push {}", value),
            Instruction::Dup => write!(f, "dup"),
            Instruction::Drop => write!(f, "drop"),
            Instruction::Swap => write!(f, "swap"),
            Instruction::Load { reg } => write!(f, "ld {}", reg),
            Instruction::Store { reg } => write!(f, "st {}", reg),
            Instruction::Add => write!(f, "add"),
            Instruction::Sub => write!(f, "sub"),
            Instruction::Mul => write!(f, "mul"),
            Instruction::Div => write!(f, "div"),
            Instruction::Mod => write!(f, "mod"),
            Instruction::Label { id } => write!(f, ":{}", id),
            Instruction::Call { target } => write!(f, "call {}", target),
            Instruction::Jump { target } => write!(f, "jmp {}", target),
            Instruction::JumpIfZero { target } => write!(f, "jmpz {}", target),
            Instruction::JumpIfNotZero { target } => write!(f, "jmpnz {}", target),
            Instruction::JumpIfPositive { target } => write!(f, "jmpp {}", target),
            Instruction::JumpIfNegative { target } => write!(f, "jmpn {}", target),
            Instruction::Return => write!(f, "ret"),
            Instruction::PutNumber => write!(f, "putn"),
            Instruction::PutChar => write!(f, "putc"),
        }
    }
}

/// 解码整个字节码缓冲区
///
/// 从偏移 0 开始逐条消费；格式没有长度前缀，出错后无法重新同步，
/// 因此遇到第一个错误即返回。
pub fn decode(bytes: &[u8]) -> VMResult<Vec<Instruction>> {
    let mut instructions = Vec::new();
    let mut offset = 0;
    while offset < bytes.len() {
        let instr = Instruction::decode_at(bytes, offset)?;
        offset += instr.size();
        instructions.push(instr);
    }
    Ok(instructions)
}

fn read_register(byte: u8) -> VMResult<Register> {
    Register::new(byte).ok_or(VMError::InvalidRegister(byte))
}

/// 读取小端 i64，调用方保证至少 8 字节
pub(crate) fn read_i64(bytes: &[u8]) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    i64::from_le_bytes(buf)
}

pub(crate) fn read_label(bytes: &[u8]) -> LabelId {
    LabelId(u16::from_le_bytes([bytes[0], bytes[1]]))
}
