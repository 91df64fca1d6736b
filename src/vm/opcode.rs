//! 字节码操作码定义
//!
//! 每条指令由一个字节的操作码开头，总长度固定（含操作码本身）。
//! 多字节操作数统一使用小端序。
//!
//! 指令编码空间规划：
//! - 0x00-0x0F：停机、调试与寄存器移动
//! - 0x10-0x1F：栈操作
//! - 0x20-0x2F：寄存器与栈之间的加载/存储
//! - 0x30-0x3F：整数运算
//! - 0xA0-0xAF：标签、跳转与调用
//! - 0xB0-0xBF：输出

use std::fmt;

/// 字节码操作码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    // =====================
    // 基础控制 (0x00-0x0F)
    // =====================
    /// 停机
    Hlt = 0x00,

    /// 输出 VM 状态
    Dbg = 0x01,

    /// 加载立即数到寄存器
    /// 操作数：reg (u8), value (i64)
    MovLiteral = 0x08,

    /// 寄存器移动
    /// 操作数：dst (u8), src (u8)
    MovRegister = 0x09,

    // =====================
    // 栈操作 (0x10-0x1F)
    // =====================
    /// 压栈立即数
    /// 操作数：value (i64)
    Push = 0x10,

    /// 复制栈顶
    Dup = 0x11,

    /// 丢弃栈顶
    Drop = 0x12,

    /// 交换栈顶两个值
    Swap = 0x13,

    // =====================
    // 加载/存储 (0x20-0x2F)
    // =====================
    /// 寄存器值压栈
    /// 操作数：reg (u8)
    Ld = 0x20,

    /// 弹栈写入寄存器
    /// 操作数：reg (u8)
    St = 0x21,

    // =====================
    // 整数运算 (0x30-0x3F)
    // =====================
    /// 加法
    Add = 0x30,

    /// 减法
    Sub = 0x31,

    /// 乘法
    Mul = 0x32,

    /// 除法（向零截断）
    Div = 0x33,

    /// 取模
    Mod = 0x34,

    // =====================
    // 控制流 (0xA0-0xAF)
    // 操作数均为 label_id (u16)
    // =====================
    /// 标签定义（跳转目标）
    Label = 0xA0,

    /// 函数调用
    Call = 0xA1,

    /// 无条件跳转
    Jmp = 0xA2,

    /// 为零跳转
    JmpZ = 0xA3,

    /// 非零跳转
    JmpNZ = 0xA4,

    /// 为正跳转
    JmpP = 0xA5,

    /// 为负跳转
    JmpN = 0xA6,

    /// 返回
    Ret = 0xA7,

    // =====================
    // 输出 (0xB0-0xBF)
    // =====================
    /// 输出整数
    PutN = 0xB0,

    /// 输出字符
    PutC = 0xB1,
}

impl Opcode {
    /// 全部操作码，按编码顺序排列
    pub const ALL: [Opcode; 25] = [
        Opcode::Hlt,
        Opcode::Dbg,
        Opcode::MovLiteral,
        Opcode::MovRegister,
        Opcode::Push,
        Opcode::Dup,
        Opcode::Drop,
        Opcode::Swap,
        Opcode::Ld,
        Opcode::St,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Mod,
        Opcode::Label,
        Opcode::Call,
        Opcode::Jmp,
        Opcode::JmpZ,
        Opcode::JmpNZ,
        Opcode::JmpP,
        Opcode::JmpN,
        Opcode::Ret,
        Opcode::PutN,
        Opcode::PutC,
    ];

    /// 操作码字节
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 指令总长度（字节），包含操作码本身
    pub fn size(self) -> usize {
        match self {
            Opcode::MovLiteral => 10,
            Opcode::Push => 9,
            Opcode::MovRegister => 3,
            Opcode::Label
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::JmpZ
            | Opcode::JmpNZ
            | Opcode::JmpP
            | Opcode::JmpN => 3,
            Opcode::Ld | Opcode::St => 2,
            Opcode::Hlt
            | Opcode::Dbg
            | Opcode::Dup
            | Opcode::Drop
            | Opcode::Swap
            | Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Ret
            | Opcode::PutN
            | Opcode::PutC => 1,
        }
    }

    /// 反汇编时显示的名称
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Hlt => "HLT",
            Opcode::Dbg => "DBG",
            Opcode::MovLiteral | Opcode::MovRegister => "MOV",
            Opcode::Push => "PUSH",
            Opcode::Dup => "DUP",
            Opcode::Drop => "DROP",
            Opcode::Swap => "SWAP",
            Opcode::Ld => "LD",
            Opcode::St => "ST",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Label => "LABEL",
            Opcode::Call => "CALL",
            Opcode::Jmp => "JMP",
            Opcode::JmpZ => "JMPZ",
            Opcode::JmpNZ => "JMPNZ",
            Opcode::JmpP => "JMPP",
            Opcode::JmpN => "JMPN",
            Opcode::Ret => "RET",
            Opcode::PutN => "PUTN",
            Opcode::PutC => "PUTC",
        }
    }

    /// 检查是否携带标签操作数
    pub fn has_label_operand(self) -> bool {
        matches!(
            self,
            Opcode::Label
                | Opcode::Call
                | Opcode::Jmp
                | Opcode::JmpZ
                | Opcode::JmpNZ
                | Opcode::JmpP
                | Opcode::JmpN
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 从字节值创建 Opcode
///
/// 未知字节原样作为错误返回
impl TryFrom<u8> for Opcode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Opcode::Hlt),
            0x01 => Ok(Opcode::Dbg),
            0x08 => Ok(Opcode::MovLiteral),
            0x09 => Ok(Opcode::MovRegister),
            0x10 => Ok(Opcode::Push),
            0x11 => Ok(Opcode::Dup),
            0x12 => Ok(Opcode::Drop),
            0x13 => Ok(Opcode::Swap),
            0x20 => Ok(Opcode::Ld),
            0x21 => Ok(Opcode::St),
            0x30 => Ok(Opcode::Add),
            0x31 => Ok(Opcode::Sub),
            0x32 => Ok(Opcode::Mul),
            0x33 => Ok(Opcode::Div),
            0x34 => Ok(Opcode::Mod),
            0xA0 => Ok(Opcode::Label),
            0xA1 => Ok(Opcode::Call),
            0xA2 => Ok(Opcode::Jmp),
            0xA3 => Ok(Opcode::JmpZ),
            0xA4 => Ok(Opcode::JmpNZ),
            0xA5 => Ok(Opcode::JmpP),
            0xA6 => Ok(Opcode::JmpN),
            0xA7 => Ok(Opcode::Ret),
            0xB0 => Ok(Opcode::PutN),
            0xB1 => Ok(Opcode::PutC),
            other => Err(other),
        }
    }
}
