//! 运行时跳转表
//!
//! 执行前对整个程序做一次线性扫描，记录每个 Label 指令之后的字节偏移。

use std::collections::HashMap;

use crate::vm::errors::{VMError, VMResult};
use crate::vm::instructions::LabelId;
use crate::vm::opcode::Opcode;

/// 标签 ID -> 字节偏移
#[derive(Debug, Clone, Default)]
pub struct JumpTable {
    offsets: HashMap<u16, usize>,
}

impl JumpTable {
    /// 扫描程序并建立跳转表
    ///
    /// 只依据操作码长度表前进，不解码操作数；
    /// 未知操作码或越过末尾的指令说明字节码已损坏。
    /// 同一 ID 出现多次时以最后一次为准。
    pub fn scan(program: &[u8]) -> VMResult<Self> {
        let mut offsets = HashMap::new();
        let mut offset = 0;

        while offset < program.len() {
            let header = program[offset];
            let opcode = Opcode::try_from(header)
                .map_err(|opcode| VMError::InvalidOpcode { opcode, offset })?;
            let size = opcode.size();
            let available = program.len() - offset;
            if available < size {
                return Err(VMError::TruncatedInstruction {
                    opcode: header,
                    offset,
                    needed: size,
                    available,
                });
            }

            if opcode == Opcode::Label {
                let id = u16::from_le_bytes([program[offset + 1], program[offset + 2]]);
                offsets.insert(id, offset + size);
            }
            offset += size;
        }

        Ok(Self { offsets })
    }

    /// 查找标签对应的偏移
    pub fn resolve(
        &self,
        label: LabelId,
    ) -> VMResult<usize> {
        self.offsets
            .get(&label.0)
            .copied()
            .ok_or(VMError::UndefinedLabel(label.0))
    }

    /// 标签数量
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// 检查是否没有任何标签
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
