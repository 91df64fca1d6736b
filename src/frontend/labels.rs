//! 汇编期标签表
//!
//! 标签名 -> 稠密 ID，ID 等于首次声明的顺序。只在汇编期间存在；
//! 运行时的 ID -> 偏移映射见 [`JumpTable`](crate::vm::JumpTable)。

use indexmap::IndexSet;

use crate::frontend::errors::AsmErrorKind;
use crate::vm::instructions::LabelId;

/// 标签数量上限（ID 为 u16）
pub const MAX_LABELS: usize = 1 << 16;

/// 标签表
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    names: IndexSet<String>,
}

impl LabelTable {
    /// 创建空标签表
    pub fn new() -> Self {
        Self::default()
    }

    /// 检查是否已达到上限
    pub fn is_full(&self) -> bool {
        self.names.len() >= MAX_LABELS
    }

    /// 声明标签，返回分配的 ID
    pub fn declare(
        &mut self,
        name: &str,
    ) -> Result<LabelId, AsmErrorKind> {
        if self.is_full() {
            return Err(AsmErrorKind::TooManyLabels);
        }
        let (index, inserted) = self.names.insert_full(name.to_string());
        if !inserted {
            return Err(AsmErrorKind::DuplicateLabel(name.to_string()));
        }
        // is_full 检查保证 index < 65536
        Ok(LabelId(index as u16))
    }

    /// 查找标签 ID
    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<LabelId> {
        self.names.get_index_of(name).map(|index| LabelId(index as u16))
    }

    /// 已声明的标签数量
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// 检查是否为空
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
