//! 定长栈
//!
//! 操作数栈与调用栈共用同一实现，只在溢出/下溢时报告不同的错误。

use crate::vm::errors::{VMError, VMResult};

/// 栈的用途，决定越界时的错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackKind {
    /// 操作数栈
    Operand,
    /// 调用栈（保存返回地址）
    Call,
}

/// 固定容量的 LIFO 栈
#[derive(Debug, Clone)]
pub struct BoundedStack<T> {
    items: Vec<T>,
    capacity: usize,
    kind: StackKind,
}

impl<T: Copy> BoundedStack<T> {
    /// 创建指定容量的空栈
    pub fn new(
        kind: StackKind,
        capacity: usize,
    ) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            kind,
        }
    }

    /// 压栈，已满时返回溢出错误
    pub fn push(
        &mut self,
        value: T,
    ) -> VMResult<()> {
        if self.items.len() >= self.capacity {
            return Err(match self.kind {
                StackKind::Operand => VMError::StackOverflow,
                StackKind::Call => VMError::CallStackOverflow,
            });
        }
        self.items.push(value);
        Ok(())
    }

    /// 弹栈，为空时返回下溢错误
    pub fn pop(&mut self) -> VMResult<T> {
        self.items.pop().ok_or(match self.kind {
            StackKind::Operand => VMError::StackUnderflow,
            StackKind::Call => VMError::CallStackUnderflow,
        })
    }

    /// 当前深度
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// 容量
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 栈内容（栈底在前）
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// 清空
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
