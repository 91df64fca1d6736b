//! Bytecode encoder
//!
//! 把指令序列串接为连续的字节缓冲区。这个缓冲区是汇编器与执行器之间
//! 唯一的交换格式：没有文件头、版本号或校验和，也没有填充与对齐。

use tracing::debug;

use crate::vm::instructions::Instruction;

/// 编码整个指令序列
pub fn encode(instructions: &[Instruction]) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(instructions));
    for instr in instructions {
        instr.encode_into(&mut out);
    }
    debug!(
        instructions = instructions.len(),
        bytes = out.len(),
        "encoded"
    );
    out
}

/// 编码后的总字节数
pub fn encoded_len(instructions: &[Instruction]) -> usize {
    instructions.iter().map(Instruction::size).sum()
}

/// 每条指令在编码结果中的起始偏移
pub fn offsets(instructions: &[Instruction]) -> Vec<usize> {
    instructions
        .iter()
        .scan(0usize, |offset, instr| {
            let start = *offset;
            *offset += instr.size();
            Some(start)
        })
        .collect()
}
