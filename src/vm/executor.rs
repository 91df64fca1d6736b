//! Virtual Machine executor
//!
//! 实现 STOP 字节码执行器：操作数栈 + 调用栈 + 16 个通用寄存器。
//! 执行前先扫描一遍程序建立跳转表，然后按 取指-解码-执行 循环运行，
//! 直到遇到 `hlt`、指令指针到达程序末尾或发生错误。

use std::io::Write;

use tracing::{debug, trace};

use crate::vm::errors::{VMError, VMResult};
use crate::vm::instructions::{Instruction, LabelId, Register};
use crate::vm::jump_table::JumpTable;
use crate::vm::stack::{BoundedStack, StackKind};

/// 操作数栈默认容量
pub const STACK_SIZE: usize = 1024;

/// 调用栈默认容量
pub const CALL_STACK_SIZE: usize = 64;

/// VM 配置
#[derive(Debug, Clone)]
pub struct VMConfig {
    /// 操作数栈容量
    pub stack_size: usize,
    /// 调用栈容量（最大调用深度）
    pub call_stack_size: usize,
    /// 是否逐条输出执行跟踪
    pub trace_execution: bool,
}

impl Default for VMConfig {
    fn default() -> Self {
        Self {
            stack_size: STACK_SIZE,
            call_stack_size: CALL_STACK_SIZE,
            trace_execution: false,
        }
    }
}

/// 寄存器文件，初始全为 0
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    regs: [i64; Register::COUNT],
}

impl RegisterFile {
    /// 创建新的寄存器文件
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取寄存器
    #[inline]
    pub fn read(
        &self,
        reg: Register,
    ) -> i64 {
        self.regs[reg.index() as usize]
    }

    /// 写入寄存器
    #[inline]
    pub fn write(
        &mut self,
        reg: Register,
        value: i64,
    ) {
        self.regs[reg.index() as usize] = value;
    }

    /// 全部寄存器的值
    pub fn as_slice(&self) -> &[i64] {
        &self.regs
    }
}

/// VM 执行状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VMStatus {
    /// 准备好执行
    Ready,
    /// 正在执行
    Running,
    /// 执行到 `hlt` 停机
    Halted,
    /// 指令指针到达程序末尾
    Finished,
    /// 发生错误
    Error,
}

/// 单步执行后指令指针的去向
enum Step {
    Next,
    Jump(usize),
    Halt,
}

/// 虚拟机
///
/// 所有状态都归单个实例所有；程序字节码只被借用，可以在多个实例间共享。
#[derive(Debug)]
pub struct VM {
    /// 配置
    config: VMConfig,
    /// 状态
    status: VMStatus,
    /// 寄存器文件
    regs: RegisterFile,
    /// 操作数栈
    stack: BoundedStack<i64>,
    /// 调用栈（返回地址）
    call_stack: BoundedStack<usize>,
    /// 跳转表，每次运行重新构建
    jump_table: JumpTable,
    /// 指令指针（字节偏移）
    ip: usize,
    /// 已执行的指令数
    steps: u64,
    /// 出错时的指令指针
    fault_ip: Option<usize>,
}

impl Default for VM {
    fn default() -> Self {
        Self::new_with_config(VMConfig::default())
    }
}

impl VM {
    /// 使用默认配置创建 VM
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置创建 VM
    pub fn new_with_config(config: VMConfig) -> Self {
        Self {
            stack: BoundedStack::new(StackKind::Operand, config.stack_size),
            call_stack: BoundedStack::new(StackKind::Call, config.call_stack_size),
            config,
            status: VMStatus::Ready,
            regs: RegisterFile::new(),
            jump_table: JumpTable::default(),
            ip: 0,
            steps: 0,
            fault_ip: None,
        }
    }

    /// 获取配置
    pub fn config(&self) -> &VMConfig {
        &self.config
    }

    /// 获取 VM 状态
    pub fn status(&self) -> VMStatus {
        self.status
    }

    /// 出错时的指令指针
    pub fn fault_ip(&self) -> Option<usize> {
        self.fault_ip
    }

    /// 当前指令指针
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// 已执行的指令数
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// 读取寄存器
    pub fn register(
        &self,
        reg: Register,
    ) -> i64 {
        self.regs.read(reg)
    }

    /// 全部寄存器
    pub fn registers(&self) -> &[i64] {
        self.regs.as_slice()
    }

    /// 操作数栈内容（栈底在前）
    pub fn stack(&self) -> &[i64] {
        self.stack.as_slice()
    }

    /// 当前调用深度
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// 运行程序，输出写入 `out`
    ///
    /// 每次运行都从全新的状态开始。出错时该实例进入 [`VMStatus::Error`]，
    /// 错误返回给调用者，栈与寄存器保留出错时的内容以便检查。
    pub fn run<W: Write>(
        &mut self,
        program: &[u8],
        out: &mut W,
    ) -> VMResult<VMStatus> {
        self.reset();
        self.status = VMStatus::Running;
        debug!(
            bytes = program.len(),
            stack = self.stack.capacity(),
            call_stack = self.call_stack.capacity(),
            "vm start"
        );

        match self.execute(program, out) {
            Ok(status) => {
                self.status = status;
                debug!(?status, steps = self.steps, "vm complete");
                Ok(status)
            }
            Err(err) => {
                let _ = out.flush();
                self.status = VMStatus::Error;
                self.fault_ip = Some(self.ip);
                debug!(ip = self.ip, error = %err, "vm failed");
                Err(err)
            }
        }
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.call_stack.clear();
        self.regs = RegisterFile::new();
        self.jump_table = JumpTable::default();
        self.ip = 0;
        self.steps = 0;
        self.fault_ip = None;
    }

    fn execute<W: Write>(
        &mut self,
        program: &[u8],
        out: &mut W,
    ) -> VMResult<VMStatus> {
        self.jump_table = JumpTable::scan(program)?;
        debug!(labels = self.jump_table.len(), "jump table built");

        while self.ip < program.len() {
            let instr = Instruction::decode_at(program, self.ip)?;
            if self.config.trace_execution {
                trace!(ip = self.ip, sp = self.stack.len(), "{}", instr);
            }
            self.steps += 1;

            match self.step(instr, out)? {
                Step::Next => self.ip += instr.size(),
                Step::Jump(target) => self.ip = target,
                Step::Halt => {
                    out.flush()?;
                    return Ok(VMStatus::Halted);
                }
            }
        }

        out.flush()?;
        Ok(VMStatus::Finished)
    }

    fn step<W: Write>(
        &mut self,
        instr: Instruction,
        out: &mut W,
    ) -> VMResult<Step> {
        match instr {
            Instruction::Halt => return Ok(Step::Halt),
            Instruction::Debug => {
                writeln!(
                    out,
                    "ip={}, sp={}, csp={}",
                    self.ip,
                    self.stack.len(),
                    self.call_stack.len()
                )?;
                debug!(registers = ?self.regs.as_slice(), stack = ?self.stack.as_slice(), "dbg");
            }
            Instruction::MoveLiteral { dst, value } => self.regs.write(dst, value),
            Instruction::MoveRegister { dst, src } => {
                let value = self.regs.read(src);
                self.regs.write(dst, value);
            }
            Instruction::Push { value } => self.stack.push(value)?,
            Instruction::Dup => {
                let value = self.stack.pop()?;
                self.stack.push(value)?;
                self.stack.push(value)?;
            }
            Instruction::Drop => {
                self.stack.pop()?;
            }
            Instruction::Swap => {
                // 先弹出的先压回
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                self.stack.push(a)?;
                self.stack.push(b)?;
            }
            Instruction::Load { reg } => self.stack.push(self.regs.read(reg))?,
            Instruction::Store { reg } => {
                let value = self.stack.pop()?;
                self.regs.write(reg, value);
            }
            Instruction::Add => self.binary_op(|a, b| Ok(a.wrapping_add(b)))?,
            Instruction::Sub => self.binary_op(|a, b| Ok(a.wrapping_sub(b)))?,
            Instruction::Mul => self.binary_op(|a, b| Ok(a.wrapping_mul(b)))?,
            Instruction::Div => self.binary_op(|a, b| {
                if b == 0 {
                    Err(VMError::DivisionByZero)
                } else {
                    Ok(a.wrapping_div(b))
                }
            })?,
            Instruction::Mod => self.binary_op(|a, b| {
                if b == 0 {
                    Err(VMError::DivisionByZero)
                } else {
                    Ok(a.wrapping_rem(b))
                }
            })?,
            Instruction::Label { .. } => {}
            Instruction::Call { target } => {
                self.call_stack.push(self.ip + instr.size())?;
                return Ok(Step::Jump(self.jump_table.resolve(target)?));
            }
            Instruction::Jump { target } => {
                return Ok(Step::Jump(self.jump_table.resolve(target)?));
            }
            Instruction::JumpIfZero { target } => return self.branch(target, |v| v == 0),
            Instruction::JumpIfNotZero { target } => return self.branch(target, |v| v != 0),
            Instruction::JumpIfPositive { target } => return self.branch(target, |v| v > 0),
            Instruction::JumpIfNegative { target } => return self.branch(target, |v| v < 0),
            Instruction::Return => return Ok(Step::Jump(self.call_stack.pop()?)),
            Instruction::PutNumber => {
                let value = self.stack.pop()?;
                writeln!(out, "{}", value)?;
            }
            Instruction::PutChar => {
                let value = self.stack.pop()?;
                write!(out, "{}", char_from_code(value))?;
            }
        }
        Ok(Step::Next)
    }

    /// 二元运算：先弹出的值是左操作数
    fn binary_op(
        &mut self,
        op: impl FnOnce(i64, i64) -> VMResult<i64>,
    ) -> VMResult<()> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(op(a, b)?)
    }

    /// 条件跳转：弹出一个值，满足条件才跳转
    fn branch(
        &mut self,
        target: LabelId,
        taken: impl FnOnce(i64) -> bool,
    ) -> VMResult<Step> {
        let value = self.stack.pop()?;
        if taken(value) {
            Ok(Step::Jump(self.jump_table.resolve(target)?))
        } else {
            Ok(Step::Next)
        }
    }
}

/// 把整数按 Unicode 码点解释，非法码点输出替换字符
fn char_from_code(value: i64) -> char {
    u32::try_from(value)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
