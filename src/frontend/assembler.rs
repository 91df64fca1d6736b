//! 两遍汇编器
//!
//! 跳转/调用的目标可以出现在声明之前，所以分两遍处理：
//!
//! 1. 收集所有标签声明，按出现顺序分配 ID；
//! 2. 逐行生成指令，标签引用直接查第一遍的结果。
//!
//! 遇到第一个错误立即返回，不产生部分结果。

use tracing::debug;

use crate::frontend::errors::{AsmError, AsmErrorKind, AsmResult};
use crate::frontend::labels::LabelTable;
use crate::frontend::lexer::{self, LineKind, SourceLine};
use crate::vm::instructions::{Instruction, LabelId, Register};

/// 汇编源码为指令序列
pub fn assemble(source: &str) -> AsmResult<Vec<Instruction>> {
    let mut assembler = Assembler::new(source);
    assembler.collect_labels()?;
    assembler.emit()
}

/// 汇编器状态
#[derive(Debug)]
pub struct Assembler<'a> {
    lines: Vec<SourceLine<'a>>,
    labels: LabelTable,
}

impl<'a> Assembler<'a> {
    /// 切分源码，准备汇编
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: lexer::tokenize(source),
            labels: LabelTable::new(),
        }
    }

    /// 已收集的标签
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// 第一遍：收集标签声明
    pub fn collect_labels(&mut self) -> AsmResult<()> {
        for line in &self.lines {
            let LineKind::Label(name) = &line.kind else {
                continue;
            };
            let err = |kind| AsmError::new(line.number, kind);

            if self.labels.is_full() {
                return Err(err(AsmErrorKind::TooManyLabels));
            }
            if name.is_empty() {
                return Err(err(AsmErrorKind::EmptyLabelName));
            }
            if !lexer::is_label_name(name) {
                return Err(err(AsmErrorKind::InvalidLabelName(name.to_string())));
            }
            self.labels.declare(name).map_err(err)?;
        }

        debug!(labels = self.labels.len(), "labels collected");
        Ok(())
    }

    /// 第二遍：生成指令
    pub fn emit(&self) -> AsmResult<Vec<Instruction>> {
        let mut instructions = Vec::with_capacity(self.lines.len());

        for line in &self.lines {
            let instr = match &line.kind {
                LineKind::Blank | LineKind::Comment => continue,
                LineKind::Label(name) => {
                    // 第一遍已经校验并登记过所有标签
                    let id = self.labels.lookup(name).ok_or_else(|| {
                        AsmError::new(
                            line.number,
                            AsmErrorKind::InvalidLabelName(name.to_string()),
                        )
                    })?;
                    Instruction::Label { id }
                }
                LineKind::Instruction { mnemonic, args } => self
                    .parse_instruction(mnemonic, args)
                    .map_err(|kind| AsmError::new(line.number, kind))?,
            };
            instructions.push(instr);
        }

        debug!(instructions = instructions.len(), "assembled");
        Ok(instructions)
    }

    fn parse_instruction(
        &self,
        mnemonic: &str,
        args: &[&str],
    ) -> Result<Instruction, AsmErrorKind> {
        let instr = match mnemonic {
            "hlt" => nullary("hlt", args, Instruction::Halt)?,
            "dbg" => nullary("dbg", args, Instruction::Debug)?,
            "dup" => nullary("dup", args, Instruction::Dup)?,
            "drop" => nullary("drop", args, Instruction::Drop)?,
            "swap" => nullary("swap", args, Instruction::Swap)?,
            "add" => nullary("add", args, Instruction::Add)?,
            "sub" => nullary("sub", args, Instruction::Sub)?,
            "mul" => nullary("mul", args, Instruction::Mul)?,
            "div" => nullary("div", args, Instruction::Div)?,
            "mod" => nullary("mod", args, Instruction::Mod)?,
            "ret" => nullary("ret", args, Instruction::Return)?,
            "putn" => nullary("putn", args, Instruction::PutNumber)?,
            "putc" => nullary("putc", args, Instruction::PutChar)?,
            "mov" => {
                expect_args("mov", args, 2)?;
                let dst = register("mov", args[0])?;
                // 第二个参数优先按寄存器解析，其次按整数
                if let Some(src) = lexer::parse_register(args[1]) {
                    Instruction::MoveRegister { dst, src }
                } else if let Some(value) = lexer::parse_literal(args[1]) {
                    Instruction::MoveLiteral { dst, value }
                } else {
                    return Err(AsmErrorKind::ExpectedRegisterOrLiteral(args[1].to_string()));
                }
            }
            "ld" => {
                expect_args("ld", args, 1)?;
                Instruction::Load {
                    reg: register("ld", args[0])?,
                }
            }
            "st" => {
                expect_args("st", args, 1)?;
                Instruction::Store {
                    reg: register("st", args[0])?,
                }
            }
            "push" => {
                expect_args("push", args, 1)?;
                let value =
                    lexer::parse_literal(args[0]).ok_or_else(|| AsmErrorKind::ExpectedLiteral {
                        mnemonic: "push",
                        found: args[0].to_string(),
                    })?;
                Instruction::Push { value }
            }
            "call" => Instruction::Call {
                target: self.label_arg("call", args)?,
            },
            "jmp" => Instruction::Jump {
                target: self.label_arg("jmp", args)?,
            },
            "jmpz" => Instruction::JumpIfZero {
                target: self.label_arg("jmpz", args)?,
            },
            "jmpnz" => Instruction::JumpIfNotZero {
                target: self.label_arg("jmpnz", args)?,
            },
            "jmpp" => Instruction::JumpIfPositive {
                target: self.label_arg("jmpp", args)?,
            },
            "jmpn" => Instruction::JumpIfNegative {
                target: self.label_arg("jmpn", args)?,
            },
            other => return Err(AsmErrorKind::UnknownInstruction(other.to_string())),
        };
        Ok(instr)
    }

    /// 单个标签参数，必须是第一遍收集到的标签
    fn label_arg(
        &self,
        mnemonic: &'static str,
        args: &[&str],
    ) -> Result<LabelId, AsmErrorKind> {
        expect_args(mnemonic, args, 1)?;
        self.labels
            .lookup(args[0])
            .ok_or_else(|| AsmErrorKind::UndefinedLabel {
                mnemonic,
                name: args[0].to_string(),
            })
    }
}

fn expect_args(
    mnemonic: &'static str,
    args: &[&str],
    expected: usize,
) -> Result<(), AsmErrorKind> {
    if args.len() != expected {
        return Err(AsmErrorKind::ArgumentCount {
            mnemonic,
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn nullary(
    mnemonic: &'static str,
    args: &[&str],
    instr: Instruction,
) -> Result<Instruction, AsmErrorKind> {
    expect_args(mnemonic, args, 0)?;
    Ok(instr)
}

fn register(
    mnemonic: &'static str,
    token: &str,
) -> Result<Register, AsmErrorKind> {
    lexer::parse_register(token).ok_or_else(|| AsmErrorKind::ExpectedRegister {
        mnemonic,
        found: token.to_string(),
    })
}
