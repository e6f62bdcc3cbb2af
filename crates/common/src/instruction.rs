//! Validated instructions.
//!
//! An [`Instruction`] is an order tag plus an [`Op`], a tagged variant with
//! one case per opcode whose fields are already typed operands. Arity and
//! operand kinds are checked once, when a record is converted, so the
//! machine never sees a malformed operand list.

use crate::error::LoadError;
use crate::opcode::{OperandKind, Opcode};
use crate::operand::{is_identifier, Symbol, VarRef};
use crate::record::{InstructionRecord, OperandRecord, OperandTag};
use crate::type_tag::TypeTag;
use crate::value::{decode_escapes, encode_escapes, Value};

/// One operation with its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    CreateFrame,
    PushFrame,
    PopFrame,
    DefVar(VarRef),
    Call(String),
    Return,

    PushS(Symbol),
    PopS(VarRef),

    Move(VarRef, Symbol),
    Add(VarRef, Symbol, Symbol),
    Sub(VarRef, Symbol, Symbol),
    Mul(VarRef, Symbol, Symbol),
    IDiv(VarRef, Symbol, Symbol),
    Lt(VarRef, Symbol, Symbol),
    Gt(VarRef, Symbol, Symbol),
    Eq(VarRef, Symbol, Symbol),
    And(VarRef, Symbol, Symbol),
    Or(VarRef, Symbol, Symbol),
    Not(VarRef, Symbol),
    Int2Char(VarRef, Symbol),
    Stri2Int(VarRef, Symbol, Symbol),

    Read(VarRef, TypeTag),
    Write(Symbol),

    Concat(VarRef, Symbol, Symbol),
    StrLen(VarRef, Symbol),
    GetChar(VarRef, Symbol, Symbol),
    SetChar(VarRef, Symbol, Symbol),

    Type(VarRef, Symbol),

    Label(String),
    Jump(String),
    JumpIfEq(String, Symbol, Symbol),
    JumpIfNeq(String, Symbol, Symbol),
    Exit(Symbol),

    DPrint(Symbol),
    Break,
}

/// A borrowed view of one operand, used to walk an [`Op`] generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    Var(&'a VarRef),
    Symb(&'a Symbol),
    Label(&'a str),
    Type(TypeTag),
}

impl Op {
    pub fn opcode(&self) -> Opcode {
        match self {
            Op::CreateFrame => Opcode::CreateFrame,
            Op::PushFrame => Opcode::PushFrame,
            Op::PopFrame => Opcode::PopFrame,
            Op::DefVar(..) => Opcode::DefVar,
            Op::Call(..) => Opcode::Call,
            Op::Return => Opcode::Return,
            Op::PushS(..) => Opcode::PushS,
            Op::PopS(..) => Opcode::PopS,
            Op::Move(..) => Opcode::Move,
            Op::Add(..) => Opcode::Add,
            Op::Sub(..) => Opcode::Sub,
            Op::Mul(..) => Opcode::Mul,
            Op::IDiv(..) => Opcode::IDiv,
            Op::Lt(..) => Opcode::Lt,
            Op::Gt(..) => Opcode::Gt,
            Op::Eq(..) => Opcode::Eq,
            Op::And(..) => Opcode::And,
            Op::Or(..) => Opcode::Or,
            Op::Not(..) => Opcode::Not,
            Op::Int2Char(..) => Opcode::Int2Char,
            Op::Stri2Int(..) => Opcode::Stri2Int,
            Op::Read(..) => Opcode::Read,
            Op::Write(..) => Opcode::Write,
            Op::Concat(..) => Opcode::Concat,
            Op::StrLen(..) => Opcode::StrLen,
            Op::GetChar(..) => Opcode::GetChar,
            Op::SetChar(..) => Opcode::SetChar,
            Op::Type(..) => Opcode::Type,
            Op::Label(..) => Opcode::Label,
            Op::Jump(..) => Opcode::Jump,
            Op::JumpIfEq(..) => Opcode::JumpIfEq,
            Op::JumpIfNeq(..) => Opcode::JumpIfNeq,
            Op::Exit(..) => Opcode::Exit,
            Op::DPrint(..) => Opcode::DPrint,
            Op::Break => Opcode::Break,
        }
    }

    /// Operands in slot order.
    pub fn operands(&self) -> Vec<Operand<'_>> {
        use Operand::{Label as L, Symb as S, Type as T, Var as V};
        match self {
            Op::CreateFrame | Op::PushFrame | Op::PopFrame | Op::Return | Op::Break => vec![],
            Op::DefVar(v) | Op::PopS(v) => vec![V(v)],
            Op::PushS(s) | Op::Write(s) | Op::Exit(s) | Op::DPrint(s) => vec![S(s)],
            Op::Call(l) | Op::Label(l) | Op::Jump(l) => vec![L(l)],
            Op::Move(v, s)
            | Op::Not(v, s)
            | Op::Int2Char(v, s)
            | Op::StrLen(v, s)
            | Op::Type(v, s) => vec![V(v), S(s)],
            Op::Read(v, t) => vec![V(v), T(*t)],
            Op::Add(v, a, b)
            | Op::Sub(v, a, b)
            | Op::Mul(v, a, b)
            | Op::IDiv(v, a, b)
            | Op::Lt(v, a, b)
            | Op::Gt(v, a, b)
            | Op::Eq(v, a, b)
            | Op::And(v, a, b)
            | Op::Or(v, a, b)
            | Op::Stri2Int(v, a, b)
            | Op::Concat(v, a, b)
            | Op::GetChar(v, a, b)
            | Op::SetChar(v, a, b) => vec![V(v), S(a), S(b)],
            Op::JumpIfEq(l, a, b) | Op::JumpIfNeq(l, a, b) => vec![L(l), S(a), S(b)],
        }
    }
}

/// A single instruction: its declared order and the operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Declared position in the program. Unique, not necessarily contiguous.
    pub order: u64,
    pub op: Op,
}

impl Instruction {
    pub fn new(order: u64, op: Op) -> Self {
        Self { order, op }
    }

    pub fn opcode(&self) -> Opcode {
        self.op.opcode()
    }

    /// Validate a record and build the instruction it describes.
    pub fn from_record(record: &InstructionRecord) -> Result<Self, LoadError> {
        let order = record.order;
        let opcode = Opcode::lookup(&record.opcode).ok_or_else(|| LoadError::UnknownOpcode {
            order,
            name: record.opcode.clone(),
        })?;

        let mut args = OperandReader::new(record, opcode)?;

        let op = match opcode {
            Opcode::CreateFrame => Op::CreateFrame,
            Opcode::PushFrame => Op::PushFrame,
            Opcode::PopFrame => Op::PopFrame,
            Opcode::Return => Op::Return,
            Opcode::Break => Op::Break,

            Opcode::DefVar => Op::DefVar(args.var()?),
            Opcode::PopS => Op::PopS(args.var()?),
            Opcode::PushS => Op::PushS(args.symb()?),
            Opcode::Write => Op::Write(args.symb()?),
            Opcode::Exit => Op::Exit(args.symb()?),
            Opcode::DPrint => Op::DPrint(args.symb()?),
            Opcode::Call => Op::Call(args.label()?),
            Opcode::Label => Op::Label(args.label()?),
            Opcode::Jump => Op::Jump(args.label()?),

            Opcode::Move => Op::Move(args.var()?, args.symb()?),
            Opcode::Not => Op::Not(args.var()?, args.symb()?),
            Opcode::Int2Char => Op::Int2Char(args.var()?, args.symb()?),
            Opcode::StrLen => Op::StrLen(args.var()?, args.symb()?),
            Opcode::Type => Op::Type(args.var()?, args.symb()?),
            Opcode::Read => Op::Read(args.var()?, args.type_name()?),

            Opcode::Add => Op::Add(args.var()?, args.symb()?, args.symb()?),
            Opcode::Sub => Op::Sub(args.var()?, args.symb()?, args.symb()?),
            Opcode::Mul => Op::Mul(args.var()?, args.symb()?, args.symb()?),
            Opcode::IDiv => Op::IDiv(args.var()?, args.symb()?, args.symb()?),
            Opcode::Lt => Op::Lt(args.var()?, args.symb()?, args.symb()?),
            Opcode::Gt => Op::Gt(args.var()?, args.symb()?, args.symb()?),
            Opcode::Eq => Op::Eq(args.var()?, args.symb()?, args.symb()?),
            Opcode::And => Op::And(args.var()?, args.symb()?, args.symb()?),
            Opcode::Or => Op::Or(args.var()?, args.symb()?, args.symb()?),
            Opcode::Stri2Int => Op::Stri2Int(args.var()?, args.symb()?, args.symb()?),
            Opcode::Concat => Op::Concat(args.var()?, args.symb()?, args.symb()?),
            Opcode::GetChar => Op::GetChar(args.var()?, args.symb()?, args.symb()?),
            Opcode::SetChar => Op::SetChar(args.var()?, args.symb()?, args.symb()?),
            Opcode::JumpIfEq => Op::JumpIfEq(args.label()?, args.symb()?, args.symb()?),
            Opcode::JumpIfNeq => Op::JumpIfNeq(args.label()?, args.symb()?, args.symb()?),
        };

        Ok(Self { order, op })
    }

    /// The record a loader would have to deliver to produce this instruction.
    pub fn to_record(&self) -> InstructionRecord {
        let operands = self
            .op
            .operands()
            .into_iter()
            .enumerate()
            .map(|(i, operand)| {
                let slot = i as u8 + 1;
                match operand {
                    Operand::Var(v) => OperandRecord::new(slot, "var", v.to_string()),
                    Operand::Symb(Symbol::Var(v)) => OperandRecord::new(slot, "var", v.to_string()),
                    Operand::Symb(Symbol::Const(value)) => {
                        let text = match value {
                            Value::Int(i) => i.to_string(),
                            Value::Bool(b) => b.to_string(),
                            Value::Str(s) => encode_escapes(s),
                            Value::Nil => "nil".to_string(),
                        };
                        OperandRecord::new(slot, value.type_tag().name(), text)
                    }
                    Operand::Label(l) => OperandRecord::new(slot, "label", l),
                    Operand::Type(t) => OperandRecord::new(slot, "type", t.name()),
                }
            })
            .collect();

        InstructionRecord::new(self.order, self.opcode().mnemonic(), operands)
    }
}

/// Walks a record's operands in slot order, checking each against the
/// opcode signature as it is consumed.
struct OperandReader<'r> {
    order: u64,
    opcode: Opcode,
    operands: Vec<(&'r OperandRecord, OperandTag)>,
    next: usize,
}

impl<'r> OperandReader<'r> {
    fn new(record: &'r InstructionRecord, opcode: Opcode) -> Result<Self, LoadError> {
        let order = record.order;
        let mut seen = [false; 3];
        let mut operands = Vec::with_capacity(record.operands.len());

        for operand in &record.operands {
            let slot = operand.slot;
            if !(1..=3).contains(&slot) {
                return Err(LoadError::InvalidOperandSlot { order, slot });
            }
            let index = usize::from(slot - 1);
            if seen[index] {
                return Err(LoadError::DuplicateOperandSlot { order, slot });
            }
            seen[index] = true;

            let name = operand
                .type_tag
                .as_deref()
                .ok_or(LoadError::MissingTypeTag { order, slot })?;
            let tag = OperandTag::lookup(name).ok_or_else(|| LoadError::UnknownTypeTag {
                order,
                slot,
                tag: name.to_string(),
            })?;
            operands.push((operand, tag));
        }

        operands.sort_by_key(|(operand, _)| operand.slot);

        // Slots must be exactly 1..=arity.
        let arity = opcode.arity();
        let contiguous = operands
            .iter()
            .enumerate()
            .all(|(i, (operand, _))| usize::from(operand.slot) == i + 1);
        if operands.len() != arity || !contiguous {
            return Err(LoadError::ArityMismatch {
                order,
                opcode: opcode.mnemonic(),
                expected: arity,
                found: operands.len(),
            });
        }

        Ok(Self {
            order,
            opcode,
            operands,
            next: 0,
        })
    }

    fn take(
        &mut self,
        expected: OperandKind,
    ) -> Result<(&'r OperandRecord, OperandTag), LoadError> {
        let (operand, tag) = *self
            .operands
            .get(self.next)
            .ok_or(LoadError::ArityMismatch {
                order: self.order,
                opcode: self.opcode.mnemonic(),
                expected: self.opcode.arity(),
                found: self.operands.len(),
            })?;
        self.next += 1;

        let fits = match expected {
            OperandKind::Var => tag == OperandTag::Var,
            OperandKind::Symb => tag == OperandTag::Var || tag.is_literal(),
            OperandKind::Label => tag == OperandTag::Label,
            OperandKind::Type => tag == OperandTag::Type,
        };
        if !fits {
            return Err(LoadError::OperandKindMismatch {
                order: self.order,
                slot: operand.slot,
                expected,
                found: tag,
            });
        }
        Ok((operand, tag))
    }

    fn var(&mut self) -> Result<VarRef, LoadError> {
        let (operand, _) = self.take(OperandKind::Var)?;
        self.parse_var(&operand.text)
    }

    fn symb(&mut self) -> Result<Symbol, LoadError> {
        let (operand, tag) = self.take(OperandKind::Symb)?;
        let text = operand.text.as_str();
        let invalid = || LoadError::InvalidLiteral {
            order: self.order,
            tag,
            text: text.to_string(),
        };

        let value = match tag {
            OperandTag::Var => return self.parse_var(text).map(Symbol::Var),
            OperandTag::Int => Value::Int(parse_int(text).ok_or_else(invalid)?),
            OperandTag::Bool => match text {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => return Err(invalid()),
            },
            OperandTag::Nil if text == "nil" => Value::Nil,
            OperandTag::String => Value::Str(decode_escapes(text)),
            _ => return Err(invalid()),
        };
        Ok(Symbol::Const(value))
    }

    fn label(&mut self) -> Result<String, LoadError> {
        let (operand, _) = self.take(OperandKind::Label)?;
        if !is_identifier(&operand.text) {
            return Err(LoadError::InvalidLabel {
                order: self.order,
                text: operand.text.clone(),
            });
        }
        Ok(operand.text.clone())
    }

    fn type_name(&mut self) -> Result<TypeTag, LoadError> {
        let (operand, _) = self.take(OperandKind::Type)?;
        operand
            .text
            .parse::<TypeTag>()
            .ok()
            .filter(TypeTag::is_readable)
            .ok_or_else(|| LoadError::InvalidTypeName {
                order: self.order,
                text: operand.text.clone(),
            })
    }

    fn parse_var(&self, text: &str) -> Result<VarRef, LoadError> {
        VarRef::parse(text).ok_or_else(|| LoadError::InvalidVariable {
            order: self.order,
            text: text.to_string(),
        })
    }
}

/// Parse an integer literal: optional sign, then decimal digits or a
/// `0x`/`0o` prefixed hexadecimal/octal magnitude.
pub fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let hex = digits.strip_prefix("0x").or(digits.strip_prefix("0X"));
    let (radix, digits) = if let Some(hex) = hex {
        (16, hex)
    } else if let Some(oct) = digits.strip_prefix("0o").or(digits.strip_prefix("0O")) {
        (8, oct)
    } else {
        (10, digits)
    };

    // from_str_radix tolerates a leading sign; the sign was handled above.
    if !digits.chars().next().is_some_and(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let magnitude = i128::from(u64::from_str_radix(digits, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}
