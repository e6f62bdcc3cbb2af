//! Opcode catalog for the framevm instruction set.
//!
//! Each opcode has a fixed operand signature. The signature is the single
//! source of truth for arity and operand-kind validation, both when
//! instruction records are converted and when assembly text is parsed.

use std::fmt;

/// The kind of operand an opcode expects in a given slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// A variable that is written (or defined).
    Var,
    /// A readable value: a variable or a literal.
    Symb,
    /// A label name.
    Label,
    /// A type name (`int`, `bool` or `string`).
    Type,
}

impl fmt::Display for OperandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperandKind::Var => "var",
            OperandKind::Symb => "symb",
            OperandKind::Label => "label",
            OperandKind::Type => "type",
        })
    }
}

use OperandKind::{Label as L, Symb as S, Type as T, Var as V};

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames and calls
    /// Replace the temporary frame with a fresh empty one.
    CreateFrame,
    /// Move the temporary frame onto the local frame stack.
    PushFrame,
    /// Move the top local frame back into the temporary slot.
    PopFrame,
    /// Define an uninitialised variable.
    DefVar,
    /// Push a return address and jump to a label.
    Call,
    /// Pop a return address and continue there.
    Return,

    // Data stack
    /// Push a value onto the data stack.
    PushS,
    /// Pop the data stack into a variable.
    PopS,

    // Arithmetic, relational, boolean and conversion
    Move,
    Add,
    Sub,
    Mul,
    /// Floor division. Division by zero is a runtime error.
    IDiv,
    Lt,
    Gt,
    Eq,
    And,
    Or,
    Not,
    /// Integer ordinal to one-character string.
    Int2Char,
    /// Ordinal of the character at an index.
    Stri2Int,

    // Input and output
    /// Read one line of input as the named type.
    Read,
    /// Write a value to program output.
    Write,

    // Strings
    Concat,
    StrLen,
    GetChar,
    SetChar,

    // Types
    /// Store the type name of a symbol. Tolerates uninitialised variables.
    Type,

    // Control flow
    /// Jump target. No effect at run time.
    Label,
    Jump,
    JumpIfEq,
    JumpIfNeq,
    /// Terminate with an exit status in 0..=49.
    Exit,

    // Debugging
    /// Emit type information to the diagnostic channel.
    DPrint,
    /// Dump interpreter state to the diagnostic channel.
    Break,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::Move,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::StrLen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
];

impl Opcode {
    /// Returns the canonical (uppercase) mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Move => "MOVE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn lookup(name: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
            .copied()
    }

    /// The operand kinds this opcode takes, in slot order.
    pub fn signature(&self) -> &'static [OperandKind] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::PopS => &[V],
            Opcode::PushS | Opcode::Write | Opcode::Exit | Opcode::DPrint => &[S],
            Opcode::Call | Opcode::Label | Opcode::Jump => &[L],

            Opcode::Move
            | Opcode::Int2Char
            | Opcode::StrLen
            | Opcode::Type
            | Opcode::Not => &[V, S],
            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],
            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }

    /// Number of operands.
    pub fn arity(&self) -> usize {
        self.signature().len()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 35);
    }

    #[test]
    fn lookup_roundtrip() {
        for &opcode in &ALL_OPCODES {
            assert_eq!(Opcode::lookup(opcode.mnemonic()), Some(opcode));
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(Opcode::lookup("defvar"), Some(Opcode::DefVar));
        assert_eq!(Opcode::lookup("JumpIfNeq"), Some(Opcode::JumpIfNeq));
        assert_eq!(Opcode::lookup("int2char"), Some(Opcode::Int2Char));
    }

    #[test]
    fn lookup_unknown() {
        assert_eq!(Opcode::lookup("HALT"), None);
        assert_eq!(Opcode::lookup(""), None);
    }

    #[test]
    fn mnemonics_are_uppercase() {
        for &opcode in &ALL_OPCODES {
            let m = opcode.mnemonic();
            assert_eq!(m, m.to_uppercase(), "mnemonic should be uppercase: {m}");
        }
    }

    #[test]
    fn arity_distribution() {
        let count = |n| ALL_OPCODES.iter().filter(|op| op.arity() == n).count();
        assert_eq!(count(0), 5);
        assert_eq!(count(1), 9);
        assert_eq!(count(2), 6);
        assert_eq!(count(3), 15);
    }

    #[test]
    fn jumps_take_label_first() {
        assert_eq!(Opcode::JumpIfEq.signature()[0], OperandKind::Label);
        assert_eq!(Opcode::Call.signature(), &[OperandKind::Label]);
    }
}
