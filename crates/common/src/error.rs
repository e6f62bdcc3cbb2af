//! Load errors and the error classification shared by every framevm crate.

use thiserror::Error;

use crate::opcode::OperandKind;
use crate::record::OperandTag;

/// Severity class of a failure. Each class maps to one reserved exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed instruction records or source text.
    Structural,
    /// Undefined label or variable, missing frame, redefinition.
    Semantic,
    /// Wrong operand type.
    Type,
    /// Uninitialised read, empty data stack, return without call.
    MissingValue,
    /// Wrong operand value.
    Value,
    /// Unknown opcode, exhausted resources, failed output.
    Internal,
}

/// A finer distinction inside a class that some exit-code policies report
/// with a code of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refinement {
    /// Access to a variable that was never defined.
    UndefinedVariable,
    /// Access to a temporary or local frame that does not exist.
    MissingFrame,
    /// Bad string index, bad ordinal or empty replacement string.
    StringOperation,
}

/// Implemented by every error type that can terminate a run.
pub trait Diagnosed {
    fn class(&self) -> ErrorClass;

    fn refinement(&self) -> Option<Refinement> {
        None
    }
}

/// Errors found while turning records into a [`Program`](crate::Program).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Two instructions declare the same order.
    #[error("duplicate instruction order {order}")]
    DuplicateOrder { order: u64 },

    /// The opcode name is not in the catalog.
    #[error("instruction {order}: unknown opcode '{name}'")]
    UnknownOpcode { order: u64, name: String },

    /// An operand record carries no type attribute.
    #[error("instruction {order}: operand {slot} has no type attribute")]
    MissingTypeTag { order: u64, slot: u8 },

    /// An operand record carries an unrecognised type attribute.
    #[error("instruction {order}: operand {slot} has unknown type '{tag}'")]
    UnknownTypeTag { order: u64, slot: u8, tag: String },

    /// Two operand records claim the same slot.
    #[error("instruction {order}: operand slot {slot} given more than once")]
    DuplicateOperandSlot { order: u64, slot: u8 },

    /// Slot number outside 1..=3.
    #[error("instruction {order}: invalid operand slot {slot}")]
    InvalidOperandSlot { order: u64, slot: u8 },

    /// Missing or surplus operands.
    #[error("instruction {order}: {opcode} expects {expected} operand(s), found {found}")]
    ArityMismatch {
        order: u64,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// The operand's tag does not fit the opcode signature.
    #[error("instruction {order}: operand {slot} must be {expected}, found {found}")]
    OperandKindMismatch {
        order: u64,
        slot: u8,
        expected: OperandKind,
        found: OperandTag,
    },

    /// Literal text that does not parse as its declared type.
    #[error("instruction {order}: invalid {tag} literal '{text}'")]
    InvalidLiteral {
        order: u64,
        tag: OperandTag,
        text: String,
    },

    /// Malformed frame-qualified variable name.
    #[error("instruction {order}: invalid variable '{text}'")]
    InvalidVariable { order: u64, text: String },

    /// Malformed label name.
    #[error("instruction {order}: invalid label '{text}'")]
    InvalidLabel { order: u64, text: String },

    /// Type operand other than int, bool or string.
    #[error("instruction {order}: invalid type name '{text}'")]
    InvalidTypeName { order: u64, text: String },
}

impl Diagnosed for LoadError {
    fn class(&self) -> ErrorClass {
        match self {
            LoadError::UnknownOpcode { .. } => ErrorClass::Internal,
            _ => ErrorClass::Structural,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_duplicate_order() {
        assert_eq!(
            LoadError::DuplicateOrder { order: 4 }.to_string(),
            "duplicate instruction order 4"
        );
    }

    #[test]
    fn display_arity_mismatch() {
        let e = LoadError::ArityMismatch {
            order: 2,
            opcode: "ADD",
            expected: 3,
            found: 2,
        };
        assert_eq!(
            e.to_string(),
            "instruction 2: ADD expects 3 operand(s), found 2"
        );
    }

    #[test]
    fn display_kind_mismatch() {
        let e = LoadError::OperandKindMismatch {
            order: 1,
            slot: 1,
            expected: OperandKind::Var,
            found: OperandTag::Int,
        };
        assert_eq!(e.to_string(), "instruction 1: operand 1 must be var, found int");
    }

    #[test]
    fn classes() {
        assert_eq!(
            LoadError::UnknownOpcode {
                order: 1,
                name: "HALT".into()
            }
            .class(),
            ErrorClass::Internal
        );
        assert_eq!(
            LoadError::MissingTypeTag { order: 1, slot: 1 }.class(),
            ErrorClass::Structural
        );
        assert_eq!(LoadError::DuplicateOrder { order: 1 }.refinement(), None);
    }
}
