//! Runtime errors for the framevm machine.
//!
//! Every error carries the order and opcode of the instruction that raised
//! it. The condition itself is an [`ErrorKind`]; the frame manager, resolver
//! and handlers produce bare kinds and the execution loop attaches the
//! instruction context.

use framevm_common::{Diagnosed, ErrorClass, FrameKind, Opcode, Refinement, TypeTag};
use thiserror::Error;

/// A fatal condition raised while a program runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("instruction {order} {opcode}: {kind}")]
pub struct RuntimeError {
    pub order: u64,
    pub opcode: Opcode,
    pub kind: ErrorKind,
}

impl RuntimeError {
    pub fn new(order: u64, opcode: Opcode, kind: ErrorKind) -> Self {
        Self {
            order,
            opcode,
            kind,
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    // Semantic
    #[error("label '{label}' already defined by instruction {first}")]
    DuplicateLabel { label: String, first: u64 },

    #[error("undefined label '{label}'")]
    UndefinedLabel { label: String },

    #[error("undefined variable {var}")]
    UndefinedVariable { var: String },

    #[error("variable {var} already defined")]
    Redefinition { var: String },

    #[error("{frame} frame does not exist")]
    MissingFrame { frame: FrameKind },

    // Type
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: TypeTag, found: TypeTag },

    #[error("cannot compare {left} with {right}")]
    NotComparable { left: TypeTag, right: TypeTag },

    // Missing value
    #[error("variable {var} is uninitialised")]
    Uninitialized { var: String },

    #[error("data stack is empty")]
    EmptyDataStack,

    #[error("call stack is empty")]
    EmptyCallStack,

    // Value
    #[error("division by zero")]
    DivisionByZero,

    #[error("exit status {code} outside 0..=49")]
    InvalidExitCode { code: i64 },

    #[error("index {index} out of range for string of length {length}")]
    IndexOutOfRange { index: i64, length: usize },

    #[error("{code} is not a valid character ordinal")]
    InvalidCodePoint { code: i64 },

    #[error("replacement string is empty")]
    EmptyReplacement,

    // Internal
    #[error("{resource} exceeded limit of {limit}")]
    ResourceExhausted { resource: &'static str, limit: usize },

    #[error("output failed: {message}")]
    Output { message: String },
}

impl ErrorKind {
    pub(crate) fn output(err: std::io::Error) -> Self {
        ErrorKind::Output {
            message: err.to_string(),
        }
    }
}

impl Diagnosed for ErrorKind {
    fn class(&self) -> ErrorClass {
        match self {
            ErrorKind::DuplicateLabel { .. }
            | ErrorKind::UndefinedLabel { .. }
            | ErrorKind::UndefinedVariable { .. }
            | ErrorKind::Redefinition { .. }
            | ErrorKind::MissingFrame { .. } => ErrorClass::Semantic,

            ErrorKind::TypeMismatch { .. } | ErrorKind::NotComparable { .. } => ErrorClass::Type,

            ErrorKind::Uninitialized { .. }
            | ErrorKind::EmptyDataStack
            | ErrorKind::EmptyCallStack => ErrorClass::MissingValue,

            ErrorKind::DivisionByZero
            | ErrorKind::InvalidExitCode { .. }
            | ErrorKind::IndexOutOfRange { .. }
            | ErrorKind::InvalidCodePoint { .. }
            | ErrorKind::EmptyReplacement => ErrorClass::Value,

            ErrorKind::ResourceExhausted { .. } | ErrorKind::Output { .. } => ErrorClass::Internal,
        }
    }

    fn refinement(&self) -> Option<Refinement> {
        match self {
            ErrorKind::UndefinedVariable { .. } => Some(Refinement::UndefinedVariable),
            ErrorKind::MissingFrame { .. } => Some(Refinement::MissingFrame),
            ErrorKind::IndexOutOfRange { .. }
            | ErrorKind::InvalidCodePoint { .. }
            | ErrorKind::EmptyReplacement => Some(Refinement::StringOperation),
            _ => None,
        }
    }
}

impl Diagnosed for RuntimeError {
    fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    fn refinement(&self) -> Option<Refinement> {
        self.kind.refinement()
    }
}
