//! Error types for the framevm assembler.

use framevm_common::{Diagnosed, ErrorClass, LoadError};
use thiserror::Error;

/// Errors produced while loading assembly text or XML into a program.
///
/// Every variant carries the 1-based line it was found on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode did not have enough operands.
    #[error("line {line}: {opcode} expects {expected} operand(s)")]
    MissingOperand {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// An order prefix that is not a number.
    #[error("line {line}: invalid order '{token}'")]
    InvalidOrder { line: usize, token: String },

    /// A variable or literal operand that is neither `FRAME@name` nor
    /// `type@value`.
    #[error("line {line}: malformed operand '{token}'")]
    MalformedOperand { line: usize, token: String },

    /// An XML document that is not well formed.
    #[error("line {line}: invalid XML: {message}")]
    Xml { line: usize, message: String },

    /// An XML element other than `program`, `instruction` or `argN` where
    /// one of those was expected.
    #[error("line {line}: unexpected element <{name}>")]
    UnexpectedElement { line: usize, name: String },

    /// An XML element lacks a required attribute.
    #[error("line {line}: <{element}> has no '{attribute}' attribute")]
    MissingAttribute {
        line: usize,
        element: String,
        attribute: &'static str,
    },

    /// The line parsed but does not form a valid instruction.
    #[error("line {line}: {source}")]
    Load {
        line: usize,
        #[source]
        source: LoadError,
    },
}

impl AsmError {
    pub fn line(&self) -> usize {
        match self {
            AsmError::UnknownOpcode { line, .. }
            | AsmError::MissingOperand { line, .. }
            | AsmError::UnexpectedToken { line, .. }
            | AsmError::InvalidOrder { line, .. }
            | AsmError::MalformedOperand { line, .. }
            | AsmError::Xml { line, .. }
            | AsmError::UnexpectedElement { line, .. }
            | AsmError::MissingAttribute { line, .. }
            | AsmError::Load { line, .. } => *line,
        }
    }
}

impl Diagnosed for AsmError {
    fn class(&self) -> ErrorClass {
        match self {
            AsmError::Load { source, .. } => source.class(),
            _ => ErrorClass::Structural,
        }
    }
}
