//! Exit-code policy.
//!
//! Codes 0..=49 belong to the EXIT opcode. Every error code is 50 or above,
//! so a status alone tells a requested exit from a failure.

use crate::error::{Diagnosed, ErrorClass, Refinement};

/// Highest status EXIT may request.
pub const MAX_EXIT_STATUS: i64 = 49;

/// Maps error classes (and optionally refinements) to process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCodes {
    pub structural: u8,
    pub semantic: u8,
    pub type_mismatch: u8,
    pub missing_value: u8,
    pub value: u8,
    pub internal: u8,
    /// Overrides for refined conditions. `None` falls back to the class code.
    pub undefined_variable: Option<u8>,
    pub missing_frame: Option<u8>,
    pub string_operation: Option<u8>,
}

impl ExitCodes {
    /// One code per class.
    pub const fn classic() -> Self {
        Self {
            structural: 50,
            semantic: 52,
            type_mismatch: 53,
            missing_value: 56,
            value: 57,
            internal: 99,
            undefined_variable: None,
            missing_frame: None,
            string_operation: None,
        }
    }

    /// Classic codes plus separate codes for undefined variables (54),
    /// missing frames (55) and string operations (58).
    pub const fn detailed() -> Self {
        Self {
            undefined_variable: Some(54),
            missing_frame: Some(55),
            string_operation: Some(58),
            ..Self::classic()
        }
    }

    pub fn for_class(&self, class: ErrorClass) -> u8 {
        match class {
            ErrorClass::Structural => self.structural,
            ErrorClass::Semantic => self.semantic,
            ErrorClass::Type => self.type_mismatch,
            ErrorClass::MissingValue => self.missing_value,
            ErrorClass::Value => self.value,
            ErrorClass::Internal => self.internal,
        }
    }

    /// The exit code for a diagnosed error under this policy.
    pub fn code_for(&self, err: &impl Diagnosed) -> u8 {
        let refined = match err.refinement() {
            Some(Refinement::UndefinedVariable) => self.undefined_variable,
            Some(Refinement::MissingFrame) => self.missing_frame,
            Some(Refinement::StringOperation) => self.string_operation,
            None => None,
        };
        refined.unwrap_or_else(|| self.for_class(err.class()))
    }
}

impl Default for ExitCodes {
    fn default() -> Self {
        Self::classic()
    }
}
