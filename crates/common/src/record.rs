//! Instruction records: the shape in which instructions arrive from a
//! loader, before any validation.
//!
//! A record carries the declared order, the opcode name as written and up
//! to three operand records. Each operand record has a slot number, an
//! optional type tag and literal text.

use std::fmt;

/// The type attribute of an operand record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandTag {
    Int,
    Bool,
    String,
    Nil,
    Var,
    Label,
    Type,
}

/// All operand tags, in definition order.
pub const ALL_OPERAND_TAGS: [OperandTag; 7] = [
    OperandTag::Int,
    OperandTag::Bool,
    OperandTag::String,
    OperandTag::Nil,
    OperandTag::Var,
    OperandTag::Label,
    OperandTag::Type,
];

impl OperandTag {
    pub fn name(&self) -> &'static str {
        match self {
            OperandTag::Int => "int",
            OperandTag::Bool => "bool",
            OperandTag::String => "string",
            OperandTag::Nil => "nil",
            OperandTag::Var => "var",
            OperandTag::Label => "label",
            OperandTag::Type => "type",
        }
    }

    pub fn lookup(name: &str) -> Option<Self> {
        ALL_OPERAND_TAGS.iter().find(|t| t.name() == name).copied()
    }

    /// True for the four literal tags.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            OperandTag::Int | OperandTag::Bool | OperandTag::String | OperandTag::Nil
        )
    }
}

impl fmt::Display for OperandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One operand as delivered by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandRecord {
    /// 1-based operand position.
    pub slot: u8,
    /// Type attribute as written; `None` when the loader found none.
    pub type_tag: Option<String>,
    /// Raw text. Strings are still escape-encoded.
    pub text: String,
}

impl OperandRecord {
    pub fn new(slot: u8, type_tag: &str, text: impl Into<String>) -> Self {
        Self {
            slot,
            type_tag: Some(type_tag.to_string()),
            text: text.into(),
        }
    }
}

/// One instruction as delivered by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    pub order: u64,
    pub opcode: String,
    pub operands: Vec<OperandRecord>,
}

impl InstructionRecord {
    pub fn new(order: u64, opcode: impl Into<String>, operands: Vec<OperandRecord>) -> Self {
        Self {
            order,
            opcode: opcode.into(),
            operands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_roundtrip() {
        for &tag in &ALL_OPERAND_TAGS {
            assert_eq!(OperandTag::lookup(tag.name()), Some(tag));
        }
        assert_eq!(OperandTag::lookup("float"), None);
        assert_eq!(OperandTag::lookup("INT"), None);
    }

    #[test]
    fn literal_tags() {
        let literals: Vec<_> = ALL_OPERAND_TAGS
            .iter()
            .filter(|t| t.is_literal())
            .collect();
        assert_eq!(literals.len(), 4);
        assert!(!OperandTag::Var.is_literal());
    }
}
