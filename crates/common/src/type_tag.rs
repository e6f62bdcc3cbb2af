//! Runtime type tags.
//!
//! Every initialised value carries exactly one of four type tags. The tag
//! names double as the text of `type` operands (READ) and as the result of
//! the TYPE opcode.

use std::fmt;
use std::str::FromStr;

/// Identifies the dynamic type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Signed 64-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// Unicode string.
    String,
    /// The nil singleton.
    Nil,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 4] =
    [TypeTag::Int, TypeTag::Bool, TypeTag::String, TypeTag::Nil];

impl TypeTag {
    /// Returns the source-level name of this type tag.
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
            TypeTag::Nil => "nil",
        }
    }

    /// Returns true if READ may target this type.
    pub fn is_readable(&self) -> bool {
        !matches!(self, TypeTag::Nil)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_TYPE_TAGS
            .iter()
            .find(|tag| tag.name() == s)
            .copied()
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_roundtrip() {
        for &tag in &ALL_TYPE_TAGS {
            assert_eq!(tag.name().parse::<TypeTag>(), Ok(tag));
        }
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!("INT".parse::<TypeTag>().is_err());
        assert!("String".parse::<TypeTag>().is_err());
    }

    #[test]
    fn nil_is_not_readable() {
        assert!(TypeTag::Int.is_readable());
        assert!(TypeTag::Bool.is_readable());
        assert!(TypeTag::String.is_readable());
        assert!(!TypeTag::Nil.is_readable());
    }
}
