//! Operand representation: frame-qualified variables, symbols and labels.

use std::fmt;

use crate::value::Value;

/// Which frame a variable reference addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// The process-lifetime global frame (`GF`).
    Global,
    /// The staging temporary frame (`TF`).
    Temporary,
    /// The top of the local frame stack (`LF`).
    Local,
}

impl FrameKind {
    /// Two-letter prefix used in qualified names.
    pub fn prefix(&self) -> &'static str {
        match self {
            FrameKind::Global => "GF",
            FrameKind::Temporary => "TF",
            FrameKind::Local => "LF",
        }
    }

    /// Resolve a prefix. Prefixes are case-sensitive.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "GF" => Some(FrameKind::Global),
            "TF" => Some(FrameKind::Temporary),
            "LF" => Some(FrameKind::Local),
            _ => None,
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A frame-qualified variable name such as `GF@counter`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarRef {
    pub frame: FrameKind,
    pub name: String,
}

impl VarRef {
    pub fn new(frame: FrameKind, name: impl Into<String>) -> Self {
        Self {
            frame,
            name: name.into(),
        }
    }

    /// Parse a qualified name: two prefix characters, `@`, then an identifier.
    ///
    /// Returns `None` for an unknown prefix, a missing separator or an
    /// invalid identifier.
    pub fn parse(text: &str) -> Option<Self> {
        let (prefix, name) = text.split_once('@')?;
        let frame = FrameKind::from_prefix(prefix)?;
        if !is_identifier(name) {
            return None;
        }
        Some(Self::new(frame, name))
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.frame, self.name)
    }
}

/// A readable operand: either a variable or a literal constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Var(VarRef),
    Const(Value),
}

impl From<VarRef> for Symbol {
    fn from(var: VarRef) -> Self {
        Symbol::Var(var)
    }
}

impl From<Value> for Symbol {
    fn from(value: Value) -> Self {
        Symbol::Const(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Var(var) => var.fmt(f),
            Symbol::Const(value) => write!(f, "{}@{}", value.type_tag(), value),
        }
    }
}

const SPECIAL_CHARS: &[char] = &['_', '-', '$', '&', '%', '*', '!', '?'];

/// Variable and label names: a letter or special character, followed by
/// letters, digits and special characters.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || SPECIAL_CHARS.contains(&first) => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || SPECIAL_CHARS.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_frames() {
        assert_eq!(
            VarRef::parse("GF@x"),
            Some(VarRef::new(FrameKind::Global, "x"))
        );
        assert_eq!(
            VarRef::parse("TF@tmp_1"),
            Some(VarRef::new(FrameKind::Temporary, "tmp_1"))
        );
        assert_eq!(
            VarRef::parse("LF@$ret"),
            Some(VarRef::new(FrameKind::Local, "$ret"))
        );
    }

    #[test]
    fn parse_rejects_malformed_names() {
        assert_eq!(VarRef::parse("GF"), None);
        assert_eq!(VarRef::parse("GF@"), None);
        assert_eq!(VarRef::parse("XF@a"), None);
        assert_eq!(VarRef::parse("gf@a"), None);
        assert_eq!(VarRef::parse("GF@1a"), None);
        assert_eq!(VarRef::parse("GF@a b"), None);
    }

    #[test]
    fn display_roundtrip() {
        let var = VarRef::new(FrameKind::Local, "counter");
        assert_eq!(var.to_string(), "LF@counter");
        assert_eq!(VarRef::parse(&var.to_string()), Some(var));
    }

    #[test]
    fn symbol_display() {
        assert_eq!(Symbol::Const(Value::Int(3)).to_string(), "int@3");
        assert_eq!(Symbol::Const(Value::Nil).to_string(), "nil@");
        assert_eq!(
            Symbol::Var(VarRef::new(FrameKind::Global, "a")).to_string(),
            "GF@a"
        );
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("loop"));
        assert!(is_identifier("_start"));
        assert!(is_identifier("a-b?c!"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("a@b"));
    }
}
