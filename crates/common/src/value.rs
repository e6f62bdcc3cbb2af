//! Runtime value representation for the framevm machine.
//!
//! Values are what live in variables and on the data stack. The
//! "uninitialised" state of a variable is not a value; it is modelled by the
//! frame that owns the variable.

use std::fmt;

use crate::type_tag::TypeTag;

/// Runtime value representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean value.
    Bool(bool),
    /// String of Unicode scalar values, escapes already decoded.
    Str(String),
    /// The nil singleton.
    Nil,
}

impl Value {
    /// Returns the type tag for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Int(_) => TypeTag::Int,
            Value::Bool(_) => TypeTag::Bool,
            Value::Str(_) => TypeTag::String,
            Value::Nil => TypeTag::Nil,
        }
    }

    /// Convenience constructor for string values.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }
}

/// Renders the value the way WRITE emits it: integers in decimal, booleans
/// as `true`/`false`, nil as nothing, strings verbatim.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Nil => Ok(()),
        }
    }
}

/// Decode `\ddd` escapes (exactly three decimal digits) into the character
/// with that ordinal. A backslash not followed by three digits is kept as is.
pub fn decode_escapes(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '\\'
            && i + 3 < chars.len()
            && chars[i + 1..=i + 3].iter().all(char::is_ascii_digit)
        {
            let code = chars[i + 1..=i + 3]
                .iter()
                .fold(0u32, |acc, c| acc * 10 + (*c as u32 - '0' as u32));
            // 0..=999 never hits the surrogate range.
            if let Some(c) = char::from_u32(code) {
                out.push(c);
                i += 4;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

/// Encode a string so that it survives the whitespace-separated source
/// format: ASCII control characters, space, `#` and `\` become `\ddd`.
pub fn encode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let code = c as u32;
        if code <= 32 || code == 127 || c == '#' || c == '\\' {
            out.push_str(&format!("\\{code:03}"));
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags() {
        assert_eq!(Value::Int(42).type_tag(), TypeTag::Int);
        assert_eq!(Value::Bool(true).type_tag(), TypeTag::Bool);
        assert_eq!(Value::string("a").type_tag(), TypeTag::String);
        assert_eq!(Value::Nil.type_tag(), TypeTag::Nil);
    }

    #[test]
    fn display_matches_write_rendering() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::string("ab c").to_string(), "ab c");
        assert_eq!(Value::Nil.to_string(), "");
    }

    #[test]
    fn equality_different_types() {
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::string(""), Value::Nil);
    }

    #[test]
    fn decode_basic_escapes() {
        assert_eq!(decode_escapes("a\\032b"), "a b");
        assert_eq!(decode_escapes("\\035\\092"), "#\\");
        assert_eq!(decode_escapes("\\010"), "\n");
    }

    #[test]
    fn decode_keeps_incomplete_escapes() {
        assert_eq!(decode_escapes("a\\12"), "a\\12");
        assert_eq!(decode_escapes("\\"), "\\");
        assert_eq!(decode_escapes("\\x41"), "\\x41");
    }

    #[test]
    fn decode_is_single_pass() {
        // \092 produces a backslash that must not start a second escape.
        assert_eq!(decode_escapes("\\092065"), "\\065");
    }

    #[test]
    fn decode_non_ascii_passthrough() {
        assert_eq!(decode_escapes("žluťoučký\\032kůň"), "žluťoučký kůň");
    }

    #[test]
    fn encode_escapes_whitespace_hash_backslash() {
        assert_eq!(encode_escapes("a b#c\\"), "a\\032b\\035c\\092");
        assert_eq!(encode_escapes("line\n"), "line\\010");
        assert_eq!(encode_escapes("plain"), "plain");
    }
}
