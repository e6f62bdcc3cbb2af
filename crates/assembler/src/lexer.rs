//! Tokenizer for framevm assembly text.

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An explicit `ORDER:` prefix. Only recognised as the first word.
    Order(u64),
    /// Any other word, case preserved.
    Word(String),
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `#` and extend to end of line. Words are separated
/// by ASCII whitespace.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };

    let mut tokens = Vec::new();
    for (i, word) in line.split_ascii_whitespace().enumerate() {
        let token = match word.strip_suffix(':') {
            Some(digits) if i == 0 => {
                let order = digits.parse().map_err(|_| AsmError::InvalidOrder {
                    line: line_num,
                    token: word.to_string(),
                })?;
                Token::Order(order)
            }
            _ => Token::Word(word.to_string()),
        };
        tokens.push(token);
    }

    Ok(tokens)
}
