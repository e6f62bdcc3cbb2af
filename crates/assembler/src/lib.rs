//! framevm assembler: bidirectional text to program translation, plus an
//! XML program loader.
//!
//! Source text is line-oriented. Each instruction line is an optional
//! `ORDER:` prefix, a mnemonic and its operands; without a prefix the order
//! is one more than the previous instruction's (starting at 1). `#` starts
//! a comment and an optional `.framecode` header may open the file.
//!
//! # Usage
//!
//! ```
//! use framevm_assembler::{assemble, disassemble};
//!
//! let text = ".framecode\n1: DEFVAR GF@x\n2: MOVE GF@x string@hi\n3: WRITE GF@x\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.len(), 3);
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for all valid programs.
//! The disassembler outputs canonical text; the assembler also accepts
//! lowercase mnemonics, implicit orders and any operand spacing.
//!
//! # XML
//!
//! [`load`] also accepts programs as XML documents (see [`load_xml`]),
//! recognised by a leading `<`.

pub mod error;

mod disassembler;
mod lexer;
mod parser;
mod xml;

pub use error::AsmError;
pub use xml::load_xml;

use std::collections::HashMap;

use framevm_common::{Instruction, LoadError, Program};
use lexer::{tokenize_line, Token};
use parser::parse_line;

/// Load a program from assembly text or XML, whichever `text` holds.
pub fn load(text: &str) -> Result<Program, AsmError> {
    if is_xml(text) {
        load_xml(text)
    } else {
        assemble(text)
    }
}

/// True when the first non-blank character is `<`.
pub fn is_xml(text: &str) -> bool {
    text.trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with('<')
}

/// Assemble text into a program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();
    let mut next_order = 1;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;

        if instructions.is_empty() && is_header(&tokens) {
            continue;
        }

        let Some(record) = parse_line(&tokens, line_num, next_order)? else {
            continue;
        };
        let instr = Instruction::from_record(&record).map_err(|source| AsmError::Load {
            line: line_num,
            source,
        })?;

        next_order = instr.order.checked_add(1).ok_or_else(|| AsmError::InvalidOrder {
            line: line_num,
            token: instr.order.to_string(),
        })?;
        instructions.push((line_num, instr));
    }

    program_from_lines(instructions)
}

/// Build a program from instructions tagged with their source lines. A
/// duplicate order is reported at the line of its later occurrence.
pub(crate) fn program_from_lines(
    instructions: Vec<(usize, Instruction)>,
) -> Result<Program, AsmError> {
    let mut line_of_order: HashMap<u64, usize> = HashMap::new();
    let instructions = instructions
        .into_iter()
        .map(|(line, instr)| {
            line_of_order.insert(instr.order, line);
            instr
        })
        .collect();

    Program::new(instructions).map_err(|source| {
        let line = match &source {
            LoadError::DuplicateOrder { order } => {
                line_of_order.get(order).copied().unwrap_or(0)
            }
            _ => 0,
        };
        AsmError::Load { line, source }
    })
}

fn is_header(tokens: &[Token]) -> bool {
    matches!(tokens, [Token::Word(w)] if w.eq_ignore_ascii_case(".framecode"))
}

/// Disassemble a program into canonical assembly text.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
