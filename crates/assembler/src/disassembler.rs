//! Disassembler: program to canonical assembly text.
//!
//! Output starts with the `.framecode` header, then one instruction per
//! line with an explicit order prefix. No indentation, no comments.

use framevm_common::{OperandTag, Program};

/// Disassemble a program into canonical assembly text.
///
/// The output is guaranteed to reassemble to an identical program
/// (`assemble(disassemble(program)) == program`).
pub fn disassemble(program: &Program) -> String {
    let mut out = String::from(".framecode\n");

    for record in program.to_records() {
        out.push_str(&format!("{}: {}", record.order, record.opcode));
        for operand in &record.operands {
            let tag = operand
                .type_tag
                .as_deref()
                .and_then(OperandTag::lookup);
            out.push(' ');
            match tag {
                Some(tag) if tag.is_literal() => {
                    out.push_str(&format!("{}@{}", tag, operand.text));
                }
                _ => out.push_str(&operand.text),
            }
        }
        out.push('\n');
    }

    out
}
