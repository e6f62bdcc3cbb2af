//! XML program loader.
//!
//! The document is a `<program>` element holding `<instruction order="N"
//! opcode="NAME">` elements. Each instruction has `<arg1>`..`<arg3>`
//! children with a `type` attribute and the operand text as content.
//! Elements become instruction records; operand validation is done by
//! [`Instruction::from_record`].

use framevm_common::{Instruction, InstructionRecord, OperandRecord, Program};
use roxmltree::{Document, Node};

use crate::error::AsmError;
use crate::program_from_lines;

/// Load a program from an XML document.
pub fn load_xml(text: &str) -> Result<Program, AsmError> {
    let doc = Document::parse(text).map_err(|e| AsmError::Xml {
        line: e.pos().row as usize,
        message: e.to_string(),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "program" {
        return Err(unexpected(root));
    }

    let mut instructions = Vec::new();
    for node in root.children().filter(Node::is_element) {
        let line = line_of(node);
        let record = instruction_record(node, line)?;
        let instr =
            Instruction::from_record(&record).map_err(|source| AsmError::Load { line, source })?;
        instructions.push((line, instr));
    }
    program_from_lines(instructions)
}

fn instruction_record(node: Node, line: usize) -> Result<InstructionRecord, AsmError> {
    if node.tag_name().name() != "instruction" {
        return Err(unexpected(node));
    }

    let order_text = required(node, "order", line)?;
    let order = order_text
        .trim()
        .parse::<u64>()
        .map_err(|_| AsmError::InvalidOrder {
            line,
            token: order_text.clone(),
        })?;
    let opcode = required(node, "opcode", line)?;

    let operands = node
        .children()
        .filter(Node::is_element)
        .map(operand_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InstructionRecord::new(order, opcode.trim(), operands))
}

/// `argN` becomes slot N. Only string text keeps its surrounding whitespace.
fn operand_record(node: Node) -> Result<OperandRecord, AsmError> {
    let slot = node
        .tag_name()
        .name()
        .strip_prefix("arg")
        .filter(|n| n.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|n| n.parse::<u8>().ok())
        .ok_or_else(|| unexpected(node))?;

    let type_tag = node.attribute("type").map(str::to_string);
    let raw = node.text().unwrap_or("");
    let text = if type_tag.as_deref() == Some("string") {
        raw
    } else {
        raw.trim()
    };

    Ok(OperandRecord {
        slot,
        type_tag,
        text: text.to_string(),
    })
}

fn required(node: Node, attribute: &'static str, line: usize) -> Result<String, AsmError> {
    node.attribute(attribute)
        .map(str::to_string)
        .ok_or_else(|| AsmError::MissingAttribute {
            line,
            element: node.tag_name().name().to_string(),
            attribute,
        })
}

fn unexpected(node: Node) -> AsmError {
    AsmError::UnexpectedElement {
        line: line_of(node),
        name: node.tag_name().name().to_string(),
    }
}

fn line_of(node: Node) -> usize {
    node.document().text_pos_at(node.range().start).row as usize
}
