//! Parser for framevm assembly tokens to instruction records.
//!
//! Operands are placed by the opcode signature: variables and literals are
//! written `FRAME@name` and `type@value`, labels and type names are bare.
//! Record-level checks (literal syntax, identifier rules, operand kinds)
//! are left to [`Instruction::from_record`](framevm_common::Instruction::from_record).

use crate::error::AsmError;
use crate::lexer::Token;
use framevm_common::{FrameKind, InstructionRecord, OperandKind, OperandRecord, OperandTag, Opcode};

/// Parse one tokenized line into a record.
///
/// `next_order` is the order an instruction gets without an explicit
/// prefix. Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(
    tokens: &[Token],
    line_num: usize,
    next_order: u64,
) -> Result<Option<InstructionRecord>, AsmError> {
    let (order, rest) = match tokens {
        [] => return Ok(None),
        [Token::Order(order), rest @ ..] => (*order, rest),
        _ => (next_order, tokens),
    };

    let (mnemonic, args) = match rest {
        [Token::Word(mnemonic), args @ ..] => (mnemonic.as_str(), args),
        [Token::Order(order), ..] => return Err(unexpected(line_num, &format!("{order}:"))),
        [] => return Err(unexpected(line_num, &format!("{order}:"))),
    };

    let opcode = Opcode::lookup(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    let signature = opcode.signature();
    if args.len() < signature.len() {
        return Err(AsmError::MissingOperand {
            line: line_num,
            opcode: opcode.mnemonic(),
            expected: signature.len(),
        });
    }

    let mut operands = Vec::with_capacity(signature.len());
    for (i, (kind, token)) in signature.iter().zip(args).enumerate() {
        let Token::Word(word) = token else {
            return Err(unexpected(line_num, "order prefix"));
        };
        let slot = i as u8 + 1;
        operands.push(parse_operand(*kind, word, slot, line_num)?);
    }

    if let Some(extra) = args.get(signature.len()) {
        let text = match extra {
            Token::Word(w) => w.clone(),
            Token::Order(o) => format!("{o}:"),
        };
        return Err(unexpected(line_num, &text));
    }

    Ok(Some(InstructionRecord::new(order, mnemonic, operands)))
}

fn parse_operand(
    kind: OperandKind,
    word: &str,
    slot: u8,
    line_num: usize,
) -> Result<OperandRecord, AsmError> {
    match (kind, word.split_once('@')) {
        (OperandKind::Label, None) => Ok(OperandRecord::new(slot, OperandTag::Label.name(), word)),
        (OperandKind::Type, None) => Ok(OperandRecord::new(slot, OperandTag::Type.name(), word)),
        (_, Some((prefix, text))) => {
            if FrameKind::from_prefix(prefix).is_some() {
                Ok(OperandRecord::new(slot, OperandTag::Var.name(), word))
            } else {
                match OperandTag::lookup(prefix) {
                    Some(tag) if tag.is_literal() => Ok(OperandRecord::new(slot, tag.name(), text)),
                    _ => Err(AsmError::MalformedOperand {
                        line: line_num,
                        token: word.to_string(),
                    }),
                }
            }
        }
        (OperandKind::Var | OperandKind::Symb, None) => Err(AsmError::MalformedOperand {
            line: line_num,
            token: word.to_string(),
        }),
    }
}

fn unexpected(line_num: usize, token: &str) -> AsmError {
    AsmError::UnexpectedToken {
        line: line_num,
        token: token.to_string(),
    }
}
