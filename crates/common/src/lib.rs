//! framevm common types.
//!
//! This crate provides the data model shared by the machine, the assembler
//! and the command-line tool:
//!
//! - [`Opcode`]: the 35-opcode catalog with operand signatures
//! - [`Value`] and [`TypeTag`]: runtime values and their type names
//! - [`VarRef`] and [`Symbol`]: frame-qualified variables and readable operands
//! - [`InstructionRecord`]: unvalidated instructions as a loader delivers them
//! - [`Instruction`] and [`Op`]: validated instructions
//! - [`Program`]: instructions sorted by order
//! - [`LoadError`], [`Diagnosed`] and [`ExitCodes`]: error classes and exit codes
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and has no other dependencies.

pub mod error;
pub mod exit;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod record;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::{Diagnosed, ErrorClass, LoadError, Refinement};
pub use exit::{ExitCodes, MAX_EXIT_STATUS};
pub use instruction::{Instruction, Op, Operand};
pub use opcode::{OperandKind, Opcode};
pub use operand::{FrameKind, Symbol, VarRef};
pub use program::Program;
pub use record::{InstructionRecord, OperandRecord, OperandTag};
pub use type_tag::TypeTag;
pub use value::Value;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::Int),
            any::<bool>().prop_map(Value::Bool),
            "\\PC{0,12}".prop_map(Value::Str),
            Just(Value::Nil),
        ]
    }

    fn arb_var() -> impl Strategy<Value = VarRef> {
        (
            prop::sample::select(vec![FrameKind::Global, FrameKind::Temporary, FrameKind::Local]),
            "[a-z_][a-z0-9_$]{0,8}",
        )
            .prop_map(|(frame, name)| VarRef::new(frame, name))
    }

    fn arb_symbol() -> impl Strategy<Value = Symbol> {
        prop_oneof![arb_var().prop_map(Symbol::Var), arb_value().prop_map(Symbol::Const)]
    }

    proptest! {
        /// Escape encoding is undone exactly by decoding.
        #[test]
        fn escapes_roundtrip(s in "\\PC{0,24}|[ \\\\#\\t\\n]{0,8}") {
            prop_assert_eq!(value::decode_escapes(&value::encode_escapes(&s)), s);
        }

        /// Encoded strings contain no ASCII whitespace and no '#'.
        #[test]
        fn encoded_strings_are_token_safe(s in "\\PC{0,24}") {
            let encoded = value::encode_escapes(&s);
            prop_assert!(!encoded.chars().any(|c| c.is_ascii_whitespace() || c == '#'));
        }

        /// Any three-operand arithmetic instruction survives conversion to
        /// a record and back.
        #[test]
        fn record_conversion_roundtrip(
            order in 1u64..10_000,
            var in arb_var(),
            a in arb_symbol(),
            b in arb_symbol(),
        ) {
            let instr = Instruction::new(order, Op::Concat(var, a, b));
            prop_assert_eq!(Instruction::from_record(&instr.to_record()), Ok(instr));
        }

        /// Program construction always yields strictly increasing orders
        /// or a duplicate-order error.
        #[test]
        fn program_orders_sorted(orders in prop::collection::vec(0u64..50, 0..20)) {
            let instrs: Vec<_> = orders
                .iter()
                .map(|&o| Instruction::new(o, Op::Break))
                .collect();
            match Program::new(instrs) {
                Ok(program) => {
                    let sorted: Vec<_> = program.instructions().iter().map(|i| i.order).collect();
                    prop_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
                    prop_assert_eq!(sorted.len(), orders.len());
                }
                Err(LoadError::DuplicateOrder { order }) => {
                    prop_assert!(orders.iter().filter(|&&o| o == order).count() > 1);
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }
    }
}
