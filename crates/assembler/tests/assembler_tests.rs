//! Integration tests for the framevm assembler.
//!
//! Tests cover:
//! - Complete programs (assemble, then execute on the machine)
//! - Roundtrip properties (disassemble then assemble)
//! - Error cases with line numbers and error classes

use framevm_assembler::{assemble, disassemble, AsmError};
use framevm_common::{
    Diagnosed, ErrorClass, ExitCodes, FrameKind, Instruction, LoadError, Op, Program, Symbol,
    TypeTag, Value, VarRef,
};
use framevm_vm::{run, BufReadSource, Io, Outcome, RuntimeError};

// ---- Test helpers ----

/// Assemble and run `source` against `input`, returning the outcome and
/// both output channels.
fn execute(source: &str, input: &str) -> (Result<Outcome, RuntimeError>, String, String) {
    let program = assemble(source).unwrap_or_else(|e| panic!("assembly failed: {e}"));
    let mut lines = BufReadSource::new(input.as_bytes());
    let (mut out, mut diag) = (Vec::new(), Vec::new());
    let result = run(&program, Io::new(&mut lines, &mut out, &mut diag));
    (
        result,
        String::from_utf8(out).unwrap(),
        String::from_utf8(diag).unwrap(),
    )
}

fn stdout_of(source: &str, input: &str) -> String {
    let (result, out, err) = execute(source, input);
    assert_eq!(result, Ok(Outcome::Completed), "stderr: {err}");
    out
}

// ---- Complete programs ----

const HELLO: &str = "\
.framecode
DEFVAR GF@greeting
MOVE GF@greeting string@Hello,\\032world!\\010
WRITE GF@greeting
";

#[test]
fn hello_world() {
    assert_eq!(stdout_of(HELLO, ""), "Hello, world!\n");
}

const COUNTDOWN: &str = "\
.framecode
# counts down from the number on the first input line
DEFVAR GF@n
READ GF@n int
LABEL loop
JUMPIFEQ done GF@n int@0
WRITE GF@n
WRITE string@\\032
SUB GF@n GF@n int@1
JUMP loop
LABEL done
WRITE string@liftoff
";

#[test]
fn countdown_loop() {
    assert_eq!(stdout_of(COUNTDOWN, "3\n"), "3 2 1 liftoff");
}

const SPARSE_ORDERS: &str = "\
.framecode
30: WRITE string@c
10: WRITE string@a
20: WRITE string@b
";

#[test]
fn orders_decide_execution_sequence() {
    assert_eq!(stdout_of(SPARSE_ORDERS, ""), "abc");
}

const FACTORIAL: &str = "\
.framecode
DEFVAR GF@n
READ GF@n int
PUSHS GF@n
CALL fact
POPS GF@n
WRITE GF@n
EXIT int@0

LABEL fact
CREATEFRAME
PUSHFRAME
DEFVAR LF@n
DEFVAR LF@r
POPS LF@n
JUMPIFNEQ recurse LF@n int@0
PUSHS int@1
POPFRAME
RETURN
LABEL recurse
SUB LF@r LF@n int@1
PUSHS LF@r
CALL fact
POPS LF@r
MUL LF@r LF@r LF@n
PUSHS LF@r
POPFRAME
RETURN
";

#[test]
fn recursive_factorial() {
    let (result, out, _) = execute(FACTORIAL, "10\n");
    assert_eq!(result, Ok(Outcome::Exited(0)));
    assert_eq!(out, "3628800");
}

const STRINGS: &str = "\
.framecode
DEFVAR GF@s
DEFVAR GF@c
DEFVAR GF@len
MOVE GF@s string@žluťoučký
STRLEN GF@len GF@s
GETCHAR GF@c GF@s int@3
SETCHAR GF@s int@0 string@Z
WRITE GF@len
WRITE string@\\032
WRITE GF@c
WRITE string@\\032
WRITE GF@s
";

#[test]
fn unicode_string_operations() {
    assert_eq!(stdout_of(STRINGS, ""), "9 ť Zluťoučký");
}

const READ_ALL_TYPES: &str = "\
.framecode
DEFVAR GF@v
DEFVAR GF@t
READ GF@v bool
TYPE GF@t GF@v
WRITE GF@t
READ GF@v int
TYPE GF@t GF@v
WRITE GF@t
READ GF@v string
TYPE GF@t GF@v
WRITE GF@t
";

#[test]
fn read_with_missing_input_yields_nil() {
    assert_eq!(stdout_of(READ_ALL_TYPES, "true\nnot a number\n"), "boolnilnil");
}

#[test]
fn runtime_error_has_class_code() {
    let (result, _, _) = execute("DEFVAR GF@x\nIDIV GF@x int@1 int@0\n", "");
    let err = result.unwrap_err();
    assert_eq!(err.order, 2);
    assert_eq!(ExitCodes::classic().code_for(&err), 57);
}

#[test]
fn dprint_goes_to_diagnostics() {
    let (result, out, err) = execute("DPRINT string@x\nWRITE int@1\n", "");
    assert_eq!(result, Ok(Outcome::Completed));
    assert_eq!(out, "1");
    assert_eq!(err, "string");
}

// ---- Error cases ----

#[test]
fn unknown_opcode_reports_line() {
    let err = assemble("BREAK\n\nNOPE GF@x\n").unwrap_err();
    assert_eq!(
        err,
        AsmError::UnknownOpcode {
            line: 3,
            token: "NOPE".into()
        }
    );
    assert_eq!(err.class(), ErrorClass::Structural);
}

#[test]
fn missing_operand() {
    let err = assemble("ADD GF@x int@1\n").unwrap_err();
    assert_eq!(
        err,
        AsmError::MissingOperand {
            line: 1,
            opcode: "ADD",
            expected: 3
        }
    );
}

#[test]
fn literal_in_variable_slot() {
    let err = assemble("DEFVAR int@1\n").unwrap_err();
    assert!(matches!(
        err,
        AsmError::Load {
            line: 1,
            source: LoadError::OperandKindMismatch { .. }
        }
    ));
    assert_eq!(ExitCodes::classic().code_for(&err), 50);
}

#[test]
fn invalid_type_name() {
    assert!(matches!(
        assemble("READ GF@x float\n"),
        Err(AsmError::Load {
            source: LoadError::InvalidTypeName { .. },
            ..
        })
    ));
}

#[test]
fn invalid_variable_name() {
    assert!(matches!(
        assemble("DEFVAR GF@1x\n"),
        Err(AsmError::Load {
            source: LoadError::InvalidVariable { .. },
            ..
        })
    ));
}

#[test]
fn duplicate_order() {
    let err = assemble("5: BREAK\n4: BREAK\nBREAK\n").unwrap_err();
    assert_eq!(
        err,
        AsmError::Load {
            line: 3,
            source: LoadError::DuplicateOrder { order: 5 }
        }
    );
}

#[test]
fn duplicate_label_is_a_runtime_semantic_error() {
    let (result, out, _) = execute("WRITE int@1\nLABEL a\nLABEL a\n", "");
    let err = result.unwrap_err();
    assert_eq!(err.class(), ErrorClass::Semantic);
    assert_eq!(out, "");
}

// ---- Roundtrip ----

#[test]
fn disassemble_is_canonical() {
    let program = assemble("  defvar   GF@x # c\nmove GF@x bool@true\n").unwrap();
    assert_eq!(
        disassemble(&program),
        ".framecode\n1: DEFVAR GF@x\n2: MOVE GF@x bool@true\n"
    );
}

#[test]
fn example_programs_roundtrip() {
    for source in [HELLO, COUNTDOWN, SPARSE_ORDERS, FACTORIAL, STRINGS, READ_ALL_TYPES] {
        let program = assemble(source).unwrap();
        let text = disassemble(&program);
        assert_eq!(assemble(&text).unwrap(), program);
        assert_eq!(disassemble(&assemble(&text).unwrap()), text);
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn arb_var() -> impl Strategy<Value = VarRef> {
        (
            prop::sample::select(vec![FrameKind::Global, FrameKind::Temporary, FrameKind::Local]),
            "[a-zA-Z_$&%*!?-][a-zA-Z0-9_$&%*!?-]{0,6}",
        )
            .prop_map(|(frame, name)| VarRef::new(frame, name))
    }

    fn arb_symbol() -> impl Strategy<Value = Symbol> {
        prop_oneof![
            arb_var().prop_map(Symbol::Var),
            any::<i64>().prop_map(|i| Symbol::Const(Value::Int(i))),
            any::<bool>().prop_map(|b| Symbol::Const(Value::Bool(b))),
            "\\PC{0,10}|[ #\\\\\\t]{0,4}".prop_map(|s| Symbol::Const(Value::Str(s))),
            Just(Symbol::Const(Value::Nil)),
        ]
    }

    fn arb_label() -> impl Strategy<Value = String> {
        "[a-z_][a-zA-Z0-9_]{0,6}"
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::CreateFrame),
            Just(Op::Return),
            arb_var().prop_map(Op::DefVar),
            arb_label().prop_map(Op::Label),
            arb_label().prop_map(Op::Call),
            arb_symbol().prop_map(Op::Write),
            (arb_var(), arb_symbol()).prop_map(|(v, s)| Op::Move(v, s)),
            (arb_var(), prop::sample::select(vec![TypeTag::Int, TypeTag::Bool, TypeTag::String]))
                .prop_map(|(v, t)| Op::Read(v, t)),
            (arb_var(), arb_symbol(), arb_symbol()).prop_map(|(v, a, b)| Op::Concat(v, a, b)),
            (arb_label(), arb_symbol(), arb_symbol()).prop_map(|(l, a, b)| Op::JumpIfNeq(l, a, b)),
        ]
    }

    fn arb_program() -> impl Strategy<Value = Program> {
        prop::collection::btree_map(any::<u32>(), arb_op(), 0..20).prop_map(|ops| {
            let instructions = ops
                .into_iter()
                .map(|(order, op)| Instruction::new(u64::from(order), op))
                .collect();
            Program::new(instructions).unwrap()
        })
    }

    proptest! {
        /// For all programs, disassemble then assemble gives the original.
        #[test]
        fn disassemble_assemble_roundtrip(program in arb_program()) {
            let text = disassemble(&program);
            prop_assert_eq!(assemble(&text), Ok(program));
        }
    }
}
