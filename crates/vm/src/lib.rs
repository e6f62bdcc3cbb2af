//! framevm virtual machine: executes order-sorted instruction programs.
//!
//! The machine has:
//! - A global frame, an optional temporary frame and a stack of local frames
//! - A data stack for PUSHS/POPS
//! - A call stack of return addresses for CALL/RETURN
//! - A label table built once before the first instruction runs
//!
//! # Usage
//!
//! ```
//! use framevm_common::{Instruction, Op, Program, Symbol, Value};
//! use framevm_vm::{run, BufReadSource, Io, Outcome};
//!
//! let program = Program::new(vec![
//!     Instruction::new(1, Op::Write(Symbol::Const(Value::string("hi")))),
//! ])
//! .unwrap();
//!
//! let mut input = BufReadSource::new(std::io::empty());
//! let (mut out, mut diag) = (Vec::new(), Vec::new());
//! let outcome = run(&program, Io::new(&mut input, &mut out, &mut diag)).unwrap();
//! assert_eq!(outcome, Outcome::Completed);
//! assert_eq!(out, b"hi");
//! ```

pub mod error;
pub mod execute;
pub mod frame;
pub mod io;
pub mod labels;
pub mod machine;
pub mod resolve;

pub use error::{ErrorKind, RuntimeError};
pub use frame::{Frame, FrameManager};
pub use io::{BufReadSource, Io, LineSource};
pub use labels::LabelTable;
pub use machine::{
    Outcome, VmConfig, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_DATA_STACK, DEFAULT_MAX_LOCAL_FRAMES,
    VM,
};

use framevm_common::Program;

/// Execute a program under the default resource bounds.
///
/// # Errors
///
/// Returns [`RuntimeError`] for a duplicate label or any fatal condition
/// raised by an instruction.
pub fn run<'a>(program: &'a Program, io: Io<'a>) -> Result<Outcome, RuntimeError> {
    run_with(program, io, VmConfig::default())
}

/// Execute a program under the given resource bounds.
pub fn run_with<'a>(
    program: &'a Program,
    io: Io<'a>,
    config: VmConfig,
) -> Result<Outcome, RuntimeError> {
    let mut vm = VM::new(program, io, config);
    vm.execute()
}
