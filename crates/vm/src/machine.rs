//! VM state management: frames, data stack, call stack, label table.

use framevm_common::{Instruction, Program, Symbol, Value};

use crate::error::{ErrorKind, RuntimeError};
use crate::frame::FrameManager;
use crate::io::Io;
use crate::labels::LabelTable;
use crate::resolve;

/// Default bound on pending CALL return addresses.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100_000;
/// Default bound on values held by the data stack.
pub const DEFAULT_MAX_DATA_STACK: usize = 1_000_000;
/// Default bound on the depth of the local frame stack.
pub const DEFAULT_MAX_LOCAL_FRAMES: usize = 100_000;

/// Resource bounds for a run. Exceeding one is a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum number of pending CALL return addresses.
    pub max_call_depth: usize,
    /// Maximum number of values on the data stack.
    pub max_data_stack: usize,
    /// Maximum number of local frames.
    pub max_local_frames: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_data_stack: DEFAULT_MAX_DATA_STACK,
            max_local_frames: DEFAULT_MAX_LOCAL_FRAMES,
        }
    }
}

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The program counter ran past the last instruction.
    Completed,
    /// EXIT was executed with this status.
    Exited(u8),
}

impl Outcome {
    /// Process exit status for this outcome.
    pub fn status(&self) -> u8 {
        match self {
            Outcome::Completed => 0,
            Outcome::Exited(code) => *code,
        }
    }
}

/// The framevm virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    pub(crate) labels: LabelTable,
    pub(crate) frames: FrameManager,
    /// PUSHS/POPS stack.
    pub(crate) data_stack: Vec<Value>,
    /// Return addresses (instruction indices).
    pub(crate) call_stack: Vec<usize>,
    /// Index of the next instruction to fetch.
    pub(crate) pc: usize,
    /// Instructions executed so far.
    pub(crate) steps: u64,
    pub(crate) config: VmConfig,
    pub(crate) io: Io<'a>,
}

impl<'a> VM<'a> {
    /// Create a new VM for the given program.
    pub fn new(program: &'a Program, io: Io<'a>, config: VmConfig) -> Self {
        Self {
            program,
            labels: LabelTable::default(),
            frames: FrameManager::new(),
            data_stack: Vec::new(),
            call_stack: Vec::new(),
            pc: 0,
            steps: 0,
            config,
            io,
        }
    }

    pub fn frames(&self) -> &FrameManager {
        &self.frames
    }

    pub fn data_stack(&self) -> &[Value] {
        &self.data_stack
    }

    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Build the label table. Runs before the first instruction.
    pub(crate) fn scan_labels(&mut self) -> Result<(), RuntimeError> {
        self.labels = LabelTable::build(self.program)?;
        Ok(())
    }

    /// Fetch the instruction at the current pc, or `None` past the end.
    pub(crate) fn fetch(&self) -> Option<&'a Instruction> {
        self.program.get(self.pc)
    }

    /// Push a value onto the data stack, checking the configured bound.
    pub(crate) fn push(&mut self, value: Value) -> Result<(), ErrorKind> {
        let limit = self.config.max_data_stack;
        if self.data_stack.len() >= limit {
            return Err(ErrorKind::ResourceExhausted {
                resource: "data stack",
                limit,
            });
        }
        self.data_stack.push(value);
        Ok(())
    }

    /// Pop a value from the data stack.
    pub(crate) fn pop(&mut self) -> Result<Value, ErrorKind> {
        self.data_stack.pop().ok_or(ErrorKind::EmptyDataStack)
    }

    /// Push a return address, checking the configured bound.
    pub(crate) fn push_return(&mut self, index: usize) -> Result<(), ErrorKind> {
        let limit = self.config.max_call_depth;
        if self.call_stack.len() >= limit {
            return Err(ErrorKind::ResourceExhausted {
                resource: "call stack",
                limit,
            });
        }
        self.call_stack.push(index);
        Ok(())
    }

    /// PUSHFRAME, checking the configured local frame bound.
    pub(crate) fn push_frame(&mut self) -> Result<(), ErrorKind> {
        let limit = self.config.max_local_frames;
        if self.frames.local_depth() >= limit {
            return Err(ErrorKind::ResourceExhausted {
                resource: "local frame stack",
                limit,
            });
        }
        self.frames.push_temp_to_local()
    }

    pub(crate) fn pop_return(&mut self) -> Result<usize, ErrorKind> {
        self.call_stack.pop().ok_or(ErrorKind::EmptyCallStack)
    }

    /// Resolve a readable operand.
    pub(crate) fn value<'s>(&'s self, symbol: &'s Symbol) -> Result<&'s Value, ErrorKind> {
        resolve::value_of(&self.frames, symbol)
    }
}
