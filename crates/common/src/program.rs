//! Program representation.
//!
//! A program is the list of validated instructions sorted by declared
//! order. Orders need not be contiguous, but each must be unique; the
//! position in the sorted list is the instruction index the machine uses
//! for jumps and return addresses.

use crate::error::LoadError;
use crate::instruction::Instruction;
use crate::record::InstructionRecord;

/// A loaded program, sorted by ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    /// Sort instructions by order and reject duplicate orders.
    pub fn new(mut instructions: Vec<Instruction>) -> Result<Self, LoadError> {
        instructions.sort_by_key(|instr| instr.order);
        if let Some(pair) = instructions.windows(2).find(|w| w[0].order == w[1].order) {
            return Err(LoadError::DuplicateOrder {
                order: pair[0].order,
            });
        }
        Ok(Self { instructions })
    }

    /// Validate every record, then build the program.
    ///
    /// Records are validated in the order given; the first failure wins.
    pub fn from_records(records: &[InstructionRecord]) -> Result<Self, LoadError> {
        let instructions = records
            .iter()
            .map(Instruction::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(instructions)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// Records for every instruction, in program order.
    pub fn to_records(&self) -> Vec<InstructionRecord> {
        self.instructions.iter().map(Instruction::to_record).collect()
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
