//! Label table: label name to instruction index, built once before
//! execution starts.

use std::collections::HashMap;

use framevm_common::{Op, Opcode, Program};

use crate::error::{ErrorKind, RuntimeError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: HashMap<String, usize>,
}

impl LabelTable {
    /// Scan every LABEL instruction. A name defined twice is an error
    /// reported against the second definition.
    pub fn build(program: &Program) -> Result<Self, RuntimeError> {
        let mut labels: HashMap<String, usize> = HashMap::new();

        for (index, instr) in program.instructions().iter().enumerate() {
            let Op::Label(name) = &instr.op else {
                continue;
            };
            if let Some(&first) = labels.get(name) {
                let first = program.get(first).map_or(0, |i| i.order);
                return Err(RuntimeError::new(
                    instr.order,
                    Opcode::Label,
                    ErrorKind::DuplicateLabel {
                        label: name.clone(),
                        first,
                    },
                ));
            }
            labels.insert(name.clone(), index);
        }

        Ok(Self { labels })
    }

    /// Instruction index of the LABEL with this name.
    pub fn resolve(&self, name: &str) -> Result<usize, ErrorKind> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| ErrorKind::UndefinedLabel {
                label: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
