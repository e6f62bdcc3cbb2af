//! Frame manager: the global frame, the temporary frame slot and the local
//! frame stack.
//!
//! Frames move between the temporary slot and the local stack by value.
//! PUSHFRAME takes the frame out of the slot and pushes it; POPFRAME pops it
//! and puts it back into the slot.

use std::collections::HashMap;

use framevm_common::{FrameKind, TypeTag, Value, VarRef};
use tracing::trace;

use crate::error::ErrorKind;

/// One scope of variables. `None` marks a defined but uninitialised variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    vars: HashMap<String, Option<Value>>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Variable names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.vars.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[derive(Debug, Clone, Default)]
pub struct FrameManager {
    global: Frame,
    temporary: Option<Frame>,
    locals: Vec<Frame>,
}

impl FrameManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// The top of the local stack.
    pub fn local(&self) -> Option<&Frame> {
        self.locals.last()
    }

    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }

    fn frame(&self, kind: FrameKind) -> Result<&Frame, ErrorKind> {
        match kind {
            FrameKind::Global => Some(&self.global),
            FrameKind::Temporary => self.temporary.as_ref(),
            FrameKind::Local => self.locals.last(),
        }
        .ok_or(ErrorKind::MissingFrame { frame: kind })
    }

    fn frame_mut(&mut self, kind: FrameKind) -> Result<&mut Frame, ErrorKind> {
        match kind {
            FrameKind::Global => Some(&mut self.global),
            FrameKind::Temporary => self.temporary.as_mut(),
            FrameKind::Local => self.locals.last_mut(),
        }
        .ok_or(ErrorKind::MissingFrame { frame: kind })
    }

    fn slot(&self, var: &VarRef) -> Result<&Option<Value>, ErrorKind> {
        self.frame(var.frame)?
            .vars
            .get(&var.name)
            .ok_or_else(|| ErrorKind::UndefinedVariable {
                var: var.to_string(),
            })
    }

    /// DEFVAR: create an uninitialised variable.
    pub fn define(&mut self, var: &VarRef) -> Result<(), ErrorKind> {
        let frame = self.frame_mut(var.frame)?;
        if frame.contains(&var.name) {
            return Err(ErrorKind::Redefinition {
                var: var.to_string(),
            });
        }
        frame.vars.insert(var.name.clone(), None);
        Ok(())
    }

    /// The current value of an initialised variable.
    pub fn read(&self, var: &VarRef) -> Result<&Value, ErrorKind> {
        self.slot(var)?
            .as_ref()
            .ok_or_else(|| ErrorKind::Uninitialized {
                var: var.to_string(),
            })
    }

    /// Type of a defined variable; `None` while it is uninitialised.
    pub fn type_of(&self, var: &VarRef) -> Result<Option<TypeTag>, ErrorKind> {
        Ok(self.slot(var)?.as_ref().map(Value::type_tag))
    }

    /// Assign a defined variable.
    pub fn write(&mut self, var: &VarRef, value: Value) -> Result<(), ErrorKind> {
        let slot = self
            .frame_mut(var.frame)?
            .vars
            .get_mut(&var.name)
            .ok_or_else(|| ErrorKind::UndefinedVariable {
                var: var.to_string(),
            })?;
        *slot = Some(value);
        Ok(())
    }

    /// CREATEFRAME: replace the temporary frame with a fresh one.
    pub fn create_temp(&mut self) {
        self.temporary = Some(Frame::new());
    }

    /// PUSHFRAME: move the temporary frame onto the local stack.
    pub fn push_temp_to_local(&mut self) -> Result<(), ErrorKind> {
        let frame = self.temporary.take().ok_or(ErrorKind::MissingFrame {
            frame: FrameKind::Temporary,
        })?;
        self.locals.push(frame);
        trace!(depth = self.locals.len(), "local frame pushed");
        Ok(())
    }

    /// POPFRAME: move the top local frame into the temporary slot.
    pub fn pop_local_to_temp(&mut self) -> Result<(), ErrorKind> {
        let frame = self.locals.pop().ok_or(ErrorKind::MissingFrame {
            frame: FrameKind::Local,
        })?;
        self.temporary = Some(frame);
        trace!(depth = self.locals.len(), "local frame popped");
        Ok(())
    }
}
