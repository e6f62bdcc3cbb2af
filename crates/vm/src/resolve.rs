//! Operand resolution: turns a [`Symbol`] into a value or a type against the
//! current frame state.

use framevm_common::{Symbol, TypeTag, Value};

use crate::error::ErrorKind;
use crate::frame::FrameManager;

/// The value a symbol denotes. Literals are returned as stored (string
/// escapes were decoded at load time); variables must be initialised.
pub fn value_of<'a>(frames: &'a FrameManager, symbol: &'a Symbol) -> Result<&'a Value, ErrorKind> {
    match symbol {
        Symbol::Const(value) => Ok(value),
        Symbol::Var(var) => frames.read(var),
    }
}

/// The type a symbol denotes, or `None` for an uninitialised variable.
///
/// Unlike [`value_of`] this never fails on an uninitialised variable; it
/// still fails on an undefined one or a missing frame.
pub fn type_of(frames: &FrameManager, symbol: &Symbol) -> Result<Option<TypeTag>, ErrorKind> {
    match symbol {
        Symbol::Const(value) => Ok(Some(value.type_tag())),
        Symbol::Var(var) => frames.type_of(var),
    }
}
