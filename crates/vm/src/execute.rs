//! Main execution loop and opcode dispatch for the framevm machine.

use std::cmp::Ordering;

use framevm_common::{Instruction, Op, Symbol, TypeTag, Value, VarRef, MAX_EXIT_STATUS};
use tracing::{debug, trace};

use crate::error::{ErrorKind, RuntimeError};
use crate::machine::{Outcome, VM};
use crate::resolve;

/// What the loop does after an instruction.
enum Step {
    Next,
    Exit(u8),
}

impl<'a> VM<'a> {
    /// Execute the program until the pc runs past the end, EXIT, or error.
    pub fn execute(&mut self) -> Result<Outcome, RuntimeError> {
        self.scan_labels()?;
        debug!(
            instructions = self.program.len(),
            labels = self.labels.len(),
            "run started"
        );

        let outcome = loop {
            let Some(instr) = self.fetch() else {
                break Outcome::Completed;
            };
            trace!(order = instr.order, opcode = %instr.opcode(), pc = self.pc, "dispatch");
            self.steps += 1;
            self.pc += 1;

            match self.dispatch(instr) {
                Ok(Step::Next) => {}
                Ok(Step::Exit(code)) => break Outcome::Exited(code),
                Err(kind) => {
                    debug!(order = instr.order, steps = self.steps, error = %kind, "run failed");
                    return Err(RuntimeError::new(instr.order, instr.opcode(), kind));
                }
            }
        };

        debug!(?outcome, steps = self.steps, "run finished");
        Ok(outcome)
    }

    fn dispatch(&mut self, instr: &Instruction) -> Result<Step, ErrorKind> {
        match &instr.op {
            // Frames and calls
            Op::CreateFrame => self.frames.create_temp(),
            Op::PushFrame => self.push_frame()?,
            Op::PopFrame => self.frames.pop_local_to_temp()?,
            Op::DefVar(var) => self.frames.define(var)?,
            Op::Call(label) => self.exec_call(label)?,
            Op::Return => self.exec_return()?,

            // Data stack
            Op::PushS(symb) => {
                let value = self.value(symb)?.clone();
                self.push(value)?;
            }
            Op::PopS(var) => {
                let value = self.pop()?;
                self.frames.write(var, value)?;
            }

            // Arithmetic, relational, boolean and conversion
            Op::Move(var, symb) => {
                let value = self.value(symb)?.clone();
                self.frames.write(var, value)?;
            }
            Op::Add(var, a, b) => self.exec_arith(var, a, b, i64::wrapping_add)?,
            Op::Sub(var, a, b) => self.exec_arith(var, a, b, i64::wrapping_sub)?,
            Op::Mul(var, a, b) => self.exec_arith(var, a, b, i64::wrapping_mul)?,
            Op::IDiv(var, a, b) => self.exec_idiv(var, a, b)?,
            Op::Lt(var, a, b) => self.exec_relational(var, a, b, Ordering::Less)?,
            Op::Gt(var, a, b) => self.exec_relational(var, a, b, Ordering::Greater)?,
            Op::Eq(var, a, b) => {
                let result = equal(self.value(a)?, self.value(b)?)?;
                self.frames.write(var, Value::Bool(result))?;
            }
            Op::And(var, a, b) => self.exec_logic(var, a, b, |x, y| x && y)?,
            Op::Or(var, a, b) => self.exec_logic(var, a, b, |x, y| x || y)?,
            Op::Not(var, symb) => {
                let result = !expect_bool(self.value(symb)?)?;
                self.frames.write(var, Value::Bool(result))?;
            }
            Op::Int2Char(var, symb) => self.exec_int2char(var, symb)?,
            Op::Stri2Int(var, a, b) => self.exec_stri2int(var, a, b)?,

            // Input and output
            Op::Read(var, ty) => self.exec_read(var, *ty)?,
            Op::Write(symb) => self.exec_write(symb)?,

            // Strings
            Op::Concat(var, a, b) => self.exec_concat(var, a, b)?,
            Op::StrLen(var, symb) => self.exec_strlen(var, symb)?,
            Op::GetChar(var, a, b) => self.exec_getchar(var, a, b)?,
            Op::SetChar(var, a, b) => self.exec_setchar(var, a, b)?,

            // Types
            Op::Type(var, symb) => self.exec_type(var, symb)?,

            // Control flow
            Op::Label(_) => {}
            Op::Jump(label) => self.pc = self.labels.resolve(label)?,
            Op::JumpIfEq(label, a, b) => self.exec_conditional_jump(label, a, b, true)?,
            Op::JumpIfNeq(label, a, b) => self.exec_conditional_jump(label, a, b, false)?,
            Op::Exit(symb) => return self.exec_exit(symb),

            // Debugging
            Op::DPrint(symb) => self.exec_dprint(symb)?,
            Op::Break => self.exec_break(instr)?,
        }
        Ok(Step::Next)
    }

    // ---- calls ----

    /// The pc already points past the CALL, so it is the return address.
    fn exec_call(&mut self, label: &str) -> Result<(), ErrorKind> {
        let target = self.labels.resolve(label)?;
        self.push_return(self.pc)?;
        trace!(label, depth = self.call_stack.len(), "call");
        self.pc = target;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), ErrorKind> {
        self.pc = self.pop_return()?;
        trace!(depth = self.call_stack.len(), "return");
        Ok(())
    }

    // ---- arithmetic and logic ----

    fn exec_arith(
        &mut self,
        var: &VarRef,
        a: &Symbol,
        b: &Symbol,
        op: fn(i64, i64) -> i64,
    ) -> Result<(), ErrorKind> {
        let (x, y) = self.int_pair(a, b)?;
        self.frames.write(var, Value::Int(op(x, y)))
    }

    fn exec_idiv(&mut self, var: &VarRef, a: &Symbol, b: &Symbol) -> Result<(), ErrorKind> {
        let (x, y) = self.int_pair(a, b)?;
        if y == 0 {
            return Err(ErrorKind::DivisionByZero);
        }
        self.frames.write(var, Value::Int(floor_div(x, y)))
    }

    fn exec_relational(
        &mut self,
        var: &VarRef,
        a: &Symbol,
        b: &Symbol,
        wanted: Ordering,
    ) -> Result<(), ErrorKind> {
        let ordering = compare(self.value(a)?, self.value(b)?)?;
        self.frames.write(var, Value::Bool(ordering == wanted))
    }

    fn exec_logic(
        &mut self,
        var: &VarRef,
        a: &Symbol,
        b: &Symbol,
        op: fn(bool, bool) -> bool,
    ) -> Result<(), ErrorKind> {
        let (x, y) = (self.value(a)?, self.value(b)?);
        let result = op(expect_bool(x)?, expect_bool(y)?);
        self.frames.write(var, Value::Bool(result))
    }

    fn int_pair(&self, a: &Symbol, b: &Symbol) -> Result<(i64, i64), ErrorKind> {
        let (x, y) = (self.value(a)?, self.value(b)?);
        Ok((expect_int(x)?, expect_int(y)?))
    }

    // ---- conversions and strings ----

    fn exec_int2char(&mut self, var: &VarRef, symb: &Symbol) -> Result<(), ErrorKind> {
        let code = expect_int(self.value(symb)?)?;
        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(ErrorKind::InvalidCodePoint { code })?;
        self.frames.write(var, Value::Str(c.to_string()))
    }

    fn exec_stri2int(&mut self, var: &VarRef, a: &Symbol, b: &Symbol) -> Result<(), ErrorKind> {
        let (s, index) = (self.value(a)?, self.value(b)?);
        let c = char_at(expect_str(s)?, expect_int(index)?)?;
        self.frames.write(var, Value::Int(i64::from(u32::from(c))))
    }

    fn exec_concat(&mut self, var: &VarRef, a: &Symbol, b: &Symbol) -> Result<(), ErrorKind> {
        let (x, y) = (self.value(a)?, self.value(b)?);
        let result = [expect_str(x)?, expect_str(y)?].concat();
        self.frames.write(var, Value::Str(result))
    }

    fn exec_strlen(&mut self, var: &VarRef, symb: &Symbol) -> Result<(), ErrorKind> {
        let length = expect_str(self.value(symb)?)?.chars().count();
        self.frames.write(var, Value::Int(length as i64))
    }

    fn exec_getchar(&mut self, var: &VarRef, a: &Symbol, b: &Symbol) -> Result<(), ErrorKind> {
        let (s, index) = (self.value(a)?, self.value(b)?);
        let c = char_at(expect_str(s)?, expect_int(index)?)?;
        self.frames.write(var, Value::Str(c.to_string()))
    }

    /// Replace the character at an index of the target's own string with
    /// the first character of the replacement.
    fn exec_setchar(&mut self, var: &VarRef, a: &Symbol, b: &Symbol) -> Result<(), ErrorKind> {
        let current = self.frames.read(var)?;
        let (index, replacement) = (self.value(a)?, self.value(b)?);
        let (current, index, replacement) =
            (expect_str(current)?, expect_int(index)?, expect_str(replacement)?);

        let mut chars: Vec<char> = current.chars().collect();
        let length = chars.len();
        let slot = usize::try_from(index)
            .ok()
            .and_then(|i| chars.get_mut(i))
            .ok_or(ErrorKind::IndexOutOfRange { index, length })?;
        *slot = replacement.chars().next().ok_or(ErrorKind::EmptyReplacement)?;

        let result: String = chars.into_iter().collect();
        self.frames.write(var, Value::Str(result))
    }

    fn exec_type(&mut self, var: &VarRef, symb: &Symbol) -> Result<(), ErrorKind> {
        let name = resolve::type_of(&self.frames, symb)?.map_or("", |t| t.name());
        self.frames.write(var, Value::string(name))
    }

    // ---- I/O ----

    /// READ never fails on bad input; it stores nil instead.
    fn exec_read(&mut self, var: &VarRef, ty: TypeTag) -> Result<(), ErrorKind> {
        let value = match self.io.input.read_line() {
            Some(line) => parse_input(&line, ty),
            None => Value::Nil,
        };
        if value == Value::Nil {
            debug!(var = %var, ty = %ty, "read produced nil");
        }
        self.frames.write(var, value)
    }

    fn exec_write(&mut self, symb: &Symbol) -> Result<(), ErrorKind> {
        let value = resolve::value_of(&self.frames, symb)?;
        write!(self.io.output, "{value}").map_err(ErrorKind::output)
    }

    // ---- control flow ----

    fn exec_conditional_jump(
        &mut self,
        label: &str,
        a: &Symbol,
        b: &Symbol,
        jump_if_equal: bool,
    ) -> Result<(), ErrorKind> {
        let target = self.labels.resolve(label)?;
        if equal(self.value(a)?, self.value(b)?)? == jump_if_equal {
            self.pc = target;
        }
        Ok(())
    }

    fn exec_exit(&mut self, symb: &Symbol) -> Result<Step, ErrorKind> {
        match *self.value(symb)? {
            Value::Int(code) if (0..=MAX_EXIT_STATUS).contains(&code) => {
                u8::try_from(code).map(Step::Exit).map_err(|_| ErrorKind::InvalidExitCode { code })
            }
            Value::Int(code) => Err(ErrorKind::InvalidExitCode { code }),
            ref other => Err(ErrorKind::TypeMismatch {
                expected: TypeTag::Int,
                found: other.type_tag(),
            }),
        }
    }

    // ---- debugging ----

    fn exec_dprint(&mut self, symb: &Symbol) -> Result<(), ErrorKind> {
        let ty = resolve::value_of(&self.frames, symb)?.type_tag();
        write!(self.io.diagnostics, "{ty}").map_err(ErrorKind::output)
    }

    fn exec_break(&mut self, instr: &Instruction) -> Result<(), ErrorKind> {
        let temporary = match self.frames.temporary() {
            Some(frame) => format!("{} variable(s)", frame.len()),
            None => "none".to_string(),
        };
        let dump = format!(
            "BREAK at instruction {} (index {})\n\
             \x20 steps executed: {}\n\
             \x20 global frame: {} variable(s)\n\
             \x20 temporary frame: {}\n\
             \x20 local frames: {}\n\
             \x20 data stack: {}\n\
             \x20 call stack: {}\n",
            instr.order,
            self.pc - 1,
            self.steps,
            self.frames.global().len(),
            temporary,
            self.frames.local_depth(),
            self.data_stack.len(),
            self.call_stack.len(),
        );
        self.io
            .diagnostics
            .write_all(dump.as_bytes())
            .map_err(ErrorKind::output)
    }
}

fn expect_int(value: &Value) -> Result<i64, ErrorKind> {
    match value {
        Value::Int(i) => Ok(*i),
        other => Err(ErrorKind::TypeMismatch {
            expected: TypeTag::Int,
            found: other.type_tag(),
        }),
    }
}

fn expect_bool(value: &Value) -> Result<bool, ErrorKind> {
    match value {
        Value::Bool(b) => Ok(*b),
        other => Err(ErrorKind::TypeMismatch {
            expected: TypeTag::Bool,
            found: other.type_tag(),
        }),
    }
}

fn expect_str(value: &Value) -> Result<&str, ErrorKind> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(ErrorKind::TypeMismatch {
            expected: TypeTag::String,
            found: other.type_tag(),
        }),
    }
}

/// Ordering for LT/GT. Both sides must share a type and nil has no order.
fn compare(x: &Value, y: &Value) -> Result<Ordering, ErrorKind> {
    match (x, y) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        _ => Err(ErrorKind::NotComparable {
            left: x.type_tag(),
            right: y.type_tag(),
        }),
    }
}

/// Equality for EQ and the conditional jumps. Nil compares with anything.
fn equal(x: &Value, y: &Value) -> Result<bool, ErrorKind> {
    match (x, y) {
        (Value::Nil, _) | (_, Value::Nil) => Ok(x == y),
        _ => compare(x, y).map(|o| o == Ordering::Equal),
    }
}

/// Division rounding toward negative infinity. Wraps on `i64::MIN / -1`.
pub(crate) fn floor_div(x: i64, y: i64) -> i64 {
    let q = x.wrapping_div(y);
    let r = x.wrapping_rem(y);
    if r != 0 && ((r < 0) != (y < 0)) {
        q - 1
    } else {
        q
    }
}

fn char_at(s: &str, index: i64) -> Result<char, ErrorKind> {
    usize::try_from(index)
        .ok()
        .and_then(|i| s.chars().nth(i))
        .ok_or_else(|| ErrorKind::IndexOutOfRange {
            index,
            length: s.chars().count(),
        })
}

/// Convert one input line to the requested type; nil when it is empty or
/// does not parse.
pub(crate) fn parse_input(line: &str, ty: TypeTag) -> Value {
    if line.is_empty() {
        return Value::Nil;
    }
    match ty {
        TypeTag::Int => line.trim().parse().map_or(Value::Nil, Value::Int),
        TypeTag::Bool => Value::Bool(line.eq_ignore_ascii_case("true")),
        TypeTag::String => Value::string(line),
        TypeTag::Nil => Value::Nil,
    }
}
