//! Stack-based virtual machine. Execution is single-threaded and never suspends except at
//! `INPUT`, which blocks synchronously on whatever [`InputProvider`] the host supplies.

use log::trace;

use crate::bytecode::{BytecodeProgram, Opcode, Value};
use crate::error::{RuntimeError, RuntimeErrorKind};

/// A source of input lines for the `INPUT` instruction. The VM never interprets the result —
/// an empty string just means "no more input."
pub trait InputProvider {
    fn next_line(&mut self) -> String;
}

/// An [`InputProvider`] that always reports no more input. Useful for programs that never call
/// the built-in `input`.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputProvider for NoInput {
    fn next_line(&mut self) -> String {
        String::new()
    }
}

/// A fixed, pre-recorded sequence of lines, consumed front-to-back. Once exhausted it behaves
/// like [`NoInput`]. Handy for tests and for hosts that collect all input up front.
#[derive(Debug, Default)]
pub struct BufferedInput {
    lines: std::collections::VecDeque<String>,
}

impl BufferedInput {
    pub fn new(lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
        }
    }
}

impl InputProvider for BufferedInput {
    fn next_line(&mut self) -> String {
        self.lines.pop_front().unwrap_or_default()
    }
}

/// A call frame. Since the compiler keys variable indices by name in one flat, global table,
/// the only slots a call is guaranteed to own are the ones it binds its own
/// parameters into — those are saved here and restored on `RETURN`, so a recursive call can't
/// corrupt a caller's still-needed copy of a same-named parameter. Any other variable a callee
/// writes (a shared global, or a local under a name nothing else uses) is left exactly as the
/// callee leaves it, so ordinary side-effecting functions still work.
struct Frame {
    return_pc: usize,
    saved_params: Vec<(usize, Value)>,
}

/// The outcome of a successful run: the lines the program printed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionResult {
    pub output_lines: Vec<String>,
}

pub struct Vm<'a> {
    program: &'a BytecodeProgram,
    stack: Vec<Value>,
    variables: Vec<Value>,
    frames: Vec<Frame>,
    output: Vec<String>,
    pc: usize,
    instruction_budget: Option<usize>,
    instructions_executed: usize,
}

impl<'a> Vm<'a> {
    pub fn new(program: &'a BytecodeProgram) -> Self {
        Self {
            program,
            stack: Vec::new(),
            variables: Vec::new(),
            frames: Vec::new(),
            output: Vec::new(),
            pc: 0,
            instruction_budget: None,
            instructions_executed: 0,
        }
    }

    /// Caps total instructions executed; exceeding it raises `ExecutionLimitExceeded` rather
    /// than letting a runaway loop spin forever.
    pub fn with_instruction_budget(mut self, budget: usize) -> Self {
        self.instruction_budget = Some(budget);
        self
    }

    pub fn run(mut self, io: &mut dyn InputProvider) -> Result<ExecutionResult, RuntimeError> {
        loop {
            if self.pc >= self.program.instructions.len() {
                break;
            }

            if let Some(budget) = self.instruction_budget {
                if self.instructions_executed >= budget {
                    return Err(RuntimeError::new(
                        RuntimeErrorKind::ExecutionLimitExceeded,
                        format!("exceeded instruction budget of {budget}"),
                        self.pc,
                    ));
                }
            }
            self.instructions_executed += 1;

            let opcode = self.program.instructions[self.pc];
            trace!("pc={} op={opcode:?} stack_depth={}", self.pc, self.stack.len());

            if opcode == Opcode::Halt {
                break;
            }

            self.step(opcode, io)?;
            self.pc += 1;
        }

        Ok(ExecutionResult {
            output_lines: self.output,
        })
    }

    fn step(&mut self, opcode: Opcode, io: &mut dyn InputProvider) -> Result<(), RuntimeError> {
        match opcode {
            Opcode::LoadConst(idx) => {
                let value = self.constant(idx)?;
                self.stack.push(value);
            }
            Opcode::LoadVar(idx) => {
                let value = self.read_var(idx)?;
                self.stack.push(value);
            }
            Opcode::StoreVar(idx) => {
                let value = self.peek()?.clone();
                self.write_var(idx, value);
            }
            Opcode::Pop => {
                self.pop()?;
            }
            Opcode::ToNumber => {
                let value = self.pop()?;
                let Value::String(text) = &value else {
                    return Err(self.bad_instruction(format!(
                        "expected a numeric literal's text but found '{}'",
                        value.type_name()
                    )));
                };
                let n = text.parse::<f64>().map_err(|_| {
                    self.bad_instruction(format!("'{text}' is not a valid number"))
                })?;
                self.stack.push(Value::Number(n));
            }
            Opcode::Add => self.binary_add()?,
            Opcode::Subtract => self.binary_numeric(|a, b| a - b)?,
            Opcode::Multiply => self.binary_numeric(|a, b| a * b)?,
            Opcode::Divide => self.binary_divmod(false)?,
            Opcode::Modulo => self.binary_divmod(true)?,
            Opcode::Negate => {
                let value = self.pop()?;
                let n = self.expect_number(&value)?;
                self.stack.push(Value::Number(-n));
            }
            Opcode::Equal => {
                let (a, b) = self.pop_pair()?;
                self.stack.push(Value::Boolean(a == b));
            }
            Opcode::NotEqual => {
                let (a, b) = self.pop_pair()?;
                self.stack.push(Value::Boolean(a != b));
            }
            Opcode::LessThan => self.compare(|ord| ord == std::cmp::Ordering::Less)?,
            Opcode::GreaterThan => self.compare(|ord| ord == std::cmp::Ordering::Greater)?,
            Opcode::LessEqual => self.compare(|ord| ord != std::cmp::Ordering::Greater)?,
            Opcode::GreaterEqual => self.compare(|ord| ord != std::cmp::Ordering::Less)?,
            Opcode::And => {
                let (a, b) = self.pop_pair()?;
                self.stack.push(if !a.is_truthy() { a } else { b });
            }
            Opcode::Or => {
                let (a, b) = self.pop_pair()?;
                self.stack.push(if a.is_truthy() { a } else { b });
            }
            Opcode::Not => {
                let value = self.pop()?;
                self.stack.push(Value::Boolean(!value.is_truthy()));
            }
            Opcode::Jump(target) => {
                self.pc = target - 1;
            }
            Opcode::JumpIfFalse(target) => {
                let value = self.pop()?;
                if !value.is_truthy() {
                    self.pc = target - 1;
                }
            }
            Opcode::JumpIfTrue(target) => {
                let value = self.pop()?;
                if value.is_truthy() {
                    self.pc = target - 1;
                }
            }
            Opcode::Call(arg_count) => self.call(arg_count)?,
            Opcode::Return => self.do_return()?,
            Opcode::Print(arg_count) => self.print(arg_count)?,
            Opcode::Input => {
                self.stack.push(Value::String(io.next_line()));
            }
            Opcode::Halt => unreachable!("HALT is handled in the execution loop"),
        }
        Ok(())
    }

    fn call(&mut self, arg_count: usize) -> Result<(), RuntimeError> {
        let callee = self.pop()?;
        let Value::Function { address, arity } = callee else {
            return Err(self.bad_instruction(format!(
                "attempted to call a non-function value of type '{}'",
                callee.type_name()
            )));
        };
        if arity != arg_count {
            return Err(self.bad_instruction(format!(
                "function expects {arity} argument(s) but {arg_count} were supplied"
            )));
        }
        if self.stack.len() < arg_count {
            return Err(self.stack_underflow());
        }

        // The compiler always lays a function's prologue out as `arity` consecutive
        // `STORE_VAR idx`/`POP` pairs starting at `address` (one per parameter, see
        // `Compiler::compile_fun_decl`). Reading those operands back out tells the VM exactly
        // which slots this call is about to overwrite, without the bytecode needing a separate
        // parameter table.
        let mut saved_params = Vec::with_capacity(arity);
        for i in 0..arity {
            let offset = address + i * 2;
            let idx = match self.program.instructions.get(offset) {
                Some(Opcode::StoreVar(idx)) => *idx,
                _ => {
                    return Err(self.bad_instruction(format!(
                        "function at {address} does not bind parameter {i} as expected"
                    )))
                }
            };
            saved_params.push((idx, self.read_var(idx)?));
        }

        self.frames.push(Frame {
            return_pc: self.pc,
            saved_params,
        });
        self.pc = address - 1;
        Ok(())
    }

    fn do_return(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| self.bad_instruction("RETURN with no active call frame"))?;
        for (idx, saved_value) in frame.saved_params {
            self.write_var(idx, saved_value);
        }
        self.pc = frame.return_pc;
        self.stack.push(value);
        Ok(())
    }

    fn print(&mut self, arg_count: usize) -> Result<(), RuntimeError> {
        if self.stack.len() < arg_count {
            return Err(self.stack_underflow());
        }
        let start = self.stack.len() - arg_count;
        let parts: Vec<String> = self.stack.drain(start..).map(|v| v.to_string()).collect();
        self.output.push(parts.join(" "));
        Ok(())
    }

    fn binary_add(&mut self) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let result = match (&a, &b) {
            (Value::String(_), _) | (_, Value::String(_)) => {
                Value::String(format!("{a}{b}"))
            }
            _ => {
                let a = self.expect_number(&a)?;
                let b = self.expect_number(&b)?;
                Value::Number(a + b)
            }
        };
        self.stack.push(result);
        Ok(())
    }

    fn binary_numeric(&mut self, f: fn(f64, f64) -> f64) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let a = self.expect_number(&a)?;
        let b = self.expect_number(&b)?;
        self.stack.push(Value::Number(f(a, b)));
        Ok(())
    }

    fn binary_divmod(&mut self, modulo: bool) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let a = self.expect_number(&a)?;
        let b = self.expect_number(&b)?;
        if b == 0.0 {
            return Err(RuntimeError::new(
                RuntimeErrorKind::DivisionByZero,
                if modulo {
                    "modulo by zero"
                } else {
                    "division by zero"
                },
                self.pc,
            ));
        }
        self.stack.push(Value::Number(if modulo { a % b } else { a / b }));
        Ok(())
    }

    fn compare(&mut self, accept: fn(std::cmp::Ordering) -> bool) -> Result<(), RuntimeError> {
        let (a, b) = self.pop_pair()?;
        let ordering = match (&a, &b) {
            (Value::Number(a), Value::Number(b)) => {
                a.partial_cmp(b).ok_or_else(|| self.bad_instruction("cannot compare NaN"))?
            }
            (Value::String(a), Value::String(b)) => a.cmp(b),
            _ => {
                return Err(self.bad_instruction(format!(
                    "cannot compare '{}' and '{}'",
                    a.type_name(),
                    b.type_name()
                )))
            }
        };
        self.stack.push(Value::Boolean(accept(ordering)));
        Ok(())
    }

    fn expect_number(&self, value: &Value) -> Result<f64, RuntimeError> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(self.bad_instruction(format!(
                "expected a number but found '{}'",
                other.type_name()
            ))),
        }
    }

    fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or_else(|| self.stack_underflow())
    }

    fn peek(&self) -> Result<&Value, RuntimeError> {
        self.stack.last().ok_or_else(|| self.stack_underflow())
    }

    /// Pops two operands in push order: `a` was pushed first (left operand), `b` second.
    fn pop_pair(&mut self) -> Result<(Value, Value), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        Ok((a, b))
    }

    fn constant(&self, idx: usize) -> Result<Value, RuntimeError> {
        self.program
            .constants
            .get(idx)
            .cloned()
            .ok_or_else(|| self.bad_instruction(format!("constant index {idx} out of range")))
    }

    fn read_var(&self, idx: usize) -> Result<Value, RuntimeError> {
        Ok(self.variables.get(idx).cloned().unwrap_or(Value::Null))
    }

    fn write_var(&mut self, idx: usize, value: Value) {
        if idx >= self.variables.len() {
            self.variables.resize(idx + 1, Value::Null);
        }
        self.variables[idx] = value;
    }

    fn stack_underflow(&self) -> RuntimeError {
        RuntimeError::new(RuntimeErrorKind::StackUnderflow, "popped from an empty stack", self.pc)
    }

    fn bad_instruction(&self, message: impl Into<String>) -> RuntimeError {
        RuntimeError::new(RuntimeErrorKind::BadInstruction, message, self.pc)
    }
}
