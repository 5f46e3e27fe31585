//! Stack-based virtual machine for lambda-calculus bytecode.
//!
//! The machine has a program counter, an active environment register, and
//! three bounded stacks:
//!
//! - the operand stack, holding [`Value`]s;
//! - the environment-save stack, holding caller environments across calls;
//! - the return-address stack.
//!
//! Execution starts at address 0 and runs until the program counter leaves
//! the instruction stream. Exactly one value must remain on the operand stack;
//! that value is the result. Every fault (a full stack, a wrong value kind, a
//! bad address) stops execution with an error instead of corrupting state.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

mod config;
mod stack;

pub use config::{DEFAULT_STACK_CAPACITY, VmConfig};

use stack::BoundedStack;

use lambdavm_foundation::{Closure, Env, Error, ErrorKind, Result, StackKind, Value};

use crate::compiler::compile;
use crate::opcode::{Bytecode, Instruction, Opcode};
use crate::trace::{TraceRecord, Tracer};

/// Stack-based virtual machine.
pub struct Vm {
    config: VmConfig,
    /// Operand stack.
    operands: BoundedStack<Value>,
    /// Saved caller environments.
    env_stack: BoundedStack<Env>,
    /// Return addresses.
    returns: BoundedStack<usize>,
    /// Active environment register.
    env: Env,
    /// Program counter.
    pc: usize,
    /// Instructions executed in the current run.
    steps: u64,
    tracer: Tracer,
}

impl Default for Vm {
    fn default() -> Self {
        Self::new()
    }
}

impl Vm {
    /// Creates a VM with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(VmConfig::default())
    }

    /// Creates a VM with the given configuration.
    #[must_use]
    pub fn with_config(config: VmConfig) -> Self {
        Self {
            operands: BoundedStack::new(StackKind::Operand, config.operand_capacity),
            env_stack: BoundedStack::new(StackKind::Environment, config.env_capacity),
            returns: BoundedStack::new(StackKind::Return, config.return_capacity),
            env: Env::empty(),
            pc: 0,
            steps: 0,
            tracer: Tracer::new(config.trace.clone()),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Resets registers and stacks.
    pub fn reset(&mut self) {
        self.operands.clear();
        self.env_stack.clear();
        self.returns.clear();
        self.env = Env::empty();
        self.pc = 0;
        self.steps = 0;
    }

    /// Returns the tracer holding the last execution's instruction trace.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Returns the tracer mutably (to enable, disable, or redirect it).
    pub fn tracer_mut(&mut self) -> &mut Tracer {
        &mut self.tracer
    }

    /// Drains the recorded trace.
    pub fn take_trace(&mut self) -> Vec<TraceRecord> {
        self.tracer.take()
    }

    /// Number of instructions executed by the last (or current) run.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Executes a program from address 0 and returns its result.
    ///
    /// # Errors
    /// Returns a fault if a stack overflows or underflows, a value has the
    /// wrong kind, an address is invalid, the step budget runs out, or the
    /// program does not leave exactly one value.
    pub fn execute(&mut self, code: &Bytecode) -> Result<Value> {
        self.reset();
        self.tracer.clear();

        let result = self.run(code);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn run(&mut self, code: &Bytecode) -> Result<Value> {
        while self.pc < code.len() {
            let instr = code.decode_at(self.pc)?;
            self.charge_step()?;
            self.trace(instr);

            self.pc = instr.next_address();
            self.step(instr)?;
        }

        let depth = self.operands.len();
        if depth != 1 {
            return Err(Error::new(ErrorKind::MalformedResult { depth }));
        }
        self.operands.pop()
    }

    fn step(&mut self, instr: Instruction) -> Result<()> {
        match instr.opcode {
            Opcode::Dup => {
                let value = self.operands.peek()?.clone();
                self.operands.push(value)?;
            }
            Opcode::Swap => {
                let top = self.operands.pop()?;
                let below = self.operands.pop()?;
                self.operands.push(top)?;
                self.operands.push(below)?;
            }
            Opcode::Jmp => {
                self.pc = relative(instr)?;
            }
            Opcode::Call => {
                let target = self.operands.pop()?.into_address()?;
                self.returns.push(instr.next_address())?;
                self.pc = target;
            }
            Opcode::Ret => {
                self.pc = self.returns.pop()?;
            }
            Opcode::EnvLookup => {
                let hops = hop_count(instr)?;
                let value = self.env.lookup(hops).cloned().ok_or_else(|| {
                    Error::new(ErrorKind::LookupOutOfRange {
                        hops,
                        depth: self.env.depth(),
                    })
                })?;
                self.operands.push(value)?;
            }
            Opcode::PushEnv => {
                let callee_env = self.operands.pop()?.into_env()?;
                let caller_env = std::mem::replace(&mut self.env, callee_env);
                self.env_stack.push(caller_env)?;
            }
            Opcode::PopEnv => {
                self.env = self.env_stack.pop()?;
            }
            Opcode::ExtendEnv => {
                let value = self.operands.pop()?;
                self.env = self.env.extend(value);
            }
            Opcode::GetEnv => {
                self.operands.push(Value::Environment(self.env.clone()))?;
            }
            Opcode::MkClosure => {
                let env = self.operands.pop()?.into_env()?;
                let address = self.operands.pop()?.into_address()?;
                self.operands
                    .push(Value::Closure(Closure { address, env }))?;
            }
            Opcode::GetClosureEnv => {
                let closure = self.operands.pop()?.into_closure()?;
                self.operands.push(Value::Environment(closure.env))?;
            }
            Opcode::GetClosureCode => {
                let closure = self.operands.pop()?.into_closure()?;
                self.operands.push(Value::Address(closure.address))?;
            }
            Opcode::GetRelAddr => {
                self.operands.push(Value::Address(relative(instr)?))?;
            }
        }
        Ok(())
    }

    fn charge_step(&mut self) -> Result<()> {
        if let Some(max) = self.config.max_steps {
            if self.steps >= max {
                return Err(Error::new(ErrorKind::StepLimitExceeded(max)));
            }
        }
        self.steps += 1;
        Ok(())
    }

    #[inline]
    fn trace(&mut self, instruction: Instruction) {
        if !self.tracer.is_enabled() {
            return;
        }
        self.tracer.record(TraceRecord {
            step: self.steps - 1,
            instruction,
            operand_depth: self.operands.len(),
            env_stack_depth: self.env_stack.len(),
            return_depth: self.returns.len(),
            env_depth: self.env.depth(),
        });
    }
}

/// Resolves an instruction's operand as a displacement from its own address.
fn relative(instr: Instruction) -> Result<usize> {
    let displacement = i64::from(instr.operand.unwrap_or(0));
    let target = instr.address as i64 + displacement;
    usize::try_from(target).map_err(|_| Error::new(ErrorKind::InvalidAddress(target)))
}

fn hop_count(instr: Instruction) -> Result<usize> {
    let operand = instr.operand.unwrap_or(0);
    usize::try_from(operand).map_err(|_| {
        Error::new(ErrorKind::Internal(format!(
            "negative environment hop count {operand} at address {}",
            instr.address
        )))
    })
}

/// Compiles and executes source text with the default configuration.
///
/// # Errors
/// Returns any parse, compile, or runtime error.
pub fn eval(source: &str) -> Result<Value> {
    let code = compile(source)?;
    Vm::new().execute(&code)
}
