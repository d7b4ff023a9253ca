//! Bytecode interpreter
//!
//! Fetch-decode-execute loop over a borrowed byte stream.

use stackvm_bytecode::{BytecodeReader, Opcode, REGISTER_COUNT, Register};

use crate::config::MachineConfig;
use crate::error::{VmError, VmResult};
use crate::registers::RegisterFile;
use crate::stack::{OperandStack, STACK_CAPACITY};
use crate::trace::{TraceEvent, Tracer};

const LOG_TARGET: &str = "stackvm::engine";

/// Why a run ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// A `HALT` instruction executed
    Halt,
    /// The instruction pointer reached or passed the end of the program
    EndOfProgram,
}

/// Outcome of a single [`Machine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One instruction executed; the machine is still running
    Continue,
    /// The machine is halted
    Halted(HaltReason),
}

/// Result of executing one instruction
enum Flow {
    Continue,
    Halt,
}

enum RunState {
    Running,
    Halted(HaltReason),
    Faulted(VmError),
}

/// The execution engine
///
/// Owns the operand stack, register file and instruction pointer. The program
/// is borrowed and never written.
pub struct Machine<'a> {
    reader: BytecodeReader<'a>,
    stack: OperandStack,
    registers: RegisterFile,
    config: MachineConfig,
    state: RunState,
    steps: u64,
    tracer: Option<Tracer<'a>>,
}

impl<'a> Machine<'a> {
    /// Create a machine over `code` with the default configuration
    pub fn new(code: &'a [u8]) -> Self {
        Self::with_config(code, MachineConfig::default())
    }

    /// Create a machine over `code`. Nothing executes until [`Machine::execute`].
    pub fn with_config(code: &'a [u8], config: MachineConfig) -> Self {
        Self {
            reader: BytecodeReader::new(code),
            stack: OperandStack::new(),
            registers: RegisterFile::new(),
            config,
            state: RunState::Running,
            steps: 0,
            tracer: None,
        }
    }

    /// Install a callback invoked after every successfully executed instruction
    ///
    /// `HALT` is traced too. The instruction that faults is not.
    pub fn set_tracer(&mut self, tracer: impl FnMut(&TraceEvent) + Send + 'a) {
        self.tracer = Some(Box::new(tracer));
    }

    /// Remove the tracing callback
    pub fn clear_tracer(&mut self) {
        self.tracer = None;
    }

    /// Run until `HALT`, the end of the program, or a fault
    ///
    /// State mutated before a fault is kept. Once halted or faulted, further
    /// calls return the same outcome until [`Machine::reset`].
    pub fn execute(&mut self) -> VmResult<HaltReason> {
        if matches!(self.state, RunState::Running) {
            tracing::debug!(
                target: LOG_TARGET,
                program_len = self.reader.code().len(),
                ip = self.reader.position(),
                "execution starting"
            );
        }

        loop {
            if let Step::Halted(reason) = self.step()? {
                return Ok(reason);
            }
        }
    }

    /// Execute exactly one instruction
    pub fn step(&mut self) -> VmResult<Step> {
        match &self.state {
            RunState::Running => {}
            RunState::Halted(reason) => return Ok(Step::Halted(*reason)),
            RunState::Faulted(err) => return Err(err.clone()),
        }

        if self.reader.is_at_end() {
            return Ok(self.halt(HaltReason::EndOfProgram));
        }

        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(self.fault(VmError::StepLimitExceeded(limit)));
            }
        }

        match self.dispatch() {
            Ok((opcode, flow)) => {
                self.steps += 1;
                self.trace(opcode);
                match flow {
                    Flow::Continue => Ok(Step::Continue),
                    Flow::Halt => Ok(self.halt(HaltReason::Halt)),
                }
            }
            Err(err) => Err(self.fault(err)),
        }
    }

    /// Return to the initial state over the same program
    pub fn reset(&mut self) {
        self.reader.set_position(0);
        self.stack.clear();
        self.registers.clear();
        self.state = RunState::Running;
        self.steps = 0;
    }

    fn dispatch(&mut self) -> VmResult<(Opcode, Flow)> {
        let offset = self.reader.position();
        let byte = self.reader.read_u8()?;
        let opcode =
            Opcode::from_byte(byte).ok_or(VmError::UnknownInstruction { opcode: byte, offset })?;
        let flow = self.execute_instruction(opcode)?;
        Ok((opcode, flow))
    }

    /// Execute a single instruction whose opcode byte has been consumed
    fn execute_instruction(&mut self, opcode: Opcode) -> VmResult<Flow> {
        match opcode {
            Opcode::Halt => return Ok(Flow::Halt),

            // ==================== Data movement ====================
            Opcode::Push => {
                let value = self.reader.read_i32()?;
                self.stack.push(value)?;
            }

            Opcode::PushReg => {
                let reg = RegisterFile::resolve(self.reader.read_u8()?)?;
                let value = self.registers.get(reg);
                self.stack.push(value)?;
            }

            Opcode::Mov => {
                let dst = self.reader.read_u8()?;
                let src = self.reader.read_u8()?;
                let dst = RegisterFile::resolve(dst)?;
                let value = self.registers.get(RegisterFile::resolve(src)?);
                self.registers.set(dst, value);
            }

            Opcode::Lea => {
                let reg = self.reader.read_u8()?;
                let value = self.reader.read_i32()?;
                self.registers.set(RegisterFile::resolve(reg)?, value);
            }

            Opcode::Pop => {
                self.stack.pop()?;
            }

            Opcode::PopReg => {
                let reg = RegisterFile::resolve(self.reader.read_u8()?)?;
                let value = self.stack.pop()?;
                self.registers.set(reg, value);
            }

            // ==================== Arithmetic ====================
            Opcode::Add => self.binary(|a, b| a.wrapping_add(b))?,
            Opcode::Sub => self.binary(|a, b| b.wrapping_sub(a))?,
            Opcode::Mul => self.binary(|a, b| a.wrapping_mul(b))?,

            Opcode::Div => {
                self.stack.require(2)?;
                let a = self.stack.pop()?;
                let b = self.stack.pop()?;
                // Both operands are already gone when the divisor is rejected
                if a == 0 {
                    return Err(VmError::DivisionByZero);
                }
                self.stack.push(b.wrapping_div(a))?;
            }

            // ==================== Bitwise ====================
            Opcode::And => self.binary(|a, b| a & b)?,
            Opcode::Or => self.binary(|a, b| a | b)?,

            Opcode::Not => {
                self.stack.require(1)?;
                let a = self.stack.pop()?;
                self.stack.push(!a)?;
            }

            Opcode::Shl => self.binary(|a, b| b.wrapping_shl(a as u32))?,
            Opcode::Shr => self.binary(|a, b| b.wrapping_shr(a as u32))?,

            // ==================== Control Flow ====================
            Opcode::Jmp => {
                // Never reads the stack, but refuses to jump with it empty
                self.stack.require(1)?;
                let target = self.reader.read_i32()?;
                self.jump(target);
            }

            Opcode::Jz => {
                self.stack.require(1)?;
                let target = self.reader.read_i32()?;
                if self.stack.top()? == 0 {
                    self.jump(target);
                }
            }

            Opcode::Jnz => {
                self.stack.require(1)?;
                let target = self.reader.read_i32()?;
                if self.stack.top()? != 0 {
                    self.jump(target);
                }
            }

            // ==================== Comparison ====================
            Opcode::Cmp => self.binary(|a, b| i32::from(b == a))?,
        }

        Ok(Flow::Continue)
    }

    /// Pop A then B and push `op(a, b)`; needs two operands up front
    #[inline]
    fn binary(&mut self, op: impl FnOnce(i32, i32) -> i32) -> VmResult<()> {
        self.stack.require(2)?;
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(op(a, b))
    }

    /// Absolute jump. Targets outside the program halt on the next fetch.
    #[inline]
    fn jump(&mut self, target: i32) {
        let end = self.reader.code().len();
        let pos = usize::try_from(target).unwrap_or(end);
        self.reader.set_position(pos);
    }

    fn trace(&mut self, opcode: Opcode) {
        let ip = self.reader.position();
        let stack_size = self.stack.len();

        tracing::trace!(
            target: LOG_TARGET,
            opcode = opcode.name(),
            ip,
            stack_size,
            "instruction executed"
        );

        if let Some(tracer) = self.tracer.as_mut() {
            tracer(&TraceEvent {
                opcode,
                ip,
                stack_size,
            });
        }
    }

    fn halt(&mut self, reason: HaltReason) -> Step {
        tracing::debug!(
            target: LOG_TARGET,
            ?reason,
            ip = self.reader.position(),
            stack_size = self.stack.len(),
            steps = self.steps,
            "execution halted"
        );
        self.state = RunState::Halted(reason);
        Step::Halted(reason)
    }

    fn fault(&mut self, err: VmError) -> VmError {
        tracing::warn!(
            target: LOG_TARGET,
            error = %err,
            ip = self.reader.position(),
            stack_size = self.stack.len(),
            "execution faulted"
        );
        self.state = RunState::Faulted(err.clone());
        err
    }

    // ==================== Inspection ====================

    /// Full operand stack storage; slots above [`Machine::stack_len`] are zero
    pub fn stack(&self) -> &[i32; STACK_CAPACITY] {
        self.stack.slots()
    }

    /// Number of values on the operand stack
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    /// Top of the operand stack, if any
    pub fn top(&self) -> Option<i32> {
        self.stack.top().ok()
    }

    /// Value of one register
    pub fn register(&self, reg: Register) -> i32 {
        self.registers.get(reg)
    }

    /// All register values in index order
    pub fn registers(&self) -> &[i32; REGISTER_COUNT] {
        self.registers.as_array()
    }

    /// Current instruction pointer, for diagnostics
    pub fn ip(&self) -> usize {
        self.reader.position()
    }

    /// Instructions executed successfully since construction or reset
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// True once the machine has halted or faulted
    pub fn is_halted(&self) -> bool {
        !matches!(self.state, RunState::Running)
    }

    /// How the machine halted, if it halted normally
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self.state {
            RunState::Halted(reason) => Some(reason),
            _ => None,
        }
    }

    /// The fault that ended the run, if any
    pub fn fault_error(&self) -> Option<&VmError> {
        match &self.state {
            RunState::Faulted(err) => Some(err),
            _ => None,
        }
    }

    /// The program being executed
    pub fn program(&self) -> &'a [u8] {
        self.reader.code()
    }

    /// Active configuration
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackvm_bytecode::ProgramBuilder;

    #[test]
    fn test_construction_executes_nothing() {
        let code = ProgramBuilder::new().push(1).build();
        let machine = Machine::new(&code);
        assert_eq!(machine.ip(), 0);
        assert_eq!(machine.stack_len(), 0);
        assert!(!machine.is_halted());
    }

    #[test]
    fn test_step_by_step() {
        let code = ProgramBuilder::new().push(2).push(3).op(Opcode::Mul).build();
        let mut machine = Machine::new(&code);

        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.ip(), 5);
        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.step(), Ok(Step::Continue));
        assert_eq!(machine.top(), Some(6));
        assert_eq!(
            machine.step(),
            Ok(Step::Halted(HaltReason::EndOfProgram))
        );
        assert_eq!(machine.steps(), 3);
    }

    #[test]
    fn test_negative_jump_target_halts() {
        let code = ProgramBuilder::new().push(1).jmp(-5).push(2).build();
        let mut machine = Machine::new(&code);
        assert_eq!(machine.execute(), Ok(HaltReason::EndOfProgram));
        assert_eq!(machine.stack_len(), 1);
        assert_eq!(machine.ip(), code.len());
    }

    #[test]
    fn test_fault_is_sticky_until_reset() {
        let code = ProgramBuilder::new().op(Opcode::Pop).build();
        let mut machine = Machine::new(&code);
        assert_eq!(machine.execute(), Err(VmError::Underflow));
        assert_eq!(machine.step(), Err(VmError::Underflow));
        assert_eq!(machine.fault_error(), Some(&VmError::Underflow));

        machine.reset();
        assert!(!machine.is_halted());
        assert_eq!(machine.ip(), 0);
    }
}
