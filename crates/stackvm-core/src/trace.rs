//! Instruction-level tracing hook

use stackvm_bytecode::Opcode;

/// Snapshot passed to the tracer after each executed instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    /// The instruction that just ran
    pub opcode: Opcode,
    /// Instruction pointer after the instruction, jumps included
    pub ip: usize,
    /// Operand stack depth after the instruction
    pub stack_size: usize,
}

/// Boxed tracer callback
pub(crate) type Tracer<'a> = Box<dyn FnMut(&TraceEvent) + Send + 'a>;
