//! VM error types

use stackvm_bytecode::BytecodeError;
use thiserror::Error;

/// VM execution faults
///
/// Every fault is terminal for the run that raised it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    /// Push attempted with the operand stack full
    #[error("stack overflow")]
    Overflow,

    /// Pop or peek on an empty stack, or too few operands for an operator
    #[error("stack underflow")]
    Underflow,

    /// Register identifier outside `0..=7`
    #[error("invalid register {0}")]
    InvalidRegister(u8),

    /// DIV with a zero divisor
    #[error("division by zero")]
    DivisionByZero,

    /// Opcode byte that names no instruction
    #[error("unknown instruction {opcode:#04x} at offset {offset}")]
    UnknownInstruction {
        /// The raw opcode byte
        opcode: u8,
        /// Offset of the opcode byte
        offset: usize,
    },

    /// Operand read ran past the end of the program
    #[error("malformed program: operand out of range at offset {offset}")]
    MalformedProgram {
        /// Offset of the first missing byte
        offset: usize,
    },

    /// Configured step limit reached before the program halted
    #[error("step limit of {0} instructions exceeded")]
    StepLimitExceeded(u64),
}

/// Fault kind without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum FaultKind {
    Overflow,
    Underflow,
    InvalidRegister,
    DivisionByZero,
    UnknownInstruction,
    MalformedProgram,
    StepLimitExceeded,
}

impl VmError {
    /// The kind of this fault
    pub fn kind(&self) -> FaultKind {
        match self {
            Self::Overflow => FaultKind::Overflow,
            Self::Underflow => FaultKind::Underflow,
            Self::InvalidRegister(_) => FaultKind::InvalidRegister,
            Self::DivisionByZero => FaultKind::DivisionByZero,
            Self::UnknownInstruction { .. } => FaultKind::UnknownInstruction,
            Self::MalformedProgram { .. } => FaultKind::MalformedProgram,
            Self::StepLimitExceeded(_) => FaultKind::StepLimitExceeded,
        }
    }
}

impl From<BytecodeError> for VmError {
    fn from(err: BytecodeError) -> Self {
        match err {
            BytecodeError::InvalidOpcode { opcode, offset } => {
                Self::UnknownInstruction { opcode, offset }
            }
            BytecodeError::UnexpectedEnd { offset } => Self::MalformedProgram { offset },
        }
    }
}

/// Result type for VM operations
pub type VmResult<T> = std::result::Result<T, VmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytecode_errors_map_onto_faults() {
        let err: VmError = BytecodeError::UnexpectedEnd { offset: 9 }.into();
        assert_eq!(err, VmError::MalformedProgram { offset: 9 });

        let err: VmError = BytecodeError::InvalidOpcode {
            opcode: 0x30,
            offset: 2,
        }
        .into();
        assert_eq!(err.kind(), FaultKind::UnknownInstruction);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(VmError::InvalidRegister(9).to_string(), "invalid register 9");
        assert_eq!(
            VmError::UnknownInstruction {
                opcode: 0xAB,
                offset: 4
            }
            .to_string(),
            "unknown instruction 0xab at offset 4"
        );
    }
}
