//! Bytecode errors

use thiserror::Error;

/// Errors that can occur while decoding bytecode
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BytecodeError {
    /// Opcode byte does not name any instruction
    #[error("Invalid opcode {opcode:#04x} at offset {offset}")]
    InvalidOpcode {
        /// The raw opcode byte
        opcode: u8,
        /// Offset of the opcode byte
        offset: usize,
    },

    /// An operand read ran past the end of the program
    #[error("Unexpected end of bytecode at offset {offset}")]
    UnexpectedEnd {
        /// Offset of the first missing byte
        offset: usize,
    },
}

/// Result type for bytecode operations
pub type Result<T> = std::result::Result<T, BytecodeError>;
