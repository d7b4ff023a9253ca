//! # stackvm bytecode
//!
//! Binary program format consumed by the `stackvm-core` execution engine.
//!
//! ## Format
//!
//! - **Opcodes**: one byte, `HALT = 0` through `CMP = 19`
//! - **Register operands**: one raw byte; valid programs use `0..=7`
//! - **Immediates**: four bytes, little-endian two's-complement `i32`
//!
//! The [`ProgramBuilder`] encoder does no validation at all. Deciding whether a
//! byte stream is a legal program is left to the engine at run time.

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod builder;
pub mod error;
pub mod instruction;
pub mod operand;
pub mod reader;

pub use builder::ProgramBuilder;
pub use error::{BytecodeError, Result};
pub use instruction::{Instruction, Opcode, disassemble};
pub use operand::{REGISTER_COUNT, Register};
pub use reader::BytecodeReader;

/// Width in bytes of an encoded immediate operand
pub const IMMEDIATE_WIDTH: usize = 4;
