//! # stackvm core
//!
//! Execution engine for stackvm bytecode.
//!
//! ## Design Principles
//!
//! - **Stack-based**: Working values live on a bounded operand stack
//! - **Fixed resources**: 2048 stack slots and 8 registers, allocated up front
//! - **Total**: Every fault is a [`VmError`], nothing panics on bad input
//! - **Borrowed program**: The engine reads its bytecode and never mutates it

#![warn(clippy::all)]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod interpreter;
pub mod registers;
pub mod stack;
pub mod trace;

pub use config::MachineConfig;
pub use error::{FaultKind, VmError, VmResult};
pub use interpreter::{HaltReason, Machine, Step};
pub use registers::RegisterFile;
pub use stack::{OperandStack, STACK_CAPACITY};
pub use trace::TraceEvent;

pub use stackvm_bytecode::{Opcode, ProgramBuilder, Register};
