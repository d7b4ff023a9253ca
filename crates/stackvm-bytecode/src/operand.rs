//! Bytecode operands

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of slots in the register file
pub const REGISTER_COUNT: usize = 8;

/// General purpose register identifier
///
/// Only `R0..=R7` exist. The raw operand byte found in a program may hold any
/// value; [`Register::from_index`] is how the engine rejects the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Register {
    /// Register 0
    R0 = 0,
    /// Register 1
    R1 = 1,
    /// Register 2
    R2 = 2,
    /// Register 3
    R3 = 3,
    /// Register 4
    R4 = 4,
    /// Register 5
    R5 = 5,
    /// Register 6
    R6 = 6,
    /// Register 7
    R7 = 7,
}

impl Register {
    /// All registers in index order
    pub const ALL: [Register; REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Convert from a raw operand byte
    #[inline]
    pub const fn from_index(index: u8) -> Option<Self> {
        if (index as usize) < REGISTER_COUNT {
            Some(Self::ALL[index as usize])
        } else {
            None
        }
    }

    /// Get register index
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }
}

impl From<Register> for u8 {
    fn from(reg: Register) -> Self {
        reg.index()
    }
}

impl TryFrom<u8> for Register {
    type Error = u8;

    fn try_from(index: u8) -> std::result::Result<Self, Self::Error> {
        Self::from_index(index).ok_or(index)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.index())
    }
}
