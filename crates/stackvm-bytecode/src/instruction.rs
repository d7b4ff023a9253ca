//! Bytecode instructions (opcodes)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::IMMEDIATE_WIDTH;
use crate::error::{BytecodeError, Result};
use crate::reader::BytecodeReader;

/// Bytecode opcodes
///
/// Stack-based instruction set. "Pops A then B" means A is the value on top of
/// the stack and B the one pushed just before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    // ==================== Control ====================
    /// Stop execution
    Halt = 0,

    // ==================== Data movement ====================
    /// Push immediate: push imm32
    Push = 1,
    /// Push register: push regs\[reg\]
    PushReg = 2,
    /// Copy register: regs\[dst\] = regs\[src\]
    Mov = 3,
    /// Load immediate into register: regs\[reg\] = imm32
    Lea = 4,
    /// Discard top of stack
    Pop = 5,
    /// Pop into register: regs\[reg\] = pop
    PopReg = 6,

    // ==================== Arithmetic ====================
    /// Addition: push A + B
    Add = 7,
    /// Subtraction: push B - A
    Sub = 8,
    /// Multiplication: push A * B
    Mul = 9,
    /// Truncating division: push B / A
    Div = 10,

    // ==================== Bitwise ====================
    /// Bitwise AND: push A & B
    And = 11,
    /// Bitwise OR: push A | B
    Or = 12,
    /// Bitwise complement: push !A
    Not = 13,
    /// Left shift: push B << A
    Shl = 14,
    /// Arithmetic right shift: push B >> A
    Shr = 15,

    // ==================== Control Flow ====================
    /// Unconditional jump to an absolute offset
    Jmp = 16,
    /// Jump if top of stack is zero (peeks)
    Jz = 17,
    /// Jump if top of stack is non-zero (peeks)
    Jnz = 18,

    // ==================== Comparison ====================
    /// Equality: push 1 if B == A else 0
    Cmp = 19,
}

impl Opcode {
    /// Every opcode in encoding order
    pub const ALL: [Opcode; 20] = [
        Self::Halt,
        Self::Push,
        Self::PushReg,
        Self::Mov,
        Self::Lea,
        Self::Pop,
        Self::PopReg,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::And,
        Self::Or,
        Self::Not,
        Self::Shl,
        Self::Shr,
        Self::Jmp,
        Self::Jz,
        Self::Jnz,
        Self::Cmp,
    ];

    /// Convert from raw byte
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.get(byte as usize).copied()
    }

    /// Convert to raw byte
    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// Get the mnemonic of this opcode
    pub const fn name(self) -> &'static str {
        match self {
            Self::Halt => "HALT",
            Self::Push => "PUSH",
            Self::PushReg => "PUSHREG",
            Self::Mov => "MOV",
            Self::Lea => "LEA",
            Self::Pop => "POP",
            Self::PopReg => "POPREG",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Not => "NOT",
            Self::Shl => "SHL",
            Self::Shr => "SHR",
            Self::Jmp => "JMP",
            Self::Jz => "JZ",
            Self::Jnz => "JNZ",
            Self::Cmp => "CMP",
        }
    }

    /// Number of operand bytes following the opcode byte
    pub const fn operand_width(self) -> usize {
        match self {
            Self::Push | Self::Jmp | Self::Jz | Self::Jnz => IMMEDIATE_WIDTH,
            Self::PushReg | Self::PopReg => 1,
            Self::Mov => 2,
            Self::Lea => 1 + IMMEDIATE_WIDTH,
            Self::Halt
            | Self::Pop
            | Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Div
            | Self::And
            | Self::Or
            | Self::Not
            | Self::Shl
            | Self::Shr
            | Self::Cmp => 0,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded instruction with its operands
///
/// Register operands stay raw bytes: a program may legally encode `PUSHREG 200`,
/// it just faults when executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Instruction {
    Halt,
    Push { value: i32 },
    PushReg { reg: u8 },
    Mov { dst: u8, src: u8 },
    Lea { reg: u8, value: i32 },
    Pop,
    PopReg { reg: u8 },
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Not,
    Shl,
    Shr,
    Jmp { target: i32 },
    Jz { target: i32 },
    Jnz { target: i32 },
    Cmp,
}

impl Instruction {
    /// Decode the instruction at the reader's position, advancing past it
    ///
    /// For listings and diagnostics only; the engine reads operands itself so
    /// that stack checks can run before a jump's immediate is read.
    pub fn decode(reader: &mut BytecodeReader<'_>) -> Result<Self> {
        let offset = reader.position();
        let byte = reader.read_u8()?;
        let opcode =
            Opcode::from_byte(byte).ok_or(BytecodeError::InvalidOpcode { opcode: byte, offset })?;

        Ok(match opcode {
            Opcode::Halt => Self::Halt,
            Opcode::Push => Self::Push {
                value: reader.read_i32()?,
            },
            Opcode::PushReg => Self::PushReg {
                reg: reader.read_u8()?,
            },
            Opcode::Mov => {
                let dst = reader.read_u8()?;
                let src = reader.read_u8()?;
                Self::Mov { dst, src }
            }
            Opcode::Lea => {
                let reg = reader.read_u8()?;
                let value = reader.read_i32()?;
                Self::Lea { reg, value }
            }
            Opcode::Pop => Self::Pop,
            Opcode::PopReg => Self::PopReg {
                reg: reader.read_u8()?,
            },
            Opcode::Add => Self::Add,
            Opcode::Sub => Self::Sub,
            Opcode::Mul => Self::Mul,
            Opcode::Div => Self::Div,
            Opcode::And => Self::And,
            Opcode::Or => Self::Or,
            Opcode::Not => Self::Not,
            Opcode::Shl => Self::Shl,
            Opcode::Shr => Self::Shr,
            Opcode::Jmp => Self::Jmp {
                target: reader.read_i32()?,
            },
            Opcode::Jz => Self::Jz {
                target: reader.read_i32()?,
            },
            Opcode::Jnz => Self::Jnz {
                target: reader.read_i32()?,
            },
            Opcode::Cmp => Self::Cmp,
        })
    }

    /// The opcode tag of this instruction
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::Halt => Opcode::Halt,
            Self::Push { .. } => Opcode::Push,
            Self::PushReg { .. } => Opcode::PushReg,
            Self::Mov { .. } => Opcode::Mov,
            Self::Lea { .. } => Opcode::Lea,
            Self::Pop => Opcode::Pop,
            Self::PopReg { .. } => Opcode::PopReg,
            Self::Add => Opcode::Add,
            Self::Sub => Opcode::Sub,
            Self::Mul => Opcode::Mul,
            Self::Div => Opcode::Div,
            Self::And => Opcode::And,
            Self::Or => Opcode::Or,
            Self::Not => Opcode::Not,
            Self::Shl => Opcode::Shl,
            Self::Shr => Opcode::Shr,
            Self::Jmp { .. } => Opcode::Jmp,
            Self::Jz { .. } => Opcode::Jz,
            Self::Jnz { .. } => Opcode::Jnz,
            Self::Cmp => Opcode::Cmp,
        }
    }

    /// Encoded size in bytes, opcode included
    pub const fn encoded_len(&self) -> usize {
        1 + self.opcode().operand_width()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().name();
        match self {
            Self::Push { value } => write!(f, "{name} {value}"),
            Self::PushReg { reg } | Self::PopReg { reg } => write!(f, "{name} r{reg}"),
            Self::Mov { dst, src } => write!(f, "{name} r{dst}, r{src}"),
            Self::Lea { reg, value } => write!(f, "{name} r{reg}, {value}"),
            Self::Jmp { target } | Self::Jz { target } | Self::Jnz { target } => {
                write!(f, "{name} @{target}")
            }
            _ => f.write_str(name),
        }
    }
}

/// Decode an entire byte stream into `(offset, instruction)` pairs
///
/// Decoding is linear from offset 0; jump targets are not followed.
pub fn disassemble(code: &[u8]) -> Result<Vec<(usize, Instruction)>> {
    let mut reader = BytecodeReader::new(code);
    let mut listing = Vec::new();
    while !reader.is_at_end() {
        let offset = reader.position();
        listing.push((offset, Instruction::decode(&mut reader)?));
    }
    Ok(listing)
}
