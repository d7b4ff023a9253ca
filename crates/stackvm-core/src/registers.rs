//! Register file

use stackvm_bytecode::{REGISTER_COUNT, Register};

use crate::error::{VmError, VmResult};

/// Eight zero-initialized `i32` registers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    slots: [i32; REGISTER_COUNT],
}

impl RegisterFile {
    /// Create a register file with every slot zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a register by raw operand byte
    #[inline]
    pub fn read(&self, id: u8) -> VmResult<i32> {
        self.slots
            .get(id as usize)
            .copied()
            .ok_or(VmError::InvalidRegister(id))
    }

    /// Write a register by raw operand byte
    #[inline]
    pub fn write(&mut self, id: u8, value: i32) -> VmResult<()> {
        let slot = self
            .slots
            .get_mut(id as usize)
            .ok_or(VmError::InvalidRegister(id))?;
        *slot = value;
        Ok(())
    }

    /// Validate a raw operand byte as a register identifier
    #[inline]
    pub fn resolve(id: u8) -> VmResult<Register> {
        Register::from_index(id).ok_or(VmError::InvalidRegister(id))
    }

    /// Read a register that is known to exist
    #[inline]
    pub fn get(&self, reg: Register) -> i32 {
        self.slots[reg.index() as usize]
    }

    /// Write a register that is known to exist
    #[inline]
    pub fn set(&mut self, reg: Register, value: i32) {
        self.slots[reg.index() as usize] = value;
    }

    /// All register values in index order
    pub fn as_array(&self) -> &[i32; REGISTER_COUNT] {
        &self.slots
    }

    /// Zero every register
    pub fn clear(&mut self) {
        self.slots = [0; REGISTER_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_initialized() {
        let regs = RegisterFile::new();
        assert_eq!(regs.as_array(), &[0; REGISTER_COUNT]);
    }

    #[test]
    fn test_registers_are_independent() {
        let mut regs = RegisterFile::new();
        regs.write(0, 11).unwrap();
        regs.write(7, -4).unwrap();
        assert_eq!(regs.read(0), Ok(11));
        assert_eq!(regs.get(Register::R7), -4);
        assert_eq!(regs.as_array(), &[11, 0, 0, 0, 0, 0, 0, -4]);
    }

    #[test]
    fn test_invalid_register() {
        let mut regs = RegisterFile::new();
        assert_eq!(regs.read(8), Err(VmError::InvalidRegister(8)));
        assert_eq!(regs.write(255, 1), Err(VmError::InvalidRegister(255)));
        assert_eq!(regs.as_array(), &[0; REGISTER_COUNT]);
    }
}
