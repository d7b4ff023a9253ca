//! Fluent program encoder

use crate::instruction::Opcode;
use crate::operand::Register;

/// Builder for encoding programs
///
/// Appends bytes exactly as asked. Nothing is validated: wrong operand counts,
/// out-of-range registers and bad jump targets all encode fine and are only
/// rejected when the program runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramBuilder {
    bytecode: Vec<u8>,
}

impl ProgramBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an opcode byte
    pub fn instruction(mut self, opcode: Opcode) -> Self {
        self.bytecode.push(opcode.to_byte());
        self
    }

    /// Append a single raw byte
    pub fn bit8(mut self, value: u8) -> Self {
        self.bytecode.push(value);
        self
    }

    /// Append a 32-bit little-endian immediate
    pub fn bit32(mut self, value: i32) -> Self {
        self.bytecode.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Append an operand-less instruction
    pub fn op(self, opcode: Opcode) -> Self {
        self.instruction(opcode)
    }

    /// `HALT`
    pub fn halt(self) -> Self {
        self.instruction(Opcode::Halt)
    }

    /// `PUSH value`
    pub fn push(self, value: i32) -> Self {
        self.instruction(Opcode::Push).bit32(value)
    }

    /// `PUSHREG reg`
    pub fn push_reg(self, reg: Register) -> Self {
        self.instruction(Opcode::PushReg).bit8(reg.index())
    }

    /// `MOV dst, src`
    pub fn mov(self, dst: Register, src: Register) -> Self {
        self.instruction(Opcode::Mov).bit8(dst.index()).bit8(src.index())
    }

    /// `LEA reg, value`
    pub fn lea(self, reg: Register, value: i32) -> Self {
        self.instruction(Opcode::Lea).bit8(reg.index()).bit32(value)
    }

    /// `POP`
    pub fn pop(self) -> Self {
        self.instruction(Opcode::Pop)
    }

    /// `POPREG reg`
    pub fn pop_reg(self, reg: Register) -> Self {
        self.instruction(Opcode::PopReg).bit8(reg.index())
    }

    /// `JMP target`
    pub fn jmp(self, target: i32) -> Self {
        self.instruction(Opcode::Jmp).bit32(target)
    }

    /// `JZ target`
    pub fn jz(self, target: i32) -> Self {
        self.instruction(Opcode::Jz).bit32(target)
    }

    /// `JNZ target`
    pub fn jnz(self, target: i32) -> Self {
        self.instruction(Opcode::Jnz).bit32(target)
    }

    /// Number of bytes encoded so far, i.e. the offset of the next instruction
    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    /// True if nothing has been encoded
    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }

    /// Borrow the encoded bytes
    pub fn bytecode(&self) -> &[u8] {
        &self.bytecode
    }

    /// Finish and take the encoded bytes
    pub fn build(self) -> Vec<u8> {
        self.bytecode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit32_is_little_endian() {
        let code = ProgramBuilder::new().bit32(0x0102_0304).bit32(-2).build();
        assert_eq!(code, vec![0x04, 0x03, 0x02, 0x01, 0xFE, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_typed_helpers_match_primitives() {
        let typed = ProgramBuilder::new()
            .push(10)
            .pop_reg(Register::R1)
            .lea(Register::R7, 3)
            .op(Opcode::Add)
            .build();
        let raw = ProgramBuilder::new()
            .instruction(Opcode::Push)
            .bit32(10)
            .instruction(Opcode::PopReg)
            .bit8(1)
            .instruction(Opcode::Lea)
            .bit8(7)
            .bit32(3)
            .instruction(Opcode::Add)
            .build();
        assert_eq!(typed, raw);
    }

    #[test]
    fn test_no_validation() {
        // Out-of-range register, dangling PUSH with no immediate
        let code = ProgramBuilder::new()
            .instruction(Opcode::PushReg)
            .bit8(200)
            .instruction(Opcode::Push)
            .build();
        assert_eq!(code, vec![2, 200, 1]);
    }

    #[test]
    fn test_len_tracks_offsets() {
        let builder = ProgramBuilder::new();
        assert!(builder.is_empty());
        let builder = builder.push(1).mov(Register::R0, Register::R1);
        assert_eq!(builder.len(), 8);
        assert_eq!(builder.bytecode()[5], Opcode::Mov.to_byte());
    }
}
