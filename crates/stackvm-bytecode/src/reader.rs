//! Bounds-checked cursor over a program's bytes

use crate::IMMEDIATE_WIDTH;
use crate::error::{BytecodeError, Result};

/// Read cursor over an immutable byte stream
///
/// The position is a plain byte offset and may be moved anywhere, including
/// past the end. Reads never panic; they fail with
/// [`BytecodeError::UnexpectedEnd`] instead.
#[derive(Debug, Clone)]
pub struct BytecodeReader<'a> {
    code: &'a [u8],
    pos: usize,
}

impl<'a> BytecodeReader<'a> {
    /// Create a reader positioned at offset 0
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, pos: 0 }
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move to an absolute byte offset
    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// True once the cursor has reached or passed the last byte
    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.code.len()
    }

    /// The underlying byte stream
    pub fn code(&self) -> &'a [u8] {
        self.code
    }

    /// Read one raw byte
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .code
            .get(self.pos)
            .ok_or(BytecodeError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a little-endian two's-complement 32-bit immediate
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let end = self
            .pos
            .checked_add(IMMEDIATE_WIDTH)
            .ok_or(BytecodeError::UnexpectedEnd { offset: self.pos })?;
        let bytes: [u8; IMMEDIATE_WIDTH] = match self.code.get(self.pos..end) {
            Some(slice) => [slice[0], slice[1], slice[2], slice[3]],
            None => {
                return Err(BytecodeError::UnexpectedEnd {
                    offset: self.code.len().max(self.pos),
                });
            }
        };
        self.pos = end;
        Ok(i32::from_le_bytes(bytes))
    }
}
