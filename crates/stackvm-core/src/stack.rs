//! Bounded operand stack

use crate::error::{VmError, VmResult};

/// Operand stack capacity in slots
pub const STACK_CAPACITY: usize = 2048;

/// Fixed-capacity LIFO stack of `i32`
///
/// Backed by a zeroed array plus a length counter. Slots above the length
/// always hold zero, so [`OperandStack::slots`] shows exactly what is live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperandStack<const N: usize = STACK_CAPACITY> {
    slots: Box<[i32; N]>,
    len: usize,
}

impl<const N: usize> OperandStack<N> {
    /// Create an empty stack
    pub fn new() -> Self {
        Self {
            slots: Box::new([0; N]),
            len: 0,
        }
    }

    /// Push a value, failing with [`VmError::Overflow`] when full
    #[inline]
    pub fn push(&mut self, value: i32) -> VmResult<()> {
        let slot = self.slots.get_mut(self.len).ok_or(VmError::Overflow)?;
        *slot = value;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the top value
    #[inline]
    pub fn pop(&mut self) -> VmResult<i32> {
        let top = self.len.checked_sub(1).ok_or(VmError::Underflow)?;
        let value = std::mem::take(&mut self.slots[top]);
        self.len = top;
        Ok(value)
    }

    /// Return the top value without removing it
    #[inline]
    pub fn top(&self) -> VmResult<i32> {
        let top = self.len.checked_sub(1).ok_or(VmError::Underflow)?;
        Ok(self.slots[top])
    }

    /// Fail with [`VmError::Underflow`] unless at least `count` values are present
    #[inline]
    pub fn require(&self, count: usize) -> VmResult<()> {
        if self.len < count {
            return Err(VmError::Underflow);
        }
        Ok(())
    }

    /// True if no values are present
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of values present
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Maximum number of values
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Full backing storage, live values first
    pub fn slots(&self) -> &[i32; N] {
        &self.slots
    }

    /// Live values, bottom first
    pub fn as_slice(&self) -> &[i32] {
        &self.slots[..self.len]
    }

    /// Drop every value
    pub fn clear(&mut self) {
        self.slots[..self.len].fill(0);
        self.len = 0;
    }
}

impl<const N: usize> Default for OperandStack<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack: OperandStack = OperandStack::new();
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(stack.top(), Ok(2));
        assert_eq!(stack.pop(), Ok(2));
        assert_eq!(stack.pop(), Ok(1));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_overflow_at_capacity() {
        let mut stack = OperandStack::<4>::new();
        for i in 0..4 {
            stack.push(i).unwrap();
        }
        assert_eq!(stack.push(99), Err(VmError::Overflow));
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_underflow_when_empty() {
        let mut stack = OperandStack::<4>::new();
        assert_eq!(stack.pop(), Err(VmError::Underflow));
        assert_eq!(stack.top(), Err(VmError::Underflow));
        assert_eq!(stack.require(1), Err(VmError::Underflow));
        assert_eq!(stack.require(0), Ok(()));
    }

    #[test]
    fn test_popped_slots_are_zeroed() {
        let mut stack = OperandStack::<4>::new();
        stack.push(7).unwrap();
        stack.push(8).unwrap();
        stack.pop().unwrap();
        assert_eq!(stack.slots(), &[7, 0, 0, 0]);

        stack.clear();
        assert_eq!(stack.slots(), &[0; 4]);
    }

    #[test]
    fn test_default_capacity() {
        let stack: OperandStack = OperandStack::default();
        assert_eq!(stack.capacity(), STACK_CAPACITY);
        assert_eq!(stack.slots().len(), 2048);
    }
}
