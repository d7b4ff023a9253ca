//! Machine configuration

/// Configuration for a [`Machine`](crate::Machine)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum instructions a run may execute before failing with
    /// [`VmError::StepLimitExceeded`](crate::VmError::StepLimitExceeded).
    /// `None` means unbounded.
    pub step_limit: Option<u64>,
}

impl MachineConfig {
    /// Default configuration: unbounded execution
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound execution to `limit` instructions
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }
}
