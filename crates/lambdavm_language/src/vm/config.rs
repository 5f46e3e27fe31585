//! Configuration for the virtual machine.

use crate::trace::TraceConfig;

/// Capacity of each VM stack unless configured otherwise.
pub const DEFAULT_STACK_CAPACITY: usize = 1024;

/// Configuration for a [`Vm`](super::Vm).
///
/// Stack capacities bound memory use; a divergent program fails with a
/// stack-exhausted fault once one of them fills. `max_steps` is an optional
/// instruction budget for callers that need a hard stop before that.
#[derive(Clone, Debug)]
pub struct VmConfig {
    /// Capacity of the operand stack.
    pub operand_capacity: usize,
    /// Capacity of the saved-environment stack.
    pub env_capacity: usize,
    /// Capacity of the return-address stack.
    pub return_capacity: usize,
    /// Maximum number of instructions per execution (`None` = unlimited).
    pub max_steps: Option<u64>,
    /// Instruction tracing.
    pub trace: TraceConfig,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            operand_capacity: DEFAULT_STACK_CAPACITY,
            env_capacity: DEFAULT_STACK_CAPACITY,
            return_capacity: DEFAULT_STACK_CAPACITY,
            max_steps: None,
            trace: TraceConfig::default(),
        }
    }
}

impl VmConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set all three stack capacities at once.
    #[must_use]
    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.operand_capacity = capacity;
        self.env_capacity = capacity;
        self.return_capacity = capacity;
        self
    }

    /// Builder method to set the operand stack capacity.
    #[must_use]
    pub fn with_operand_capacity(mut self, capacity: usize) -> Self {
        self.operand_capacity = capacity;
        self
    }

    /// Builder method to set the instruction budget.
    #[must_use]
    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Builder method to set the tracing configuration.
    #[must_use]
    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = trace;
        self
    }
}
