//! Instruction tracing for the VM.
//!
//! The tracer keeps the most recent executed instructions in a bounded ring
//! buffer and can echo each one to stderr. It costs a single branch per
//! instruction when disabled.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, Write};

use crate::opcode::Instruction;

// =============================================================================
// Configuration
// =============================================================================

/// Where trace output should be sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraceOutput {
    /// No output (records are still kept in the buffer).
    #[default]
    None,
    /// Write each record to stderr as it happens.
    Stderr,
}

/// Configuration for the tracer.
#[derive(Clone, Debug)]
pub struct TraceConfig {
    /// Whether tracing is enabled.
    pub enabled: bool,
    /// Maximum records to keep in the buffer.
    pub buffer_size: usize,
    /// Where to echo records.
    pub output: TraceOutput,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            buffer_size: 10_000,
            output: TraceOutput::None,
        }
    }
}

impl TraceConfig {
    /// Creates a new (disabled) tracer configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to enable tracing.
    #[must_use]
    pub fn enabled(mut self) -> Self {
        self.enabled = true;
        self
    }

    /// Builder method to set buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Builder method to echo records to stderr.
    #[must_use]
    pub fn to_stderr(mut self) -> Self {
        self.output = TraceOutput::Stderr;
        self
    }
}

// =============================================================================
// Records
// =============================================================================

/// One executed instruction, with the machine shape just before it ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Sequence number of this step within the execution (0-based).
    pub step: u64,
    /// The instruction executed.
    pub instruction: Instruction,
    /// Operand stack depth before execution.
    pub operand_depth: usize,
    /// Saved-environment stack depth before execution.
    pub env_stack_depth: usize,
    /// Return stack depth before execution.
    pub return_depth: usize,
    /// Depth of the active environment chain before execution.
    pub env_depth: usize,
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:06} {:04}  {:<18} sp={} esp={} rsp={} env={}",
            self.step,
            self.instruction.address,
            self.instruction.to_string(),
            self.operand_depth,
            self.env_stack_depth,
            self.return_depth,
            self.env_depth,
        )
    }
}

// =============================================================================
// Tracer
// =============================================================================

/// Records executed instructions into a bounded buffer.
#[derive(Clone, Debug)]
pub struct Tracer {
    config: TraceConfig,
    records: VecDeque<TraceRecord>,
    /// Records discarded because the buffer was full.
    dropped: u64,
}

impl Tracer {
    /// Creates a new tracer with the given configuration.
    #[must_use]
    pub fn new(config: TraceConfig) -> Self {
        Self {
            records: VecDeque::with_capacity(config.buffer_size.min(1024)),
            config,
            dropped: 0,
        }
    }

    /// Creates a disabled tracer.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(TraceConfig::default())
    }

    /// Returns whether tracing is enabled.
    #[must_use]
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enables tracing.
    pub fn enable(&mut self) {
        self.config.enabled = true;
    }

    /// Disables tracing.
    pub fn disable(&mut self) {
        self.config.enabled = false;
    }

    /// Sets the trace output destination.
    pub fn set_output(&mut self, output: TraceOutput) {
        self.config.output = output;
    }

    /// Records a step. Returns immediately when tracing is disabled.
    #[inline]
    pub fn record(&mut self, record: TraceRecord) {
        if !self.config.enabled {
            return;
        }
        self.record_internal(record);
    }

    fn record_internal(&mut self, record: TraceRecord) {
        if self.config.output == TraceOutput::Stderr {
            let _ = writeln!(io::stderr(), "{record}");
        }

        if self.config.buffer_size == 0 {
            self.dropped += 1;
            return;
        }
        while self.records.len() >= self.config.buffer_size {
            self.records.pop_front();
            self.dropped += 1;
        }
        self.records.push_back(record);
    }

    /// Iterates over buffered records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &TraceRecord> {
        self.records.iter()
    }

    /// Returns the number of buffered records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no records are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns how many records were evicted or never buffered.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Drains all buffered records.
    pub fn take(&mut self) -> Vec<TraceRecord> {
        self.dropped = 0;
        self.records.drain(..).collect()
    }

    /// Clears the buffer.
    pub fn clear(&mut self) {
        self.records.clear();
        self.dropped = 0;
    }

    /// Formats buffered records, one per line.
    #[must_use]
    pub fn format(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_string());
            out.push('\n');
        }
        out
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::disabled()
    }
}
