// phaseline/src/core/control.rs

//! Defines the lifecycle status of a single pipeline execution.

/// Status of one `execute` invocation.
///
/// `Pending -> Running -> {Completed | Failed}`. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
  /// Created but not yet driven.
  Pending,
  /// Interceptors are being invoked.
  Running,
  /// Finished, either by running out of interceptors or through `finish()`.
  Completed,
  /// An interceptor failed or the run was cancelled.
  Failed,
}

impl ExecutionStatus {
  pub fn is_terminal(&self) -> bool {
    matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
  }
}
