// phaseline/src/core/state.rs

//! Per-invocation execution state and the step function that moves its cursor.

use crate::core::context::Interceptor;
use crate::core::control::ExecutionStatus;
use crate::core::phase::PipelinePhase;

/// One phase of an execution plan: the phase and the interceptors it had when the run started.
pub(crate) struct PlannedPhase<TSubject, TContext, Err> {
  pub(crate) phase: PipelinePhase,
  pub(crate) interceptors: Vec<Interceptor<TSubject, TContext, Err>>,
}

/// Position inside an execution plan. Indices follow the pipeline's phase order
/// and the registration order inside a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
  pub phase_index: usize,
  pub interceptor_index: usize,
}

/// Mutable record of a single `execute` call.
///
/// Never shared between calls. The subject is taken out when the run resolves,
/// so it is `None` only after completion.
pub(crate) struct ExecutionState<TSubject> {
  pub(crate) subject: Option<TSubject>,
  /// Next interceptor to invoke.
  pub(crate) cursor: Cursor,
  /// Interceptor invoked most recently.
  pub(crate) current: Option<Cursor>,
  pub(crate) status: ExecutionStatus,
  /// Set once a failure has been logged, so enclosing `proceed()` frames only pass it on.
  pub(crate) failure_reported: bool,
  exhausted: bool,
}

impl<TSubject> ExecutionState<TSubject> {
  pub(crate) fn new(subject: TSubject) -> Self {
    Self {
      subject: Some(subject),
      cursor: Cursor::default(),
      current: None,
      status: ExecutionStatus::Pending,
      failure_reported: false,
      exhausted: false,
    }
  }

  /// Returns the position of the next interceptor to run and moves the cursor past it.
  ///
  /// Phases without interceptors are skipped. Returns `None` once the plan is
  /// exhausted, the run finished early, or the status is terminal.
  pub(crate) fn advance<TContext, Err>(
    &mut self,
    plan: &[PlannedPhase<TSubject, TContext, Err>],
  ) -> Option<Cursor> {
    if self.exhausted || self.status.is_terminal() {
      return None;
    }

    while let Some(planned) = plan.get(self.cursor.phase_index) {
      if self.cursor.interceptor_index < planned.interceptors.len() {
        let position = self.cursor;
        self.cursor.interceptor_index += 1;
        self.current = Some(position);
        return Some(position);
      }
      self.cursor.phase_index += 1;
      self.cursor.interceptor_index = 0;
    }

    self.exhausted = true;
    None
  }

  /// Drops every remaining interceptor from this run.
  pub(crate) fn exhaust(&mut self) {
    self.exhausted = true;
  }
}
