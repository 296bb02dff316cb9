// phaseline/src/core/context.rs

//! Defines the `Interceptor` type and `PipelineContext`, the handle an interceptor
//! receives for the run it takes part in.

use crate::core::control::ExecutionStatus;
use crate::core::phase::PipelinePhase;
use crate::core::state::{Cursor, ExecutionState, PlannedPhase};
use crate::error::{PhaselineError, PhaselineResult};
use crate::pipeline::definition::Pipeline;
use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{event, span, Instrument, Level};

/// The future returned by an interceptor.
pub type InterceptorFuture<Err> = Pin<Box<dyn Future<Output = Result<(), Err>> + Send>>;

/// Type alias for a registered interceptor.
///
/// An interceptor is an asynchronous function that takes ownership of a
/// `PipelineContext` for the current run and returns a `Future` resolving to
/// `Result<(), Err>`. Returning `Ok(())` proceeds to the next interceptor with
/// whatever subject is current; returning `Err` fails the whole run.
///
/// Interceptors are shared behind `Arc` so pipelines can be cloned and merged
/// without rebuilding them.
pub type Interceptor<TSubject, TContext, Err> =
  Arc<dyn Fn(PipelineContext<TSubject, TContext, Err>) -> InterceptorFuture<Err> + Send + Sync>;

/// Wraps a user closure returning any `Send` future into an `Interceptor`.
pub(crate) fn boxed_interceptor<TSubject, TContext, Err, F, Fut>(interceptor_fn: F) -> Interceptor<TSubject, TContext, Err>
where
  TSubject: 'static,
  TContext: 'static,
  Err: 'static,
  F: Fn(PipelineContext<TSubject, TContext, Err>) -> Fut + Send + Sync + 'static,
  Fut: Future<Output = Result<(), Err>> + Send + 'static,
{
  Arc::new(
    move |ctx: PipelineContext<TSubject, TContext, Err>| -> InterceptorFuture<Err> { Box::pin(interceptor_fn(ctx)) },
  )
}

struct Execution<TSubject, TContext, Err> {
  plan: Vec<PlannedPhase<TSubject, TContext, Err>>,
  state: RwLock<ExecutionState<TSubject>>,
  context: TContext,
  cancellation: CancellationToken,
}

/// Handle to a single running execution, passed to every interceptor.
///
/// Cloning the handle is cheap and refers to the same run. A clone that outlives
/// the run can still be inspected, but any attempt to change the outcome fails
/// with `PhaselineError::AlreadyCompleted`.
///
/// Guards returned by [`subject`](Self::subject) and [`subject_mut`](Self::subject_mut)
/// are blocking locks. **They MUST be dropped before any `.await` point and before
/// calling another method on the same context** (`proceed_with`, `finish`, ...).
pub struct PipelineContext<TSubject, TContext = (), Err = PhaselineError>(Arc<Execution<TSubject, TContext, Err>>);

impl<TSubject, TContext, Err> Clone for PipelineContext<TSubject, TContext, Err> {
  fn clone(&self) -> Self {
    PipelineContext(Arc::clone(&self.0))
  }
}

impl<TSubject, TContext, Err> PipelineContext<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  pub(crate) fn new(
    plan: Vec<PlannedPhase<TSubject, TContext, Err>>,
    context: TContext,
    subject: TSubject,
    cancellation: CancellationToken,
  ) -> Self {
    PipelineContext(Arc::new(Execution {
      plan,
      state: RwLock::new(ExecutionState::new(subject)),
      context,
      cancellation,
    }))
  }

  /// The immutable context value of this run.
  pub fn context(&self) -> &TContext {
    &self.0.context
  }

  /// Read access to the current subject.
  ///
  /// Fails with `AlreadyCompleted` once the run has resolved and its subject
  /// has been handed back to the caller.
  pub fn subject(&self) -> PhaselineResult<MappedRwLockReadGuard<'_, TSubject>> {
    RwLockReadGuard::try_map(self.0.state.read(), |state| state.subject.as_ref())
      .map_err(|_| PhaselineError::AlreadyCompleted)
  }

  /// Write access to the current subject, for in-place changes.
  pub fn subject_mut(&self) -> PhaselineResult<MappedRwLockWriteGuard<'_, TSubject>> {
    let guard = self.0.state.write();
    if guard.status.is_terminal() {
      return Err(PhaselineError::AlreadyCompleted);
    }
    RwLockWriteGuard::try_map(guard, |state| state.subject.as_mut()).map_err(|_| PhaselineError::AlreadyCompleted)
  }

  /// Replaces the subject. The run continues with the next interceptor once the
  /// current one returns, exactly as with a bare return.
  pub fn proceed_with(&self, subject: TSubject) -> PhaselineResult<()> {
    let mut state = self.0.state.write();
    if state.status.is_terminal() {
      return Err(PhaselineError::AlreadyCompleted);
    }
    state.subject = Some(subject);
    event!(Level::TRACE, "Subject replaced.");
    Ok(())
  }

  /// Runs every remaining interceptor now, inside the calling one, and returns
  /// when they are done.
  ///
  /// Code after `proceed().await` observes the subject as the rest of the
  /// pipeline left it. When the remaining interceptors fail, the error is
  /// returned here; propagating it with `?` fails the run, while returning
  /// `Ok(())` instead recovers and completes the run with the current subject.
  /// Either way no interceptor runs twice.
  ///
  /// Fails with `AlreadyCompleted` after `finish()` or once the run has resolved.
  pub async fn proceed(&self) -> Result<(), Err> {
    if self.0.state.read().status.is_terminal() {
      return Err(Err::from(PhaselineError::AlreadyCompleted));
    }
    self.run_remaining().await
  }

  /// Ends the run successfully with the current subject. No further
  /// interceptors or phases are invoked.
  pub fn finish(&self) -> PhaselineResult<()> {
    let mut state = self.0.state.write();
    if state.status.is_terminal() {
      return Err(PhaselineError::AlreadyCompleted);
    }
    state.status = ExecutionStatus::Completed;
    state.exhaust();
    event!(Level::INFO, phase = ?self.phase_at(state.current), "Pipeline finished early.");
    Ok(())
  }

  /// Convenience for failing the run: returns `Err(error)` to be returned from the interceptor.
  pub fn fail<T>(&self, error: impl Into<Err>) -> Result<T, Err> {
    let error = error.into();
    event!(Level::DEBUG, %error, "Interceptor requested failure.");
    Err(error)
  }

  pub fn status(&self) -> ExecutionStatus {
    self.0.state.read().status
  }

  /// Position of the interceptor that ran most recently.
  pub fn cursor(&self) -> Option<Cursor> {
    self.0.state.read().current
  }

  /// Phase of the interceptor that ran most recently.
  pub fn current_phase(&self) -> Option<PipelinePhase> {
    let current = self.0.state.read().current;
    self.phase_at(current)
  }

  pub fn is_cancelled(&self) -> bool {
    self.0.cancellation.is_cancelled()
  }

  /// The token cancelling this run. Use `child_token()` on it for work that
  /// should stop together with the run.
  pub fn cancellation_token(&self) -> &CancellationToken {
    &self.0.cancellation
  }

  /// Executes another pipeline with its own, independent execution state.
  ///
  /// Cancelling this run cancels the nested one; the nested run cannot cancel
  /// this one. The calling interceptor resumes once the nested run resolves.
  pub async fn execute_nested<TInnerSubject, TInnerContext, InnerErr>(
    &self,
    pipeline: &Pipeline<TInnerSubject, TInnerContext, InnerErr>,
    context: TInnerContext,
    subject: TInnerSubject,
  ) -> Result<TInnerSubject, InnerErr>
  where
    TInnerSubject: 'static + Send + Sync,
    TInnerContext: 'static + Send + Sync,
    InnerErr: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
  {
    pipeline
      .execute_with_cancellation(context, subject, self.0.cancellation.child_token())
      .await
  }

  fn phase_at(&self, position: Option<Cursor>) -> Option<PipelinePhase> {
    position.and_then(|c| self.0.plan.get(c.phase_index)).map(|planned| planned.phase.clone())
  }

  pub(crate) fn start(&self) {
    self.0.state.write().status = ExecutionStatus::Running;
  }

  /// Drives the cursor until the plan is exhausted, the run finishes, fails or is cancelled.
  ///
  /// Re-entered through `proceed()`; the cursor is moved past an interceptor
  /// before it is invoked, so a nested drive always starts at the next one.
  pub(crate) async fn run_remaining(&self) -> Result<(), Err> {
    loop {
      if self.0.cancellation.is_cancelled() {
        {
          let mut state = self.0.state.write();
          state.exhaust();
          state.failure_reported = true;
        }
        event!(Level::INFO, "Pipeline execution cancelled before the next interceptor.");
        return Err(Err::from(PhaselineError::Cancelled));
      }

      let position = self.0.state.write().advance(&self.0.plan);
      let Some(position) = position else {
        return Ok(());
      };

      let planned = &self.0.plan[position.phase_index];
      let interceptor = Arc::clone(&planned.interceptors[position.interceptor_index]);
      let interceptor_span = span!(
        Level::DEBUG,
        "interceptor",
        phase = %planned.phase,
        phase_index = position.phase_index,
        interceptor_index = position.interceptor_index
      );

      let outcome = self
        .0
        .cancellation
        .run_until_cancelled(interceptor(self.clone()).instrument(interceptor_span))
        .await;

      match outcome {
        // A failure that came back through `proceed()` and was recovered from is no longer pending.
        Some(Ok(())) => {
          self.0.state.write().failure_reported = false;
        }
        Some(Err(e)) => {
          let already_reported = {
            let mut state = self.0.state.write();
            state.exhaust();
            std::mem::replace(&mut state.failure_reported, true)
          };
          if already_reported {
            event!(Level::DEBUG, error = %e, phase = %planned.phase, "Interceptor passed on a failure.");
          } else {
            event!(Level::ERROR, error = %e, phase = %planned.phase, "Interceptor failed.");
          }
          return Err(e);
        }
        None => {
          {
            let mut state = self.0.state.write();
            state.exhaust();
            state.failure_reported = true;
          }
          event!(Level::INFO, phase = %planned.phase, "Pipeline execution cancelled inside an interceptor.");
          return Err(Err::from(PhaselineError::Cancelled));
        }
      }
    }
  }

  /// Records the outcome and hands the subject back on success.
  pub(crate) fn resolve(&self, result: Result<(), Err>) -> Result<TSubject, Err> {
    let mut state = self.0.state.write();
    state.exhaust();
    match result {
      Ok(()) => {
        state.status = ExecutionStatus::Completed;
        state
          .subject
          .take()
          .ok_or_else(|| Err::from(PhaselineError::Internal("subject missing when resolving the run".to_string())))
      }
      Err(e) => {
        state.status = ExecutionStatus::Failed;
        state.subject = None;
        Err(e)
      }
    }
  }
}

impl<TSubject, TContext, Err> fmt::Debug for PipelineContext<TSubject, TContext, Err> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.0.state.read();
    f.debug_struct("PipelineContext")
      .field("status", &state.status)
      .field("cursor", &state.cursor)
      .field("phases", &self.0.plan.len())
      .field("cancelled", &self.0.cancellation.is_cancelled())
      .finish()
  }
}
