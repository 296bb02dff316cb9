// phaseline/src/pipeline/execution.rs

//! Contains `Pipeline::execute()` and its variants, which run the registered
//! interceptors against a subject and resolve to the final subject.

use crate::core::context::PipelineContext;
use crate::core::state::PlannedPhase;
use crate::error::PhaselineError;
use crate::pipeline::definition::Pipeline;
use tokio_util::sync::CancellationToken;
use tracing::{event, instrument, Level};

impl<TSubject, TContext, Err> Pipeline<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  /// Executes the pipeline over `subject` within `context`.
  ///
  /// Interceptors run one at a time: phases in registry order, interceptors in
  /// registration order within a phase. Returns the subject as it stands once
  /// the last interceptor returns or one of them calls `finish()`. The first
  /// interceptor error aborts the run and is returned as-is; no subject is
  /// returned on failure.
  ///
  /// Every call gets its own execution state, so the same pipeline can be
  /// executed concurrently or from inside one of its own interceptors' callees.
  pub async fn execute(&self, context: TContext, subject: TSubject) -> Result<TSubject, Err> {
    self.execute_with_cancellation(context, subject, CancellationToken::new()).await
  }

  /// Like `execute`, but stops as soon as `cancellation` is cancelled.
  ///
  /// The interceptor in flight is dropped at its next suspension point, no
  /// further interceptors are invoked, and the run fails with
  /// `PhaselineError::Cancelled` (converted into `Err`).
  #[instrument(
    name = "Pipeline::execute",
    skip_all,
    fields(
      subject_type = %std::any::type_name::<TSubject>(),
      context_type = %std::any::type_name::<TContext>(),
      error_type = %std::any::type_name::<Err>(),
      num_phases = self.phases.len(),
      num_interceptors = self.interceptors.len(),
    ),
    err(Display)
  )]
  pub async fn execute_with_cancellation(
    &self,
    context: TContext,
    subject: TSubject,
    cancellation: CancellationToken,
  ) -> Result<TSubject, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    let ctx = PipelineContext::new(self.plan(), context, subject, cancellation);
    ctx.start();
    let driven = ctx.run_remaining().await;
    let outcome = ctx.resolve(driven);

    if outcome.is_ok() {
      event!(Level::DEBUG, "Pipeline execution completed successfully.");
    }
    outcome
  }

  /// Snapshot of the current phases and interceptors. Later registrations on a
  /// clone of this pipeline never reach a run that already started.
  fn plan(&self) -> Vec<PlannedPhase<TSubject, TContext, Err>> {
    self
      .phases
      .phases()
      .map(|phase| PlannedPhase {
        phase: phase.clone(),
        interceptors: self.interceptors.interceptors_for(phase).to_vec(),
      })
      .collect()
  }
}

impl<TSubject, Err> Pipeline<TSubject, (), Err>
where
  TSubject: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  /// Executes a context-less pipeline; shorthand for `execute((), subject)`.
  pub async fn run(&self, subject: TSubject) -> Result<TSubject, Err> {
    self.execute((), subject).await
  }
}
