// phaseline/src/pipeline/hooks.rs

//! Contains methods for registering interceptors on pipeline phases.

use tracing::{event, Level};

use crate::core::context::{boxed_interceptor, PipelineContext};
use crate::core::interceptor_trait::PipelineInterceptor;
use crate::core::phase::PipelinePhase;
use crate::error::{PhaselineError, PhaselineResult};
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use std::sync::Arc;

impl<TSubject, TContext, Err> Pipeline<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  /// Registers an interceptor for `phase`, after any already registered there.
  ///
  /// The phase must already belong to the pipeline (declared in `new`, or added
  /// through `add_phase` / `insert_phase_*`); otherwise `UnknownPhase` is returned.
  ///
  /// The `interceptor_fn` takes the run's `PipelineContext` and returns a `Future`
  /// resolving to `Result<(), UserProvidedErr>`, where `UserProvidedErr` must be
  /// convertible into the pipeline's `Err` type.
  pub fn intercept<F, UserProvidedErr>(
    &mut self,
    phase: &PipelinePhase,
    interceptor_fn: impl Fn(PipelineContext<TSubject, TContext, Err>) -> F + Send + Sync + 'static,
  ) -> PhaselineResult<()>
  where
    F: Future<Output = Result<(), UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_phase_exists(phase)?;
    let interceptor = boxed_interceptor(move |ctx: PipelineContext<TSubject, TContext, Err>| {
      let user_fut = interceptor_fn(ctx);
      async move { user_fut.await.map_err(Into::into) }
    });
    self.interceptors.push(phase, interceptor);
    event!(
      Level::DEBUG,
      phase = %phase,
      registered = self.interceptor_count_for(phase),
      "Interceptor registered."
    );
    Ok(())
  }

  /// Registers a struct-based interceptor for `phase`.
  /// (Same ordering and phase rules as `intercept`.)
  pub fn intercept_with<I>(&mut self, phase: &PipelinePhase, interceptor: I) -> PhaselineResult<()>
  where
    I: PipelineInterceptor<TSubject, TContext, Err>,
  {
    self.ensure_phase_exists(phase)?;
    let interceptor = Arc::new(interceptor);
    let wrapped = boxed_interceptor(move |ctx: PipelineContext<TSubject, TContext, Err>| {
      let interceptor = Arc::clone(&interceptor);
      async move { interceptor.intercept(ctx).await }
    });
    self.interceptors.push(phase, wrapped);
    event!(
      Level::DEBUG,
      phase = %phase,
      interceptor_type = %std::any::type_name::<I>(),
      "Interceptor registered."
    );
    Ok(())
  }
}
