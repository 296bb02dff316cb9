// phaseline/src/core/interceptor_trait.rs

//! Defines the `PipelineInterceptor` trait for interceptors implemented as types
//! rather than closures.

use crate::core::context::PipelineContext;
use crate::error::PhaselineError;
use async_trait::async_trait;

/// An interceptor with its own state, registered through `Pipeline::intercept_with`.
///
/// Useful when the same logic is shared by several pipelines or carries
/// configuration of its own. Closures registered with `Pipeline::intercept`
/// behave identically.
#[async_trait]
pub trait PipelineInterceptor<TSubject, TContext, Err>: Send + Sync + 'static
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  /// Invoked once per run when the pipeline reaches this interceptor.
  async fn intercept(&self, ctx: PipelineContext<TSubject, TContext, Err>) -> Result<(), Err>;
}
