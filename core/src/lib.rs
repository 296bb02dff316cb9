// phaseline/src/lib.rs

//! Phaseline: an ASYNC interceptor pipeline for Rust.
//!
//! A pipeline runs an ordered set of interceptors, grouped into named phases,
//! over a mutable subject within an immutable context:
//!  - Phases are identity tokens, ordered by appending or by inserting before/after another phase.
//!  - Interceptors are asynchronous and may suspend; a run resumes at the exact next interceptor.
//!  - Interceptors may replace the subject, finish the run early, or fail it.
//!  - `proceed()` runs the rest of the pipeline from inside an interceptor (around-style interceptors).
//!  - Pipelines can be merged, and executed from inside another pipeline's interceptor.
//!  - Runs can be cancelled; cancellation flows into nested runs.

pub mod core;
pub mod error;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::core::context::{Interceptor, InterceptorFuture, PipelineContext};
pub use crate::core::control::ExecutionStatus;
pub use crate::core::interceptor_trait::PipelineInterceptor;
pub use crate::core::phase::{PhaseRelation, PipelinePhase};
pub use crate::core::state::Cursor;

pub use crate::pipeline::{InterceptorTable, PhaseRegistry, Pipeline};

pub use crate::error::{PhaselineError, PhaselineResult};

// Re-exported so callers can cancel runs without depending on tokio-util directly.
pub use tokio_util::sync::CancellationToken;

/*
    Core Workflow:
    1. Create the phases: `let parse = PipelinePhase::new("Parse");`.
    2. Create a `Pipeline<Subject, Context, Err>` from them: `Pipeline::new(&[parse.clone(), ...])?`.
    3. Register interceptors with `.intercept(&phase, |ctx| async move { ... })`.
       Inside, read `ctx.subject()?` / `ctx.context()`, replace with `ctx.proceed_with(..)?`,
       stop with `ctx.finish()?`, or return an error.
    4. Optionally compose: `pipeline.merge(&other)`, or call `ctx.execute_nested(&inner, ..)`
       from an interceptor.
    5. Run it: `let result = pipeline.execute(context, subject).await?;`.
*/
