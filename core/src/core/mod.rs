pub mod context;
pub mod control;
pub mod interceptor_trait;
pub mod phase;
pub mod state;

// Re-export key types for easier access from other Phaseline modules (and lib.rs)
pub use context::{Interceptor, InterceptorFuture, PipelineContext};
pub use control::ExecutionStatus;
pub use interceptor_trait::PipelineInterceptor;
pub use phase::{PhaseRelation, PipelinePhase};
pub use state::Cursor;
