// phaseline/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhaselineError {
  #[error("Phase '{phase}' is already registered in this pipeline")]
  DuplicatePhase { phase: String },

  #[error("Phase '{phase}' is not registered in this pipeline")]
  UnknownPhase { phase: String },

  #[error("Pipeline execution has already completed")]
  AlreadyCompleted,

  #[error("Interceptor failed. Source: {source}")]
  InterceptorFailure {
    #[source]
    source: AnyhowError,
  },

  #[error("Pipeline execution was cancelled")]
  Cancelled,

  #[error("Internal Phaseline error: {0}")]
  Internal(String),
}

impl PhaselineError {
  /// Wraps an arbitrary error as an `InterceptorFailure`.
  pub fn interceptor<E>(err: E) -> Self
  where
    E: Into<AnyhowError>,
  {
    PhaselineError::InterceptorFailure { source: err.into() }
  }

  /// `true` for the errors raised while building a pipeline, as opposed to while running one.
  pub fn is_setup_error(&self) -> bool {
    matches!(self, PhaselineError::DuplicatePhase { .. } | PhaselineError::UnknownPhase { .. })
  }
}

// Lets interceptors use `?` on anyhow results.
impl From<AnyhowError> for PhaselineError {
  fn from(err: AnyhowError) -> Self {
    PhaselineError::InterceptorFailure { source: err }
  }
}

pub type PhaselineResult<T, E = PhaselineError> = std::result::Result<T, E>;
