// phaseline/src/pipeline/definition.rs

//! Contains the `Pipeline<TSubject, TContext, Err>` struct definition and methods for its
//! construction and structural modification.

use crate::core::phase::{PhaseRelation, PipelinePhase};
use crate::error::{PhaselineError, PhaselineResult};
use crate::pipeline::interceptors::InterceptorTable;
use crate::pipeline::phases::PhaseRegistry;
use tracing::{event, Level};

/// The core Pipeline type: an ordered set of phases and the interceptors
/// registered for each of them.
///
/// - `TSubject` is the value transformed by a run.
/// - `TContext` is the read-only value shared by all interceptors of a run (`()` by default).
/// - `Err` is the error type interceptors return. It must be `From<PhaselineError>`
///   so engine errors (cancellation, misuse) can be reported through it.
///
/// A pipeline is configured through `&mut self` and executed through `&self`,
/// so registration can never race an execution of the same instance. Share a
/// configured pipeline behind an `Arc` to execute it from several tasks.
pub struct Pipeline<TSubject, TContext = (), Err = PhaselineError>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  pub(crate) phases: PhaseRegistry,
  pub(crate) interceptors: InterceptorTable<TSubject, TContext, Err>,
}

impl<TSubject, TContext, Err> Pipeline<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  /// Creates a new `Pipeline` with an initial, ordered set of phases.
  ///
  /// Fails with `DuplicatePhase` if the same phase appears twice.
  pub fn new(phases: &[PipelinePhase]) -> PhaselineResult<Self> {
    Ok(Self {
      phases: PhaseRegistry::from_phases(phases)?,
      interceptors: InterceptorTable::new(),
    })
  }

  // --- Phase Manipulation Methods ---

  pub fn add_phase(&mut self, phase: PipelinePhase) -> PhaselineResult<()> {
    event!(Level::DEBUG, phase = %phase, "Adding phase.");
    self.phases.add_phase(phase)
  }

  pub fn insert_phase_before(&mut self, reference: &PipelinePhase, phase: PipelinePhase) -> PhaselineResult<()> {
    event!(Level::DEBUG, reference = %reference, phase = %phase, "Inserting phase before reference.");
    self.phases.insert_phase_before(reference, phase)
  }

  pub fn insert_phase_after(&mut self, reference: &PipelinePhase, phase: PipelinePhase) -> PhaselineResult<()> {
    event!(Level::DEBUG, reference = %reference, phase = %phase, "Inserting phase after reference.");
    self.phases.insert_phase_after(reference, phase)
  }

  // --- Inspection ---

  /// Phases in execution order.
  pub fn phases(&self) -> impl Iterator<Item = &PipelinePhase> + Clone + '_ {
    self.phases.phases()
  }

  pub fn phase_registry(&self) -> &PhaseRegistry {
    &self.phases
  }

  pub fn interceptor_table(&self) -> &InterceptorTable<TSubject, TContext, Err> {
    &self.interceptors
  }

  pub fn has_phase(&self, phase: &PipelinePhase) -> bool {
    self.phases.has_phase(phase)
  }

  pub fn relation_of(&self, phase: &PipelinePhase) -> Option<&PhaseRelation> {
    self.phases.relation_of(phase)
  }

  /// Number of interceptors registered for `phase`.
  pub fn interceptor_count_for(&self, phase: &PipelinePhase) -> usize {
    self.interceptors.interceptors_for(phase).len()
  }

  /// Number of interceptors across all phases.
  pub fn interceptor_count(&self) -> usize {
    self.interceptors.len()
  }

  /// `true` when no interceptor is registered; executing such a pipeline
  /// returns the initial subject unchanged.
  pub fn is_empty(&self) -> bool {
    self.interceptors.is_empty()
  }

  pub(crate) fn ensure_phase_exists(&self, phase: &PipelinePhase) -> PhaselineResult<()> {
    self.phases.ensure_phase_exists(phase).map(|_| ())
  }
}

impl<TSubject, TContext, Err> Clone for Pipeline<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  fn clone(&self) -> Self {
    Self {
      phases: self.phases.clone(),
      interceptors: self.interceptors.clone(),
    }
  }
}

impl<TSubject, TContext, Err> std::fmt::Debug for Pipeline<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Pipeline")
      .field("phases", &self.phases.phases().collect::<Vec<_>>())
      .field("interceptors", &self.interceptors)
      .finish()
  }
}
