// phaseline/src/pipeline/interceptors.rs

//! Contains `InterceptorTable`, mapping each phase to its interceptors in registration order.

use crate::core::context::Interceptor;
use crate::core::phase::PipelinePhase;
use std::collections::HashMap;

/// Phase → interceptors, append-only per phase.
pub struct InterceptorTable<TSubject, TContext, Err> {
  by_phase: HashMap<PipelinePhase, Vec<Interceptor<TSubject, TContext, Err>>>,
}

impl<TSubject, TContext, Err> InterceptorTable<TSubject, TContext, Err> {
  pub fn new() -> Self {
    Self { by_phase: HashMap::new() }
  }

  /// Appends `interceptor` after the ones already registered for `phase`.
  ///
  /// The table does not know about phase order; `Pipeline::intercept` checks the
  /// phase is declared before calling this.
  pub fn push(&mut self, phase: &PipelinePhase, interceptor: Interceptor<TSubject, TContext, Err>) {
    self.by_phase.entry(phase.clone()).or_default().push(interceptor);
  }

  /// Interceptors for `phase` in registration order; empty if none are registered.
  pub fn interceptors_for(&self, phase: &PipelinePhase) -> &[Interceptor<TSubject, TContext, Err>] {
    self.by_phase.get(phase).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Total number of interceptors across all phases.
  pub fn len(&self) -> usize {
    self.by_phase.values().map(Vec::len).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.by_phase.values().all(Vec::is_empty)
  }

  /// Appends every interceptor of `other` after this table's own, phase by phase.
  pub(crate) fn extend_from(&mut self, other: &InterceptorTable<TSubject, TContext, Err>) {
    for (phase, interceptors) in &other.by_phase {
      self
        .by_phase
        .entry(phase.clone())
        .or_default()
        .extend(interceptors.iter().cloned());
    }
  }
}

impl<TSubject, TContext, Err> Default for InterceptorTable<TSubject, TContext, Err> {
  fn default() -> Self {
    Self::new()
  }
}

impl<TSubject, TContext, Err> Clone for InterceptorTable<TSubject, TContext, Err> {
  fn clone(&self) -> Self {
    Self {
      by_phase: self.by_phase.clone(),
    }
  }
}

// Interceptors are closures without a Debug impl; show counts per phase instead.
impl<TSubject, TContext, Err> std::fmt::Debug for InterceptorTable<TSubject, TContext, Err> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_map()
      .entries(self.by_phase.iter().map(|(phase, interceptors)| (phase, interceptors.len())))
      .finish()
  }
}
