// phaseline/src/pipeline/merge.rs

//! Contains the composition operations that combine independently built pipelines.

use crate::error::PhaselineError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, Level};

impl<TSubject, TContext, Err> Pipeline<TSubject, TContext, Err>
where
  TSubject: 'static + Send + Sync,
  TContext: 'static + Send + Sync,
  Err: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  /// Merges `other` into this pipeline.
  ///
  /// Phases of `other` that this pipeline lacks are appended at the end, in
  /// `other`'s order. For every phase, `other`'s interceptors run after this
  /// pipeline's own. `other` is left untouched and runs already in progress
  /// are not affected.
  ///
  /// After `a.merge(&b)`, executing `a` visits `a`'s phases and interceptors in
  /// their original order followed by `b`'s.
  #[instrument(
    name = "Pipeline::merge",
    skip_all,
    fields(own_phases = self.phases.len(), other_phases = other.phases.len())
  )]
  pub fn merge(&mut self, other: &Pipeline<TSubject, TContext, Err>) {
    self.merge_phases(other);
    self.interceptors.extend_from(&other.interceptors);
    event!(
      Level::DEBUG,
      interceptors = self.interceptors.len(),
      "Pipelines merged."
    );
  }

  /// Merges only the phase order of `other`, without its interceptors.
  pub fn merge_phases(&mut self, other: &Pipeline<TSubject, TContext, Err>) {
    let added = self.phases.append_missing(&other.phases);
    if !added.is_empty() {
      event!(Level::DEBUG, added = ?added, "Phases appended from merged pipeline.");
    }
  }

  /// Replaces this pipeline's phases and interceptors with a copy of `other`'s.
  pub fn reset_from(&mut self, other: &Pipeline<TSubject, TContext, Err>) {
    self.phases = other.phases.clone();
    self.interceptors = other.interceptors.clone();
    event!(Level::DEBUG, phases = self.phases.len(), "Pipeline reset from another pipeline.");
  }
}
