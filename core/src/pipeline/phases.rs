// phaseline/src/pipeline/phases.rs

//! Contains `PhaseRegistry`, the ordered set of phases a pipeline executes.

use crate::core::phase::{PhaseRelation, PipelinePhase};
use crate::error::{PhaselineError, PhaselineResult};

#[derive(Debug, Clone)]
struct PhaseEntry {
  phase: PipelinePhase,
  relation: PhaseRelation,
}

/// Ordered collection of phases. Phases can be appended or inserted relative to
/// an existing phase, never removed, and each phase instance appears at most once.
#[derive(Debug, Clone, Default)]
pub struct PhaseRegistry {
  entries: Vec<PhaseEntry>,
}

impl PhaseRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a registry from phases in the given order.
  pub fn from_phases(phases: &[PipelinePhase]) -> PhaselineResult<Self> {
    let mut registry = Self::new();
    for phase in phases {
      registry.add_phase(phase.clone())?;
    }
    Ok(registry)
  }

  /// Appends `phase` at the end of the order.
  pub fn add_phase(&mut self, phase: PipelinePhase) -> PhaselineResult<()> {
    self.ensure_phase_not_exists(&phase)?;
    self.entries.push(PhaseEntry {
      phase,
      relation: PhaseRelation::Last,
    });
    Ok(())
  }

  /// Inserts `phase` directly before `reference`.
  pub fn insert_phase_before(&mut self, reference: &PipelinePhase, phase: PipelinePhase) -> PhaselineResult<()> {
    let idx = self.ensure_phase_exists(reference)?;
    self.ensure_phase_not_exists(&phase)?;
    self.entries.insert(
      idx,
      PhaseEntry {
        phase,
        relation: PhaseRelation::Before(reference.clone()),
      },
    );
    Ok(())
  }

  /// Inserts `phase` after `reference`.
  ///
  /// If other phases were already inserted after `reference`, `phase` goes after
  /// the last of them, so repeated insertions keep their call order.
  pub fn insert_phase_after(&mut self, reference: &PipelinePhase, phase: PipelinePhase) -> PhaselineResult<()> {
    let idx = self.ensure_phase_exists(reference)?;
    self.ensure_phase_not_exists(&phase)?;

    let mut last_related = idx;
    for (offset, entry) in self.entries[idx + 1..].iter().enumerate() {
      match &entry.relation {
        PhaseRelation::Last => break,
        PhaseRelation::After(related) if related == reference => last_related = idx + 1 + offset,
        _ => {}
      }
    }

    self.entries.insert(
      last_related + 1,
      PhaseEntry {
        phase,
        relation: PhaseRelation::After(reference.clone()),
      },
    );
    Ok(())
  }

  /// Phases in execution order. The iterator is lazy and can be cloned to restart it.
  pub fn phases(&self) -> impl Iterator<Item = &PipelinePhase> + Clone + '_ {
    self.entries.iter().map(|entry| &entry.phase)
  }

  pub fn has_phase(&self, phase: &PipelinePhase) -> bool {
    self.index_of(phase).is_some()
  }

  pub fn index_of(&self, phase: &PipelinePhase) -> Option<usize> {
    self.entries.iter().position(|entry| &entry.phase == phase)
  }

  pub fn relation_of(&self, phase: &PipelinePhase) -> Option<&PhaseRelation> {
    self
      .entries
      .iter()
      .find(|entry| &entry.phase == phase)
      .map(|entry| &entry.relation)
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Appends every phase of `other` missing here, keeping `other`'s relative order.
  /// Returns the phases that were added.
  pub(crate) fn append_missing(&mut self, other: &PhaseRegistry) -> Vec<PipelinePhase> {
    let mut added = Vec::new();
    for entry in &other.entries {
      if !self.has_phase(&entry.phase) {
        self.entries.push(PhaseEntry {
          phase: entry.phase.clone(),
          relation: PhaseRelation::Last,
        });
        added.push(entry.phase.clone());
      }
    }
    added
  }

  pub(crate) fn ensure_phase_exists(&self, phase: &PipelinePhase) -> PhaselineResult<usize> {
    self.index_of(phase).ok_or_else(|| PhaselineError::UnknownPhase {
      phase: phase.name().to_string(),
    })
  }

  fn ensure_phase_not_exists(&self, phase: &PipelinePhase) -> PhaselineResult<()> {
    if self.has_phase(phase) {
      return Err(PhaselineError::DuplicatePhase {
        phase: phase.name().to_string(),
      });
    }
    Ok(())
  }
}
