// phaseline/src/core/phase.rs

//! Defines `PipelinePhase`, the identity token used to order interceptors,
//! and `PhaseRelation`, which records how a phase was placed in a registry.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A named ordering slot in a pipeline.
///
/// Phases compare by identity, not by name: two phases created with the same
/// name are distinct, while clones of one phase are equal. The name is only
/// used for diagnostics.
///
/// ```
/// use phaseline::PipelinePhase;
///
/// let setup = PipelinePhase::new("Setup");
/// let other_setup = PipelinePhase::new("Setup");
///
/// assert_eq!(setup, setup.clone());
/// assert_ne!(setup, other_setup);
/// ```
#[derive(Clone)]
pub struct PipelinePhase(Arc<PhaseLabel>);

struct PhaseLabel {
  name: String,
}

impl PipelinePhase {
  pub fn new<S: Into<String>>(name: S) -> Self {
    PipelinePhase(Arc::new(PhaseLabel { name: name.into() }))
  }

  pub fn name(&self) -> &str {
    &self.0.name
  }
}

impl PartialEq for PipelinePhase {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.0, &other.0)
  }
}

impl Eq for PipelinePhase {}

impl Hash for PipelinePhase {
  fn hash<H: Hasher>(&self, state: &mut H) {
    std::ptr::hash(Arc::as_ptr(&self.0), state)
  }
}

impl fmt::Debug for PipelinePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Phase('{}')", self.name())
  }
}

impl fmt::Display for PipelinePhase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// How a phase was placed when it was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseRelation {
  /// Appended at the end of the order.
  Last,
  /// Inserted directly before the referenced phase.
  Before(PipelinePhase),
  /// Inserted after the referenced phase (and after earlier phases inserted after it).
  After(PipelinePhase),
}
