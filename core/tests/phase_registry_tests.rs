// tests/phase_registry_tests.rs
mod common;
use common::*;
use phaseline::{PhaseRegistry, PhaseRelation, PhaselineError, Pipeline, PipelinePhase};

fn names<S, C, E>(pipeline: &Pipeline<S, C, E>) -> Vec<String>
where
  S: 'static + Send + Sync,
  C: 'static + Send + Sync,
  E: std::error::Error + From<PhaselineError> + Send + Sync + 'static,
{
  pipeline.phases().map(|p| p.name().to_string()).collect()
}

#[test]
fn test_duplicate_phase_is_rejected_everywhere() {
  let a = PipelinePhase::new("A");
  let b = PipelinePhase::new("B");

  match Pipeline::<u32>::new(&[a.clone(), b.clone(), a.clone()]) {
    Err(PhaselineError::DuplicatePhase { phase }) => assert_eq!(phase, "A"),
    other => panic!("Expected DuplicatePhase, got {:?}", other),
  }

  let mut pipeline = Pipeline::<u32>::new(&[a.clone(), b.clone()]).unwrap();
  assert!(matches!(pipeline.add_phase(b.clone()), Err(PhaselineError::DuplicatePhase { .. })));
  assert!(matches!(
    pipeline.insert_phase_before(&b, a.clone()),
    Err(PhaselineError::DuplicatePhase { .. })
  ));
  assert!(matches!(
    pipeline.insert_phase_after(&a, b.clone()),
    Err(PhaselineError::DuplicatePhase { .. })
  ));

  // Failed calls leave the order untouched.
  assert_eq!(names(&pipeline), vec!["A", "B"]);
}

#[test]
fn test_unknown_reference_is_rejected() {
  let a = PipelinePhase::new("A");
  let ghost = PipelinePhase::new("Ghost");
  let mut pipeline = Pipeline::<u32>::new(&[a.clone()]).unwrap();

  match pipeline.insert_phase_before(&ghost, PipelinePhase::new("X")) {
    Err(PhaselineError::UnknownPhase { phase }) => assert_eq!(phase, "Ghost"),
    other => panic!("Expected UnknownPhase, got {:?}", other),
  }
  assert!(matches!(
    pipeline.insert_phase_after(&ghost, PipelinePhase::new("Y")),
    Err(PhaselineError::UnknownPhase { .. })
  ));
  assert_eq!(names(&pipeline), vec!["A"]);
}

#[test]
fn test_intercept_requires_a_declared_phase() {
  let a = PipelinePhase::new("A");
  let undeclared = PipelinePhase::new("Undeclared");
  let log = event_log();
  let mut pipeline = Pipeline::<u32>::new(&[a]).unwrap();

  let err = pipeline.intercept(&undeclared, record(&log, "never")).unwrap_err();
  assert!(err.is_setup_error());
  assert!(matches!(err, PhaselineError::UnknownPhase { .. }));
  assert!(pipeline.is_empty());
}

#[test]
fn test_same_name_does_not_make_the_same_phase() {
  let first = PipelinePhase::new("Twin");
  let second = PipelinePhase::new("Twin");
  assert_ne!(first, second);
  assert_eq!(first, first.clone());

  let pipeline = Pipeline::<u32>::new(&[first.clone(), second.clone()]).unwrap();
  assert_eq!(names(&pipeline), vec!["Twin", "Twin"]);
  assert!(pipeline.has_phase(&first));
  assert!(pipeline.has_phase(&second));
  assert!(!pipeline.has_phase(&PipelinePhase::new("Twin")));
}

#[test]
fn test_relations_are_recorded() {
  let a = PipelinePhase::new("A");
  let before = PipelinePhase::new("BeforeA");
  let after = PipelinePhase::new("AfterA");
  let mut registry = PhaseRegistry::from_phases(&[a.clone()]).unwrap();

  registry.insert_phase_before(&a, before.clone()).unwrap();
  registry.insert_phase_after(&a, after.clone()).unwrap();

  assert_eq!(registry.relation_of(&a), Some(&PhaseRelation::Last));
  assert_eq!(registry.relation_of(&before), Some(&PhaseRelation::Before(a.clone())));
  assert_eq!(registry.relation_of(&after), Some(&PhaseRelation::After(a.clone())));
  assert_eq!(registry.relation_of(&PipelinePhase::new("A")), None);
  assert_eq!(registry.index_of(&after), Some(2));
  assert_eq!(registry.len(), 3);
}

#[test]
fn test_insert_after_stops_at_phases_added_later() {
  let a = PipelinePhase::new("A");
  let mut pipeline = Pipeline::<u32>::new(&[a.clone()]).unwrap();

  pipeline.insert_phase_after(&a, PipelinePhase::new("A1")).unwrap();
  pipeline.add_phase(PipelinePhase::new("Tail")).unwrap();
  pipeline.insert_phase_after(&a, PipelinePhase::new("A2")).unwrap();

  assert_eq!(names(&pipeline), vec!["A", "A1", "A2", "Tail"]);
}

#[tokio::test]
async fn test_execution_follows_inserted_phases() {
  setup_tracing();
  let phases = Phases::new("");
  let log = event_log();
  let mut pipeline = Pipeline::<u32>::new(&phases.all()).unwrap();

  let validate = PipelinePhase::new("Validate");
  let audit = PipelinePhase::new("Audit");
  pipeline.insert_phase_before(&phases.middle, validate.clone()).unwrap();
  pipeline.insert_phase_after(&phases.end, audit.clone()).unwrap();

  // Registered in reverse of the execution order on purpose.
  pipeline.intercept(&audit, record(&log, "audit")).unwrap();
  pipeline.intercept(&phases.end, record(&log, "end")).unwrap();
  pipeline.intercept(&phases.middle, record(&log, "middle")).unwrap();
  pipeline.intercept(&validate, record(&log, "validate")).unwrap();
  pipeline.intercept(&phases.start, record(&log, "start")).unwrap();

  assert_eq!(pipeline.run(0).await.unwrap(), 0);
  assert_eq!(events(&log), vec!["start", "validate", "middle", "end", "audit"]);
}

#[tokio::test]
async fn test_phase_added_on_demand_runs_last() {
  setup_tracing();
  let phases = Phases::new("");
  let log = event_log();
  let mut pipeline = Pipeline::<u32>::new(&phases.all()).unwrap();

  let late = PipelinePhase::new("Late");
  pipeline.add_phase(late.clone()).unwrap();
  pipeline.intercept(&late, record(&log, "late")).unwrap();
  pipeline.intercept(&phases.start, record(&log, "start")).unwrap();

  pipeline.run(0).await.unwrap();
  assert_eq!(events(&log), vec!["start", "late"]);
  assert_eq!(pipeline.interceptor_count_for(&late), 1);
  assert_eq!(pipeline.interceptor_count(), 2);
}
