// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use phaseline::{PhaselineError, PipelineContext, PipelinePhase};
use std::future::{ready, Ready};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Event log shared between interceptors and assertions ---
pub type EventLog = Arc<parking_lot::Mutex<Vec<String>>>;

pub fn event_log() -> EventLog {
  Arc::new(parking_lot::Mutex::new(Vec::new()))
}

pub fn events(log: &EventLog) -> Vec<String> {
  log.lock().clone()
}

// --- Common Error Type for Tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Phaseline framework error: {0}")]
  Phaseline(String), // Stored as String for Eq comparison

  #[error("Test interceptor failed: {0}")]
  Interceptor(String),
}

impl From<PhaselineError> for TestError {
  fn from(pe: PhaselineError) -> Self {
    TestError::Phaseline(format!("{:?}", pe))
  }
}

// --- Common Context ---
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
  pub request_id: String,
  pub multiplier: i64,
}

// --- Common Phases ---
pub struct Phases {
  pub start: PipelinePhase,
  pub middle: PipelinePhase,
  pub end: PipelinePhase,
}

impl Phases {
  pub fn new(prefix: &str) -> Self {
    Self {
      start: PipelinePhase::new(format!("{}Start-Phase", prefix)),
      middle: PipelinePhase::new(format!("{}Middle-Phase", prefix)),
      end: PipelinePhase::new(format!("{}End-Phase", prefix)),
    }
  }

  pub fn all(&self) -> [PipelinePhase; 3] {
    [self.start.clone(), self.middle.clone(), self.end.clone()]
  }
}

// --- Common Interceptor Creators ---

/// An interceptor that only records `label` and proceeds.
pub fn record<TSubject, TContext, Err>(
  log: &EventLog,
  label: &'static str,
) -> impl Fn(PipelineContext<TSubject, TContext, Err>) -> Ready<Result<(), Err>> + Send + Sync + 'static
where
  TSubject: 'static,
  TContext: 'static,
  Err: 'static,
{
  let log = log.clone();
  move |_ctx| {
    log.lock().push(label.to_string());
    tracing::debug!(target: "test_interceptors", label, "executed");
    ready(Ok(()))
  }
}

/// An interceptor that records `label` and fails with `TestError::Interceptor`.
pub fn failing<TSubject, TContext>(
  log: &EventLog,
  label: &'static str,
) -> impl Fn(PipelineContext<TSubject, TContext, TestError>) -> Ready<Result<(), TestError>> + Send + Sync + 'static
where
  TSubject: 'static,
  TContext: 'static,
{
  let log = log.clone();
  move |_ctx| {
    log.lock().push(label.to_string());
    tracing::warn!(target: "test_interceptors", label, "failing");
    ready(Err(TestError::Interceptor(label.to_string())))
  }
}

// --- Helper for Tracing Setup (call once per test run if needed) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Captured log output for asserting on emitted events ---
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<parking_lot::Mutex<Vec<u8>>>);

impl LogBuffer {
  pub fn contents(&self) -> String {
    String::from_utf8_lossy(&self.0.lock()).into_owned()
  }

  pub fn count(&self, needle: &str) -> usize {
    self.contents().matches(needle).count()
  }
}

impl std::io::Write for LogBuffer {
  fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
    self.0.lock().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> std::io::Result<()> {
    Ok(())
  }
}

/// Routes this thread's events into a buffer until the guard is dropped.
/// Only meaningful with the current-thread test runtime.
pub fn capture_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
  let buffer = LogBuffer::default();
  let writer = buffer.clone();
  let subscriber = tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_ansi(false)
    .with_writer(move || writer.clone())
    .finish();
  (tracing::subscriber::set_default(subscriber), buffer)
}

// --- Atomic counters for checking execution counts ---
pub static INTERCEPTOR_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  INTERCEPTOR_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
