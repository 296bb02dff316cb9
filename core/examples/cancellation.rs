// phaseline/examples/cancellation.rs

use phaseline::{CancellationToken, PhaselineError, Pipeline, PipelineContext, PipelinePhase};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), PhaselineError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Cancellation Example ---");

  let fetch = PipelinePhase::new("Fetch");
  let store = PipelinePhase::new("Store");
  let mut pipeline = Pipeline::<Vec<u32>>::new(&[fetch.clone(), store.clone()])?;

  pipeline.intercept(&fetch, |ctx: PipelineContext<Vec<u32>>| async move {
    for page in 0..10 {
      // Each page takes a while; cancellation drops this future at the next await.
      tokio::time::sleep(Duration::from_millis(50)).await;
      ctx.subject_mut()?.push(page);
      info!("Fetched page {}", page);
    }
    Ok::<_, PhaselineError>(())
  })?;
  pipeline.intercept(&store, |_ctx: PipelineContext<Vec<u32>>| async move {
    info!("Storing pages (not reached when cancelled)");
    Ok::<_, PhaselineError>(())
  })?;

  let token = CancellationToken::new();
  let canceller = token.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(175)).await;
    info!("Cancelling the run");
    canceller.cancel();
  });

  match pipeline.execute_with_cancellation((), Vec::new(), token).await {
    Err(PhaselineError::Cancelled) => info!("Run cancelled; its partial subject was dropped."),
    other => panic!("Expected the run to be cancelled, got {:?}", other),
  }

  // The pipeline itself is unaffected and can run again with a fresh token.
  let pages = pipeline.run(Vec::new()).await?;
  assert_eq!(pages.len(), 10);
  Ok(())
}
