// phaseline/examples/merge_pipelines.rs

use phaseline::{PhaselineError, Pipeline, PipelineContext, PipelinePhase};
use tracing::info;

fn append(label: &'static str) -> impl Fn(PipelineContext<Vec<&'static str>>) -> std::future::Ready<Result<(), PhaselineError>> + Send + Sync + 'static {
  move |ctx| {
    let pushed = ctx.subject_mut().map(|mut trail| trail.push(label));
    std::future::ready(pushed)
  }
}

#[tokio::main]
async fn main() -> Result<(), PhaselineError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Merge Example ---");

  // Both pipelines know the shared `Call` phase; each also has a phase of its own.
  let call = PipelinePhase::new("Call");
  let auth = PipelinePhase::new("Auth");
  let metrics = PipelinePhase::new("Metrics");

  let mut app = Pipeline::<Vec<&'static str>>::new(&[auth.clone(), call.clone()])?;
  app.intercept(&auth, append("app:auth"))?;
  app.intercept(&call, append("app:call"))?;

  let mut plugin = Pipeline::<Vec<&'static str>>::new(&[call.clone(), metrics.clone()])?;
  plugin.intercept(&call, append("plugin:call"))?;
  plugin.intercept(&metrics, append("plugin:metrics"))?;

  // Missing phases are appended; on shared phases the plugin's interceptors run after the app's.
  app.merge(&plugin);
  info!("Merged phase order: {:?}", app.phases().collect::<Vec<_>>());

  let trail = app.run(Vec::new()).await?;
  info!("Trail: {:?}", trail);
  assert_eq!(trail, vec!["app:auth", "app:call", "plugin:call", "plugin:metrics"]);

  // The merged pipeline keeps growing independently of `plugin`.
  app.intercept(&metrics, append("app:metrics"))?;
  assert_eq!(app.run(Vec::new()).await?.last(), Some(&"app:metrics"));
  assert_eq!(plugin.interceptor_count(), 2);

  Ok(())
}
