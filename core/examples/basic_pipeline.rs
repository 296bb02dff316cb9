// phaseline/examples/basic_pipeline.rs

use phaseline::{PhaselineError, Pipeline, PipelineContext, PipelinePhase};
use tracing::info;

// 1. Define the context shared by every interceptor of a run
#[derive(Clone, Debug, Default)]
struct RequestContext {
  user: String,
  max_len: usize,
}

#[tokio::main]
async fn main() -> Result<(), PhaselineError> {
  // Initialize tracing (optional, for demonstration)
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 2. Create the phases. Their order in `new` is the execution order.
  let setup = PipelinePhase::new("Setup");
  let transform = PipelinePhase::new("Transform");
  let render = PipelinePhase::new("Render");

  // Pipeline<TSubject, TContext, Err> where Err must be From<PhaselineError>
  let mut pipeline = Pipeline::<String, RequestContext>::new(&[setup.clone(), transform.clone(), render.clone()])?;

  // 3. Register interceptors. Within a phase they run in registration order.
  pipeline.intercept(&setup, |ctx: PipelineContext<String, RequestContext>| async move {
    let trimmed = ctx.subject()?.trim().to_string();
    info!("Setup: trimmed subject to '{}'", trimmed);
    ctx.proceed_with(trimmed)?;
    Ok::<_, PhaselineError>(())
  })?;

  pipeline.intercept(&transform, |ctx: PipelineContext<String, RequestContext>| async move {
    // In-place change through the write guard; the guard is dropped at the end of the statement.
    ctx.subject_mut()?.make_ascii_uppercase();
    Ok::<_, PhaselineError>(())
  })?;

  pipeline.intercept(&transform, |ctx: PipelineContext<String, RequestContext>| async move {
    let max_len = ctx.context().max_len;
    if ctx.subject()?.len() > max_len {
      let cut: String = ctx.subject()?.chars().take(max_len).collect();
      info!("Transform: subject too long, finishing early with '{}'", cut);
      ctx.proceed_with(cut)?;
      ctx.finish()?; // Render is skipped
    }
    Ok::<_, PhaselineError>(())
  })?;

  pipeline.intercept(&render, |ctx: PipelineContext<String, RequestContext>| async move {
    let rendered = format!("<{}> {}", ctx.context().user, *ctx.subject()?);
    ctx.proceed_with(rendered)?;
    Ok::<_, PhaselineError>(())
  })?;

  // 4. Run it
  let context = RequestContext {
    user: "ada".to_string(),
    max_len: 16,
  };
  let short = pipeline.execute(context.clone(), "  hello pipeline  ".to_string()).await?;
  info!("Short input result: {}", short);
  assert_eq!(short, "<ada> HELLO PIPELINE");

  let long = pipeline
    .execute(context, "  a subject that is far too long  ".to_string())
    .await?;
  info!("Long input result: {}", long);
  assert_eq!(long, "A SUBJECT THAT I");

  Ok(())
}
