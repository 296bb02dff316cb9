// phaseline/examples/error_handling.rs

use phaseline::{PhaselineError, Pipeline, PipelineContext, PipelinePhase};
use tracing::{error, info};

// 1. Define a custom application error type
#[derive(Debug, thiserror::Error)]
enum ExampleAppError {
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Phaseline framework error during pipeline execution: {0}")]
  Phaseline(#[from] PhaselineError), // Allows PhaselineError to be converted into ExampleAppError
}

type Ctx = PipelineContext<Vec<i64>, (), ExampleAppError>;

#[tokio::main]
async fn main() {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Error Handling Example ---");

  let validate = PipelinePhase::new("Validate");
  let sum = PipelinePhase::new("Sum");

  let mut pipeline = Pipeline::<Vec<i64>, (), ExampleAppError>::new(&[validate.clone(), sum.clone()])
    .expect("phases are distinct");

  pipeline
    .intercept(&validate, |ctx: Ctx| async move {
      let negative = ctx.subject()?.iter().any(|n| *n < 0);
      if negative {
        return ctx.fail(ExampleAppError::Validation("negative numbers are not allowed".to_string()));
      }
      Ok::<_, ExampleAppError>(())
    })
    .expect("Validate is declared");

  // Around-style interceptor: observes the failure of the rest of the run and recovers from it.
  pipeline
    .intercept(&validate, |ctx: Ctx| async move {
      match ctx.proceed().await {
        Err(ExampleAppError::Phaseline(PhaselineError::InterceptorFailure { source })) => {
          info!("Recovering from sum failure: {}", source);
          ctx.proceed_with(vec![i64::MAX])?;
          Ok(())
        }
        other => other,
      }
    })
    .expect("Validate is declared");

  pipeline
    .intercept(&sum, |ctx: Ctx| async move {
      let total = ctx
        .subject()?
        .iter()
        .try_fold(0i64, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| anyhow::anyhow!("sum overflowed"))
        .map_err(PhaselineError::from)?;
      ctx.proceed_with(vec![total])?;
      Ok::<_, ExampleAppError>(())
    })
    .expect("Sum is declared");

  // Scenario 1: success
  match pipeline.run(vec![1, 2, 3]).await {
    Ok(result) => info!("Sum: {:?}", result),
    Err(e) => error!("Unexpected failure: {}", e),
  }

  // Scenario 2: the Validate interceptor fails the run with an application error
  match pipeline.run(vec![1, -2]).await {
    Ok(result) => error!("Pipeline unexpectedly succeeded: {:?}", result),
    Err(e) => {
      info!("Pipeline failed as expected: {}", e);
      assert!(matches!(e, ExampleAppError::Validation(_)));
    }
  }

  // Scenario 3: the Sum interceptor fails through anyhow and the around interceptor recovers
  match pipeline.run(vec![i64::MAX, 1]).await {
    Ok(result) => {
      info!("Recovered result: {:?}", result);
      assert_eq!(result, vec![i64::MAX]);
    }
    Err(e) => error!("Recovery did not happen: {}", e),
  }
}
