// phaseline/examples/nested_pipeline.rs

use phaseline::{PhaselineError, Pipeline, PipelineContext, PipelinePhase};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
struct Order {
  items: Vec<String>,
  total_cents: u64,
}

#[tokio::main]
async fn main() -> Result<(), PhaselineError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();
  info!("--- Nested Pipeline Example ---");

  // Inner pipeline: prices a single item name. It has its own subject type.
  let lookup = PipelinePhase::new("Lookup");
  let discount = PipelinePhase::new("Discount");
  let mut pricing = Pipeline::<u64, String>::new(&[lookup.clone(), discount.clone()])?;

  pricing.intercept(&lookup, |ctx: PipelineContext<u64, String>| async move {
    let price = match ctx.context().as_str() {
      "book" => 1_500,
      "pen" => 200,
      _ => 0,
    };
    ctx.proceed_with(price)?;
    Ok::<_, PhaselineError>(())
  })?;
  pricing.intercept(&discount, |ctx: PipelineContext<u64, String>| async move {
    let discounted = *ctx.subject()? * 9 / 10;
    ctx.proceed_with(discounted)?;
    Ok::<_, PhaselineError>(())
  })?;
  let pricing = Arc::new(pricing);

  // Outer pipeline: works on the whole order and runs `pricing` once per item.
  let price = PipelinePhase::new("Price");
  let report = PipelinePhase::new("Report");
  let mut checkout = Pipeline::<Order>::new(&[price.clone(), report.clone()])?;

  checkout.intercept(&price, move |ctx: PipelineContext<Order>| {
    let pricing = pricing.clone();
    async move {
      let items = ctx.subject()?.items.clone();
      let mut total = 0;
      for item in items {
        // The outer interceptor is suspended until the nested run resolves.
        total += ctx.execute_nested(&pricing, item, 0).await?;
      }
      ctx.subject_mut()?.total_cents = total;
      Ok::<_, PhaselineError>(())
    }
  })?;
  checkout.intercept(&report, |ctx: PipelineContext<Order>| async move {
    let order = ctx.subject()?.clone();
    info!("{} items, total {} cents", order.items.len(), order.total_cents);
    Ok::<_, PhaselineError>(())
  })?;

  let order = Order {
    items: vec!["book".to_string(), "pen".to_string(), "pen".to_string()],
    total_cents: 0,
  };
  let priced = checkout.run(order).await?;

  // 1500*0.9 + 200*0.9 + 200*0.9
  assert_eq!(priced.total_cents, 1_350 + 180 + 180);
  Ok(())
}
