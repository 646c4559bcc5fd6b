use anyhow::{Context, Result};
use doubles_helpers::{
    HttpClient, Printer, RandomSource, ReqwestClient, error_function, get_user_from,
    random_between, sum,
};
use tracing::{info, instrument, warn};

mod config;

use crate::config::DemoConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = DemoConfig::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    tracing_subscriber::fmt()
        .with_max_level(config.max_level()?)
        .init();

    info!("Starting demo with configuration: {:?}", config);

    let user_id = run(
        &config,
        &ReqwestClient::new(),
        &RandomSource::new(),
        &Printer::stdout(),
    )
    .await?;

    info!(user_id, "Demo complete");
    Ok(())
}

#[instrument(skip_all, name = "run_demo")]
async fn run<C: HttpClient>(
    config: &DemoConfig,
    client: &C,
    source: &RandomSource,
    printer: &Printer,
) -> Result<u64> {
    info!(total = sum(1, 2), "Added 1 + 2");

    match error_function("a") {
        Ok(value) => info!(value, "Parsed input"),
        Err(e) => warn!(error = %e, input = e.input(), "Rejected input"),
    }

    let picked = random_between(source, config.random_min, config.random_max);
    printer.print_number_local(picked);

    let user_id = get_user_from(client, &config.user_endpoint)
        .await
        .with_context(|| format!("Failed to fetch user from {}", config.user_endpoint))?;
    printer.print_word(format!("user {user_id}"));

    Ok(user_id)
}
