use planner_api::tracing_config::{self, HoneycombConfig, TracingExportConfig};

pub async fn run(mut config: planner_api::config::Config) -> Result<(), eyre::Report> {
    let tracing_export_config = if let Some(team) = config.honeycomb_team.take() {
        TracingExportConfig::Honeycomb(HoneycombConfig {
            team,
            dataset: std::mem::take(&mut config.honeycomb_dataset),
        })
    } else if let Some(jaeger_endpoint) = config.jaeger_endpoint.take() {
        TracingExportConfig::Jaeger(jaeger_endpoint)
    } else {
        TracingExportConfig::None
    };

    tracing_config::configure(tracing_export_config)?;

    let server = planner_api::create_server(config)
        .await
        .map_err(|e| eyre::eyre!(e))?;
    let result = server.run().await;

    tracing_config::teardown();

    result?;
    Ok(())
}
