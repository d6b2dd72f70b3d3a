use opentelemetry_otlp::WithExportConfig;
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

pub struct HoneycombConfig {
    pub team: String,
    pub dataset: String,
}

pub enum TracingExportConfig {
    None,
    Honeycomb(HoneycombConfig),
    /// The address of a Jaeger agent
    Jaeger(String),
}

pub fn configure(export_config: TracingExportConfig) -> Result<(), eyre::Report> {
    LogTracer::builder()
        .ignore_crate("rustls")
        .with_max_level(log::LevelFilter::Debug)
        .init()?;

    let env_filter = EnvFilter::try_from_env("LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    let formatting_layer = BunyanFormattingLayer::new("planner".to_string(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .with(ErrorLayer::default());

    match export_config {
        TracingExportConfig::Honeycomb(honeycomb_config) => {
            let mut otlp_meta = tonic::metadata::MetadataMap::new();
            otlp_meta.insert("x-honeycomb-team", honeycomb_config.team.parse()?);

            let exporter = opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint("api.honeycomb.io:443")
                .with_metadata(otlp_meta);

            let otlp = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_trace_config(opentelemetry::sdk::trace::config().with_resource(
                    opentelemetry::sdk::Resource::new(vec![opentelemetry::KeyValue::new(
                        "service.name",
                        honeycomb_config.dataset,
                    )]),
                ))
                .with_exporter(exporter)
                .install_batch(opentelemetry::runtime::TokioCurrentThread)?;
            let telemetry = tracing_opentelemetry::layer().with_tracer(otlp);

            set_global_default(subscriber.with(telemetry))?;
        }
        TracingExportConfig::Jaeger(endpoint) => {
            let tracer = opentelemetry_jaeger::new_pipeline()
                .with_agent_endpoint(endpoint)
                .with_service_name("planner")
                .install_batch(opentelemetry::runtime::TokioCurrentThread)?;
            let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);

            set_global_default(subscriber.with(telemetry))?;
        }
        TracingExportConfig::None => {
            set_global_default(subscriber)?;
        }
    }

    Ok(())
}

pub fn teardown() {
    opentelemetry::global::shutdown_tracer_provider();
}
