//! Observability for the relayer: pretty stdout logging, optionally exported
//! together with spans to an OpenTelemetry collector over OTLP.

use anyhow::{Context, Result};
use bridge_relayer_core::config::ObservabilityConfig;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    logs::SdkLoggerProvider,
    propagation::TraceContextPropagator,
    resource::Resource,
    trace::{Sampler, SdkTracerProvider, Tracer},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Flushes and shuts down the OpenTelemetry providers on drop.
pub struct ObservabilityGuard {
    tracer_provider: Option<SdkTracerProvider>,
    logger_provider: Option<SdkLoggerProvider>,
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.tracer_provider.take() {
            if let Err(e) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {e}");
            }
        }
        // Dropping the logger provider flushes its processors.
        drop(self.logger_provider.take());
    }
}

/// Installs the global tracing subscriber.
///
/// Keep the returned guard alive for the lifetime of the program. If the OTLP
/// exporters cannot be built, the relayer falls back to stdout logging.
///
/// # Errors
/// Returns an error if a global subscriber is already installed.
pub fn init_observability(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    global::set_text_map_propagator(TraceContextPropagator::new());

    let fmt_layer = fmt::layer()
        .pretty()
        .with_target(true)
        .with_line_number(true)
        .with_file(true);
    let registry = Registry::default().with(env_filter(config)).with(fmt_layer);

    if !config.use_otel {
        try_init_subscriber(registry)?;
        return Ok(ObservabilityGuard {
            tracer_provider: None,
            logger_provider: None,
        });
    }

    match (setup_otlp_tracer(config), setup_otlp_logger(config)) {
        (Ok((tracer, tracer_provider)), Ok(logger_provider)) => {
            let subscriber = registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .with(OpenTelemetryTracingBridge::new(&logger_provider));
            try_init_subscriber(subscriber)?;
            Ok(ObservabilityGuard {
                tracer_provider: Some(tracer_provider),
                logger_provider: Some(logger_provider),
            })
        }
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("OpenTelemetry disabled: {e}");
            try_init_subscriber(registry)?;
            Ok(ObservabilityGuard {
                tracer_provider: None,
                logger_provider: None,
            })
        }
    }
}

fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::new(config.level().as_str().to_lowercase())
}

fn try_init_subscriber(subscriber: impl SubscriberInitExt) -> Result<()> {
    subscriber
        .try_init()
        .context("Failed to set global default subscriber")
}

fn resource(config: &ObservabilityConfig) -> Resource {
    Resource::builder()
        .with_attributes(vec![
            KeyValue::new("service.name", config.service_name.clone()),
            KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
        ])
        .build()
}

fn setup_otlp_tracer(config: &ObservabilityConfig) -> Result<(Tracer, SdkTracerProvider)> {
    let mut builder = opentelemetry_otlp::SpanExporter::builder().with_tonic();
    if let Some(endpoint) = &config.otel_endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    let exporter = builder.build()?;

    let provider = SdkTracerProvider::builder()
        .with_resource(resource(config))
        .with_sampler(Sampler::AlwaysOn)
        .with_batch_exporter(exporter)
        .build();
    let tracer = provider.tracer(config.service_name.clone());

    Ok((tracer, provider))
}

fn setup_otlp_logger(config: &ObservabilityConfig) -> Result<SdkLoggerProvider> {
    let mut builder = opentelemetry_otlp::LogExporter::builder().with_tonic();
    if let Some(endpoint) = &config.otel_endpoint {
        builder = builder.with_endpoint(endpoint);
    }
    let exporter = builder.build()?;

    Ok(SdkLoggerProvider::builder()
        .with_resource(resource(config))
        .with_batch_exporter(exporter)
        .build())
}
