//! Tracing setup for the pricectl binary
//!
//! Console logging via `tracing-subscriber`, plus OTLP export when built
//! with the `telemetry` feature and run with `--otel`.
//!
//! Usage:
//!   pricectl --debug serve                        # Debug logging to console
//!   pricectl --otel serve                         # Export traces to OTLP endpoint
//!   RUST_LOG=pricectl_server=debug pricectl serve # Fine-grained log control
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (default: info)
//!   OTEL_EXPORTER_OTLP_ENDPOINT       # OTLP endpoint (default: http://localhost:4317)
//!   OTEL_SERVICE_NAME                 # Service name (default: pricectl)

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Tracing configuration options
#[derive(Debug, Clone, Default)]
pub struct TracingConfig {
    /// Log at debug level unless RUST_LOG says otherwise
    pub debug: bool,
    /// Export spans over OTLP (needs the `telemetry` feature)
    pub otel: bool,
}

impl TracingConfig {
    /// RUST_LOG when set, else `debug` or `info`.
    fn filter(&self) -> EnvFilter {
        let fallback = if self.debug { "debug" } else { "info" };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }
}

/// Install the subscriber described by `config`.
pub fn init(config: &TracingConfig) -> Result<()> {
    #[cfg(feature = "telemetry")]
    if config.otel {
        return otel::init(config);
    }

    #[cfg(not(feature = "telemetry"))]
    if config.otel {
        eprintln!("--otel ignored: pricectl was built without the `telemetry` feature");
    }

    tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_target(config.debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Flush pending spans before exit.
pub fn shutdown() {
    #[cfg(feature = "telemetry")]
    opentelemetry::global::shutdown_tracer_provider();
}

#[cfg(feature = "telemetry")]
mod otel {
    use anyhow::{anyhow, Result};
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::TracerProvider;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    use super::TracingConfig;

    pub(super) fn init(config: &TracingConfig) -> Result<()> {
        let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| "http://localhost:4317".to_string());
        let service_name =
            std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "pricectl".to_string());

        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(&endpoint)
            .build()
            .map_err(|e| anyhow!("Failed to create OTLP exporter: {}", e))?;

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
            .with_resource(opentelemetry_sdk::Resource::new(vec![KeyValue::new(
                "service.name",
                service_name.clone(),
            )]))
            .build();

        let telemetry_layer = tracing_opentelemetry::layer().with_tracer(provider.tracer("pricectl"));

        // Provider must outlive this function or export stops
        let _ = opentelemetry::global::set_tracer_provider(provider);

        tracing_subscriber::registry()
            .with(config.filter())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(config.debug)
                    .compact(),
            )
            .with(telemetry_layer)
            .try_init()
            .map_err(|err| anyhow!(err))?;

        tracing::info!(
            endpoint = %endpoint,
            service = %service_name,
            "OpenTelemetry tracing initialized"
        );
        Ok(())
    }
}
