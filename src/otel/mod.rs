//! Logging and OpenTelemetry integration for aihub-auth
//!
//! Sets up the `tracing` subscriber and, when enabled, OTLP export of spans
//! and authentication metrics.

use crate::config::{LoggingConfig, OtelConfig};
use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter, MeterProvider as _},
    trace::TracerProvider as TracerProviderTrait,
    KeyValue,
};
use opentelemetry_sdk::{
    metrics::{PeriodicReader, SdkMeterProvider},
    runtime,
    trace::TracerProvider,
    Resource,
};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// OpenTelemetry error types
#[derive(Debug, Error)]
pub enum OtelError {
    /// Failed to initialize tracer
    #[error("Failed to initialize tracer: {0}")]
    TracerInit(String),

    /// Failed to initialize meter
    #[error("Failed to initialize meter: {0}")]
    MeterInit(String),

    /// Failed to shutdown
    #[error("Failed to shutdown: {0}")]
    Shutdown(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Telemetry pipelines
///
/// Always holds a meter provider so [`AuthMetrics`] can be created
/// unconditionally; it only exports when OTLP is enabled. The tracer provider
/// exists only when enabled and feeds the `tracing` bridge layer.
pub struct OtelProvider {
    tracer_provider: Option<TracerProvider>,
    meter_provider: SdkMeterProvider,
    service_name: String,
}

impl OtelProvider {
    /// Build the pipelines described by `config`
    ///
    /// # Errors
    ///
    /// `OtelError::Config` when enabled without an endpoint, or an init
    /// error if an OTLP exporter cannot be built.
    pub fn new(config: &OtelConfig) -> Result<Self, OtelError> {
        let resource = Resource::new([KeyValue::new(
            "service.name",
            config.service_name.clone(),
        )]);
        let mut meters = SdkMeterProvider::builder().with_resource(resource.clone());

        let tracer_provider = if config.enabled {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                OtelError::Config("OTLP endpoint is required when enabled".into())
            })?;

            meters = meters.with_reader(otlp_metric_reader(endpoint)?);

            let tracer_provider = otlp_tracer_provider(endpoint, resource)?;
            global::set_tracer_provider(tracer_provider.clone());
            Some(tracer_provider)
        } else {
            None
        };

        Ok(Self {
            tracer_provider,
            meter_provider: meters.build(),
            service_name: config.service_name.clone(),
        })
    }

    /// Meter for the service's instruments
    pub fn meter(&self) -> Meter {
        self.meter_provider.meter(self.service_name.clone())
    }

    /// Whether spans and metrics are exported
    pub fn is_enabled(&self) -> bool {
        self.tracer_provider.is_some()
    }

    /// Flush pending spans and stop metric export
    ///
    /// Call once, after the server has stopped.
    pub fn shutdown(&self) -> Result<(), OtelError> {
        if let Some(tracer_provider) = &self.tracer_provider {
            if let Some(Err(e)) = tracer_provider.force_flush().into_iter().find(Result::is_err) {
                return Err(OtelError::Shutdown(format!("Tracer flush failed: {:?}", e)));
            }
        }

        self.meter_provider
            .shutdown()
            .map_err(|e| OtelError::Shutdown(format!("Meter shutdown failed: {:?}", e)))
    }
}

/// Batch span exporter over OTLP/gRPC
fn otlp_tracer_provider(endpoint: &str, resource: Resource) -> Result<TracerProvider, OtelError> {
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::{Config, Sampler};

    let exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(endpoint)
        .build_span_exporter()
        .map_err(|e| OtelError::TracerInit(e.to_string()))?;

    Ok(TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_config(
            Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_resource(resource),
        )
        .build())
}

/// Periodic metric reader exporting over OTLP/gRPC
fn otlp_metric_reader(endpoint: &str) -> Result<PeriodicReader, OtelError> {
    use opentelemetry_otlp::{MetricsExporterBuilder, WithExportConfig};
    use opentelemetry_sdk::metrics::reader::{
        DefaultAggregationSelector, DefaultTemporalitySelector,
    };

    let exporter = MetricsExporterBuilder::from(
        opentelemetry_otlp::new_exporter()
            .tonic()
            .with_endpoint(endpoint),
    )
    .build_metrics_exporter(
        Box::new(DefaultTemporalitySelector::new()),
        Box::new(DefaultAggregationSelector::new()),
    )
    .map_err(|e| OtelError::MeterInit(e.to_string()))?;

    Ok(PeriodicReader::builder(exporter, runtime::Tokio).build())
}

/// Authentication metrics
///
/// Counts verification attempts per strategy and outcome, and times password
/// verification (the one deliberately slow step).
#[derive(Clone)]
pub struct AuthMetrics {
    /// Authentication attempts by strategy, method and outcome
    pub attempts_total: Counter<u64>,

    /// Password verification duration in seconds
    pub password_verify_duration: Histogram<f64>,
}

impl AuthMetrics {
    /// Create new metrics with the given meter
    pub fn new(meter: &Meter) -> Self {
        let attempts_total = meter
            .u64_counter("aihub_auth_attempts_total")
            .with_description("Total number of authentication attempts")
            .init();

        let password_verify_duration = meter
            .f64_histogram("aihub_auth_password_verify_seconds")
            .with_description("Password verification duration in seconds")
            .init();

        Self {
            attempts_total,
            password_verify_duration,
        }
    }

    /// Record one authentication attempt
    pub fn record_attempt(&self, strategy: &str, method: &str, outcome: &str) {
        self.attempts_total.add(
            1,
            &[
                KeyValue::new("strategy", strategy.to_string()),
                KeyValue::new("method", method.to_string()),
                KeyValue::new("outcome", outcome.to_string()),
            ],
        );
    }

    /// Record how long a password verification took
    pub fn record_password_verify(&self, duration_secs: f64) {
        self.password_verify_duration.record(duration_secs, &[]);
    }
}

/// Initialize the tracing subscriber
///
/// Log lines go to stdout as JSON (default) or in the multi-line pretty
/// format. When OpenTelemetry is enabled, spans are also exported over OTLP.
pub fn init_tracing(otel: &OtelProvider, logging: &LoggingConfig) -> Result<(), OtelError> {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(parse_level(&logging.level));

    let otel_layer = otel
        .tracer_provider
        .as_ref()
        .map(|tp| tracing_opentelemetry::layer().with_tracer(tp.tracer("aihub-auth")));

    let pretty = logging.format.eq_ignore_ascii_case("pretty");
    let json_layer = (!pretty).then(|| tracing_subscriber::fmt::layer().json());
    let pretty_layer = pretty.then(|| tracing_subscriber::fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| OtelError::TracerInit(e.to_string()))
}

/// Map a configured level name to a tracing level, defaulting to INFO
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> OtelConfig {
        OtelConfig {
            enabled: false,
            endpoint: None,
            service_name: "test-service".to_string(),
        }
    }

    #[test]
    fn test_otel_provider_disabled() {
        let provider = OtelProvider::new(&disabled_config()).unwrap();

        assert!(!provider.is_enabled());
        assert!(provider.tracer_provider.is_none());
    }

    #[test]
    fn test_otel_provider_requires_endpoint_when_enabled() {
        let config = OtelConfig {
            enabled: true,
            ..disabled_config()
        };

        match OtelProvider::new(&config) {
            Err(OtelError::Config(msg)) => assert!(msg.contains("endpoint is required")),
            _ => panic!("Expected OtelError::Config"),
        }
    }

    #[test]
    fn test_auth_metrics_record() {
        let provider = OtelProvider::new(&disabled_config()).unwrap();
        let metrics = AuthMetrics::new(&provider.meter());

        // Should not panic
        metrics.record_attempt("basic", "password", "accepted");
        metrics.record_attempt("bearer", "static_token", "accepted");
        metrics.record_attempt("api_key", "none", "rejected");
        metrics.record_password_verify(0.05);
    }

    #[test]
    fn test_otel_provider_shutdown() {
        let provider = OtelProvider::new(&disabled_config()).unwrap();
        assert!(provider.shutdown().is_ok());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARNING"), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_otel_error_display() {
        let err = OtelError::Config("test error".to_string());
        assert_eq!(err.to_string(), "Configuration error: test error");

        let err = OtelError::Shutdown("shutdown error".to_string());
        assert_eq!(err.to_string(), "Failed to shutdown: shutdown error");
    }

    #[test]
    fn test_default_otel_config() {
        let config = OtelConfig::default();

        assert!(!config.enabled);
        assert!(config.endpoint.is_none());
        assert_eq!(config.service_name, "aihub-auth");
    }
}
