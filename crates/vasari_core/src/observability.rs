//! Logging and OpenTelemetry metrics initialization.

#[cfg(feature = "metrics")]
use opentelemetry::{KeyValue, global};
#[cfg(feature = "metrics")]
use opentelemetry_otlp::{MetricExporter as OtlpExporter, WithExportConfig};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{
    Resource,
    metrics::{PeriodicReader, SdkMeterProvider},
};
#[cfg(feature = "metrics")]
use opentelemetry_stdout::MetricExporter as StdoutExporter;
#[cfg(feature = "metrics")]
use std::time::Duration;
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;
use vasari_error::{ConfigError, VasariResult};

/// Output format for log lines.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `debug` with `debug`
/// enabled and `info` without. Logs go to standard error so the dataset
/// path is the only thing written elsewhere.
pub fn init_tracing(debug: bool, format: LogFormat) -> VasariResult<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| ConfigError::new(format!("Failed to initialize logging: {}", e)))?;
    debug!(%format, "Tracing initialized");
    Ok(())
}

/// Keeps the meter provider alive for the duration of a run.
///
/// Dropping the guard without calling [`MetricsGuard::shutdown`] loses any
/// measurements not yet exported.
#[derive(Debug, Default)]
pub struct MetricsGuard {
    #[cfg(feature = "metrics")]
    provider: Option<SdkMeterProvider>,
}

impl MetricsGuard {
    /// Flushes pending measurements and stops the exporter.
    #[instrument(skip(self))]
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Some(provider) = self.provider {
                if let Err(e) = provider.shutdown() {
                    tracing::warn!(error = %e, "Metrics provider shutdown failed");
                }
            }
        }
        debug!("Metrics shutdown complete");
    }
}

/// Where metrics go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MetricsExporter {
    /// No exporter is installed
    #[default]
    Disabled,
    /// Periodic dumps to standard output
    Stdout,
    /// OTLP over HTTP
    Otlp,
}

impl MetricsExporter {
    /// Maps an `OTEL_EXPORTER` value to an exporter.
    ///
    /// Unset or unrecognized values disable export.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("otlp") => Self::Otlp,
            Some(v) if v.eq_ignore_ascii_case("stdout") => Self::Stdout,
            _ => Self::Disabled,
        }
    }

    /// Reads `OTEL_EXPORTER`.
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var("OTEL_EXPORTER").ok().as_deref())
    }
}

/// Initialize OpenTelemetry metrics with OTLP or stdout export.
///
/// Checks the `OTEL_EXPORTER` environment variable:
/// - "otlp" -> OTLP exporter to `OTEL_EXPORTER_OTLP_ENDPOINT` (default: http://localhost:4318)
/// - "stdout" -> stdout exporter
/// - unset -> no export
///
/// When the `metrics` feature is disabled this returns an inert guard.
#[instrument(skip_all, fields(service_name))]
pub fn init_metrics(
    service_name: &'static str,
    export_interval_secs: u64,
) -> VasariResult<MetricsGuard> {
    let exporter = MetricsExporter::from_env();

    #[cfg(not(feature = "metrics"))]
    {
        let _ = export_interval_secs;
        info!(
            service_name,
            %exporter,
            "Metrics feature disabled - skipping metrics initialization"
        );
        Ok(MetricsGuard::default())
    }

    #[cfg(feature = "metrics")]
    {
        if exporter == MetricsExporter::Disabled {
            debug!(service_name, "OTEL_EXPORTER not set, metrics export disabled");
            return Ok(MetricsGuard::default());
        }
        info!(
            service_name,
            %exporter,
            export_interval_secs, "Initializing OpenTelemetry metrics"
        );

        let resource = Resource::builder_empty()
            .with_attributes([KeyValue::new("service.name", service_name)])
            .build();
        let interval = Duration::from_secs(export_interval_secs);

        let reader = match exporter {
            MetricsExporter::Otlp => {
                let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:4318".to_string());
                info!(%endpoint, "Using OTLP metrics exporter");

                let exporter = OtlpExporter::builder()
                    .with_http()
                    .with_endpoint(endpoint)
                    .with_timeout(Duration::from_secs(10))
                    .build()
                    .map_err(|e| {
                        ConfigError::new(format!("Failed to create OTLP exporter: {}", e))
                    })?;
                PeriodicReader::builder(exporter)
                    .with_interval(interval)
                    .build()
            }
            _ => PeriodicReader::builder(StdoutExporter::default())
                .with_interval(interval)
                .build(),
        };
        let provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build();

        global::set_meter_provider(provider.clone());
        info!(service_name, "Meter provider registered globally");

        Ok(MetricsGuard {
            provider: Some(provider),
        })
    }
}
