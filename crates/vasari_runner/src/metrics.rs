//! Run metrics.
//!
//! Instruments are registered on the global meter when the `metrics`
//! feature is enabled; otherwise every method is a no-op.

#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram, Meter},
};

/// Counters and timings for a batch run.
#[cfg(feature = "metrics")]
#[derive(Clone)]
pub struct RunMetrics {
    /// Meter handle kept alive for metric instruments
    _meter: Meter,
    /// Dialogs that gained a generation
    pub generated: Counter<u64>,
    /// Dialogs whose generation failed
    pub failed: Counter<u64>,
    /// Dialogs skipped because they were already done
    pub skipped: Counter<u64>,
    /// Generation call duration in seconds
    pub duration: Histogram<f64>,
}

#[cfg(feature = "metrics")]
impl RunMetrics {
    /// Registers the instruments on the global meter.
    pub fn new() -> Self {
        use tracing::debug;
        let meter = global::meter("vasari_runner");

        let generated = meter
            .u64_counter("dialogs.generated")
            .with_description("Dialogs that gained a generation")
            .build();
        let failed = meter
            .u64_counter("dialogs.failed")
            .with_description("Dialogs whose generation failed")
            .build();
        let skipped = meter
            .u64_counter("dialogs.skipped")
            .with_description("Dialogs already carrying a generation")
            .build();
        let duration = meter
            .f64_histogram("generation.duration")
            .with_unit("seconds")
            .with_description("Generation call duration")
            .build();
        debug!("RunMetrics instruments created");

        Self {
            _meter: meter,
            generated,
            failed,
            skipped,
            duration,
        }
    }

    /// Records a successful generation.
    pub fn record_generated(&self, provider: &'static str, duration_secs: f64) {
        let labels = &[KeyValue::new("provider", provider)];
        self.generated.add(1, labels);
        self.duration.record(duration_secs, labels);
    }

    /// Records a failed generation.
    pub fn record_failed(&self, provider: &'static str, prompt_too_long: bool) {
        let labels = &[
            KeyValue::new("provider", provider),
            KeyValue::new("prompt_too_long", prompt_too_long),
        ];
        self.failed.add(1, labels);
    }

    /// Records a skipped dialog.
    pub fn record_skipped(&self) {
        self.skipped.add(1, &[]);
    }
}

/// Counters and timings for a batch run (inert without `metrics`).
#[cfg(not(feature = "metrics"))]
#[derive(Clone, Copy)]
pub struct RunMetrics;

#[cfg(not(feature = "metrics"))]
impl RunMetrics {
    /// Creates the inert recorder.
    pub fn new() -> Self {
        Self
    }

    /// Records a successful generation.
    pub fn record_generated(&self, _provider: &'static str, _duration_secs: f64) {}

    /// Records a failed generation.
    pub fn record_failed(&self, _provider: &'static str, _prompt_too_long: bool) {}

    /// Records a skipped dialog.
    pub fn record_skipped(&self) {}
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RunMetrics")
    }
}
