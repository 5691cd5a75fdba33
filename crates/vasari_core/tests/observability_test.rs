//! Tests for metrics exporter selection.

use vasari_core::{MetricsExporter, init_metrics};

#[test]
fn test_unset_exporter_disables_metrics() {
    assert_eq!(MetricsExporter::from_env_value(None), MetricsExporter::Disabled);
    assert_eq!(MetricsExporter::default(), MetricsExporter::Disabled);
}

#[test]
fn test_exporter_values() {
    assert_eq!(MetricsExporter::from_env_value(Some("otlp")), MetricsExporter::Otlp);
    assert_eq!(MetricsExporter::from_env_value(Some("STDOUT")), MetricsExporter::Stdout);
    assert_eq!(MetricsExporter::from_env_value(Some("prometheus")), MetricsExporter::Disabled);
    assert_eq!(MetricsExporter::from_env_value(Some("")), MetricsExporter::Disabled);
}

#[test]
fn test_init_without_exporter_is_inert() {
    // SAFETY: this is the only test in the binary touching the variable.
    unsafe { std::env::remove_var("OTEL_EXPORTER") };
    let guard = init_metrics("vasari-test", 1).unwrap();
    guard.shutdown();
}
