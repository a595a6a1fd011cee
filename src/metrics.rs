//! Metrics and tracing hooks for catalog alterations.
//!
//! `METRICS` is only compiled with the `metrics` feature; `tracing_helpers` only with `tracing`.
//! Metrics are recorded through an OpenTelemetry meter whose Prometheus reader feeds
//! `TableguardMetrics::registry`; `render()` produces the text exposition format.

#[cfg(feature = "metrics")]
use once_cell::sync::Lazy;
#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Histogram, MeterProvider};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::metrics::SdkMeterProvider;
#[cfg(feature = "metrics")]
use prometheus::{Encoder, Registry, TextEncoder};

#[cfg(feature = "metrics")]
pub static METRICS: Lazy<TableguardMetrics> = Lazy::new(TableguardMetrics::init);

#[cfg(feature = "metrics")]
pub struct TableguardMetrics {
    pub registry: Registry,
    pub provider: SdkMeterProvider,
    pub statements_total: Counter<u64>,
    pub statement_errors_total: Counter<u64>,
    pub statement_duration: Histogram<f64>,
    pub alterations_total: Counter<u64>,
    pub alterations_rejected_total: Counter<u64>,
}

#[cfg(feature = "metrics")]
impl TableguardMetrics {
    pub fn init() -> Self {
        let registry = Registry::new();
        let exporter = opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
            .expect("failed to build prometheus exporter");
        let provider = SdkMeterProvider::builder().with_reader(exporter).build();
        let meter = provider.meter("tableguard");

        let statements_total = meter
            .u64_counter("tableguard_statements_total")
            .with_description("Statements executed against the connection")
            .build();

        let statement_errors_total = meter
            .u64_counter("tableguard_statement_errors_total")
            .with_description("Statements rejected by the connection")
            .build();

        let statement_duration = meter
            .f64_histogram("tableguard_statement_duration_seconds")
            .with_description("Duration of statements")
            .build();

        let alterations_total = meter
            .u64_counter("tableguard_column_alterations_total")
            .with_description("Column alterations that completed")
            .build();

        let alterations_rejected_total = meter
            .u64_counter("tableguard_column_alterations_rejected_total")
            .with_description("Column alterations refused as unsupported")
            .build();

        Self {
            registry,
            provider,
            statements_total,
            statement_errors_total,
            statement_duration,
            alterations_total,
            alterations_rejected_total,
        }
    }

    /// Current values in the Prometheus text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn record_statement(&self, elapsed: std::time::Duration) {
        self.statements_total.add(1, &[]);
        self.statement_duration.record(elapsed.as_secs_f64(), &[]);
    }

    pub fn record_statement_error(&self) {
        self.statement_errors_total.add(1, &[]);
    }

    pub fn record_alteration(&self) {
        self.alterations_total.add(1, &[]);
    }

    pub fn record_rejected_alteration(&self) {
        self.alterations_rejected_total.add(1, &[]);
    }
}

/// Span constructors shared by the executor and the table catalog objects.
#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    pub fn alter_column_span(table: &str, column: &str) -> Span {
        info_span!("tableguard.alter_column", table = table, column = column)
    }

    pub fn execute_statement_span(statement: &str) -> Span {
        info_span!("tableguard.execute", db.statement = statement)
    }

    pub fn refresh_columns_span(table: &str) -> Span {
        info_span!("tableguard.refresh_columns", table = table)
    }

    pub fn connect_span() -> Span {
        info_span!("tableguard.connect")
    }
}
