//! Prometheus exposition for the metrics recorded by [`crate::MetricsCollector`].
//!
//! Installing the exporter registers a global recorder and serves
//! `/metrics` over HTTP on the given address. It must be called from within a
//! tokio runtime.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder};
use tracing::info;

use crate::metrics::METRIC_REQUEST_DURATION;

/// Request latency buckets in seconds. Search API calls range from a few
/// milliseconds (state polls) to tens of seconds (large result pages).
const REQUEST_DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

/// Handle for an installed Prometheus exporter.
#[derive(Debug)]
pub struct MetricsExporter {
    bind_addr: SocketAddr,
}

impl MetricsExporter {
    /// Install the Prometheus exporter as the global metrics recorder.
    ///
    /// # Errors
    /// - The bind address is not a socket address (`127.0.0.1:9090`)
    /// - Another recorder is already installed
    /// - The HTTP listener cannot be built
    pub fn install(bind_addr: &str) -> Result<Self, MetricsExporterError> {
        let addr = parse_bind_addr(bind_addr)?;

        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(METRIC_REQUEST_DURATION.to_string()),
                REQUEST_DURATION_BUCKETS,
            )?
            .with_http_listener(addr)
            .install()
            .map_err(|e| match e {
                metrics_exporter_prometheus::BuildError::FailedToSetGlobalRecorder(_) => {
                    MetricsExporterError::RecorderAlreadyInstalled
                }
                other => MetricsExporterError::from(other),
            })?;

        info!(%addr, "Prometheus metrics exporter listening on /metrics");

        Ok(Self { bind_addr: addr })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn parse_bind_addr(bind_addr: &str) -> Result<SocketAddr, MetricsExporterError> {
    bind_addr
        .trim()
        .parse()
        .map_err(|e| MetricsExporterError::InvalidBindAddress(bind_addr.to_string(), e))
}

/// Errors that can occur when installing the metrics exporter.
#[derive(Debug, thiserror::Error)]
pub enum MetricsExporterError {
    #[error("Invalid bind address '{0}': {1}")]
    InvalidBindAddress(String, std::net::AddrParseError),

    #[error("A metrics recorder is already installed")]
    RecorderAlreadyInstalled,

    #[error("Failed to build Prometheus recorder: {0}")]
    BuildError(String),
}

impl From<metrics_exporter_prometheus::BuildError> for MetricsExporterError {
    fn from(err: metrics_exporter_prometheus::BuildError) -> Self {
        MetricsExporterError::BuildError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_bind_address() {
        let result = MetricsExporter::install("not-a-valid-addr");
        assert!(matches!(
            result,
            Err(MetricsExporterError::InvalidBindAddress(_, _))
        ));
    }

    #[test]
    fn test_parse_bind_addr() {
        assert_eq!(
            parse_bind_addr(" 127.0.0.1:9090 ").unwrap().to_string(),
            "127.0.0.1:9090"
        );
        assert!(parse_bind_addr("[::1]:9090").is_ok());
        assert!(parse_bind_addr("localhost").is_err());
    }

    #[test]
    fn test_error_display() {
        let parse_error = "invalid".parse::<SocketAddr>().unwrap_err();
        let error = MetricsExporterError::InvalidBindAddress("test".to_string(), parse_error);
        assert!(error.to_string().contains("Invalid bind address 'test'"));
        assert_eq!(
            MetricsExporterError::RecorderAlreadyInstalled.to_string(),
            "A metrics recorder is already installed"
        );
    }
}
