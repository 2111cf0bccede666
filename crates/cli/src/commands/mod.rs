//! CLI command implementations.

pub mod job;
pub mod search;

use anyhow::{Context, Result};
use sumo_client::{MetricsCollector, SumoClient};
use sumo_config::Config;

/// Build a client from the loaded configuration, recording metrics when an
/// exporter is installed.
pub fn build_client(config: &Config, metrics_enabled: bool) -> Result<SumoClient> {
    let mut builder = SumoClient::builder().from_config(config);
    if metrics_enabled {
        builder = builder.metrics(MetricsCollector::new());
    }
    builder.build().context("Failed to build Sumo Logic client")
}
