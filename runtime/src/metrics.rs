//! Prometheus metrics for the store runtime.
//!
//! The store records through the `metrics` facade unconditionally; nothing is
//! kept unless a recorder is installed. [`install_prometheus`] installs a
//! Prometheus recorder and returns a handle that renders the exposition text.
//!
//! # Example
//!
//! ```rust,no_run
//! use todo_store_runtime::metrics::install_prometheus;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = install_prometheus()?;
//! println!("{}", handle.render());
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_gauge, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other modules
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install a process-wide Prometheus recorder.
///
/// # Errors
///
/// Returns [`MetricsError::Build`] if the histogram buckets are rejected and
/// [`MetricsError::Install`] if a recorder is already installed.
pub fn install_prometheus() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("duration_seconds".to_string()),
            &[0.000_001, 0.000_01, 0.000_1, 0.001, 0.01, 0.1],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_metrics();
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!(
        "store.actions.total",
        "Total number of actions reduced by the store"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside the reducer for one action"
    );
    describe_gauge!(
        "store.listeners.active",
        "Number of state listeners currently subscribed"
    );
    describe_counter!(
        "store.effects.executed_total",
        "Effects handed to the executor (excluding no-ops)"
    );
    describe_counter!(
        "store.middleware.unserializable_total",
        "Actions or states the serializable check could not encode"
    );
}
