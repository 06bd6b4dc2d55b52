//! Metrics collection and Prometheus export.

use crate::services::language::Capability;
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it again is a no-op.
pub fn init_metrics() -> Result<(), AppError> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!(
            "failed to install Prometheus recorder: {}",
            e
        ))
    })?;

    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

/// Current metrics in Prometheus text format, for the /metrics endpoint.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized".to_string())
}

/// Outcome of one analysis request.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisOutcome {
    Success,
    Unavailable,
    Error,
}

impl AnalysisOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            AnalysisOutcome::Success => "success",
            AnalysisOutcome::Unavailable => "unavailable",
            AnalysisOutcome::Error => "error",
        }
    }
}

pub fn record_analysis(capability: Capability, outcome: AnalysisOutcome) {
    counter!(
        "language_analysis_total",
        "capability" => capability.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}
