//! Health probing across both store slots.

use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe both stores and report per-store connectivity.
///
/// A store counts as up only when a handle is installed and its probe
/// answers. Probe failures are logged but never fail the route; the payload
/// carries the verdict.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let record_up = match state.record_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "record store health check failed");
                false
            }
        },
        None => {
            warn!("record store unavailable (degraded mode)");
            false
        }
    };

    let live_up = match state.live_store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "live store health check failed");
                false
            }
        },
        None => {
            warn!("live store unavailable (degraded mode)");
            false
        }
    };

    HealthResponse::from_probes(record_up, live_up)
}
