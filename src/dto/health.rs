use serde::Serialize;
use utoipa::ToSchema;

/// Connectivity of one store slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreHealth {
    /// The store is installed and answered its last probe.
    Up,
    /// The store is missing or failed its last probe.
    Down,
}

/// Health payload returned by the `/healthcheck` route, one verdict per
/// store plus the overall status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status: "ok" only when both stores are up.
    pub status: String,
    /// Durable record store connectivity.
    pub record_store: StoreHealth,
    /// Volatile live store connectivity.
    pub live_store: StoreHealth,
}

impl HealthResponse {
    /// Build the payload from per-store probe outcomes.
    pub fn from_probes(record_up: bool, live_up: bool) -> Self {
        let status = if record_up && live_up {
            "ok"
        } else {
            "degraded"
        };
        Self {
            status: status.to_string(),
            record_store: store_health(record_up),
            live_store: store_health(live_up),
        }
    }
}

fn store_health(up: bool) -> StoreHealth {
    if up { StoreHealth::Up } else { StoreHealth::Down }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_store_down_degrades_the_whole_service() {
        let healthy = HealthResponse::from_probes(true, true);
        assert_eq!(healthy.status, "ok");
        assert_eq!(healthy.record_store, StoreHealth::Up);
        assert_eq!(healthy.live_store, StoreHealth::Up);

        let half = HealthResponse::from_probes(true, false);
        assert_eq!(half.status, "degraded");
        assert_eq!(half.record_store, StoreHealth::Up);
        assert_eq!(half.live_store, StoreHealth::Down);
    }
}
