use serde::Serialize;
use utoipa::ToSchema;

/// Overall service condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Storage reachable, every route served.
    Ok,
    /// No storage; data routes answer 503.
    Degraded,
}

/// Body returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Crate version of the running binary.
    pub version: &'static str,
}

impl HealthResponse {
    fn with_status(status: HealthStatus) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Create a health response indicating the system is operational.
    pub fn ok() -> Self {
        Self::with_status(HealthStatus::Ok)
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded() -> Self {
        Self::with_status(HealthStatus::Degraded)
    }
}
