use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status (`ok` or `degraded`).
    pub status: String,
    /// True when no durable snapshot store is available.
    pub degraded: bool,
}

impl HealthResponse {
    /// The service is fully operational.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            degraded: false,
        }
    }

    /// The service runs without durable storage.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            degraded: true,
        }
    }
}
