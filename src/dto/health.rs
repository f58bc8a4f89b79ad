use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Number of live word pools.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_pools: Option<usize>,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(word_pools: usize) -> Self {
        Self {
            status: "ok".to_string(),
            word_pools: Some(word_pools),
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            word_pools: None,
        }
    }
}
