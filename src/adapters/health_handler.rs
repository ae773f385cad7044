use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::SchemaRegistryPort;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub registry: String,
}

pub struct HealthHandler {
    registry: Arc<dyn SchemaRegistryPort>,
    start_time: std::time::Instant,
}

impl HealthHandler {
    pub fn new(registry: Arc<dyn SchemaRegistryPort>) -> Self {
        Self {
            registry,
            start_time: std::time::Instant::now(),
        }
    }

    /// Basic health check - returns 200 if server is running
    pub async fn health(&self) -> impl IntoResponse {
        let registry = match self.registry.list().await {
            Ok(_) => "ok",
            Err(_) => "unavailable",
        };
        let status = HealthStatus {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            checks: HealthChecks {
                registry: registry.to_string(),
            },
        };

        (StatusCode::OK, Json(status))
    }

    /// Readiness check - returns 200 once the registry answers
    pub async fn ready(&self) -> impl IntoResponse {
        match self.registry.list().await {
            Ok(schemas) => (StatusCode::OK, Json(serde_json::json!({
                "status": "ready",
                "schemas": schemas.len()
            }))),
            Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({
                "status": "not_ready",
                "message": e.to_string()
            }))),
        }
    }

    /// Liveness check - returns 200 if server is alive
    pub async fn live(&self) -> impl IntoResponse {
        (StatusCode::OK, Json(serde_json::json!({
            "status": "alive",
            "message": "Server is alive"
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::registry::InMemorySchemaRegistry;
    use schemaforge_core::notify::NullSink;

    fn handler() -> HealthHandler {
        HealthHandler::new(Arc::new(InMemorySchemaRegistry::new(Arc::new(NullSink))))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = handler().health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_with_empty_registry() {
        let response = handler().ready().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_live_endpoint() {
        let response = handler().live().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
