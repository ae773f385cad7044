//! REST API handlers for the schema editor
//!
//! Provides CRUD endpoints for schema records plus render-plan and
//! submission endpoints that run the schema-to-form compiler server side.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use schemaforge_core::plan::{FormMode, RenderPlan};
use schemaforge_core::rules::{compile_schema, FieldErrors};
use schemaforge_core::{CreateSchemaRequest, ProductSchema};

use crate::adapters::notifications::NotificationHub;
use crate::domain::{RegistryError, SchemaRegistryPort};

/// Shared application state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<dyn SchemaRegistryPort>,
    pub notifications: NotificationHub,
}

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failure that still carries a payload, e.g. per-field messages
    pub fn rejected(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }
}

fn error_response<T>(err: RegistryError) -> (StatusCode, Json<ApiResponse<T>>) {
    (err.status_code(), Json(ApiResponse::error(err.to_string())))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    #[serde(default)]
    pub multi_step: bool,
}

// ============================================================================
// Schema CRUD Endpoints
// ============================================================================

/// GET /api/schemas - List all schemas, or search when `q` is given
pub async fn list_schemas(
    State(state): State<ApiState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let result = match query.q.as_deref() {
        Some(q) => state.registry.search(q).await,
        None => state.registry.list().await,
    };
    match result {
        Ok(schemas) => (StatusCode::OK, Json(ApiResponse::success(schemas))),
        Err(e) => error_response(e),
    }
}

/// GET /api/schemas/:id - Get a single schema
pub async fn get_schema(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&id).await {
        Ok(schema) => (StatusCode::OK, Json(ApiResponse::success(schema))),
        Err(e) => error_response::<ProductSchema>(e),
    }
}

/// POST /api/schemas - Create a new schema
pub async fn create_schema(
    State(state): State<ApiState>,
    Json(payload): Json<CreateSchemaRequest>,
) -> impl IntoResponse {
    match state.registry.create(payload).await {
        Ok(schema) => (StatusCode::CREATED, Json(ApiResponse::success(schema))),
        Err(e) => error_response(e),
    }
}

/// PUT /api/schemas/:id - Update a schema
pub async fn update_schema(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(payload): Json<CreateSchemaRequest>,
) -> impl IntoResponse {
    match state.registry.update(&id, payload).await {
        Ok(schema) => (StatusCode::OK, Json(ApiResponse::success(schema))),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/schemas/:id - Delete a schema
pub async fn delete_schema(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.registry.delete(&id).await {
        Ok(()) => (StatusCode::OK, Json(ApiResponse::<()>::ok())),
        Err(e) => error_response(e),
    }
}

// ============================================================================
// Form Endpoints
// ============================================================================

/// GET /api/schemas/:id/plan - Render plan for a stored schema
pub async fn get_plan(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<PlanQuery>,
) -> impl IntoResponse {
    let mode = if query.multi_step {
        FormMode::MultiStep
    } else {
        FormMode::Single
    };
    match state.registry.get(&id).await {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::success(RenderPlan::generate(&record.schema, mode))),
        ),
        Err(e) => error_response(e),
    }
}

/// Outcome of a submission, either the accepted document or field messages
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SubmitOutcome {
    Accepted(Value),
    Rejected(FieldErrors),
}

/// POST /api/schemas/:id/submit - Validate a submission against the stored schema
///
/// The body maps field paths (flat `a.b` keys or nested objects) to raw
/// values. Values are coerced the way the form widgets would before the
/// compiled ruleset runs.
pub async fn submit_form(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(raw): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let record = match state.registry.get(&id).await {
        Ok(record) => record,
        Err(e) => return error_response::<SubmitOutcome>(e),
    };

    let ruleset = compile_schema(&record.schema);
    let values = ruleset.coerce_input(&raw);
    match ruleset.validate(&values) {
        Ok(accepted) => {
            debug!(id = %id, "submission accepted");
            (
                StatusCode::OK,
                Json(ApiResponse::success(SubmitOutcome::Accepted(accepted.to_document()))),
            )
        }
        Err(errors) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::rejected(
                SubmitOutcome::Rejected(errors),
                "Submission failed validation",
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_omits_empty_fields() {
        let value = serde_json::to_value(ApiResponse::<()>::ok()).unwrap();
        assert_eq!(value, serde_json::json!({"success": true}));

        let value = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(value, serde_json::json!({"success": false, "error": "boom"}));
    }

    #[test]
    fn test_plan_query_defaults_to_single() {
        let query: PlanQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!query.multi_step);
    }
}
