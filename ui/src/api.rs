//! API client for the SchemaForge registry service

use gloo_net::http::{Request, Response};
use schemaforge_core::notify::Notification;
use schemaforge_core::{CreateSchemaRequest, FieldErrors, ProductSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{EventSource, MessageEvent};

const API_BASE: &str = "/api";

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

// ============================================================================
// Schemas
// ============================================================================

/// List every schema, or only those matching `query` when it is not blank
pub async fn list_schemas(query: &str) -> Result<Vec<ProductSchema>, String> {
    let url = if query.trim().is_empty() {
        format!("{}/schemas", API_BASE)
    } else {
        format!("{}/schemas?q={}", API_BASE, urlencoding::encode(query.trim()))
    };
    fetch_json::<Vec<ProductSchema>>(&url).await
}

pub async fn get_schema(id: &str) -> Result<ProductSchema, String> {
    let url = format!("{}/schemas/{}", API_BASE, urlencoding::encode(id));
    fetch_json::<ProductSchema>(&url).await
}

pub async fn create_schema(payload: &CreateSchemaRequest) -> Result<ProductSchema, String> {
    let url = format!("{}/schemas", API_BASE);
    post_json::<CreateSchemaRequest, ProductSchema>(&url, payload).await
}

pub async fn update_schema(id: &str, payload: &CreateSchemaRequest) -> Result<ProductSchema, String> {
    let url = format!("{}/schemas/{}", API_BASE, urlencoding::encode(id));
    put_json::<CreateSchemaRequest, ProductSchema>(&url, payload).await
}

pub async fn delete_schema(id: &str) -> Result<(), String> {
    let url = format!("{}/schemas/{}", API_BASE, urlencoding::encode(id));
    delete_request(&url).await
}

// ============================================================================
// Forms
// ============================================================================

/// Server-side check of a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitResult {
    Accepted(Value),
    Rejected(FieldErrors),
}

pub async fn submit_form(id: &str, values: &Map<String, Value>) -> Result<SubmitResult, String> {
    let url = format!("{}/schemas/{}/submit", API_BASE, urlencoding::encode(id));
    let response = Request::post(&url)
        .json(values)
        .map_err(|e| format!("Failed to serialize body: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let status = response.status();
    let api_response: ApiResponse<Value> = parse(response).await?;
    match (status, api_response.data) {
        (200, Some(document)) if api_response.success => Ok(SubmitResult::Accepted(document)),
        (422, Some(errors)) => serde_json::from_value(errors)
            .map(SubmitResult::Rejected)
            .map_err(|e| format!("Failed to parse field errors: {}", e)),
        _ => Err(api_response.error.unwrap_or_else(|| "Unknown error".to_string())),
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Open the server's notification stream and hand every event to `on_event`.
///
/// Events stop once the returned `EventSource` is closed.
pub fn subscribe_notifications<F>(on_event: F) -> Result<EventSource, String>
where
    F: Fn(Notification) + 'static,
{
    let source = EventSource::new(&format!("{}/notifications", API_BASE))
        .map_err(|e| format!("Failed to open notification stream: {:?}", e))?;

    let handler = Closure::<dyn Fn(MessageEvent)>::new(move |event: MessageEvent| {
        let Some(data) = event.data().as_string() else {
            return;
        };
        match serde_json::from_str::<Notification>(&data) {
            Ok(notification) => on_event(notification),
            Err(e) => log::warn!("Ignoring malformed notification: {}", e),
        }
    });

    for level in ["info", "success", "error"] {
        source
            .add_event_listener_with_callback(level, handler.as_ref().unchecked_ref())
            .map_err(|e| format!("Failed to listen for {} events: {:?}", level, e))?;
    }
    handler.forget();
    Ok(source)
}

// ============================================================================
// Helpers
// ============================================================================

async fn parse<T: DeserializeOwned>(response: Response) -> Result<ApiResponse<T>, String> {
    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))
}

fn unwrap_data<T>(api_response: ApiResponse<T>) -> Result<T, String> {
    if api_response.success {
        api_response.data.ok_or_else(|| "No data in response".to_string())
    } else {
        Err(api_response.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}

async fn fetch_json<T: DeserializeOwned>(url: &str) -> Result<T, String> {
    let response = Request::get(url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;
    unwrap_data(parse(response).await?)
}

async fn post_json<T: Serialize, R: DeserializeOwned>(url: &str, body: &T) -> Result<R, String> {
    let response = Request::post(url)
        .json(body)
        .map_err(|e| format!("Failed to serialize body: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;
    unwrap_data(parse(response).await?)
}

async fn put_json<T: Serialize, R: DeserializeOwned>(url: &str, body: &T) -> Result<R, String> {
    let response = Request::put(url)
        .json(body)
        .map_err(|e| format!("Failed to serialize body: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;
    unwrap_data(parse(response).await?)
}

async fn delete_request(url: &str) -> Result<(), String> {
    let response = Request::delete(url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let api_response: ApiResponse<Value> = parse(response).await?;
    if api_response.success {
        Ok(())
    } else {
        Err(api_response.error.unwrap_or_else(|| "Unknown error".to_string()))
    }
}
