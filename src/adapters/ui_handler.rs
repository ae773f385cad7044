use axum::{
    extract::OriginalUri,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

/// Front-end bundle produced by `trunk build` in `ui/`
#[derive(RustEmbed)]
#[folder = "ui/dist"]
#[allow_missing = true]
struct Asset;

pub struct UIHandler;

impl UIHandler {
    pub async fn serve(OriginalUri(uri): OriginalUri) -> Response {
        let path = uri.path().trim_start_matches('/');

        // Unknown API routes must not fall through to the SPA
        if path == "api" || path.starts_with("api/") {
            return (StatusCode::NOT_FOUND, "404 Not Found").into_response();
        }

        let path = if path.is_empty() { "index.html" } else { path };
        asset_response(path)
            // Client-side routes resolve to the app shell
            .or_else(|| asset_response("index.html"))
            .unwrap_or_else(|| (StatusCode::NOT_FOUND, "404 Not Found").into_response())
    }
}

fn asset_response(path: &str) -> Option<Response> {
    let content = Asset::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    #[tokio::test]
    async fn test_unknown_api_path_is_not_spa() {
        let response = UIHandler::serve(OriginalUri(Uri::from_static("/api/unknown"))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
