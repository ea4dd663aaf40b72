//! Static asset handlers
//!
//! Serves the embedded assets: the bundled default icon, robots.txt, and
//! anything else under `static/`.

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::IntoResponse,
};

use crate::assets::StaticAssets;

/// The bundled fallback icon, shared with the resolution handler.
pub fn default_favicon() -> Option<rust_embed::EmbeddedFile> {
    StaticAssets::get_asset("static/favicon.ico")
}

/// Serve a static asset by path
pub async fn serve_static_asset(Path(path): Path<String>) -> impl IntoResponse {
    // No directory listings
    if path.ends_with('/') || path.is_empty() {
        return (StatusCode::NOT_FOUND, "Asset not found").into_response();
    }

    let asset_path = format!("static/{path}");

    match StaticAssets::get_asset(&asset_path) {
        Some(file) => (
            [
                (
                    header::CONTENT_TYPE.as_str(),
                    StaticAssets::get_content_type(&path).to_string(),
                ),
                (
                    header::CACHE_CONTROL.as_str(),
                    "public, max-age=86400".to_string(),
                ),
            ],
            file.data.to_vec(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Asset not found").into_response(),
    }
}

/// Serve the service's own favicon
pub async fn serve_favicon_asset() -> impl IntoResponse {
    match default_favicon() {
        Some(file) => (
            [
                (header::CONTENT_TYPE.as_str(), "image/x-icon".to_string()),
                (
                    header::CACHE_CONTROL.as_str(),
                    "public, max-age=86400".to_string(),
                ),
            ],
            file.data.to_vec(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Favicon not found").into_response(),
    }
}

/// Serve robots.txt
pub async fn serve_robots_txt() -> impl IntoResponse {
    match StaticAssets::get_asset("static/robots.txt") {
        Some(file) => (
            [(header::CONTENT_TYPE.as_str(), "text/plain".to_string())],
            file.data.to_vec(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}
