//! Favicon resolution HTTP handler
//!
//! The edge of the whole pipeline: validate the caller's address, try the
//! cache, fall back to live resolution, and always answer with some icon.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::utils::UrlUtils;
use crate::web::AppState;

use super::static_assets;

#[derive(Debug, Deserialize)]
pub struct FaviconQuery {
    pub url: Option<String>,
}

/// `GET /?url=<address>`
///
/// Serves the icon for the addressed site: from cache when fresh, freshly
/// resolved otherwise, and the bundled default icon when the origin yields
/// nothing. The `X-Cache` and `X-Favicon-Source` headers say which path a
/// response took.
pub async fn serve_favicon(
    State(state): State<AppState>,
    Query(params): Query<FaviconQuery>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let Some(raw_url) = params.url.filter(|url| !url.is_empty()) else {
        return Ok((
            StatusCode::BAD_REQUEST,
            "Missing 'url' query parameter. Usage: /?url=<url>",
        )
            .into_response());
    };

    let domain = UrlUtils::canonical_host(&raw_url);

    if let Some((data, content_type)) = state.repository.get(&domain).await? {
        return Ok(serve_cached(&state, &domain, data, content_type, &headers));
    }

    debug!("Cache miss for {domain}, resolving");

    if let Some(icon) = state.resolver.resolve_for_host(&domain).await {
        // A failed save is worth noting but must not fail the response
        if let Err(e) = state
            .repository
            .save(&domain, &icon.data, &icon.content_type)
            .await
        {
            warn!("Failed to cache favicon for {domain}: {e}");
        }

        return Ok(serve_fetched(&state, icon.data, icon.content_type));
    }

    Ok(serve_default(&state))
}

fn serve_cached(
    state: &AppState,
    domain: &str,
    data: Vec<u8>,
    content_type: String,
    headers: &HeaderMap,
) -> Response {
    let etag = format!("\"fav-{domain}\"");

    // Honor conditional revalidation against the deterministic validator
    if let Some(client_etag) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
    {
        if client_etag == etag || client_etag.strip_prefix("W/") == Some(etag.as_str()) {
            return (
                StatusCode::NOT_MODIFIED,
                [(header::ETAG, etag)],
            )
                .into_response();
        }
    }

    (
        [
            (header::CONTENT_TYPE.as_str(), content_type),
            (
                header::CACHE_CONTROL.as_str(),
                format!("public, max-age={}, immutable", state.cache_max_age_secs()),
            ),
            (header::ETAG.as_str(), etag),
            ("x-cache", "HIT".to_string()),
            ("x-favicon-source", "cached".to_string()),
        ],
        data,
    )
        .into_response()
}

fn serve_fetched(state: &AppState, data: Vec<u8>, content_type: String) -> Response {
    (
        [
            (header::CONTENT_TYPE.as_str(), content_type),
            (
                header::CACHE_CONTROL.as_str(),
                format!("public, max-age={}", state.cache_max_age_secs()),
            ),
            ("x-cache", "MISS".to_string()),
            ("x-favicon-source", "fetched".to_string()),
        ],
        data,
    )
        .into_response()
}

fn serve_default(state: &AppState) -> Response {
    let Some(file) = static_assets::default_favicon() else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
    };

    (
        [
            (header::CONTENT_TYPE.as_str(), "image/x-icon".to_string()),
            (
                header::CACHE_CONTROL.as_str(),
                format!("public, max-age={}", state.cache_max_age_secs()),
            ),
            ("x-cache", "DEFAULT".to_string()),
            ("x-favicon-source", "default".to_string()),
        ],
        file.data.to_vec(),
    )
        .into_response()
}
