//! Resolver behavior against live (local) origins
//!
//! These tests stand up throwaway axum servers on ephemeral ports and point
//! candidate URLs at them, exercising the real fetch path: status and
//! content-type validation, first-success-wins racing, deadlines, and
//! discovery of manifest/markup candidates.

use std::io::Cursor;
use std::time::{Duration, Instant};

use axum::{
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use image::{ImageFormat, RgbaImage};

use favicon_proxy::config::FetchConfig;
use favicon_proxy::resolver::FaviconResolver;
use favicon_proxy::utils::IconHttpClient;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 9 % 256) as u8, (y * 13 % 256) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

async fn spawn_origin(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn test_resolver(request_timeout: Duration, resolve_timeout: Duration) -> FaviconResolver {
    let fetch = FetchConfig {
        request_timeout,
        resolve_timeout,
        ..FetchConfig::default()
    };
    let client = IconHttpClient::new(&fetch).unwrap();
    FaviconResolver::new(client, fetch, 16)
}

#[tokio::test]
async fn only_working_candidate_wins() {
    let icon = png_bytes(32, 32);
    let app = Router::new().route(
        "/real-icon.png",
        get({
            let icon = icon.clone();
            move || async move { ([(header::CONTENT_TYPE, "image/png")], icon).into_response() }
        }),
    );
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_secs(1), Duration::from_secs(2));
    let groups = vec![vec![
        format!("{base}/missing.ico"),
        format!("{base}/also-missing.png"),
        format!("{base}/real-icon.png"),
    ]];

    let resolved = resolver.resolve(groups).await.expect("icon expected");
    assert_eq!(resolved.content_type, "image/png");
    assert!(resolved.source_url.ends_with("/real-icon.png"));

    // The 32x32 source is normalized down to the canonical icon size
    let img = image::load_from_memory(&resolved.data).unwrap();
    assert_eq!((img.width(), img.height()), (16, 16));
}

#[tokio::test]
async fn deadline_elapsing_yields_no_result() {
    let app = Router::new().route(
        "/slow.png",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            ([(header::CONTENT_TYPE, "image/png")], png_bytes(16, 16)).into_response()
        }),
    );
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_millis(150), Duration::from_millis(400));
    let groups = vec![vec![format!("{base}/slow.png")]];

    let started = Instant::now();
    let resolved = resolver.resolve(groups).await;
    assert!(resolved.is_none());
    // The attempt ends once the scope is done, well before the origin answers
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn wrong_content_type_is_rejected() {
    let app = Router::new().route(
        "/fake-icon.png",
        get(|| async {
            (
                [(header::CONTENT_TYPE, "text/html")],
                png_bytes(16, 16),
            )
                .into_response()
        }),
    );
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_millis(500), Duration::from_secs(1));
    let groups = vec![vec![format!("{base}/fake-icon.png")]];

    assert!(resolver.resolve(groups).await.is_none());
}

#[tokio::test]
async fn faster_low_priority_candidate_beats_slower_high_priority() {
    let app = Router::new()
        .route(
            "/slow-but-first.png",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(400)).await;
                ([(header::CONTENT_TYPE, "image/png")], png_bytes(16, 16)).into_response()
            }),
        )
        .route(
            "/fast-but-last.ico",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "image/x-icon")],
                    b"\x00\x00\x01\x00icon-bytes".to_vec(),
                )
                    .into_response()
            }),
        );
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_secs(1), Duration::from_secs(2));
    let groups = vec![
        vec![format!("{base}/slow-but-first.png")],
        vec![format!("{base}/fast-but-last.ico")],
    ];

    let resolved = resolver.resolve(groups).await.expect("icon expected");
    assert!(resolved.source_url.ends_with("/fast-but-last.ico"));
    assert_eq!(resolved.content_type, "image/x-icon");
}

#[tokio::test]
async fn empty_candidate_set_yields_no_result() {
    let resolver = test_resolver(Duration::from_millis(100), Duration::from_millis(300));
    let started = Instant::now();
    assert!(resolver.resolve(Vec::new()).await.is_none());
    // With no senders the queue closes immediately; no deadline wait
    assert!(started.elapsed() < Duration::from_millis(200));
}

#[tokio::test]
async fn discovery_adds_manifest_and_markup_groups() {
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    r#"<html><head><link rel="icon" href="/markup-icon.png"></head></html>"#,
                )
                    .into_response()
            }),
        )
        .route(
            "/manifest.json",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"icons":[{"src":"/manifest-icon.png","sizes":"192x192","type":"image/png"}]}"#,
                )
                    .into_response()
            }),
        );
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_millis(500), Duration::from_secs(1));
    let groups = resolver.gather_candidates(&base, "example.com").await;

    assert_eq!(groups.len(), 5);
    assert_eq!(groups[3], vec![format!("{base}/manifest-icon.png")]);
    assert_eq!(groups[4], vec![format!("{base}/markup-icon.png")]);
}

#[tokio::test]
async fn origin_without_manifest_or_markup_keeps_static_groups_only() {
    let app = Router::new();
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_millis(500), Duration::from_secs(1));
    let groups = resolver.gather_candidates(&base, "example.com").await;

    assert_eq!(groups.len(), 3);
    assert!(groups[0][0].ends_with("/favicon.ico"));
}

#[tokio::test]
async fn end_to_end_discovered_icon_resolves() {
    let icon = png_bytes(48, 48);
    let app = Router::new()
        .route(
            "/",
            get(|| async {
                (
                    [(header::CONTENT_TYPE, "text/html")],
                    r#"<link rel="shortcut icon" href="/deep/path/icon.png">"#,
                )
                    .into_response()
            }),
        )
        .route(
            "/deep/path/icon.png",
            get({
                let icon = icon.clone();
                move || async move { ([(header::CONTENT_TYPE, "image/png")], icon).into_response() }
            }),
        );
    let base = spawn_origin(app).await;

    let resolver = test_resolver(Duration::from_secs(1), Duration::from_secs(2));
    let groups = resolver.gather_candidates(&base, "example.com").await;
    let resolved = resolver.resolve(groups).await.expect("icon expected");

    assert!(resolved.source_url.ends_with("/deep/path/icon.png"));
    let img = image::load_from_memory(&resolved.data).unwrap();
    assert_eq!((img.width(), img.height()), (16, 16));
}
