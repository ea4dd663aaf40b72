//! Concurrent favicon resolution
//!
//! The resolver owns the only real concurrency in the system. Every
//! candidate URL across every group is dispatched as its own task; the
//! first task to publish a validated icon wins and cancels the rest.
//! Consumption is strict completion order, so a low-priority candidate
//! that answers faster can beat a higher-priority one. That asymmetry is
//! intentional and load-bearing: imposing priority order here would change
//! observable responses for real sites.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::FetchConfig;
use crate::errors::{FetchError, FetchResult};
use crate::models::ResolvedIcon;
use crate::utils::IconHttpClient;

pub mod candidates;
pub mod discovery;
pub mod image;

pub use candidates::CandidateGroups;

/// Capacity of the completion queue shared by all probe tasks.
const RESULT_QUEUE_CAPACITY: usize = 10;

/// Content types accepted from a probed origin. Parameters after `;` are
/// ignored and matching is case-insensitive.
const ALLOWED_IMAGE_TYPES: [&str; 10] = [
    "image/x-icon",
    "image/vnd.microsoft.icon",
    "image/icon",
    "image/ico",
    "image/png",
    "image/jpeg",
    "image/jpg",
    "image/gif",
    "image/svg+xml",
    "image/webp",
];

/// Favicon resolution service
///
/// Holds the shared outbound client plus the fetch policy knobs. Cloning is
/// cheap; the underlying client pool is shared.
#[derive(Debug, Clone)]
pub struct FaviconResolver {
    client: IconHttpClient,
    fetch: FetchConfig,
    target_icon_size: u32,
}

impl FaviconResolver {
    pub fn new(client: IconHttpClient, fetch: FetchConfig, target_icon_size: u32) -> Self {
        Self {
            client,
            fetch,
            target_icon_size,
        }
    }

    /// Full resolution for one canonical host: gather candidates, then race
    /// every probe under the overall deadline.
    pub async fn resolve_for_host(&self, domain: &str) -> Option<ResolvedIcon> {
        let base_url = format!("https://{domain}");
        let groups = self.gather_candidates(&base_url, domain).await;
        self.resolve(groups).await
    }

    /// Build the full candidate set for an origin.
    ///
    /// Well-known groups are static. The manifest and markup probes run
    /// concurrently with each other, each bounded by the client's own
    /// request timeout, and contribute a group only when they found
    /// anything.
    pub async fn gather_candidates(&self, base_url: &str, domain: &str) -> CandidateGroups {
        let mut groups = candidates::well_known_groups(base_url, domain);

        let (manifest, markup) = tokio::join!(
            discovery::manifest_icons(&self.client, base_url),
            discovery::markup_icons(&self.client, base_url, self.fetch.max_html_size),
        );

        if !manifest.is_empty() {
            groups.push(manifest);
        }
        if !markup.is_empty() {
            groups.push(markup);
        }

        groups
    }

    /// Race all candidates; first validated icon wins, the rest are
    /// cancelled. Returns `None` when nothing succeeds within the deadline.
    pub async fn resolve(&self, groups: CandidateGroups) -> Option<ResolvedIcon> {
        let token = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<ResolvedIcon>(RESULT_QUEUE_CAPACITY);

        for url in groups.into_iter().flatten() {
            let client = self.client.clone();
            let token = token.clone();
            let tx = tx.clone();
            let max_image_size = self.fetch.max_image_size;
            let target_icon_size = self.target_icon_size;

            tokio::spawn(async move {
                if token.is_cancelled() {
                    return;
                }

                match probe(&client, &url, max_image_size, target_icon_size).await {
                    Ok(icon) => {
                        // A cancelled scope just drops the publish
                        tokio::select! {
                            _ = token.cancelled() => {}
                            _ = tx.send(icon) => {}
                        }
                    }
                    Err(e) => debug!("Probe failed for {url}: {e}"),
                }
            });
        }

        // Only the probe tasks hold senders now; if every probe fails the
        // channel closes and we stop waiting before the deadline.
        drop(tx);

        let winner = tokio::time::timeout(self.fetch.resolve_timeout, rx.recv()).await;
        token.cancel();

        match winner {
            Ok(Some(icon)) => {
                debug!("Resolved icon from {}", icon.source_url);
                Some(icon)
            }
            Ok(None) => None,
            Err(_) => None,
        }
    }
}

/// One probe against one candidate URL.
async fn probe(
    client: &IconHttpClient,
    url: &str,
    max_image_size: usize,
    target_icon_size: u32,
) -> FetchResult<ResolvedIcon> {
    let response = client.get(url, &[("Accept", "image/*")]).await?;

    let header_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if !is_allowed_image_type(&header_type) {
        return Err(FetchError::InvalidContentType {
            content_type: header_type,
        });
    }

    let data = IconHttpClient::read_body_capped(response, max_image_size).await?;
    let data = image::normalize_icon(&data, &header_type, target_icon_size);

    Ok(ResolvedIcon {
        data,
        content_type: infer_content_type(url, &header_type),
        source_url: url.to_string(),
    })
}

/// Check a response content type against the image allow-list.
fn is_allowed_image_type(content_type: &str) -> bool {
    if content_type.is_empty() {
        return false;
    }

    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    ALLOWED_IMAGE_TYPES.contains(&essence.as_str())
}

/// Pick the content type to serve: the origin's header when present,
/// otherwise a guess from the URL suffix.
fn infer_content_type(url: &str, header_type: &str) -> String {
    if !header_type.is_empty() {
        return header_type.to_string();
    }

    if url.ends_with(".png") {
        "image/png".to_string()
    } else {
        "image/x-icon".to_string()
    }
}
