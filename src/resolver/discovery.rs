//! Manifest and markup discovery probes
//!
//! Optional candidate sources beyond the well-known paths: the origin's
//! `manifest.json` and `<link rel=...icon...>` tags on the root page. Both
//! probes fail silently; an unreachable or malformed origin simply
//! contributes no extra candidates. Each probe is bounded by the client's
//! own per-request timeout, never the resolver deadline.

use tracing::debug;
use url::Url;

use crate::models::Manifest;
use crate::utils::{IconHttpClient, UrlUtils};

/// `rel` values containing "icon" that are nevertheless not icon links
const EXCLUDED_RELS: [&str; 5] = [
    "preload",
    "modulepreload",
    "dns-prefetch",
    "preconnect",
    "prefetch",
];

/// Fetch `manifest.json` and return its declared icons as absolute URLs.
pub async fn manifest_icons(client: &IconHttpClient, base_url: &str) -> Vec<String> {
    let manifest: Manifest = match client.fetch_json(&format!("{base_url}/manifest.json")).await {
        Ok(manifest) => manifest,
        Err(e) => {
            debug!("No usable manifest at {base_url}: {e}");
            return Vec::new();
        }
    };

    manifest
        .icons
        .into_iter()
        .filter(|icon| !icon.src.is_empty())
        .map(|icon| {
            // Anything that parses as a full URL passes through untouched
            match Url::parse(&icon.src) {
                Ok(_) => icon.src,
                Err(_) => UrlUtils::normalize_icon_url(base_url, &icon.src),
            }
        })
        .collect()
}

/// Fetch the origin root page and return icon links found in its markup.
pub async fn markup_icons(
    client: &IconHttpClient,
    base_url: &str,
    max_html_size: usize,
) -> Vec<String> {
    let html = match client.fetch_text_capped(base_url, max_html_size).await {
        Ok(html) => html,
        Err(e) => {
            debug!("No usable root page at {base_url}: {e}");
            return Vec::new();
        }
    };

    parse_icon_links(&html, base_url)
}

/// Scan markup for qualifying `<link>` tags and extract their `href`.
///
/// Deliberately a tolerant, non-validating scan: locate `<link`, take
/// everything up to the next `>`. A `>` nested inside an attribute value
/// would cut the tag short; real-world icon links don't do that.
pub fn parse_icon_links(html: &str, base_url: &str) -> Vec<String> {
    let mut icons = Vec::new();
    let mut offset = 0;

    while let Some(idx) = html[offset..].find("<link") {
        offset += idx;

        let Some(end) = html[offset..].find('>') else {
            break;
        };

        let tag = &html[offset..offset + end + 1];

        if is_icon_link(tag) {
            if let Some(href) = extract_attribute(tag, "href") {
                if !href.is_empty() {
                    icons.push(UrlUtils::normalize_icon_url(base_url, href));
                }
            }
        }

        offset += end + 1;
    }

    icons
}

/// A tag qualifies when its `rel` contains "icon" and none of the
/// preload/prefetch-style rels that also mention icons.
fn is_icon_link(tag: &str) -> bool {
    let Some(rel) = extract_attribute(tag, "rel") else {
        return false;
    };

    let rel = rel.trim().to_ascii_lowercase();

    if !rel.contains("icon") {
        return false;
    }

    !EXCLUDED_RELS.iter().any(|excluded| rel.contains(excluded))
}

/// Pull a quoted attribute value out of a raw tag. Both quote styles are
/// accepted; unquoted values are not.
fn extract_attribute<'a>(tag: &'a str, attr_name: &str) -> Option<&'a str> {
    let prefix = format!("{attr_name}=");
    let idx = tag.find(&prefix)?;

    let rest = &tag[idx + prefix.len()..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }

    let value = &rest[1..];
    let end = value.find(quote)?;
    Some(&value[..end])
}
