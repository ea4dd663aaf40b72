//! Core data models for the favicon proxy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing projection of a cached favicon, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaviconSummary {
    pub domain: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

/// A successfully fetched and normalized icon
///
/// Transient result of one resolution attempt. Never persisted as-is; the
/// edge handler decides whether to cache it.
#[derive(Debug, Clone)]
pub struct ResolvedIcon {
    pub data: Vec<u8>,
    pub content_type: String,
    /// The candidate URL that won the race
    pub source_url: String,
}

/// Web app manifest document, reduced to the fields we consume
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub icons: Vec<ManifestIcon>,
}

/// One icon declaration inside a web app manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestIcon {
    #[serde(default)]
    pub src: String,
    #[serde(default)]
    pub sizes: Option<String>,
    #[serde(rename = "type", default)]
    pub icon_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_standard_document() {
        let json = r#"{
            "name": "Example",
            "icons": [
                {"src": "/icon-192.png", "sizes": "192x192", "type": "image/png"},
                {"src": "https://cdn.example.com/icon.svg"}
            ]
        }"#;

        let manifest: Manifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.icons.len(), 2);
        assert_eq!(manifest.icons[0].src, "/icon-192.png");
        assert_eq!(manifest.icons[0].sizes.as_deref(), Some("192x192"));
        assert_eq!(manifest.icons[0].icon_type.as_deref(), Some("image/png"));
        assert!(manifest.icons[1].sizes.is_none());
    }

    #[test]
    fn manifest_without_icons_defaults_to_empty() {
        let manifest: Manifest = serde_json::from_str(r#"{"name": "x"}"#).unwrap();
        assert!(manifest.icons.is_empty());
    }
}
