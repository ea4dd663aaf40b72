//! URL utilities for consistent URL handling
//!
//! This module provides the address normalization used for cache keys and
//! the icon-reference normalization shared by the manifest and markup
//! probes.

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Reduce a free-form address to its canonical host.
    ///
    /// Strips a leading `https://` or `http://`, truncates at the first `/`
    /// (path) and the first `:` (port), and lowercases the remainder. An
    /// input that reduces to nothing is returned unchanged so that even
    /// degenerate requests map to a deterministic cache key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use favicon_proxy::utils::url::UrlUtils;
    ///
    /// assert_eq!(UrlUtils::canonical_host("https://Example.com:8080/x"), "example.com");
    /// assert_eq!(UrlUtils::canonical_host("sub.example.com/path"), "sub.example.com");
    /// assert_eq!(UrlUtils::canonical_host(""), "");
    /// ```
    pub fn canonical_host(raw: &str) -> String {
        let mut host = raw
            .strip_prefix("https://")
            .or_else(|| raw.strip_prefix("http://"))
            .unwrap_or(raw);

        if let Some(idx) = host.find('/') {
            host = &host[..idx];
        }
        if let Some(idx) = host.find(':') {
            host = &host[..idx];
        }

        if host.is_empty() {
            return raw.to_string();
        }

        host.to_ascii_lowercase()
    }

    /// Resolve an icon reference found in a manifest or page markup against
    /// the origin base URL.
    ///
    /// Handles the reference styles seen in the wild: `./relative`,
    /// absolute `http(s)` URLs, root-relative `/path`, and bare relative
    /// paths.
    pub fn normalize_icon_url(base_url: &str, icon_url: &str) -> String {
        // "./x" is the same reference as "/x" relative to the origin root
        let icon_url = if icon_url.starts_with("./") {
            &icon_url[1..]
        } else {
            icon_url
        };

        if icon_url.starts_with("http://") || icon_url.starts_with("https://") {
            return icon_url.to_string();
        }

        if icon_url.starts_with('/') {
            return format!("{base_url}{icon_url}");
        }

        format!("{base_url}/{icon_url}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_host() {
        assert_eq!(UrlUtils::canonical_host("https://example.com"), "example.com");
        assert_eq!(UrlUtils::canonical_host("http://example.com"), "example.com");
        assert_eq!(
            UrlUtils::canonical_host("https://example.com/path"),
            "example.com"
        );
        assert_eq!(
            UrlUtils::canonical_host("https://example.com:8080"),
            "example.com"
        );
        assert_eq!(
            UrlUtils::canonical_host("https://Example.com:8080/x"),
            "example.com"
        );
        assert_eq!(
            UrlUtils::canonical_host("https://sub.example.com"),
            "sub.example.com"
        );
        assert_eq!(UrlUtils::canonical_host("example.com"), "example.com");
        assert_eq!(UrlUtils::canonical_host("EXAMPLE.COM"), "example.com");
    }

    #[test]
    fn test_canonical_host_degenerate_inputs_pass_through() {
        assert_eq!(UrlUtils::canonical_host(""), "");
        assert_eq!(UrlUtils::canonical_host("https://"), "https://");
        assert_eq!(UrlUtils::canonical_host("/just/a/path"), "/just/a/path");
    }

    #[test]
    fn test_normalize_icon_url() {
        let base = "https://example.com";

        assert_eq!(
            UrlUtils::normalize_icon_url(base, "https://cdn.example.com/i.png"),
            "https://cdn.example.com/i.png"
        );
        assert_eq!(
            UrlUtils::normalize_icon_url(base, "/icons/favicon.png"),
            "https://example.com/icons/favicon.png"
        );
        assert_eq!(
            UrlUtils::normalize_icon_url(base, "./icons/favicon.png"),
            "https://example.com/icons/favicon.png"
        );
        assert_eq!(
            UrlUtils::normalize_icon_url(base, "favicon.png"),
            "https://example.com/favicon.png"
        );
    }
}
