//! Candidate URL generation
//!
//! Builds the ordered groups of probe URLs for one origin. Group order is a
//! priority hint for generation only; the resolver dispatches every
//! candidate concurrently and the fastest valid answer wins.

/// Ordered groups of candidate URLs. Outer order is the priority tier.
pub type CandidateGroups = Vec<Vec<String>>;

/// Well-known icon locations probed for every origin.
///
/// Tier 1: classic root favicons (plus host-named variants some sites use).
/// Tier 2: unsized Apple touch icons.
/// Tier 3: sized Apple touch icons, largest first.
pub fn well_known_groups(base_url: &str, domain: &str) -> CandidateGroups {
    vec![
        vec![
            format!("{base_url}/favicon.ico"),
            format!("{base_url}/favicon.png"),
            format!("{base_url}/favicon.svg"),
            format!("{base_url}/{domain}.ico"),
            format!("{base_url}/{domain}.png"),
        ],
        vec![
            format!("{base_url}/apple-touch-icon.png"),
            format!("{base_url}/apple-touch-icon-precomposed.png"),
        ],
        vec![
            format!("{base_url}/apple-touch-icon-180x180.png"),
            format!("{base_url}/apple-touch-icon-152x152.png"),
            format!("{base_url}/apple-touch-icon-120x120.png"),
        ],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favicon_group_comes_first_for_any_host() {
        for domain in ["example.com", "sub.weird-host.io", "x.y"] {
            let base = format!("https://{domain}");
            let groups = well_known_groups(&base, domain);

            assert!(groups[0].iter().any(|u| u.ends_with("/favicon.ico")));
            assert!(groups[1][0].ends_with("/apple-touch-icon.png"));
            assert!(groups[2][0].ends_with("/apple-touch-icon-180x180.png"));
        }
    }

    #[test]
    fn sized_apple_icons_descend() {
        let groups = well_known_groups("https://example.com", "example.com");
        assert_eq!(
            groups[2],
            vec![
                "https://example.com/apple-touch-icon-180x180.png",
                "https://example.com/apple-touch-icon-152x152.png",
                "https://example.com/apple-touch-icon-120x120.png",
            ]
        );
    }

    #[test]
    fn host_named_variants_use_the_domain() {
        let groups = well_known_groups("https://example.com", "example.com");
        assert!(groups[0].contains(&"https://example.com/example.com.ico".to_string()));
        assert!(groups[0].contains(&"https://example.com/example.com.png".to_string()));
    }
}
