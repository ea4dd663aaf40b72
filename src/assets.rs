use rust_embed::RustEmbed;

/// Embedded static assets (default icon, robots.txt)
#[derive(RustEmbed)]
#[folder = "static/"]
#[prefix = "static/"]
pub struct StaticAssets;

/// Embedded database migrations
#[derive(RustEmbed)]
#[folder = "src/database/migrations/"]
#[prefix = "migrations/"]
pub struct MigrationAssets;

impl StaticAssets {
    /// Get a static asset by path
    pub fn get_asset(path: &str) -> Option<rust_embed::EmbeddedFile> {
        Self::get(path)
    }

    /// Get the content type for a given file extension
    pub fn get_content_type(path: &str) -> &'static str {
        match path.split('.').next_back() {
            Some("html") => "text/html; charset=utf-8",
            Some("txt") => "text/plain; charset=utf-8",
            Some("json") => "application/json; charset=utf-8",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml; charset=utf-8",
            Some("ico") => "image/x-icon",
            _ => "application/octet-stream",
        }
    }
}

impl MigrationAssets {
    /// Get all migration files in order
    pub fn get_migrations() -> Vec<(String, String)> {
        let mut migrations = Vec::new();

        for file_path in Self::iter() {
            if let Some(file) = Self::get(&file_path) {
                let content = String::from_utf8_lossy(&file.data).to_string();
                let name = file_path
                    .strip_prefix("migrations/")
                    .unwrap_or(&file_path)
                    .to_string();
                migrations.push((name, content));
            }
        }

        // Filename prefixes define the order
        migrations.sort_by(|a, b| a.0.cmp(&b.0));
        migrations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(StaticAssets::get_content_type("favicon.ico"), "image/x-icon");
        assert_eq!(
            StaticAssets::get_content_type("robots.txt"),
            "text/plain; charset=utf-8"
        );
        assert_eq!(StaticAssets::get_content_type("test.png"), "image/png");
        assert_eq!(
            StaticAssets::get_content_type("unknown"),
            "application/octet-stream"
        );
    }

    #[test]
    fn default_favicon_is_embedded() {
        assert!(StaticAssets::get_asset("static/favicon.ico").is_some());
    }

    #[test]
    fn migrations_are_sorted_by_name() {
        let migrations = MigrationAssets::get_migrations();
        assert!(!migrations.is_empty());
        let names: Vec<_> = migrations.iter().map(|(name, _)| name.clone()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }
}
