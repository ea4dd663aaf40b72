//! Favicon cache repository
//!
//! All access to the `favicons` table goes through this type. The
//! repository comes in two flavors selected at construction time: with a
//! TTL, entries expire and are filtered at read time; without one, entries
//! live until overwritten.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sqlx::{Pool, Row, Sqlite};
use std::time::Duration;

use crate::errors::RepositoryResult;
use crate::models::FaviconSummary;

#[derive(Debug, Clone)]
pub struct FaviconRepository {
    pool: Pool<Sqlite>,
    ttl: Option<Duration>,
}

impl FaviconRepository {
    pub fn new(pool: Pool<Sqlite>, ttl: Option<Duration>) -> Self {
        Self { pool, ttl }
    }

    /// Look up the cached icon for a canonical host.
    ///
    /// Expired rows are treated as absent; they stay on disk until the next
    /// cleanup sweep, which is fine because reads never return them.
    pub async fn get(&self, domain: &str) -> RepositoryResult<Option<(Vec<u8>, String)>> {
        let row = sqlx::query(
            r#"
            SELECT data, content_type
            FROM favicons
            WHERE domain = ? AND (expires_at IS NULL OR expires_at > ?)
            "#,
        )
        .bind(domain)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| (row.get("data"), row.get("content_type"))))
    }

    /// Insert or replace the cached icon for a canonical host.
    ///
    /// Last write wins; retrying a save is harmless.
    pub async fn save(&self, domain: &str, data: &[u8], content_type: &str) -> RepositoryResult<()> {
        let now = Utc::now();
        let expires_at = self.expiry_from(now);

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO favicons (domain, data, content_type, created_at, expires_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(domain)
        .bind(data)
        .bind(content_type)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List cached entries, newest first. Operational surface, not hot path.
    pub async fn list(&self) -> RepositoryResult<Vec<FaviconSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT domain, content_type, created_at
            FROM favicons
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FaviconSummary {
                domain: row.get("domain"),
                content_type: row.get("content_type"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    /// Delete rows past their expiry, returning how many were removed.
    ///
    /// Safe to run while readers and writers are active; each statement is
    /// its own transaction.
    pub async fn cleanup_expired(&self) -> RepositoryResult<u64> {
        let result =
            sqlx::query("DELETE FROM favicons WHERE expires_at IS NOT NULL AND expires_at <= ?")
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Liveness check against the store.
    pub async fn ping(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.ttl.map(|ttl| {
            now + ChronoDuration::from_std(ttl).unwrap_or_else(|_| ChronoDuration::days(1))
        })
    }
}
