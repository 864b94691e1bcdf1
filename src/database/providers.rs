use crate::errors::AppResult;
use crate::models::*;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use super::parse_uuid;

const PROVIDER_COLUMNS: &str = "id, user_id, name, kind, url, username, password, stream_kind, \
     priority, should_filter, refresh_period_days, is_active, created_at, updated_at, \
     last_refreshed_at";

fn map_provider_row(row: &SqliteRow) -> AppResult<Provider> {
    let kind_text: String = row.try_get("kind")?;
    let kind = ProviderKind::parse(&kind_text).unwrap_or_else(|| {
        warn!("Unknown provider kind '{}', treating as m3u", kind_text);
        ProviderKind::M3u
    });

    Ok(Provider {
        id: parse_uuid(row.try_get("id")?, "id")?,
        user_id: parse_uuid(row.try_get("user_id")?, "user_id")?,
        name: row.try_get("name")?,
        kind,
        url: row.try_get("url")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        stream_kind: row.try_get("stream_kind")?,
        priority: row.try_get("priority")?,
        should_filter: row.try_get("should_filter")?,
        refresh_period_days: row.try_get("refresh_period_days")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_refreshed_at: row.try_get("last_refreshed_at")?,
    })
}

impl super::Database {
    pub async fn create_provider(
        &self,
        user_id: Uuid,
        request: &ProviderCreateRequest,
    ) -> AppResult<Provider> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO providers (id, user_id, name, kind, url, username, password, \
             stream_kind, priority, should_filter, refresh_period_days) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(&request.name)
        .bind(request.kind.as_str())
        .bind(&request.url)
        .bind(&request.username)
        .bind(&request.password)
        .bind(request.stream_kind.as_deref().unwrap_or("ts"))
        .bind(request.priority.unwrap_or(0))
        .bind(request.should_filter.unwrap_or(true))
        .bind(request.refresh_period_days.unwrap_or(1))
        .execute(&self.pool)
        .await?;

        self.get_provider(id).await?.ok_or_else(|| {
            crate::errors::AppError::internal("failed to read back created provider")
        })
    }

    /// Fetch a provider by id, unscoped; used by the playlist core for the
    /// should-filter flag (callers that act on behalf of a user must use
    /// [`get_user_provider`](Self::get_user_provider))
    pub async fn get_provider(&self, id: Uuid) -> AppResult<Option<Provider>> {
        let row = sqlx::query(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_provider_row).transpose()
    }

    pub async fn get_user_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<Provider>> {
        let row = sqlx::query(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE id = ? AND user_id = ?"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_provider_row).transpose()
    }

    pub async fn list_providers(&self, user_id: Uuid) -> AppResult<Vec<Provider>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers WHERE user_id = ? \
             ORDER BY priority ASC, name COLLATE NOCASE ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_provider_row).collect()
    }

    pub async fn update_provider(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &ProviderUpdateRequest,
    ) -> AppResult<Option<Provider>> {
        let result = sqlx::query(
            "UPDATE providers SET name = ?, kind = ?, url = ?, username = ?, password = ?, \
             stream_kind = ?, priority = ?, should_filter = ?, refresh_period_days = ?, \
             is_active = ?, updated_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&request.name)
        .bind(request.kind.as_str())
        .bind(&request.url)
        .bind(&request.username)
        .bind(&request.password)
        .bind(&request.stream_kind)
        .bind(request.priority)
        .bind(request.should_filter)
        .bind(request.refresh_period_days)
        .bind(request.is_active)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_user_provider(user_id, id).await
    }

    /// Delete a provider together with its streams and missing-stream
    /// records, in one transaction
    pub async fn delete_provider(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM missing_streams WHERE provider_id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM streams WHERE provider_id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM providers WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn mark_provider_refreshed(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE providers SET last_refreshed_at = ?, updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Active providers whose last refresh is older than their configured
    /// period, or that have never been refreshed
    pub async fn list_providers_due_refresh(&self) -> AppResult<Vec<Provider>> {
        let rows = sqlx::query(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM providers \
             WHERE is_active = 1 AND (last_refreshed_at IS NULL \
                OR datetime(last_refreshed_at) <= datetime('now', '-' || refresh_period_days || ' days')) \
             ORDER BY priority ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_provider_row).collect()
    }
}
