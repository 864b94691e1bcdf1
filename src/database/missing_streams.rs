use crate::errors::AppResult;
use crate::models::*;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::parse_uuid;

fn map_missing_row(row: &SqliteRow) -> AppResult<MissingStream> {
    let stream_id: Option<String> = row.try_get("stream_id")?;
    let stream_id = stream_id
        .as_deref()
        .map(|v| parse_uuid(v, "stream_id"))
        .transpose()?;

    Ok(MissingStream {
        id: parse_uuid(row.try_get("id")?, "id")?,
        user_id: parse_uuid(row.try_get("user_id")?, "user_id")?,
        provider_id: parse_uuid(row.try_get("provider_id")?, "provider_id")?,
        stream_id,
        name: row.try_get("name")?,
        first_seen_missing_at: row.try_get("first_seen_missing_at")?,
    })
}

impl super::Database {
    pub async fn list_missing_streams(&self, user_id: Uuid) -> AppResult<Vec<MissingStream>> {
        let rows = sqlx::query(
            "SELECT id, user_id, provider_id, stream_id, name, first_seen_missing_at \
             FROM missing_streams WHERE user_id = ? ORDER BY first_seen_missing_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_missing_row).collect()
    }

    /// Record a stream as missing from its provider's listing; repeated
    /// refreshes keep the first-seen timestamp
    pub async fn record_missing_stream(
        &self,
        user_id: Uuid,
        provider_id: Uuid,
        stream_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<()> {
        if let Some(stream_id) = stream_id {
            let existing = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM missing_streams WHERE user_id = ? AND stream_id = ?",
            )
            .bind(user_id.to_string())
            .bind(stream_id.to_string())
            .fetch_one(&self.pool)
            .await?;
            if existing > 0 {
                return Ok(());
            }
        }

        sqlx::query(
            "INSERT INTO missing_streams (id, user_id, provider_id, stream_id, name) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(provider_id.to_string())
        .bind(stream_id.map(|v| v.to_string()))
        .bind(name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Drop the missing record for a stream that re-appeared
    pub async fn clear_missing_for_stream(
        &self,
        user_id: Uuid,
        stream_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM missing_streams WHERE user_id = ? AND stream_id = ?")
            .bind(user_id.to_string())
            .bind(stream_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear_missing_streams(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM missing_streams WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
