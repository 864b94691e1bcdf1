use crate::errors::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use super::parse_uuid;

const STREAM_COLUMNS: &str = "s.id, s.user_id, s.provider_id, s.stream_type, s.is_active, \
     s.category, s.channel_number, s.name, s.original_name, s.stream_url, s.tvg_id, \
     s.tvg_group, s.tvg_logo, s.extras, s.created_at, s.updated_at";

fn map_stream_row(row: &SqliteRow) -> AppResult<Stream> {
    let type_code: i64 = row.try_get("stream_type")?;
    let stream_type = StreamType::from_code(type_code)
        .ok_or_else(|| AppError::internal(format!("invalid stream_type code {type_code}")))?;

    let category_text: String = row.try_get("category")?;
    let category = StreamCategory::parse(&category_text)
        .ok_or_else(|| AppError::internal(format!("invalid stream category '{category_text}'")))?;

    let provider_id: Option<String> = row.try_get("provider_id")?;
    let provider_id = provider_id
        .as_deref()
        .map(|v| parse_uuid(v, "provider_id"))
        .transpose()?;

    Ok(Stream {
        id: parse_uuid(row.try_get("id")?, "id")?,
        user_id: parse_uuid(row.try_get("user_id")?, "user_id")?,
        provider_id,
        stream_type,
        is_active: row.try_get("is_active")?,
        category,
        channel_number: row.try_get("channel_number")?,
        name: row.try_get("name")?,
        original_name: row.try_get("original_name")?,
        stream_url: row.try_get("stream_url")?,
        tvg_id: row.try_get("tvg_id")?,
        tvg_group: row.try_get("tvg_group")?,
        tvg_logo: row.try_get("tvg_logo")?,
        extras: row.try_get("extras")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl super::Database {
    /// Active, exportable streams for one user and stream type, optionally
    /// narrowed to one provider.
    ///
    /// Ordering is provider priority ascending (streams without a provider
    /// last), then display name ascending; the playlist emitter preserves
    /// this order verbatim.
    pub async fn list_active_streams(
        &self,
        user_id: Uuid,
        stream_type: StreamType,
        provider_id: Option<Uuid>,
    ) -> AppResult<Vec<Stream>> {
        let mut sql = format!(
            "SELECT {STREAM_COLUMNS} FROM streams s \
             LEFT JOIN providers p ON p.id = s.provider_id \
             WHERE s.user_id = ? AND s.stream_type = ? AND s.is_active = 1 \
               AND s.category = 'main'"
        );
        if provider_id.is_some() {
            sql.push_str(" AND s.provider_id = ?");
        }
        sql.push_str(
            " ORDER BY CASE WHEN p.priority IS NULL THEN 1 ELSE 0 END, \
              p.priority ASC, s.name COLLATE NOCASE ASC",
        );

        let mut query = sqlx::query(&sql)
            .bind(user_id.to_string())
            .bind(stream_type.code());
        if let Some(provider_id) = provider_id {
            query = query.bind(provider_id.to_string());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_stream_row).collect()
    }

    /// Every stream a provider owns for a user, active or not; used by the
    /// refresh reconciliation pass
    pub async fn list_provider_streams(
        &self,
        user_id: Uuid,
        provider_id: Uuid,
    ) -> AppResult<Vec<Stream>> {
        let rows = sqlx::query(&format!(
            "SELECT {STREAM_COLUMNS} FROM streams s \
             WHERE s.user_id = ? AND s.provider_id = ?"
        ))
        .bind(user_id.to_string())
        .bind(provider_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_stream_row).collect()
    }

    pub async fn list_streams(
        &self,
        user_id: Uuid,
        request: &StreamListRequest,
    ) -> AppResult<StreamListResponse> {
        let page = request.page.unwrap_or(1).max(1);
        let limit = request.limit.unwrap_or(50).clamp(1, 500);
        // Widen before multiplying; page comes straight off the query string
        let offset = (i64::from(page) - 1) * i64::from(limit);

        let stream_type = request
            .stream_type
            .as_deref()
            .map(|v| {
                StreamType::parse(v)
                    .ok_or_else(|| AppError::validation(format!("unknown stream type '{v}'")))
            })
            .transpose()?;
        let category = request
            .category
            .as_deref()
            .map(|v| {
                StreamCategory::parse(v)
                    .ok_or_else(|| AppError::validation(format!("unknown category '{v}'")))
            })
            .transpose()?;

        let mut conditions = String::from("s.user_id = ?");
        if stream_type.is_some() {
            conditions.push_str(" AND s.stream_type = ?");
        }
        if request.provider.is_some() {
            conditions.push_str(" AND s.provider_id = ?");
        }
        if category.is_some() {
            conditions.push_str(" AND s.category = ?");
        }

        let count_sql = format!("SELECT COUNT(*) as cnt FROM streams s WHERE {conditions}");
        let mut count_query = sqlx::query(&count_sql).bind(user_id.to_string());
        if let Some(ty) = stream_type {
            count_query = count_query.bind(ty.code());
        }
        if let Some(provider) = request.provider {
            count_query = count_query.bind(provider.to_string());
        }
        if let Some(cat) = category {
            count_query = count_query.bind(cat.as_str());
        }
        let total_count: i64 = count_query.fetch_one(&self.pool).await?.try_get("cnt")?;

        let list_sql = format!(
            "SELECT {STREAM_COLUMNS} FROM streams s WHERE {conditions} \
             ORDER BY s.name COLLATE NOCASE ASC LIMIT ? OFFSET ?"
        );
        let mut list_query = sqlx::query(&list_sql).bind(user_id.to_string());
        if let Some(ty) = stream_type {
            list_query = list_query.bind(ty.code());
        }
        if let Some(provider) = request.provider {
            list_query = list_query.bind(provider.to_string());
        }
        if let Some(cat) = category {
            list_query = list_query.bind(cat.as_str());
        }
        let rows = list_query
            .bind(i64::from(limit))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let streams = rows
            .iter()
            .map(map_stream_row)
            .collect::<AppResult<Vec<_>>>()?;
        let total_pages = (total_count + i64::from(limit) - 1) / i64::from(limit);
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);

        Ok(StreamListResponse {
            streams,
            total_count,
            page,
            limit,
            total_pages,
        })
    }

    pub async fn get_stream(&self, user_id: Uuid, id: Uuid) -> AppResult<Option<Stream>> {
        let row = sqlx::query(&format!(
            "SELECT {STREAM_COLUMNS} FROM streams s WHERE s.id = ? AND s.user_id = ?"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_stream_row).transpose()
    }

    pub async fn create_stream(&self, user_id: Uuid, new: &NewStream) -> AppResult<Stream> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO streams (id, user_id, provider_id, stream_type, channel_number, \
             name, original_name, stream_url, tvg_id, tvg_group, tvg_logo, extras) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(new.provider_id.map(|v| v.to_string()))
        .bind(new.stream_type.code())
        .bind(&new.channel_number)
        .bind(&new.name)
        .bind(&new.original_name)
        .bind(&new.stream_url)
        .bind(&new.tvg_id)
        .bind(&new.tvg_group)
        .bind(&new.tvg_logo)
        .bind(&new.extras)
        .execute(&self.pool)
        .await?;

        self.get_stream(user_id, id)
            .await?
            .ok_or_else(|| AppError::internal("failed to read back created stream"))
    }

    pub async fn update_stream(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &StreamUpdateRequest,
    ) -> AppResult<Option<Stream>> {
        let result = sqlx::query(
            "UPDATE streams SET channel_number = ?, name = ?, stream_url = ?, tvg_id = ?, \
             tvg_group = ?, tvg_logo = ?, is_active = ?, updated_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(&request.channel_number)
        .bind(&request.name)
        .bind(&request.stream_url)
        .bind(&request.tvg_id)
        .bind(&request.tvg_group)
        .bind(&request.tvg_logo)
        .bind(request.is_active)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_stream(user_id, id).await
    }

    /// Retag a stream's type and/or category; this is the whole "move"
    /// operation, no rows are copied
    pub async fn move_stream(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &StreamMoveRequest,
    ) -> AppResult<Option<Stream>> {
        let Some(current) = self.get_stream(user_id, id).await? else {
            return Ok(None);
        };

        let stream_type = request.stream_type.unwrap_or(current.stream_type);
        let category = request.category.unwrap_or(current.category);

        sqlx::query(
            "UPDATE streams SET stream_type = ?, category = ?, updated_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(stream_type.code())
        .bind(category.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_stream(user_id, id).await
    }

    pub async fn set_stream_active(
        &self,
        user_id: Uuid,
        id: Uuid,
        is_active: bool,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE streams SET is_active = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(is_active)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_stream(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM missing_streams WHERE stream_id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM streams WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
