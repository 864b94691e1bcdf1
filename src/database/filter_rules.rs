use crate::errors::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::warn;
use uuid::Uuid;

use super::parse_uuid;

const RULE_COLUMNS: &str = "id, user_id, is_active, kind, pattern, created_at, updated_at";

/// Maps a rule row, returning `Ok(None)` for rows whose kind text is not
/// recognized; such rows are logged and skipped so a corrupt rule never
/// aborts playlist generation.
fn map_rule_row(row: &SqliteRow) -> AppResult<Option<FilterRule>> {
    let kind_text: String = row.try_get("kind")?;
    let Some(kind) = FilterRuleKind::parse(&kind_text) else {
        let id: String = row.try_get("id")?;
        warn!("Skipping filter rule {} with unknown kind '{}'", id, kind_text);
        return Ok(None);
    };

    Ok(Some(FilterRule {
        id: parse_uuid(row.try_get("id")?, "id")?,
        user_id: parse_uuid(row.try_get("user_id")?, "user_id")?,
        is_active: row.try_get("is_active")?,
        kind,
        pattern: row.try_get("pattern")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    }))
}

impl super::Database {
    /// Active rules for one user, in creation order; the filter engine
    /// applies its own precedence across kinds
    pub async fn list_active_filter_rules(&self, user_id: Uuid) -> AppResult<Vec<FilterRule>> {
        let rows = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM filter_rules \
             WHERE user_id = ? AND is_active = 1 ORDER BY created_at ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut rules = Vec::new();
        for row in &rows {
            if let Some(rule) = map_rule_row(row)? {
                rules.push(rule);
            }
        }
        Ok(rules)
    }

    pub async fn list_filter_rules(&self, user_id: Uuid) -> AppResult<Vec<FilterRule>> {
        let rows = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM filter_rules WHERE user_id = ? ORDER BY created_at ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut rules = Vec::new();
        for row in &rows {
            if let Some(rule) = map_rule_row(row)? {
                rules.push(rule);
            }
        }
        Ok(rules)
    }

    pub async fn create_filter_rule(
        &self,
        user_id: Uuid,
        request: &FilterRuleCreateRequest,
    ) -> AppResult<FilterRule> {
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO filter_rules (id, user_id, is_active, kind, pattern) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(request.is_active.unwrap_or(true))
        .bind(request.kind.as_str())
        .bind(&request.pattern)
        .execute(&self.pool)
        .await?;

        self.get_filter_rule(user_id, id)
            .await?
            .ok_or_else(|| AppError::internal("failed to read back created filter rule"))
    }

    pub async fn get_filter_rule(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> AppResult<Option<FilterRule>> {
        let row = sqlx::query(&format!(
            "SELECT {RULE_COLUMNS} FROM filter_rules WHERE id = ? AND user_id = ?"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => map_rule_row(&row),
            None => Ok(None),
        }
    }

    pub async fn update_filter_rule(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: &FilterRuleUpdateRequest,
    ) -> AppResult<Option<FilterRule>> {
        let result = sqlx::query(
            "UPDATE filter_rules SET kind = ?, pattern = ?, is_active = ?, updated_at = ? \
             WHERE id = ? AND user_id = ?",
        )
        .bind(request.kind.as_str())
        .bind(&request.pattern)
        .bind(request.is_active)
        .bind(Utc::now())
        .bind(id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_filter_rule(user_id, id).await
    }

    pub async fn delete_filter_rule(&self, user_id: Uuid, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM filter_rules WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
