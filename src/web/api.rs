//! JSON API handlers for providers, streams, filter rules and
//! missing-stream bookkeeping. All routes are scoped by the user id in the
//! path; a stream or rule belonging to another user is indistinguishable
//! from one that does not exist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;
use crate::models::*;

// ---- Providers ----

pub async fn list_providers(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Provider>>, AppError> {
    Ok(Json(state.database.list_providers(user_id).await?))
}

pub async fn create_provider(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ProviderCreateRequest>,
) -> Result<(StatusCode, Json<Provider>), AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::validation("provider name must not be empty"));
    }
    if request.url.trim().is_empty() {
        return Err(AppError::validation("provider url must not be empty"));
    }

    let provider = state.database.create_provider(user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(provider)))
}

pub async fn get_provider(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<Provider>, AppError> {
    state
        .database
        .get_user_provider(user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("provider", id.to_string()))
}

pub async fn update_provider(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
    Json(request): Json<ProviderUpdateRequest>,
) -> Result<Json<Provider>, AppError> {
    state
        .database
        .update_provider(user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("provider", id.to_string()))
}

pub async fn delete_provider(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state.database.delete_provider(user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("provider", id.to_string()))
    }
}

pub async fn refresh_provider(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, AppError> {
    let provider = state
        .database
        .get_user_provider(user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("provider", id.to_string()))?;

    let summary = state.ingestor.refresh_provider(&provider).await?;
    Ok(Json(RefreshResponse {
        success: true,
        message: format!("refreshed provider '{}'", provider.name),
        summary,
    }))
}

// ---- Streams ----

pub async fn list_streams(
    Path(user_id): Path<Uuid>,
    Query(request): Query<StreamListRequest>,
    State(state): State<AppState>,
) -> Result<Json<StreamListResponse>, AppError> {
    Ok(Json(state.database.list_streams(user_id, &request).await?))
}

pub async fn get_stream(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<Stream>, AppError> {
    state
        .database
        .get_stream(user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("stream", id.to_string()))
}

pub async fn update_stream(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
    Json(request): Json<StreamUpdateRequest>,
) -> Result<Json<Stream>, AppError> {
    if request.name.trim().is_empty() {
        return Err(AppError::validation("stream name must not be empty"));
    }

    state
        .database
        .update_stream(user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("stream", id.to_string()))
}

pub async fn move_stream(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
    Json(request): Json<StreamMoveRequest>,
) -> Result<Json<Stream>, AppError> {
    if request.stream_type.is_none() && request.category.is_none() {
        return Err(AppError::validation(
            "move requires a stream_type or a category",
        ));
    }

    state
        .database
        .move_stream(user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("stream", id.to_string()))
}

pub async fn delete_stream(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state.database.delete_stream(user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("stream", id.to_string()))
    }
}

// ---- Filter rules ----

pub async fn list_filter_rules(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FilterRule>>, AppError> {
    Ok(Json(state.database.list_filter_rules(user_id).await?))
}

pub async fn create_filter_rule(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<FilterRuleCreateRequest>,
) -> Result<(StatusCode, Json<FilterRule>), AppError> {
    if request.pattern.is_empty() {
        return Err(AppError::validation("rule pattern must not be empty"));
    }

    let rule = state.database.create_filter_rule(user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(rule)))
}

pub async fn get_filter_rule(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<FilterRule>, AppError> {
    state
        .database
        .get_filter_rule(user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("filter rule", id.to_string()))
}

pub async fn update_filter_rule(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
    Json(request): Json<FilterRuleUpdateRequest>,
) -> Result<Json<FilterRule>, AppError> {
    if request.pattern.is_empty() {
        return Err(AppError::validation("rule pattern must not be empty"));
    }

    state
        .database
        .update_filter_rule(user_id, id, &request)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("filter rule", id.to_string()))
}

pub async fn delete_filter_rule(
    Path((user_id, id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    if state.database.delete_filter_rule(user_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("filter rule", id.to_string()))
    }
}

// ---- Missing streams ----

pub async fn list_missing_streams(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<MissingStream>>, AppError> {
    Ok(Json(state.database.list_missing_streams(user_id).await?))
}

pub async fn clear_missing_streams(
    Path(user_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.database.clear_missing_streams(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
