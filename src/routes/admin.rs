use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::middleware::audit;
use crate::models::{Role, User};
use crate::state::SharedState;

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: String,
}

/// Read-only listing in insertion order, capped by `limit`. Callers are
/// expected to re-issue this after every mutation; there is no incremental
/// update contract.
pub async fn list_users(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    auth.require_admin()?;

    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let users = db::users::list(&state.pool, limit).await?;
    Ok(Json(users))
}

pub async fn set_role(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRoleRequest>,
) -> Result<Json<User>, AppError> {
    auth.require_admin()?;

    // Trust boundary: whatever casing or value arrives, only an enumerated
    // role is persisted.
    let role = Role::normalize(&req.role);

    let user = db::users::update_role(&state.pool, id, role)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "user.role_changed",
        "user",
        Some(user.id),
        Some(json!({ "role": role })),
    )
    .await;

    Ok(Json(user))
}

pub async fn remove_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    // Not idempotent: a second removal of the same id reports NOT_FOUND.
    let removed = db::users::delete(&state.pool, id).await?;
    if removed == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "user.removed",
        "user",
        Some(id),
        None,
    )
    .await;

    Ok(Json(json!({ "message": "User removed" })))
}

/// Declared in the admin surface but not wired up. Surfaces a clear
/// "not available" signal instead of silently succeeding.
pub async fn ban_user(
    auth: AuthUser,
    State(_state): State<SharedState>,
    Path(_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth.require_admin()?;

    Err(AppError::Unavailable(
        "Banning users is not available".to_string(),
    ))
}
