/// Offsec Program - User handlers.
///
/// Listing returns non-sensitive fields only. API key regeneration is the
/// one admin-gated operation; the new key appears in the response exactly
/// once and is never retrievable afterwards.
use axum::{
    Json,
    extract::{Path, State},
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::{Value, json};

use crate::AppState;
use crate::bootstrap::generate_api_key;
use crate::db::get_connection;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, require_admin};
use crate::models::user::{User, UserResponse};
use crate::schema::users;

/// List all users.
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<UserResponse>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    let user_list: Vec<User> = users::table.order(users::id.asc()).load(&mut conn).await?;

    Ok(Json(user_list.into_iter().map(UserResponse::from).collect()))
}

/// Regenerate a user's API key. Admin only; invalidates the previous key.
pub async fn regenerate_api_key(
    State(state): State<AppState>,
    user: AuthUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Value>> {
    require_admin(&user)?;

    let mut conn = get_connection(&state.db_pool).await?;

    let new_key = generate_api_key();
    let updated: User = diesel::update(users::table.find(user_id))
        .set(users::api_key.eq(&new_key))
        .get_result(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "User"))?;

    tracing::info!(
        user_id = updated.id,
        username = %updated.username,
        actor = %user.username,
        "API key regenerated"
    );

    Ok(Json(json!({
        "user_id": updated.id,
        "username": updated.username,
        "api_key": new_key,
        "message": "API key regenerated successfully. Save this key - it won't be shown again!",
    })))
}
