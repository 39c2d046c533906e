/// Offsec Program - Authentication middleware.
///
/// Every API request resolves to a user. A present `X-API-Key` header is
/// looked up against the users table and must match; an invalid key is a
/// 401. When the header is absent, the first user by id is used instead,
/// which keeps a freshly bootstrapped single-user instance usable without
/// any client configuration.
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};

use crate::db::get_connection;
use crate::error::AppError;
use crate::models::user::User;
use crate::schema::users;
use crate::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Authenticated user context, inserted into request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Extract the AuthUser placed in extensions by `auth_middleware`.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AppError::Auth("Authentication required".to_string()))
    }
}

/// Resolve the request's user and store it in extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented_key = request
        .headers()
        .get(API_KEY_HEADER)
        .map(|v| {
            v.to_str()
                .map_err(|_| AppError::Auth("Invalid API key".to_string()))
        })
        .transpose()?
        .map(str::to_owned);

    let mut conn = get_connection(&state.db_pool).await?;

    let user: User = match presented_key {
        Some(key) => users::table
            .filter(users::api_key.eq(&key))
            .first(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AppError::Auth("Invalid API key".to_string())
                }
                other => AppError::Database(other),
            })?,
        None => users::table
            .order(users::id.asc())
            .first(&mut conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => {
                    AppError::Auth("No users exist; bootstrap has not run".to_string())
                }
                other => AppError::Database(other),
            })?,
    };
    drop(conn);

    request.extensions_mut().insert(AuthUser::from(user));
    Ok(next.run(request).await)
}

/// Reject non-admin callers. Used by the handful of admin-only operations.
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Admin role required".to_string()))
    }
}
