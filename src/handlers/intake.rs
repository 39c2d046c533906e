/// Offsec Program - Intake request handlers.
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::AppState;
use crate::db::get_connection;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::intake::{CreateIntakeRequest, IntakeRequest, IntakeStatus, NewIntakeRequest};
use crate::schema::intake_requests;

/// Create an intake request with status "New"; creator is the current user.
pub async fn create_intake_request(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateIntakeRequest>,
) -> AppResult<(StatusCode, Json<IntakeRequest>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    let mut conn = get_connection(&state.db_pool).await?;

    let new_request = NewIntakeRequest {
        title: request.title,
        requester_name: request.requester_name,
        requester_email: request.requester_email,
        business_unit: request.business_unit,
        system_name: request.system_name,
        description: request.description,
        risk_level: request.risk_level,
        desired_window: request.desired_window,
        engagement_type: request.engagement_type,
        status: IntakeStatus::New.as_str().to_string(),
        created_by_id: Some(user.id),
    };

    let created: IntakeRequest = diesel::insert_into(intake_requests::table)
        .values(&new_request)
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
pub struct ListIntakeParams {
    pub status: Option<String>,
}

/// List intake requests, newest first, optionally filtered by status.
pub async fn list_intake_requests(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListIntakeParams>,
) -> AppResult<Json<Vec<IntakeRequest>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    let mut query = intake_requests::table.into_boxed();
    if let Some(status) = params.status {
        if IntakeStatus::parse(&status).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown intake status: {}",
                status
            )));
        }
        query = query.filter(intake_requests::status.eq(status));
    }

    let requests: Vec<IntakeRequest> = query
        .order(intake_requests::created_at.desc())
        .load(&mut conn)
        .await?;

    Ok(Json(requests))
}
