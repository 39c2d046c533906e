/// Offsec Program - Timeline and engagement comment handlers.
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::AppState;
use crate::db::get_connection;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::comment::{Comment, CreateCommentRequest, NewComment};
use crate::models::engagement::Engagement;
use crate::models::timeline::{CreateTimelineEventRequest, NewTimelineEvent, TimelineEvent};
use crate::schema::{comments, engagements, timeline_events};

/// Log a timeline event on an engagement.
pub async fn add_timeline_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(engagement_id): Path<i32>,
    Json(request): Json<CreateTimelineEventRequest>,
) -> AppResult<(StatusCode, Json<TimelineEvent>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    let mut conn = get_connection(&state.db_pool).await?;

    engagements::table
        .find(engagement_id)
        .first::<Engagement>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let event: TimelineEvent = diesel::insert_into(timeline_events::table)
        .values(&NewTimelineEvent {
            engagement_id,
            user_id: Some(user.id),
            event_type: request.event_type,
            summary: request.summary,
            details: request.details,
        })
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(event)))
}

/// List an engagement's timeline events ordered by creation time.
pub async fn list_timeline_events(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<Json<Vec<TimelineEvent>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    engagements::table
        .find(engagement_id)
        .first::<Engagement>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let events: Vec<TimelineEvent> = timeline_events::table
        .filter(timeline_events::engagement_id.eq(engagement_id))
        .order(timeline_events::created_at.asc())
        .load(&mut conn)
        .await?;

    Ok(Json(events))
}

/// Add a comment to an engagement.
pub async fn add_engagement_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(engagement_id): Path<i32>,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    let mut conn = get_connection(&state.db_pool).await?;

    engagements::table
        .find(engagement_id)
        .first::<Engagement>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let comment: Comment = diesel::insert_into(comments::table)
        .values(&NewComment {
            engagement_id: Some(engagement_id),
            finding_id: None,
            user_id: user.id,
            text: request.text,
        })
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}
