/// Offsec Program - Report handlers.
///
/// All three representations are generated from one loaded aggregate; the
/// endpoints are read-only.
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::db::get_connection;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::report::{self, EngagementReport};

/// Assembled report document as JSON.
pub async fn get_report(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<Json<EngagementReport>> {
    let mut conn = get_connection(&state.db_pool).await?;
    let aggregate = report::load_aggregate(&mut conn, engagement_id).await?;
    Ok(Json(report::assemble(&aggregate)))
}

/// Findings export as a CSV attachment.
pub async fn export_csv(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = get_connection(&state.db_pool).await?;
    let aggregate = report::load_aggregate(&mut conn, engagement_id).await?;
    let body = report::csv::render(&aggregate)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename={}",
                    report::csv::filename(engagement_id)
                ),
            ),
        ],
        body,
    )
        .into_response())
}

/// Narrative report as a Markdown attachment.
pub async fn export_markdown(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<Response> {
    let mut conn = get_connection(&state.db_pool).await?;
    let aggregate = report::load_aggregate(&mut conn, engagement_id).await?;
    let body = report::markdown::render(&aggregate);

    Ok((
        [
            (header::CONTENT_TYPE, "text/markdown".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename={}",
                    report::markdown::filename(engagement_id)
                ),
            ),
        ],
        body,
    )
        .into_response())
}
