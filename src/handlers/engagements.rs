/// Offsec Program - Engagement handlers.
///
/// Engagements are the primary objects here: create with a lazily created
/// program year, list with filters, a nested detail view, partial update,
/// cascade delete, and asset scoping.
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::db::{DbConnection, get_connection};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::asset::{
    Asset, EngagementAsset, LinkEngagementAssetRequest, NewEngagementAsset,
};
use crate::models::comment::Comment;
use crate::models::engagement::{
    CreateEngagementRequest, Engagement, EngagementStatus, EngagementSummary, EngagementType,
    UpdateEngagementRequest,
};
use crate::models::finding::{Finding, FindingSummary};
use crate::models::program_year::{NewProgramYear, ProgramYear};
use crate::models::timeline::TimelineEvent;
use crate::schema::{
    assets, comments, engagement_assets, engagements, findings, program_years, timeline_events,
};

/// Engagement detail: all fields plus the resolved year and nested children.
#[derive(Debug, Serialize)]
pub struct EngagementDetail {
    #[serde(flatten)]
    pub engagement: Engagement,
    pub program_year: Option<i32>,
    pub assets: Vec<Asset>,
    pub findings: Vec<FindingSummary>,
    pub timeline_events: Vec<TimelineEvent>,
    pub comments: Vec<Comment>,
}

async fn resolve_year(
    conn: &mut DbConnection,
    program_year_id: Option<i32>,
) -> AppResult<Option<i32>> {
    let year = match program_year_id {
        Some(py_id) => program_years::table
            .find(py_id)
            .first::<ProgramYear>(conn)
            .await
            .optional()?
            .map(|py| py.year),
        None => None,
    };
    Ok(year)
}

async fn load_detail(conn: &mut DbConnection, engagement_id: i32) -> AppResult<EngagementDetail> {
    let engagement: Engagement = engagements::table
        .find(engagement_id)
        .first(conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let program_year = resolve_year(conn, engagement.program_year_id).await?;

    let linked_assets: Vec<Asset> = engagement_assets::table
        .inner_join(assets::table)
        .filter(engagement_assets::engagement_id.eq(engagement_id))
        .order(engagement_assets::id.asc())
        .load::<(EngagementAsset, Asset)>(conn)
        .await?
        .into_iter()
        .map(|(_, asset)| asset)
        .collect();

    let finding_rows: Vec<Finding> = findings::table
        .filter(findings::engagement_id.eq(engagement_id))
        .order(findings::id.asc())
        .load(conn)
        .await?;

    let events: Vec<TimelineEvent> = timeline_events::table
        .filter(timeline_events::engagement_id.eq(engagement_id))
        .order(timeline_events::created_at.asc())
        .load(conn)
        .await?;

    let comment_rows: Vec<Comment> = comments::table
        .filter(comments::engagement_id.eq(engagement_id))
        .order(comments::created_at.asc())
        .load(conn)
        .await?;

    Ok(EngagementDetail {
        engagement,
        program_year,
        assets: linked_assets,
        findings: finding_rows.iter().map(FindingSummary::from).collect(),
        timeline_events: events,
        comments: comment_rows,
    })
}

/// Create an engagement with status "Planned".
///
/// The cited program year row is get-or-created inside the same transaction
/// as the engagement insert; the ON CONFLICT DO NOTHING plus re-select
/// tolerates a concurrent creator of the same year.
pub async fn create_engagement(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateEngagementRequest>,
) -> AppResult<(StatusCode, Json<EngagementDetail>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    if EngagementType::parse(&request.engagement_type).is_none() {
        return Err(AppError::Validation(format!(
            "Unknown engagement type: {}",
            request.engagement_type
        )));
    }

    let mut conn = get_connection(&state.db_pool).await?;

    let owner_id = user.id;
    let engagement = conn
        .transaction::<Engagement, AppError, _>(|conn| {
            async move {
                let year = request.program_year;
                diesel::insert_into(program_years::table)
                    .values(&NewProgramYear { year })
                    .on_conflict(program_years::year)
                    .do_nothing()
                    .execute(conn)
                    .await?;
                let program_year: ProgramYear = program_years::table
                    .filter(program_years::year.eq(year))
                    .first(conn)
                    .await?;

                let new_engagement = crate::models::engagement::NewEngagement {
                    name: request.name,
                    program_year_id: Some(program_year.id),
                    engagement_type: request.engagement_type,
                    business_unit: request.business_unit,
                    owner_id: Some(owner_id),
                    status: EngagementStatus::Planned.as_str().to_string(),
                    start_date: request.start_date,
                    end_date: request.end_date,
                    scope_summary: request.scope_summary,
                    objectives: request.objectives,
                    methodology: request.methodology,
                };
                let engagement: Engagement = diesel::insert_into(engagements::table)
                    .values(&new_engagement)
                    .get_result(conn)
                    .await?;
                Ok(engagement)
            }
            .scope_boxed()
        })
        .await?;

    tracing::info!(engagement_id = engagement.id, name = %engagement.name, "engagement created");

    let detail = load_detail(&mut conn, engagement.id).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

#[derive(Debug, Deserialize)]
pub struct ListEngagementsParams {
    pub engagement_type: Option<String>,
    pub status: Option<String>,
}

/// List engagement summaries, start date descending with undated ones last.
pub async fn list_engagements(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListEngagementsParams>,
) -> AppResult<Json<Vec<EngagementSummary>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    let mut query = engagements::table
        .left_join(program_years::table)
        .select((
            Engagement::as_select(),
            Option::<ProgramYear>::as_select(),
        ))
        .into_boxed();

    if let Some(engagement_type) = params.engagement_type {
        if EngagementType::parse(&engagement_type).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown engagement type: {}",
                engagement_type
            )));
        }
        query = query.filter(engagements::engagement_type.eq(engagement_type));
    }
    if let Some(status) = params.status {
        if EngagementStatus::parse(&status).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown engagement status: {}",
                status
            )));
        }
        query = query.filter(engagements::status.eq(status));
    }

    let rows: Vec<(Engagement, Option<ProgramYear>)> = query
        .order(engagements::start_date.desc().nulls_last())
        .load(&mut conn)
        .await?;

    let summaries = rows
        .iter()
        .map(|(e, py)| EngagementSummary::from_engagement(e, py.as_ref().map(|py| py.year)))
        .collect();

    Ok(Json(summaries))
}

/// Retrieve the engagement detail view.
pub async fn get_engagement(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<Json<EngagementDetail>> {
    let mut conn = get_connection(&state.db_pool).await?;
    let detail = load_detail(&mut conn, engagement_id).await?;
    Ok(Json(detail))
}

/// Partially update an engagement. Absent fields keep their values; an
/// explicit null clears a nullable field.
pub async fn update_engagement(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
    Json(request): Json<UpdateEngagementRequest>,
) -> AppResult<Json<EngagementDetail>> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    if let Some(ref engagement_type) = request.engagement_type {
        if EngagementType::parse(engagement_type).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown engagement type: {}",
                engagement_type
            )));
        }
    }
    if let Some(ref status) = request.status {
        if EngagementStatus::parse(status).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown engagement status: {}",
                status
            )));
        }
    }

    let mut conn = get_connection(&state.db_pool).await?;

    let existing: Engagement = engagements::table
        .find(engagement_id)
        .first(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    // Absent fields keep the stored value; an explicit null arrives as
    // Some(None) and clears the column.
    diesel::update(engagements::table.find(engagement_id))
        .set((
            engagements::name.eq(request.name.unwrap_or(existing.name)),
            engagements::engagement_type
                .eq(request.engagement_type.unwrap_or(existing.engagement_type)),
            engagements::business_unit
                .eq(request.business_unit.unwrap_or(existing.business_unit)),
            engagements::status.eq(request.status.unwrap_or(existing.status)),
            engagements::start_date.eq(request.start_date.unwrap_or(existing.start_date)),
            engagements::end_date.eq(request.end_date.unwrap_or(existing.end_date)),
            engagements::scope_summary
                .eq(request.scope_summary.unwrap_or(existing.scope_summary)),
            engagements::objectives.eq(request.objectives.unwrap_or(existing.objectives)),
            engagements::methodology.eq(request.methodology.unwrap_or(existing.methodology)),
            engagements::exec_summary.eq(request.exec_summary.unwrap_or(existing.exec_summary)),
            engagements::recommendations_overall.eq(request
                .recommendations_overall
                .unwrap_or(existing.recommendations_overall)),
            engagements::updated_at.eq(diesel::dsl::now),
        ))
        .execute(&mut conn)
        .await?;

    let detail = load_detail(&mut conn, engagement_id).await?;
    Ok(Json(detail))
}

/// Delete an engagement. The schema cascades to its asset associations,
/// findings (and their asset links and comments), timeline events and
/// comments in the same statement.
pub async fn delete_engagement(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<StatusCode> {
    let mut conn = get_connection(&state.db_pool).await?;

    let deleted = diesel::delete(engagements::table.find(engagement_id))
        .execute(&mut conn)
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Engagement not found".to_string()));
    }

    tracing::info!(engagement_id, "engagement deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Put an asset in scope for an engagement.
pub async fn link_asset(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
    Json(request): Json<LinkEngagementAssetRequest>,
) -> AppResult<(StatusCode, Json<EngagementAsset>)> {
    let mut conn = get_connection(&state.db_pool).await?;

    engagements::table
        .find(engagement_id)
        .first::<Engagement>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;
    assets::table
        .find(request.asset_id)
        .first::<Asset>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Asset"))?;

    let link: EngagementAsset = diesel::insert_into(engagement_assets::table)
        .values(&NewEngagementAsset {
            engagement_id,
            asset_id: request.asset_id,
            role: request.role,
            notes: request.notes,
        })
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(link)))
}
