/// Offsec Program - Finding handlers.
///
/// Findings are created under an engagement, optionally seeded from a
/// template. Template text is copied at creation time; a later template
/// edit or delete never touches existing findings.
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
use crate::models::asset::{Asset, FindingAsset, LinkFindingAssetRequest, NewFindingAsset};
use crate::models::comment::{Comment, CreateCommentRequest, NewComment};
use crate::models::engagement::Engagement;
use crate::models::finding::{
    CreateFindingRequest, Finding, FindingStatus, FindingSummary, FindingTemplate, NewFinding,
    RemediationStatus, SEVERITY_ORDER, Severity,
};
use crate::schema::{assets, comments, engagements, finding_assets, finding_templates, findings};

/// Create a finding under an engagement.
///
/// When `template_id` is given, the template's default severity and
/// canonical text fill any field the request leaves empty.
pub async fn create_finding(
    State(state): State<AppState>,
    user: AuthUser,
    Path(engagement_id): Path<i32>,
    Json(request): Json<CreateFindingRequest>,
) -> AppResult<(StatusCode, Json<Finding>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    let mut conn = get_connection(&state.db_pool).await?;

    engagements::table
        .find(engagement_id)
        .first::<Engagement>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let template: Option<FindingTemplate> = match request.template_id {
        Some(template_id) => Some(
            finding_templates::table
                .find(template_id)
                .first(&mut conn)
                .await
                .map_err(|e| AppError::from_diesel(e, "Finding template"))?,
        ),
        None => None,
    };

    let severity = request
        .severity
        .or_else(|| template.as_ref().and_then(|t| t.severity_default.clone()))
        .ok_or_else(|| {
            AppError::Validation("severity is required when no template supplies one".to_string())
        })?;
    if Severity::parse(&severity).is_none() {
        return Err(AppError::Validation(format!(
            "Unknown severity: {}",
            severity
        )));
    }

    let remediation_status = request
        .remediation_status
        .unwrap_or_else(|| RemediationStatus::NotStarted.as_str().to_string());
    if RemediationStatus::parse(&remediation_status).is_none() {
        return Err(AppError::Validation(format!(
            "Unknown remediation status: {}",
            remediation_status
        )));
    }

    let new_finding = NewFinding {
        engagement_id,
        template_id: request.template_id,
        title: request.title,
        severity,
        status: FindingStatus::New.as_str().to_string(),
        description: request
            .description
            .or_else(|| template.as_ref().and_then(|t| t.description.clone())),
        impact: request
            .impact
            .or_else(|| template.as_ref().and_then(|t| t.impact.clone())),
        poc: request.poc,
        recommendation: request
            .recommendation
            .or_else(|| template.as_ref().and_then(|t| t.recommendation.clone())),
        attack_techniques: request
            .attack_techniques
            .or_else(|| template.as_ref().and_then(|t| t.attack_techniques.clone())),
        remediation_status,
        remediation_owner: request.remediation_owner,
        due_date: request.due_date,
        created_by_id: Some(user.id),
    };

    let finding: Finding = diesel::insert_into(findings::table)
        .values(&new_finding)
        .get_result(&mut conn)
        .await?;

    tracing::info!(
        finding_id = finding.id,
        engagement_id,
        severity = %finding.severity,
        "finding created"
    );

    Ok((StatusCode::CREATED, Json(finding)))
}

fn severity_rank(severity: &str) -> usize {
    SEVERITY_ORDER
        .iter()
        .position(|s| s.as_str() == severity)
        .unwrap_or(SEVERITY_ORDER.len())
}

/// List an engagement's findings, most severe first.
pub async fn list_findings(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(engagement_id): Path<i32>,
) -> AppResult<Json<Vec<FindingSummary>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    engagements::table
        .find(engagement_id)
        .first::<Engagement>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Engagement"))?;

    let mut finding_rows: Vec<Finding> = findings::table
        .filter(findings::engagement_id.eq(engagement_id))
        .order(findings::id.asc())
        .load(&mut conn)
        .await?;

    finding_rows.sort_by_key(|f| severity_rank(&f.severity));

    Ok(Json(finding_rows.iter().map(FindingSummary::from).collect()))
}

/// Mark an asset as affected by a finding.
pub async fn link_asset(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(finding_id): Path<i32>,
    Json(request): Json<LinkFindingAssetRequest>,
) -> AppResult<(StatusCode, Json<FindingAsset>)> {
    let mut conn = get_connection(&state.db_pool).await?;

    findings::table
        .find(finding_id)
        .first::<Finding>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Finding"))?;
    assets::table
        .find(request.asset_id)
        .first::<Asset>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Asset"))?;

    let link: FindingAsset = diesel::insert_into(finding_assets::table)
        .values(&NewFindingAsset {
            finding_id,
            asset_id: request.asset_id,
        })
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(link)))
}

/// Add a comment to a finding.
pub async fn add_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(finding_id): Path<i32>,
    Json(request): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    let mut conn = get_connection(&state.db_pool).await?;

    findings::table
        .find(finding_id)
        .first::<Finding>(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Finding"))?;

    let comment: Comment = diesel::insert_into(comments::table)
        .values(&NewComment {
            engagement_id: None,
            finding_id: Some(finding_id),
            user_id: user.id,
            text: request.text,
        })
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_canonical() {
        assert_eq!(severity_rank("Critical"), 0);
        assert_eq!(severity_rank("High"), 1);
        assert_eq!(severity_rank("Info"), 4);
    }

    #[test]
    fn test_severity_rank_unknown_sorts_last() {
        assert!(severity_rank("Catastrophic") > severity_rank("Info"));
    }
}
