/// Offsec Program - Finding template handlers.
///
/// Full CRUD over the reusable template library. Deleting a template leaves
/// findings that copied its text untouched; the FK on findings is set null.
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;

use crate::AppState;
use crate::db::get_connection;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::finding::{
    CreateFindingTemplateRequest, FindingTemplate, NewFindingTemplate, Severity,
    UpdateFindingTemplateRequest,
};
use crate::schema::finding_templates;

fn validate_severity_default(severity_default: &Option<String>) -> AppResult<()> {
    if let Some(severity) = severity_default {
        if Severity::parse(severity).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown severity: {}",
                severity
            )));
        }
    }
    Ok(())
}

/// Create a finding template.
pub async fn create_template(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateFindingTemplateRequest>,
) -> AppResult<(StatusCode, Json<FindingTemplate>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;
    validate_severity_default(&request.severity_default)?;

    let mut conn = get_connection(&state.db_pool).await?;

    let new_template = NewFindingTemplate {
        title: request.title,
        category: request.category,
        severity_default: request.severity_default,
        description: request.description,
        impact: request.impact,
        recommendation: request.recommendation,
        cwe_id: request.cwe_id,
        attack_techniques: request.attack_techniques,
        external_references: request.external_references,
        created_by_id: Some(user.id),
    };

    let template: FindingTemplate = diesel::insert_into(finding_templates::table)
        .values(&new_template)
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(template)))
}

#[derive(Debug, Deserialize)]
pub struct ListTemplatesParams {
    pub category: Option<String>,
}

/// List templates ordered by title, optionally filtered by category.
pub async fn list_templates(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListTemplatesParams>,
) -> AppResult<Json<Vec<FindingTemplate>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    let mut query = finding_templates::table.into_boxed();
    if let Some(category) = params.category {
        query = query.filter(finding_templates::category.eq(category));
    }

    let templates: Vec<FindingTemplate> = query
        .order(finding_templates::title.asc())
        .load(&mut conn)
        .await?;

    Ok(Json(templates))
}

/// Retrieve a template by id.
pub async fn get_template(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(template_id): Path<i32>,
) -> AppResult<Json<FindingTemplate>> {
    let mut conn = get_connection(&state.db_pool).await?;

    let template: FindingTemplate = finding_templates::table
        .find(template_id)
        .first(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Finding template"))?;

    Ok(Json(template))
}

/// Partially update a template. Absent fields keep their values; an
/// explicit null clears a nullable field.
pub async fn update_template(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(template_id): Path<i32>,
    Json(request): Json<UpdateFindingTemplateRequest>,
) -> AppResult<Json<FindingTemplate>> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;
    if let Some(severity_default) = &request.severity_default {
        validate_severity_default(severity_default)?;
    }

    let mut conn = get_connection(&state.db_pool).await?;

    let existing: FindingTemplate = finding_templates::table
        .find(template_id)
        .first(&mut conn)
        .await
        .map_err(|e| AppError::from_diesel(e, "Finding template"))?;

    let updated: FindingTemplate = diesel::update(finding_templates::table.find(template_id))
        .set((
            finding_templates::title.eq(request.title.unwrap_or(existing.title)),
            finding_templates::category.eq(request.category.unwrap_or(existing.category)),
            finding_templates::severity_default
                .eq(request.severity_default.unwrap_or(existing.severity_default)),
            finding_templates::description
                .eq(request.description.unwrap_or(existing.description)),
            finding_templates::impact.eq(request.impact.unwrap_or(existing.impact)),
            finding_templates::recommendation
                .eq(request.recommendation.unwrap_or(existing.recommendation)),
            finding_templates::cwe_id.eq(request.cwe_id.unwrap_or(existing.cwe_id)),
            finding_templates::attack_techniques
                .eq(request.attack_techniques.unwrap_or(existing.attack_techniques)),
            finding_templates::external_references
                .eq(request
                    .external_references
                    .unwrap_or(existing.external_references)),
        ))
        .get_result(&mut conn)
        .await?;

    Ok(Json(updated))
}

/// Delete a template.
pub async fn delete_template(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(template_id): Path<i32>,
) -> AppResult<StatusCode> {
    let mut conn = get_connection(&state.db_pool).await?;

    let deleted = diesel::delete(finding_templates::table.find(template_id))
        .execute(&mut conn)
        .await?;

    if deleted == 0 {
        return Err(AppError::NotFound("Finding template not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
