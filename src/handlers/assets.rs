/// Offsec Program - Asset handlers.
///
/// Assets are created independently of engagements and linked in later.
use axum::{Json, extract::State, http::StatusCode};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::AppState;
use crate::db::get_connection;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::models::asset::{Asset, CreateAssetRequest, Criticality, NewAsset};
use crate::schema::assets;

/// Create an asset.
pub async fn create_asset(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateAssetRequest>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    validator::Validate::validate(&request)
        .map_err(|e| AppError::Validation(format!("Validation failed: {}", e)))?;

    if let Some(ref criticality) = request.criticality {
        if Criticality::parse(criticality).is_none() {
            return Err(AppError::Validation(format!(
                "Unknown criticality: {}",
                criticality
            )));
        }
    }

    let mut conn = get_connection(&state.db_pool).await?;

    let new_asset = NewAsset {
        name: request.name,
        asset_type: request.asset_type,
        identifier: request.identifier,
        environment: request.environment,
        business_unit: request.business_unit,
        criticality: request.criticality,
        notes: request.notes,
    };

    let asset: Asset = diesel::insert_into(assets::table)
        .values(&new_asset)
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(asset)))
}

/// List all assets ordered by name.
pub async fn list_assets(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<Vec<Asset>>> {
    let mut conn = get_connection(&state.db_pool).await?;

    let asset_list: Vec<Asset> = assets::table
        .order(assets::name.asc())
        .load(&mut conn)
        .await?;

    Ok(Json(asset_list))
}
