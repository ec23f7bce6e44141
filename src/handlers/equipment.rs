use actix_web::{
    HttpResponse, Result,
    web::{Data, Json, Path, Query},
};
use serde::Deserialize;

use crate::AppState;
use crate::access::{AccessContext, AccessRequirement};
use crate::database::is_unique_violation;
use crate::database::models::{
    CategoryList, CreateEquipmentInput, EquipmentFilter, UpdateEquipmentInput,
};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    pub owner_id: Option<String>,
}

fn equipment_not_found() -> AppError {
    AppError::NotFound("Equipment not found".to_string())
}

fn map_write_error(e: sqlx::Error) -> AppError {
    if is_unique_violation(&e) {
        AppError::BadRequest("Serial number already exists".to_string())
    } else {
        AppError::DatabaseError(e)
    }
}

pub async fn list_equipment(
    ctx: AccessContext,
    state: Data<AppState>,
    filter: Query<EquipmentFilter>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().equipment())?;

    let items = state
        .equipment_repository
        .list(&filter)
        .await
        .map_err(|e| {
            log::error!("Failed to list equipment: {}", e);
            AppError::DatabaseError(e)
        })?;

    Ok(ApiResponse::success(items))
}

pub async fn create_equipment(
    ctx: AccessContext,
    state: Data<AppState>,
    input: Json<CreateEquipmentInput>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().equipment())?;

    let mut input = input.into_inner();
    if input.name.trim().is_empty() {
        return Err(AppError::BadRequest("Equipment name is required".to_string()).into());
    }
    if input.category.trim().is_empty() {
        return Err(AppError::BadRequest("Equipment category is required".to_string()).into());
    }

    if input.owner_id.is_none() {
        input.owner_id = Some(ctx.identity.id.clone());
        if input.owner_name.is_none() {
            input.owner_name = ctx.identity.display_name().map(str::to_string);
        }
    }

    if let Some(ref serial_number) = input.serial_number {
        let existing = state
            .equipment_repository
            .find_by_serial_number(serial_number)
            .await
            .map_err(AppError::DatabaseError)?;
        if existing.is_some() {
            return Err(AppError::BadRequest("Serial number already exists".to_string()).into());
        }
    }

    let equipment = state
        .equipment_repository
        .create(&input)
        .await
        .map_err(map_write_error)?;

    log::info!(
        "User {} added equipment {} ({})",
        ctx.user_id(),
        equipment.id,
        equipment.name
    );
    Ok(ApiResponse::created(equipment))
}

pub async fn get_equipment(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().equipment())?;

    let equipment = state
        .equipment_repository
        .find_by_id(path.into_inner())
        .await
        .map_err(AppError::DatabaseError)?
        .ok_or_else(equipment_not_found)?;

    Ok(ApiResponse::success(equipment))
}

pub async fn update_equipment(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
    input: Json<UpdateEquipmentInput>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().equipment())?;
    let equipment_id = path.into_inner();

    let equipment = state
        .equipment_repository
        .update(equipment_id, input.into_inner())
        .await
        .map_err(map_write_error)?
        .ok_or_else(equipment_not_found)?;

    Ok(ApiResponse::success(equipment))
}

pub async fn delete_equipment(
    ctx: AccessContext,
    state: Data<AppState>,
    path: Path<i64>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().equipment())?;
    let equipment_id = path.into_inner();

    let deleted = state
        .equipment_repository
        .delete(equipment_id)
        .await
        .map_err(AppError::DatabaseError)?;
    if !deleted {
        return Err(equipment_not_found().into());
    }

    log::info!("User {} deleted equipment {}", ctx.user_id(), equipment_id);
    Ok(ApiResponse::ok_message("Equipment deleted successfully"))
}

pub async fn get_stats(
    ctx: AccessContext,
    state: Data<AppState>,
    query: Query<StatsQuery>,
) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().reports())?;

    let stats = state
        .equipment_repository
        .stats(query.owner_id.as_deref())
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(stats))
}

pub async fn list_categories(ctx: AccessContext, state: Data<AppState>) -> Result<HttpResponse> {
    ctx.require(AccessRequirement::none().equipment())?;

    let categories = state
        .equipment_repository
        .categories()
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(ApiResponse::success(CategoryList { categories }))
}
