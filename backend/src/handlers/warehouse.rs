//! HTTP handlers for warehouse management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::warehouse::{
    CreateWarehouseInput, UpdateWarehouseInput, Warehouse, WarehouseService,
};
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// List warehouses
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service.list(pagination).await?;
    Ok(Json(warehouses))
}

/// Get a warehouse
pub async fn get_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.get(warehouse_id).await?;
    Ok(Json(warehouse))
}

/// Create a warehouse
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(input): Json<CreateWarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

/// Update a warehouse
pub async fn update_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<UpdateWarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.update(warehouse_id, input).await?;
    Ok(Json(warehouse))
}

/// Delete a warehouse
pub async fn delete_warehouse(
    State(state): State<AppState>,
    Path(warehouse_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = WarehouseService::new(state.db);
    service.delete(warehouse_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
