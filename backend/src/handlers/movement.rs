//! HTTP handlers for stock movement endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::movement::{
    CreateMovementInput, MovementService, MovementWithDetail, UpdateMovementInput,
};
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// List movements
pub async fn list_movements(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<MovementWithDetail>>> {
    let service = MovementService::new(state.db);
    let movements = service.list(pagination).await?;
    Ok(Json(movements))
}

/// Get a movement
pub async fn get_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<Json<MovementWithDetail>> {
    let service = MovementService::new(state.db);
    let movement = service.get(movement_id).await?;
    Ok(Json(movement))
}

/// Create a movement and apply its ledger effect
pub async fn create_movement(
    State(state): State<AppState>,
    Json(input): Json<CreateMovementInput>,
) -> AppResult<(StatusCode, Json<MovementWithDetail>)> {
    let service = MovementService::new(state.db);
    let movement = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Update a movement, compensating the ledger for the difference
pub async fn update_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
    Json(input): Json<UpdateMovementInput>,
) -> AppResult<Json<MovementWithDetail>> {
    let service = MovementService::new(state.db);
    let movement = service.update(movement_id, input).await?;
    Ok(Json(movement))
}

/// Delete a movement, reversing its ledger effect
pub async fn delete_movement(
    State(state): State<AppState>,
    Path(movement_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = MovementService::new(state.db);
    service.delete(movement_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
