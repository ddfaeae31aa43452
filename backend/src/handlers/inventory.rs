//! HTTP handlers for inventory balance endpoints
//!
//! Balances are derived state, updated only as the side effect of movement
//! processing, so this surface is read-only.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::inventory::{Balance, InventoryService, InventoryWithDetail};
use crate::AppState;
use shared::types::{PaginatedResponse, Pagination};

/// List inventory balances
pub async fn list_inventories(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<PaginatedResponse<InventoryWithDetail>>> {
    let service = InventoryService::new(state.db);
    let inventories = service.list(pagination).await?;
    Ok(Json(inventories))
}

/// Get an inventory balance by id
pub async fn get_inventory(
    State(state): State<AppState>,
    Path(inventory_id): Path<Uuid>,
) -> AppResult<Json<InventoryWithDetail>> {
    let service = InventoryService::new(state.db);
    let inventory = service.get(inventory_id).await?;
    Ok(Json(inventory))
}

/// Query parameters for the balance lookup
#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
}

/// Current balance for a (product, warehouse) pair; 0 when the pair has
/// never been touched by a movement
pub async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> AppResult<Json<Balance>> {
    let service = InventoryService::new(state.db);
    let balance = service
        .balance(query.product_id, query.warehouse_id)
        .await?;
    Ok(Json(balance))
}
