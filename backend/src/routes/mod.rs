//! Route definitions for the Warehouse Stock Tracker

use axum::{routing::get, Router};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Warehouse management
        .nest("/warehouses", warehouse_routes())
        // Category management
        .nest("/categories", category_routes())
        // Product management
        .nest("/products", product_routes())
        // Inventory balances (read-only)
        .nest("/inventories", inventory_routes())
        // Stock movements
        .nest("/movements", movement_routes())
}

/// Warehouse CRUD routes
fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_warehouses).post(handlers::create_warehouse),
        )
        .route(
            "/:warehouse_id",
            get(handlers::get_warehouse)
                .put(handlers::update_warehouse)
                .patch(handlers::update_warehouse)
                .delete(handlers::delete_warehouse),
        )
}

/// Category CRUD routes
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .patch(handlers::update_category)
                .delete(handlers::delete_category),
        )
}

/// Product CRUD routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .patch(handlers::update_product)
                .delete(handlers::delete_product),
        )
}

/// Inventory routes. Balances are derived state updated by movements only,
/// so no write methods are routed; axum answers them with 405.
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventories))
        .route("/balance", get(handlers::get_balance))
        .route("/:inventory_id", get(handlers::get_inventory))
}

/// Movement routes (in, out and transfer)
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route(
            "/:movement_id",
            get(handlers::get_movement)
                .put(handlers::update_movement)
                .patch(handlers::update_movement)
                .delete(handlers::delete_movement),
        )
}
