//! Inventory ledger service owning the (product, warehouse) balances

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};

/// Inventory service exposing read access to balances and the transactional
/// adjust primitive that mutates them
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Inventory balance with product and warehouse names for API responses
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InventoryWithDetail {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub quantity: i64,
    pub updated_at: DateTime<Utc>,
}

/// Current balance for a (product, warehouse) pair
#[derive(Debug, Clone, Serialize)]
pub struct Balance {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub quantity: i64,
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Atomically apply a signed delta to the balance of a product at a
    /// warehouse.
    ///
    /// Runs on a borrowed transaction connection so the caller commits the
    /// balance change together with the movement row it belongs to. The row
    /// is materialized with an idempotent upsert on first touch, then held
    /// under SELECT ... FOR UPDATE for the rest of the transaction, which
    /// serializes concurrent adjusts on the same (product, warehouse) pair.
    /// A delta that would drive the balance negative fails with
    /// `InsufficientStock` and leaves the row untouched.
    ///
    /// Every balance mutation in the system goes through this function.
    pub async fn adjust(
        conn: &mut PgConnection,
        product_id: Uuid,
        warehouse_id: Uuid,
        delta: i64,
    ) -> AppResult<i64> {
        sqlx::query(
            r#"
            INSERT INTO inventories (product_id, warehouse_id, quantity)
            VALUES ($1, $2, 0)
            ON CONFLICT (product_id, warehouse_id) DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(warehouse_id)
        .execute(&mut *conn)
        .await?;

        let current = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM inventories WHERE product_id = $1 AND warehouse_id = $2 FOR UPDATE",
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_one(&mut *conn)
        .await?;

        let new_quantity = current + delta;
        if new_quantity < 0 {
            return Err(AppError::InsufficientStock {
                requested: -delta,
                available: current,
            });
        }

        sqlx::query(
            "UPDATE inventories SET quantity = $1, updated_at = NOW() WHERE product_id = $2 AND warehouse_id = $3",
        )
        .bind(new_quantity)
        .bind(product_id)
        .bind(warehouse_id)
        .execute(&mut *conn)
        .await?;

        Ok(new_quantity)
    }

    /// Current balance for a pair; 0 when no row exists. Does not create one.
    pub async fn quantity_for(&self, product_id: Uuid, warehouse_id: Uuid) -> AppResult<i64> {
        let quantity = sqlx::query_scalar::<_, i64>(
            "SELECT quantity FROM inventories WHERE product_id = $1 AND warehouse_id = $2",
        )
        .bind(product_id)
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Balance for a pair as an API payload
    pub async fn balance(&self, product_id: Uuid, warehouse_id: Uuid) -> AppResult<Balance> {
        let quantity = self.quantity_for(product_id, warehouse_id).await?;

        Ok(Balance {
            product_id,
            warehouse_id,
            quantity,
        })
    }

    /// List balances with product and warehouse names
    pub async fn list(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<InventoryWithDetail>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM inventories")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, InventoryWithDetail>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name,
                   i.warehouse_id, w.name AS warehouse_name,
                   i.quantity, i.updated_at
            FROM inventories i
            JOIN products p ON p.id = i.product_id
            JOIN warehouses w ON w.id = i.warehouse_id
            ORDER BY p.name, w.name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: rows,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Get a balance by id
    pub async fn get(&self, inventory_id: Uuid) -> AppResult<InventoryWithDetail> {
        let row = sqlx::query_as::<_, InventoryWithDetail>(
            r#"
            SELECT i.id, i.product_id, p.name AS product_name,
                   i.warehouse_id, w.name AS warehouse_name,
                   i.quantity, i.updated_at
            FROM inventories i
            JOIN products p ON p.id = i.product_id
            JOIN warehouses w ON w.id = i.warehouse_id
            WHERE i.id = $1
            "#,
        )
        .bind(inventory_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))?;

        Ok(row)
    }
}
