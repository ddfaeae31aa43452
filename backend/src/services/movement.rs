//! Movement processing service
//!
//! Every create, update or delete of a movement record pairs the row write
//! with the ledger adjustment(s) it implies, inside one database
//! transaction. A movement row never exists without its balance effect
//! having been applied, and vice versa.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{merge_deltas, transition_deltas, MovementRoute, MovementType};
use crate::services::inventory::InventoryService;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_quantity;

/// Movement service orchestrating the ledger and the movement store
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

/// Movement row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Movement {
    pub id: Uuid,
    pub movement_type: String,
    pub product_id: Uuid,
    pub warehouse_from: Option<Uuid>,
    pub warehouse_to: Option<Uuid>,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movement {
    /// Route of the stored movement. Stored rows were validated on the way
    /// in, so a failure here means the row no longer satisfies the shape
    /// rules and is surfaced as an internal error rather than a 400.
    fn route(&self) -> AppResult<MovementRoute> {
        let movement_type = MovementType::from_str(&self.movement_type).ok_or_else(|| {
            AppError::Internal(format!("unknown movement type: {}", self.movement_type))
        })?;

        MovementRoute::resolve(movement_type, self.warehouse_from, self.warehouse_to)
            .map_err(|reason| AppError::Internal(format!("stored movement is invalid: {}", reason)))
    }
}

/// Movement with product and warehouse names for API responses
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MovementWithDetail {
    pub id: Uuid,
    pub movement_type: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub warehouse_from: Option<Uuid>,
    pub warehouse_from_name: Option<String>,
    pub warehouse_to: Option<Uuid>,
    pub warehouse_to_name: Option<String>,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a movement
#[derive(Debug, Deserialize)]
pub struct CreateMovementInput {
    pub movement_type: MovementType,
    pub product: Uuid,
    pub quantity: i64,
    pub warehouse_from: Option<Uuid>,
    pub warehouse_to: Option<Uuid>,
}

/// Input for updating a movement; absent fields keep their stored values.
/// The product of a movement cannot be changed after creation.
#[derive(Debug, Deserialize)]
pub struct UpdateMovementInput {
    pub movement_type: Option<MovementType>,
    pub quantity: Option<i64>,
    pub warehouse_from: Option<Uuid>,
    pub warehouse_to: Option<Uuid>,
}

impl MovementService {
    /// Create a new MovementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a movement and apply its balance effects as one atomic unit
    pub async fn create(&self, input: CreateMovementInput) -> AppResult<MovementWithDetail> {
        // Fail fast, before any ledger mutation
        validate_quantity(input.quantity).map_err(|_| AppError::InvalidQuantity(input.quantity))?;
        let route =
            MovementRoute::resolve(input.movement_type, input.warehouse_from, input.warehouse_to)
                .map_err(AppError::InvalidMovementShape)?;

        self.ensure_product_exists(input.product).await?;
        for warehouse_id in [route.warehouse_from(), route.warehouse_to()]
            .into_iter()
            .flatten()
        {
            self.ensure_warehouse_exists(warehouse_id).await?;
        }

        let mut tx = self.db.begin().await?;

        // Deltas are merged per warehouse and sorted by warehouse id, the
        // fixed lock acquisition order.
        for delta in merge_deltas(route.apply_deltas(input.quantity)) {
            InventoryService::adjust(&mut *tx, input.product, delta.warehouse_id, delta.delta)
                .await?;
        }

        let movement_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO movements (movement_type, product_id, warehouse_from, warehouse_to, quantity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.movement_type.as_str())
        .bind(input.product)
        .bind(route.warehouse_from())
        .bind(route.warehouse_to())
        .bind(input.quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(movement_id).await
    }

    /// Update a movement, adjusting balances by the difference between the
    /// old and the new effect
    ///
    /// The old effect is reversed and the new one applied as a single set of
    /// net deltas per warehouse, so a quantity-only edit does not
    /// double-count and a transfer whose warehouse pair changes restores both
    /// old balances before charging the new pair.
    pub async fn update(
        &self,
        movement_id: Uuid,
        input: UpdateMovementInput,
    ) -> AppResult<MovementWithDetail> {
        let existing = self.fetch(movement_id).await?;
        let old_route = existing.route()?;

        // Merge partial input over the stored movement
        let movement_type = input.movement_type.unwrap_or(old_route.movement_type());
        let quantity = input.quantity.unwrap_or(existing.quantity);
        let warehouse_from = input.warehouse_from.or(existing.warehouse_from);
        let warehouse_to = input.warehouse_to.or(existing.warehouse_to);

        validate_quantity(quantity).map_err(|_| AppError::InvalidQuantity(quantity))?;
        let new_route = MovementRoute::resolve(movement_type, warehouse_from, warehouse_to)
            .map_err(AppError::InvalidMovementShape)?;

        for warehouse_id in [new_route.warehouse_from(), new_route.warehouse_to()]
            .into_iter()
            .flatten()
        {
            self.ensure_warehouse_exists(warehouse_id).await?;
        }

        let mut tx = self.db.begin().await?;

        for delta in transition_deltas(&old_route, existing.quantity, &new_route, quantity) {
            InventoryService::adjust(
                &mut *tx,
                existing.product_id,
                delta.warehouse_id,
                delta.delta,
            )
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE movements
            SET movement_type = $1, warehouse_from = $2, warehouse_to = $3, quantity = $4,
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(movement_type.as_str())
        .bind(new_route.warehouse_from())
        .bind(new_route.warehouse_to())
        .bind(quantity)
        .bind(movement_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get(movement_id).await
    }

    /// Delete a movement, reversing its balance effects first
    ///
    /// A reversal that would drive a balance negative (stock already
    /// consumed elsewhere) fails with `InsufficientStock` and the movement
    /// is retained.
    pub async fn delete(&self, movement_id: Uuid) -> AppResult<()> {
        let existing = self.fetch(movement_id).await?;
        let route = existing.route()?;

        let mut tx = self.db.begin().await?;

        for delta in merge_deltas(route.reversal_deltas(existing.quantity)) {
            InventoryService::adjust(
                &mut *tx,
                existing.product_id,
                delta.warehouse_id,
                delta.delta,
            )
            .await?;
        }

        sqlx::query("DELETE FROM movements WHERE id = $1")
            .bind(movement_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Get a movement by id with product and warehouse names
    pub async fn get(&self, movement_id: Uuid) -> AppResult<MovementWithDetail> {
        let row = sqlx::query_as::<_, MovementWithDetail>(
            r#"
            SELECT m.id, m.movement_type, m.product_id, p.name AS product_name,
                   m.warehouse_from, wf.name AS warehouse_from_name,
                   m.warehouse_to, wt.name AS warehouse_to_name,
                   m.quantity, m.created_at, m.updated_at
            FROM movements m
            JOIN products p ON p.id = m.product_id
            LEFT JOIN warehouses wf ON wf.id = m.warehouse_from
            LEFT JOIN warehouses wt ON wt.id = m.warehouse_to
            WHERE m.id = $1
            "#,
        )
        .bind(movement_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))?;

        Ok(row)
    }

    /// List movements, newest first
    pub async fn list(
        &self,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<MovementWithDetail>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movements")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, MovementWithDetail>(
            r#"
            SELECT m.id, m.movement_type, m.product_id, p.name AS product_name,
                   m.warehouse_from, wf.name AS warehouse_from_name,
                   m.warehouse_to, wt.name AS warehouse_to_name,
                   m.quantity, m.created_at, m.updated_at
            FROM movements m
            JOIN products p ON p.id = m.product_id
            LEFT JOIN warehouses wf ON wf.id = m.warehouse_from
            LEFT JOIN warehouses wt ON wt.id = m.warehouse_to
            ORDER BY m.created_at DESC
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

    /// Fetch the raw movement row used by the update and delete paths
    async fn fetch(&self, movement_id: Uuid) -> AppResult<Movement> {
        sqlx::query_as::<_, Movement>(
            r#"
            SELECT id, movement_type, product_id, warehouse_from, warehouse_to, quantity,
                   created_at, updated_at
            FROM movements
            WHERE id = $1
            "#,
        )
        .bind(movement_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Movement".to_string()))
    }

    async fn ensure_product_exists(&self, product_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(product_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Product".to_string()));
        }
        Ok(())
    }

    async fn ensure_warehouse_exists(&self, warehouse_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1)")
                .bind(warehouse_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }
        Ok(())
    }
}
