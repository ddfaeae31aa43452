//! Warehouse management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::EntityStatus;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_name;

/// Warehouse service for plain CRUD over storage locations
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

/// Warehouse row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a warehouse
#[derive(Debug, Deserialize)]
pub struct CreateWarehouseInput {
    pub name: String,
    pub address: String,
    pub status: Option<EntityStatus>,
}

/// Input for updating a warehouse
#[derive(Debug, Deserialize)]
pub struct UpdateWarehouseInput {
    pub name: Option<String>,
    pub address: Option<String>,
    pub status: Option<EntityStatus>,
}

impl WarehouseService {
    /// Create a new WarehouseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List warehouses
    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResponse<Warehouse>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM warehouses")
            .fetch_one(&self.db)
            .await?;

        let warehouses = sqlx::query_as::<_, Warehouse>(
            r#"
            SELECT id, name, address, status, created_at, updated_at
            FROM warehouses
            ORDER BY name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: warehouses,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Get a warehouse by id
    pub async fn get(&self, warehouse_id: Uuid) -> AppResult<Warehouse> {
        sqlx::query_as::<_, Warehouse>(
            "SELECT id, name, address, status, created_at, updated_at FROM warehouses WHERE id = $1",
        )
        .bind(warehouse_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Warehouse".to_string()))
    }

    /// Create a warehouse
    pub async fn create(&self, input: CreateWarehouseInput) -> AppResult<Warehouse> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, address, status)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.address)
        .bind(input.status.unwrap_or_default().as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(warehouse)
    }

    /// Update a warehouse; absent fields keep their stored values
    pub async fn update(
        &self,
        warehouse_id: Uuid,
        input: UpdateWarehouseInput,
    ) -> AppResult<Warehouse> {
        let existing = self.get(warehouse_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let address = input.address.unwrap_or(existing.address);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
            SET name = $1, address = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, address, status, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&address)
        .bind(&status)
        .bind(warehouse_id)
        .fetch_one(&self.db)
        .await?;

        Ok(warehouse)
    }

    /// Delete a warehouse
    pub async fn delete(&self, warehouse_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
            .bind(warehouse_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Warehouse".to_string()));
        }

        Ok(())
    }
}
