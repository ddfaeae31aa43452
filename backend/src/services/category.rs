//! Category management service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::EntityStatus;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_name;

/// Category service for plain CRUD over product categories
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

/// Category row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<EntityStatus>,
}

/// Input for updating a category
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<EntityStatus>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List categories
    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResponse<Category>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.db)
            .await?;

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, status, created_at, updated_at
            FROM categories
            ORDER BY name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: categories,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Get a category by id
    pub async fn get(&self, category_id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, status, created_at, updated_at FROM categories WHERE id = $1",
        )
        .bind(category_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    /// Create a category
    pub async fn create(&self, input: CreateCategoryInput) -> AppResult<Category> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, status)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.status.unwrap_or_default().as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// Update a category; absent fields keep their stored values
    pub async fn update(
        &self,
        category_id: Uuid,
        input: UpdateCategoryInput,
    ) -> AppResult<Category> {
        let existing = self.get(category_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $1, description = $2, status = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, description, status, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(&status)
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    /// Delete a category. Products referencing it fall back to no category
    /// via the ON DELETE SET NULL constraint.
    pub async fn delete(&self, category_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }
}
