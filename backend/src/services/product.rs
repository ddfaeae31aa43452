//! Product management service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::EntityStatus;
use shared::types::{PaginatedResponse, Pagination, PaginationMeta};
use shared::validation::validate_name;

/// Product service for plain CRUD over the product catalog
#[derive(Clone)]
pub struct ProductService {
    db: PgPool,
}

/// Product row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub status: String,
    pub unit_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a product with its category
#[derive(Debug, Clone, sqlx::FromRow)]
struct ProductWithCategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub status: String,
    pub unit_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its category embedded for API responses
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithCategory {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<CategorySummary>,
    pub status: String,
    pub unit_price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category reference embedded in product responses
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

impl From<ProductWithCategoryRow> for ProductWithCategory {
    fn from(row: ProductWithCategoryRow) -> Self {
        let category = match (row.category_id, row.category_name) {
            (Some(id), Some(name)) => Some(CategorySummary { id, name }),
            _ => None,
        };

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category,
            status: row.status,
            unit_price: row.unit_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub status: Option<EntityStatus>,
    pub unit_price: Option<Decimal>,
}

/// Input for updating a product
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub status: Option<EntityStatus>,
    pub unit_price: Option<Decimal>,
}

impl ProductService {
    /// Create a new ProductService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List products (plain rows, category by reference)
    pub async fn list(&self, pagination: Pagination) -> AppResult<PaginatedResponse<Product>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
            .fetch_one(&self.db)
            .await?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, category_id, status, unit_price, created_at, updated_at
            FROM products
            ORDER BY name
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        Ok(PaginatedResponse {
            data: products,
            pagination: PaginationMeta::new(pagination, total as u64),
        })
    }

    /// Get a product by id with its category embedded
    pub async fn get(&self, product_id: Uuid) -> AppResult<ProductWithCategory> {
        let row = sqlx::query_as::<_, ProductWithCategoryRow>(
            r#"
            SELECT p.id, p.name, p.description, p.category_id, c.name AS category_name,
                   p.status, p.unit_price, p.created_at, p.updated_at
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(ProductWithCategory::from(row))
    }

    /// Create a product
    pub async fn create(&self, input: CreateProductInput) -> AppResult<ProductWithCategory> {
        validate_name(&input.name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(category_id) = input.category {
            self.ensure_category_exists(category_id).await?;
        }

        let product_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, description, category_id, status, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.category)
        .bind(input.status.unwrap_or_default().as_str())
        .bind(input.unit_price)
        .fetch_one(&self.db)
        .await?;

        self.get(product_id).await
    }

    /// Update a product; absent fields keep their stored values
    pub async fn update(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> AppResult<ProductWithCategory> {
        let existing = self.get(product_id).await?;

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let category_id = input.category.or(existing.category.map(|c| c.id));
        let status = input
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or(existing.status);
        let unit_price = input.unit_price.or(existing.unit_price);

        validate_name(&name).map_err(|msg| AppError::Validation {
            field: "name".to_string(),
            message: msg.to_string(),
        })?;

        if let Some(category_id) = input.category {
            self.ensure_category_exists(category_id).await?;
        }

        sqlx::query(
            r#"
            UPDATE products
            SET name = $1, description = $2, category_id = $3, status = $4, unit_price = $5,
                updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(&name)
        .bind(&description)
        .bind(category_id)
        .bind(&status)
        .bind(unit_price)
        .bind(product_id)
        .execute(&self.db)
        .await?;

        self.get(product_id).await
    }

    /// Delete a product
    pub async fn delete(&self, product_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(product_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    async fn ensure_category_exists(&self, category_id: Uuid) -> AppResult<()> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(category_id)
                .fetch_one(&self.db)
                .await?;

        if !exists {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(())
    }
}
