use std::sync::Arc;

use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::clean;
use crate::{
    db::DbPool,
    entities::{order_item, product},
    errors::ServiceError,
    models::{CreateProductRequest, UpdateProductRequest},
};

const DEFAULT_UNIT: &str = "PC";

/// Catalog management.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
}

impl ProductService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_asc(product::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list products");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Product", id))
    }

    /// Creates a product. A duplicate code is a conflict and leaves the existing row untouched.
    #[instrument(skip(self, request), fields(code = %request.code))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        let code = request.code.trim().to_string();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.clone()),
            name: Set(request.name.trim().to_string()),
            description: Set(clean(request.description)),
            cost_price: Set(request.cost_price),
            sale_price: Set(request.sale_price),
            convention_price: Set(request.convention_price),
            unit: Set(clean(request.unit).unwrap_or_else(|| DEFAULT_UNIT.to_string())),
            image_url: Set(clean(request.image_url)),
            active: Set(request.active.unwrap_or(true)),
            ..Default::default()
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, code = %code, "Failed to create product");
            ServiceError::from_write(e, format!("product code {} already exists", code))
        })?;

        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(id).await?;
        let mut model: product::ActiveModel = existing.into();

        let code = request.code.map(|c| c.trim().to_string());
        if let Some(code) = &code {
            model.code = Set(code.clone());
        }
        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        if request.description.is_some() {
            model.description = Set(clean(request.description));
        }
        if let Some(cost_price) = request.cost_price {
            model.cost_price = Set(cost_price);
        }
        if let Some(sale_price) = request.sale_price {
            model.sale_price = Set(sale_price);
        }
        if let Some(convention_price) = request.convention_price {
            model.convention_price = Set(convention_price);
        }
        if let Some(unit) = clean(request.unit) {
            model.unit = Set(unit);
        }
        if request.image_url.is_some() {
            model.image_url = Set(clean(request.image_url));
        }
        if let Some(active) = request.active {
            model.active = Set(active);
        }

        let updated = model.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, product_id = %id, "Failed to update product");
            ServiceError::from_write(
                e,
                format!("product code {} already exists", code.unwrap_or_default()),
            )
        })?;

        info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Deletes a product. Order lines that priced it keep their values and lose the reference.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        order_item::Entity::update_many()
            .col_expr(order_item::Column::ProductId, Expr::value(Option::<Uuid>::None))
            .filter(order_item::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;

        let result = product::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Product", id));
        }

        txn.commit().await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
