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
    entities::{client, order, project},
    errors::ServiceError,
    models::{CreateClientRequest, UpdateClientRequest},
};

#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<client::Model>, ServiceError> {
        client::Entity::find()
            .order_by_asc(client::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list clients");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_client(&self, id: Uuid) -> Result<client::Model, ServiceError> {
        client::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", id))
    }

    #[instrument(skip(self, request))]
    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> Result<client::Model, ServiceError> {
        let model = client::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            tax_id: Set(clean(request.tax_id)),
            address: Set(clean(request.address)),
            neighborhood: Set(clean(request.neighborhood)),
            city: Set(clean(request.city)),
            state: Set(clean(request.state)),
            phone: Set(clean(request.phone)),
            email: Set(clean(request.email)),
            ..Default::default()
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, "Failed to create client");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = %created.id, "Client created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_client(
        &self,
        id: Uuid,
        request: UpdateClientRequest,
    ) -> Result<client::Model, ServiceError> {
        let existing = self.get_client(id).await?;
        let mut model: client::ActiveModel = existing.into();

        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        // Present-but-blank clears an optional field.
        for (value, column) in [
            (request.tax_id, &mut model.tax_id),
            (request.address, &mut model.address),
            (request.neighborhood, &mut model.neighborhood),
            (request.city, &mut model.city),
            (request.state, &mut model.state),
            (request.phone, &mut model.phone),
            (request.email, &mut model.email),
        ] {
            if value.is_some() {
                *column = Set(clean(value));
            }
        }

        let updated = model.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, client_id = %id, "Failed to update client");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = %id, "Client updated");
        Ok(updated)
    }

    /// Deletes a client. Orders and projects addressed to it survive with a null reference.
    #[instrument(skip(self))]
    pub async fn delete_client(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        order::Entity::update_many()
            .col_expr(order::Column::ClientId, Expr::value(Option::<Uuid>::None))
            .filter(order::Column::ClientId.eq(id))
            .exec(&txn)
            .await?;
        project::Entity::update_many()
            .col_expr(project::Column::ClientId, Expr::value(Option::<Uuid>::None))
            .filter(project::Column::ClientId.eq(id))
            .exec(&txn)
            .await?;

        let result = client::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Client", id));
        }

        txn.commit().await?;
        info!(client_id = %id, "Client deleted");
        Ok(())
    }
}
