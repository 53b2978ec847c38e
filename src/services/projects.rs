use std::collections::HashMap;
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
    entities::{
        client,
        project::{self, ProjectItems},
        project_template, user,
    },
    errors::ServiceError,
    models::{
        CreateProjectRequest, CreateTemplateRequest, ProjectResponse, UpdateProjectRequest,
        UpdateTemplateRequest,
    },
};

/// Lighting project templates and the projects built from them.
#[derive(Clone)]
pub struct ProjectService {
    db_pool: Arc<DbPool>,
}

impl ProjectService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list_templates(&self) -> Result<Vec<project_template::Model>, ServiceError> {
        project_template::Entity::find()
            .order_by_asc(project_template::Column::Name)
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list project templates");
                ServiceError::DatabaseError(e)
            })
    }

    #[instrument(skip(self))]
    pub async fn get_template(&self, id: Uuid) -> Result<project_template::Model, ServiceError> {
        project_template::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Template", id))
    }

    #[instrument(skip(self, request))]
    pub async fn create_template(
        &self,
        request: CreateTemplateRequest,
    ) -> Result<project_template::Model, ServiceError> {
        let model = project_template::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            description: Set(clean(request.description)),
            category: Set(clean(request.category)),
            items: Set(ProjectItems(request.items)),
            active: Set(request.active.unwrap_or(true)),
            ..Default::default()
        };

        let created = model.insert(&*self.db_pool).await?;
        info!(template_id = %created.id, "Project template created");
        Ok(created)
    }

    #[instrument(skip(self, request))]
    pub async fn update_template(
        &self,
        id: Uuid,
        request: UpdateTemplateRequest,
    ) -> Result<project_template::Model, ServiceError> {
        let mut model: project_template::ActiveModel = self.get_template(id).await?.into();

        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        if request.description.is_some() {
            model.description = Set(clean(request.description));
        }
        if request.category.is_some() {
            model.category = Set(clean(request.category));
        }
        if let Some(items) = request.items {
            model.items = Set(ProjectItems(items));
        }
        if let Some(active) = request.active {
            model.active = Set(active);
        }

        let updated = model.update(&*self.db_pool).await?;
        info!(template_id = %id, "Project template updated");
        Ok(updated)
    }

    /// Deletes a template. Projects created from it keep their copied items.
    #[instrument(skip(self))]
    pub async fn delete_template(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        project::Entity::update_many()
            .col_expr(project::Column::TemplateId, Expr::value(Option::<Uuid>::None))
            .filter(project::Column::TemplateId.eq(id))
            .exec(&txn)
            .await?;

        let result = project_template::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Template", id));
        }

        txn.commit().await?;
        info!(template_id = %id, "Project template deleted");
        Ok(())
    }

    /// Every project, newest first, with client, template and creator names.
    #[instrument(skip(self))]
    pub async fn list_projects(&self) -> Result<Vec<ProjectResponse>, ServiceError> {
        let db = &*self.db_pool;

        let projects = project::Entity::find()
            .order_by_desc(project::Column::CreatedAt)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list projects");
                ServiceError::DatabaseError(e)
            })?;

        let client_ids: Vec<Uuid> = projects.iter().filter_map(|p| p.client_id).collect();
        let template_ids: Vec<Uuid> = projects.iter().filter_map(|p| p.template_id).collect();
        let creator_ids: Vec<Uuid> = projects.iter().filter_map(|p| p.created_by).collect();

        let client_names: HashMap<Uuid, String> = if client_ids.is_empty() {
            HashMap::new()
        } else {
            client::Entity::find()
                .filter(client::Column::Id.is_in(client_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };
        let template_names: HashMap<Uuid, String> = if template_ids.is_empty() {
            HashMap::new()
        } else {
            project_template::Entity::find()
                .filter(project_template::Column::Id.is_in(template_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect()
        };
        let creator_names: HashMap<Uuid, String> = if creator_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(creator_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|u| (u.id, u.name))
                .collect()
        };

        Ok(projects
            .into_iter()
            .map(|p| {
                let client_name = p.client_id.and_then(|id| client_names.get(&id).cloned());
                let template_name = p.template_id.and_then(|id| template_names.get(&id).cloned());
                let creator_name = p.created_by.and_then(|id| creator_names.get(&id).cloned());
                ProjectResponse::assemble(p, client_name, template_name, creator_name)
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_project(&self, id: Uuid) -> Result<ProjectResponse, ServiceError> {
        let db = &*self.db_pool;
        let project = project::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;

        let client_name = match project.client_id {
            Some(cid) => client::Entity::find_by_id(cid).one(db).await?.map(|c| c.name),
            None => None,
        };
        let template_name = match project.template_id {
            Some(tid) => project_template::Entity::find_by_id(tid)
                .one(db)
                .await?
                .map(|t| t.name),
            None => None,
        };
        let creator_name = match project.created_by {
            Some(uid) => user::Entity::find_by_id(uid).one(db).await?.map(|u| u.name),
            None => None,
        };

        Ok(ProjectResponse::assemble(
            project,
            client_name,
            template_name,
            creator_name,
        ))
    }

    /// Creates a project owned by `created_by`. Without explicit items the template's are copied.
    #[instrument(skip(self, request))]
    pub async fn create_project(
        &self,
        created_by: Uuid,
        request: CreateProjectRequest,
    ) -> Result<ProjectResponse, ServiceError> {
        let items = match (request.items, request.template_id) {
            (Some(items), _) => items,
            (None, Some(template_id)) => self.get_template(template_id).await?.items.0,
            (None, None) => Vec::new(),
        };

        let model = project::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            client_id: Set(request.client_id),
            template_id: Set(request.template_id),
            description: Set(clean(request.description)),
            items: Set(ProjectItems(items)),
            status: Set(request.status.unwrap_or_default()),
            notes: Set(clean(request.notes)),
            created_by: Set(Some(created_by)),
            ..Default::default()
        };

        let created = model.insert(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, "Failed to create project");
            ServiceError::DatabaseError(e)
        })?;

        info!(project_id = %created.id, "Project created");
        self.get_project(created.id).await
    }

    #[instrument(skip(self, request))]
    pub async fn update_project(
        &self,
        id: Uuid,
        request: UpdateProjectRequest,
    ) -> Result<ProjectResponse, ServiceError> {
        let existing = project::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project", id))?;
        let mut model: project::ActiveModel = existing.into();

        if let Some(name) = request.name {
            model.name = Set(name.trim().to_string());
        }
        if request.client_id.is_some() {
            model.client_id = Set(request.client_id);
        }
        if request.template_id.is_some() {
            model.template_id = Set(request.template_id);
        }
        if request.description.is_some() {
            model.description = Set(clean(request.description));
        }
        if let Some(items) = request.items {
            model.items = Set(ProjectItems(items));
        }
        if let Some(status) = request.status {
            model.status = Set(status);
        }
        if request.notes.is_some() {
            model.notes = Set(clean(request.notes));
        }

        model.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, project_id = %id, "Failed to update project");
            ServiceError::DatabaseError(e)
        })?;

        info!(project_id = %id, "Project updated");
        self.get_project(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete_project(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = project::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Project", id));
        }

        info!(project_id = %id, "Project deleted");
        Ok(())
    }
}
