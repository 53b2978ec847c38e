use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::not_blank;
use crate::entities::{
    project::{self, ProjectStatus},
    project_template::{self, ProjectItem},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub items: Vec<ProjectItem>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<project_template::Model> for TemplateResponse {
    fn from(model: project_template::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            category: model.category,
            items: model.items.0,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplateRequest {
    #[serde(default)]
    #[validate(length(max = 255), custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub items: Vec<ProjectItem>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemplateRequest {
    #[validate(length(max = 255), custom = "not_blank")]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub items: Option<Vec<ProjectItem>>,
    pub active: Option<bool>,
}

/// A project with the display names of the records it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub client_id: Option<Uuid>,
    pub client_name: Option<String>,
    pub template_id: Option<Uuid>,
    pub template_name: Option<String>,
    pub description: Option<String>,
    pub items: Vec<ProjectItem>,
    pub status: ProjectStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub creator_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectResponse {
    pub fn assemble(
        model: project::Model,
        client_name: Option<String>,
        template_name: Option<String>,
        creator_name: Option<String>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            client_id: model.client_id,
            client_name,
            template_id: model.template_id,
            template_name,
            description: model.description,
            items: model.items.0,
            status: model.status,
            notes: model.notes,
            created_by: model.created_by,
            creator_name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// New project. Without `items`, the template's items are copied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    #[serde(default)]
    #[validate(length(max = 255), custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub template_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<ProjectItem>>,
    #[serde(default)]
    pub status: Option<ProjectStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    #[validate(length(max = 255), custom = "not_blank")]
    pub name: Option<String>,
    pub client_id: Option<Uuid>,
    pub template_id: Option<Uuid>,
    pub description: Option<String>,
    pub items: Option<Vec<ProjectItem>>,
    pub status: Option<ProjectStatus>,
    pub notes: Option<String>,
}
