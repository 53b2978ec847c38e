use std::sync::Arc;

use axum::{
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post, put, MethodRouter},
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, validate_input, AppJson};
use crate::{
    auth::{role_middleware, AuthRouterExt, AuthUser},
    entities::user::Role,
    errors::ServiceError,
    handlers::AppState,
    models::{
        CreateProjectRequest, CreateTemplateRequest, MessageResponse, ProjectResponse,
        TemplateResponse, UpdateProjectRequest, UpdateTemplateRequest,
    },
};

const TEMPLATE_EDITORS: [Role; 2] = [Role::Admin, Role::Designer];

#[utoipa::path(
    get,
    path = "/api/projects/templates",
    tag = "projects",
    responses(
        (status = 200, description = "Templates ordered by name", body = [TemplateResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let templates = state.services.projects.list_templates().await?;
    Ok(Json(
        templates
            .into_iter()
            .map(TemplateResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/projects/templates",
    tag = "projects",
    request_body = CreateTemplateRequest,
    responses(
        (status = 201, description = "Template created", body = TemplateResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin or designer role required", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_template(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateTemplateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let template = state.services.projects.create_template(request).await?;
    Ok(created_response(TemplateResponse::from(template)))
}

#[utoipa::path(
    put,
    path = "/api/projects/templates/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Template id")),
    request_body = UpdateTemplateRequest,
    responses(
        (status = 200, description = "Template updated", body = TemplateResponse),
        (status = 403, description = "Admin or designer role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<UpdateTemplateRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let template = state.services.projects.update_template(id, request).await?;
    Ok(Json(TemplateResponse::from(template)))
}

#[utoipa::path(
    delete,
    path = "/api/projects/templates/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Template id")),
    responses(
        (status = 200, description = "Template deleted", body = MessageResponse),
        (status = 403, description = "Admin or designer role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.projects.delete_template(id).await?;
    Ok(Json(MessageResponse::new("template deleted")))
}

#[utoipa::path(
    get,
    path = "/api/projects",
    tag = "projects",
    responses(
        (status = 200, description = "Projects, newest first", body = [ProjectResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.projects.list_projects().await?))
}

#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.projects.get_project(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/projects",
    tag = "projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = ProjectResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Template not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_project(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<CreateProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let project = state
        .services
        .projects
        .create_project(user.user_id, request)
        .await?;
    Ok(created_response(project))
}

#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<UpdateProjectRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    Ok(Json(state.services.projects.update_project(id, request).await?))
}

#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted", body = MessageResponse),
        (status = 404, description = "Project not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.projects.delete_project(id).await?;
    Ok(Json(MessageResponse::new("project deleted")))
}

/// Restricts a method router to template editors. Authentication is applied by the enclosing router.
fn template_editors_only(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    let allowed: Arc<[Role]> = Arc::from(&TEMPLATE_EDITORS[..]);
    route.route_layer(middleware::from_fn_with_state(allowed, role_middleware))
}

pub fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/templates",
            get(list_templates).merge(template_editors_only(post(create_template))),
        )
        .route(
            "/templates/:id",
            template_editors_only(put(update_template).delete(delete_template)),
        )
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .with_auth()
}
