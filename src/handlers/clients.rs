use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::common::{created_response, validate_input, AppJson};
use crate::{
    auth::AuthRouterExt,
    errors::ServiceError,
    handlers::AppState,
    models::{CreateClientRequest, MessageResponse, ClientResponse, UpdateClientRequest},
};

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "clients",
    responses(
        (status = 200, description = "Clients ordered by name", body = [ClientResponse]),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let clients = state.services.clients.list_clients().await?;
    Ok(Json(
        clients
            .into_iter()
            .map(ClientResponse::from)
            .collect::<Vec<_>>(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client", body = ClientResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let client = state.services.clients.get_client(id).await?;
    Ok(Json(ClientResponse::from(client)))
}

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "clients",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Client created", body = ClientResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_client(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let client = state.services.clients.create_client(request).await?;
    Ok(created_response(ClientResponse::from(client)))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Client updated", body = ClientResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<UpdateClientRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let client = state.services.clients.update_client(id, request).await?;
    Ok(Json(ClientResponse::from(client)))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "clients",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client deleted; its orders and projects keep a null reference", body = MessageResponse),
        (status = 404, description = "Client not found", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.clients.delete_client(id).await?;
    Ok(Json(MessageResponse::new("client deleted")))
}

pub fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route(
            "/:id",
            get(get_client).put(update_client).delete(delete_client),
        )
        .with_auth()
}
