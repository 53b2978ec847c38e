use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tracing::info;

use super::common::{created_response, validate_input, AppJson};
use crate::{
    auth::{AuthRouterExt, AuthUser},
    errors::ServiceError,
    handlers::AppState,
    models::{
        AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
        UserResponse,
    },
};

fn auth_response(
    state: &AppState,
    user: crate::entities::user::Model,
) -> Result<AuthResponse, ServiceError> {
    let issued = state.auth.issue_token(&user)?;
    Ok(AuthResponse {
        token: issued.token,
        user: user.into(),
    })
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Missing email or password", body = crate::errors::ErrorResponse),
        (status = 401, description = "Invalid credentials or inactive account", body = crate::errors::ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let user = state
        .services
        .users
        .authenticate(&request.email, &request.password)
        .await?;
    Ok(Json(auth_response(&state, user)?))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role requested", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    let user = state.services.users.register(request).await?;
    info!(user_id = %user.id, "Account registered");
    Ok(created_response(auth_response(&state, user)?))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state.services.users.get_user(user.user_id).await?;
    Ok(Json(UserResponse::from(account)))
}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    tag = "auth",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = crate::errors::ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    validate_input(&request)?;
    state
        .services
        .users
        .change_password(user.user_id, &request.current_password, &request.new_password)
        .await?;
    Ok(Json(MessageResponse::new("password changed")))
}

pub fn auth_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route("/change-password", put(change_password))
        .with_auth();

    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .merge(protected)
}
