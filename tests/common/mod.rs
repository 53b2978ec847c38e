#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use enerlight_api::{
    config::AppConfig, db, entities::user::Role, models::CreateUserRequest, AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "t3st-Secr3t-For-Enerlight-Proposals-9xQ";
pub const ADMIN_EMAIL: &str = "admin@enerlight.test";
pub const SALES_EMAIL: &str = "vendas@enerlight.test";
pub const DESIGNER_EMAIL: &str = "projetos@enerlight.test";
pub const PASSWORD: &str = "senha-forte-123";

/// A seeded account and a valid bearer token for it.
#[derive(Clone, Debug)]
pub struct SeededUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

pub fn test_config(upload_dir: &str) -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        JWT_SECRET.to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
    );
    cfg.cors_allow_any_origin = true;
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg.upload_dir = upload_dir.to_string();
    cfg.upload_max_bytes = 64 * 1024;
    cfg
}

/// Application on a fresh in-memory SQLite database with one account per role.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub admin: SeededUser,
    pub salesperson: SeededUser,
    pub designer: SeededUser,
    upload_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let upload_dir = tempfile::tempdir().expect("create upload dir");
        let cfg = test_config(
            upload_dir
                .path()
                .to_str()
                .expect("upload dir path is valid utf-8"),
        );
        Self::start(cfg, upload_dir).await
    }

    /// Same accounts on a SQLite file with a pool of several connections, so
    /// requests run on separate sessions.
    pub async fn file_backed() -> Self {
        let upload_dir = tempfile::tempdir().expect("create upload dir");
        let dir = upload_dir
            .path()
            .to_str()
            .expect("upload dir path is valid utf-8")
            .to_string();
        let mut cfg = test_config(&dir);
        cfg.database_url = format!("sqlite://{dir}/enerlight.db?mode=rwc");
        cfg.db_max_connections = 8;
        Self::start(cfg, upload_dir).await
    }

    async fn start(cfg: AppConfig, upload_dir: TempDir) -> Self {
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let admin = seed_user(&state, "Ana Admin", ADMIN_EMAIL, Role::Admin).await;
        let salesperson = seed_user(&state, "Bruno Vendas", SALES_EMAIL, Role::Salesperson).await;
        let designer = seed_user(&state, "Carla Projetos", DESIGNER_EMAIL, Role::Designer).await;

        let router = enerlight_api::build_router(state.clone());

        Self {
            router,
            state,
            admin,
            salesperson,
            designer,
            upload_dir,
        }
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.state.db
    }

    pub fn upload_path(&self) -> &std::path::Path {
        self.upload_dir.path()
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        send(&self.router, method, uri, body, token).await
    }

    /// Convenience helper for requests made as the seeded admin.
    pub async fn as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(&self.admin.token)).await
    }

    pub async fn upload(
        &self,
        field: &str,
        content_type: &str,
        data: &[u8],
        token: Option<&str>,
    ) -> Response {
        let boundary = "enerlight-test-boundary";
        let mut payload = Vec::new();
        payload.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"proposta.pdf\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        payload.extend_from_slice(data);
        payload.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/api/uploads/pdf")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            );
        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let request = builder
            .body(Body::from(payload))
            .expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn create_product(&self, code: &str, convention_price: f64) -> Value {
        let response = self
            .as_admin(
                Method::POST,
                "/api/products",
                Some(serde_json::json!({
                    "code": code,
                    "name": format!("Produto {code}"),
                    "costPrice": cents(convention_price / 2.0),
                    "salePrice": cents(convention_price * 1.2),
                    "conventionPrice": convention_price,
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "seed product {code}");
        response_json(response).await
    }

    pub async fn create_client(&self, name: &str) -> Value {
        let response = self
            .as_admin(
                Method::POST,
                "/api/clients",
                Some(serde_json::json!({
                    "name": name,
                    "cnpj": "12.345.678/0001-90",
                    "city": "Campinas",
                    "state": "SP",
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "seed client {name}");
        response_json(response).await
    }
}

async fn seed_user(state: &AppState, name: &str, email: &str, role: Role) -> SeededUser {
    let user = state
        .services
        .users
        .create_user(CreateUserRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role: Some(role),
            active: Some(true),
        })
        .await
        .expect("seed user");
    let token = state.auth.issue_token(&user).expect("issue token").token;
    SeededUser {
        id: user.id,
        email: user.email,
        token,
    }
}

/// Rounds a seeded price to whole cents.
fn cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Router whose database connection is unusable. Anything that reaches the
/// database fails with 500.
pub fn disconnected_router() -> Router {
    let cfg = test_config(std::env::temp_dir().to_str().unwrap_or("/tmp"));
    let state = AppState::new(Arc::new(DatabaseConnection::Disconnected), cfg);
    enerlight_api::build_router(state)
}

pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(tok) = token {
        builder = builder.header("authorization", format!("Bearer {}", tok));
    }

    let body = if let Some(json) = body {
        builder = builder.header("content-type", "application/json");
        Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
    } else {
        Body::empty()
    };

    let request = builder.body(body).expect("failed to build request");
    router
        .clone()
        .oneshot(request)
        .await
        .expect("router error during test request")
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

/// Decimal fields travel as JSON numbers.
pub fn num(value: &Value) -> f64 {
    value
        .as_f64()
        .unwrap_or_else(|| panic!("expected a number, got {value}"))
}
