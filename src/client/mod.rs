//! Typed HTTP client for the API.
//!
//! [`ApiClient`] holds the base URL and bearer token. [`EntityStore`] keeps a
//! local copy of one resource collection in sync with the server, and
//! [`OrderForm`] prices a proposal while it is being edited.

mod order_form;
mod store;

pub use order_form::{FormLine, OrderForm};
pub use store::EntityStore;

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    AuthResponse, ClientResponse, CreateClientRequest, CreateOrderRequest, CreateProductRequest,
    CreateUserRequest, LoginRequest, MessageResponse, OrderResponse, ProductResponse,
    UpdateClientRequest, UpdateOrderRequest, UpdateProductRequest, UpdateUserRequest,
    UserResponse,
};
use crate::pricing::PricingError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },
    #[error("Order line {0} does not exist")]
    LineOutOfRange(usize),
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::LineOutOfRange(_) | ClientError::Pricing(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// A collection the API exposes under `/api{PATH}` with list, create, update and delete.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Send + Sync;

    const PATH: &'static str;

    fn id(&self) -> Uuid;
}

impl Resource for ProductResponse {
    type Create = CreateProductRequest;
    type Update = UpdateProductRequest;
    const PATH: &'static str = "/products";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for ClientResponse {
    type Create = CreateClientRequest;
    type Update = UpdateClientRequest;
    const PATH: &'static str = "/clients";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for OrderResponse {
    type Create = CreateOrderRequest;
    type Update = UpdateOrderRequest;
    const PATH: &'static str = "/orders";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Resource for UserResponse {
    type Create = CreateUserRequest;
    type Update = UpdateUserRequest;
    const PATH: &'static str = "/users";

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Cheap to clone; clones share the bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Logs in and keeps the returned token for every later request.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.post("/auth/login", &body).await?;
        self.set_token(Some(auth.token.clone())).await;
        Ok(auth)
    }

    pub async fn logout(&self) {
        self.set_token(None).await;
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<MessageResponse, ClientError> {
        self.send::<(), MessageResponse>(Method::DELETE, path, None)
            .await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/api{}", self.base_url, path);
        let mut request = self.http.request(method, &url);
        if let Some(token) = self.token.read().await.as_deref() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string(),
            };
            return Err(ClientError::Api { status, message });
        }

        Ok(response.json().await?)
    }
}
