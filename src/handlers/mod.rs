pub mod auth;
pub mod clients;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;
pub mod projects;
pub mod uploads;
pub mod users;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        ClientService, OrderService, ProductService, ProjectService, UploadService, UserService,
    },
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub clients: Arc<ClientService>,
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
    pub projects: Arc<ProjectService>,
    pub uploads: Arc<UploadService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            products: Arc::new(ProductService::new(db_pool.clone())),
            clients: Arc::new(ClientService::new(db_pool.clone())),
            orders: Arc::new(OrderService::new(db_pool.clone())),
            users: Arc::new(UserService::new(db_pool.clone())),
            projects: Arc::new(ProjectService::new(db_pool)),
            uploads: Arc::new(UploadService::new(
                config.upload_dir.clone(),
                config.upload_max_bytes,
            )),
        }
    }
}
