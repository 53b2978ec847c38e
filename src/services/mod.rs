//! Business operations over the database, one service per resource.

pub mod clients;
pub mod orders;
pub mod products;
pub mod projects;
pub mod uploads;
pub mod users;

pub use clients::ClientService;
pub use orders::OrderService;
pub use products::ProductService;
pub use projects::ProjectService;
pub use uploads::UploadService;
pub use users::UserService;

/// Trims a free-text field, turning blank strings into `None`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
