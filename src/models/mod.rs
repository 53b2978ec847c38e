//! Request and response bodies of the HTTP API, shared with the typed client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationError;

pub mod auth;
pub mod client;
pub mod order;
pub mod product;
pub mod project;
pub mod upload;
pub mod user;

pub use auth::*;
pub use client::*;
pub use order::*;
pub use product::*;
pub use project::*;
pub use upload::*;
pub use user::*;

/// Body of delete responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("is required".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Non-negative, at most two decimal places and within [`crate::pricing::max_amount`].
pub(crate) fn amount(value: &Decimal) -> Result<(), ValidationError> {
    non_negative(value)?;
    crate::pricing::check_amount(*value).map_err(|msg| {
        let mut err = ValidationError::new("amount");
        err.message = Some(msg.into());
        err
    })
}
