use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{amount, not_blank};
use crate::entities::product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub convention_price: Decimal,
    pub unit: String,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
            cost_price: model.cost_price,
            sale_price: model.sale_price,
            convention_price: model.convention_price,
            unit: model.unit,
            image_url: model.image_url,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    #[validate(length(max = 50), custom = "not_blank")]
    pub code: String,
    #[serde(default)]
    #[validate(length(max = 255), custom = "not_blank")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(custom = "amount")]
    pub cost_price: Decimal,
    #[serde(default)]
    #[validate(custom = "amount")]
    pub sale_price: Decimal,
    #[serde(default)]
    #[validate(custom = "amount")]
    pub convention_price: Decimal,
    /// Defaults to `PC`
    #[serde(default)]
    #[validate(length(min = 1, max = 10))]
    pub unit: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(max = 50), custom = "not_blank")]
    pub code: Option<String>,
    #[validate(length(max = 255), custom = "not_blank")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "amount")]
    pub cost_price: Option<Decimal>,
    #[validate(custom = "amount")]
    pub sale_price: Option<Decimal>,
    #[validate(custom = "amount")]
    pub convention_price: Option<Decimal>,
    #[validate(length(min = 1, max = 10))]
    pub unit: Option<String>,
    pub image_url: Option<String>,
    pub active: Option<bool>,
}
