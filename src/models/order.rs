use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::amount;
use crate::entities::{client, order, order::OrderStatus, order_item, product};
use crate::pricing::LinePricing;

fn positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    amount(value)
}

/// One line of an order payload. Line totals are always computed by the server.
///
/// `productId` is required on create. A replacement line set may carry `null`
/// for a line whose product has since been deleted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    #[serde(default)]
    pub product_id: Option<Uuid>,
    #[validate(custom = "positive")]
    pub quantity: Decimal,
    #[serde(default)]
    #[validate(custom = "amount")]
    pub unit_price: Decimal,
    /// Per-unit discount
    #[serde(default)]
    #[validate(custom = "amount")]
    pub discount: Decimal,
}

impl OrderItemRequest {
    pub fn pricing(&self) -> LinePricing {
        LinePricing::new(self.quantity, self.unit_price, self.discount)
    }
}

/// New proposal. Any `subtotal`, `total` or `status` sent by the caller is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(required)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    #[validate]
    pub items: Vec<OrderItemRequest>,
    #[serde(default)]
    #[validate(custom = "amount")]
    pub freight: Decimal,
    #[serde(default)]
    #[validate(custom = "amount")]
    pub tax_substitution: Decimal,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub validity_days: Option<i32>,
    #[serde(default)]
    pub payment_condition: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub delivery_deadline: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
}

/// Header fields present here overwrite the stored ones. A present `items`
/// array, even an empty one, replaces every stored line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
    pub date: Option<NaiveDate>,
    pub client_id: Option<Uuid>,
    pub items: Option<Vec<OrderItemRequest>>,
    #[validate(custom = "amount")]
    pub freight: Option<Decimal>,
    #[validate(custom = "amount")]
    pub tax_substitution: Option<Decimal>,
    #[validate(range(min = 0))]
    pub validity_days: Option<i32>,
    pub payment_condition: Option<String>,
    pub payment_method: Option<String>,
    pub delivery_deadline: Option<String>,
    pub observations: Option<String>,
    pub seller: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Client fields embedded in an order. A deleted client renders as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderClientSummary {
    pub id: Option<Uuid>,
    pub name: String,
    pub tax_id: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub email: String,
}

impl From<Option<client::Model>> for OrderClientSummary {
    fn from(model: Option<client::Model>) -> Self {
        let Some(c) = model else {
            return Self::default();
        };
        Self {
            id: Some(c.id),
            name: c.name,
            tax_id: c.tax_id.unwrap_or_default(),
            address: c.address.unwrap_or_default(),
            neighborhood: c.neighborhood.unwrap_or_default(),
            city: c.city.unwrap_or_default(),
            state: c.state.unwrap_or_default(),
            phone: c.phone.unwrap_or_default(),
            email: c.email.unwrap_or_default(),
        }
    }
}

/// Product fields embedded in an order line. A deleted product renders as zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderProductSummary {
    pub id: Option<Uuid>,
    pub code: String,
    pub name: String,
    pub description: String,
    pub unit: String,
    pub cost_price: Decimal,
    pub sale_price: Decimal,
    pub convention_price: Decimal,
    pub image_url: String,
    pub active: bool,
}

impl From<Option<product::Model>> for OrderProductSummary {
    fn from(model: Option<product::Model>) -> Self {
        match model {
            Some(p) => Self {
                id: Some(p.id),
                code: p.code,
                name: p.name,
                description: p.description.unwrap_or_default(),
                unit: p.unit,
                cost_price: p.cost_price,
                sale_price: p.sale_price,
                convention_price: p.convention_price,
                image_url: p.image_url.unwrap_or_default(),
                active: p.active,
            },
            None => Self {
                id: None,
                code: String::new(),
                name: String::new(),
                description: String::new(),
                unit: "PC".to_string(),
                cost_price: Decimal::ZERO,
                sale_price: Decimal::ZERO,
                convention_price: Decimal::ZERO,
                image_url: String::new(),
                active: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Option<Uuid>,
    pub product: OrderProductSummary,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl From<(order_item::Model, Option<product::Model>)> for OrderItemResponse {
    fn from((item, product): (order_item::Model, Option<product::Model>)) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product: product.into(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            total: item.total,
        }
    }
}

/// An order with its client and lines, as returned by every order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub number: i32,
    pub date: NaiveDate,
    pub client_id: Option<Uuid>,
    pub client: OrderClientSummary,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: Decimal,
    pub freight: Decimal,
    pub tax_substitution: Decimal,
    pub total_discount: Decimal,
    pub total: Decimal,
    pub validity_days: i32,
    pub payment_condition: String,
    pub payment_method: String,
    pub delivery_deadline: Option<String>,
    pub observations: Option<String>,
    pub seller: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn assemble(
        order: order::Model,
        client: Option<client::Model>,
        items: Vec<(order_item::Model, Option<product::Model>)>,
    ) -> Self {
        Self {
            id: order.id,
            number: order.number,
            date: order.date,
            client_id: order.client_id,
            client: client.into(),
            items: items.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: order.subtotal,
            freight: order.freight,
            tax_substitution: order.tax_substitution,
            total_discount: order.total_discount,
            total: order.total,
            validity_days: order.validity_days,
            payment_condition: order.payment_condition,
            payment_method: order.payment_method,
            delivery_deadline: order.delivery_deadline,
            observations: order.observations,
            seller: order.seller,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_request_requires_client_and_valid_lines() {
        let missing_client: CreateOrderRequest =
            serde_json::from_value(serde_json::json!({ "items": [] })).unwrap();
        assert!(missing_client.validate().is_err());

        let bad_line: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "items": [{ "productId": Uuid::new_v4(), "quantity": 0, "unitPrice": 10 }]
        }))
        .unwrap();
        assert!(bad_line.validate().is_err());

        let ok: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "items": [{ "productId": Uuid::new_v4(), "quantity": 3, "unitPrice": 45 }],
            "total": 999999
        }))
        .unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.items[0].pricing().total(), Ok(dec!(135)));
    }

    #[test]
    fn oversized_or_overprecise_amounts_fail_validation() {
        let huge: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "items": [{ "productId": Uuid::new_v4(), "quantity": 1e15, "unitPrice": 1e15 }]
        }))
        .unwrap();
        assert!(huge.validate().is_err());

        let fine_grained: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "clientId": Uuid::new_v4(),
            "items": [{ "productId": Uuid::new_v4(), "quantity": 1.255, "unitPrice": 10 }]
        }))
        .unwrap();
        assert!(fine_grained.validate().is_err());

        let freight: UpdateOrderRequest =
            serde_json::from_value(serde_json::json!({ "freight": 1e12 })).unwrap();
        assert!(freight.validate().is_err());
    }

    #[test]
    fn replacement_lines_may_omit_the_product() {
        let update: UpdateOrderRequest = serde_json::from_value(serde_json::json!({
            "items": [{ "productId": null, "quantity": 2, "unitPrice": 10 }]
        }))
        .unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn missing_references_render_defaults() {
        let client = OrderClientSummary::from(None);
        assert_eq!(client.id, None);
        assert_eq!(client.name, "");

        let product = OrderProductSummary::from(None);
        assert_eq!(product.id, None);
        assert_eq!(product.convention_price, Decimal::ZERO);
        assert_eq!(product.unit, "PC");
        assert_eq!(product.description, "");
        assert!(product.active);
    }
}
