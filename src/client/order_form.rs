use rust_decimal::Decimal;
use uuid::Uuid;

use super::{ClientError, EntityStore};
use crate::entities::order::{
    DEFAULT_PAYMENT_CONDITION, DEFAULT_PAYMENT_METHOD, DEFAULT_VALIDITY_DAYS,
};
use crate::models::{
    CreateOrderRequest, OrderItemRequest, OrderResponse, ProductResponse, UpdateOrderRequest,
};
use crate::pricing::{LinePricing, OrderTotals, PricingError};

/// One editable line. `total` follows every edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLine {
    pub product_id: Option<Uuid>,
    pub product_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

impl FormLine {
    /// One unit, no discount: the line total is the convention price.
    fn for_product(product: &ProductResponse) -> Self {
        Self {
            product_id: Some(product.id),
            product_name: product.name.clone(),
            quantity: Decimal::ONE,
            unit_price: product.convention_price,
            discount: Decimal::ZERO,
            total: product.convention_price,
        }
    }

    fn pricing(&self) -> LinePricing {
        LinePricing::new(self.quantity, self.unit_price, self.discount)
    }
}

/// Proposal being edited before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderForm {
    pub client_id: Option<Uuid>,
    lines: Vec<FormLine>,
    pub freight: Decimal,
    pub tax_substitution: Decimal,
    pub validity_days: i32,
    pub payment_condition: String,
    pub payment_method: String,
    pub delivery_deadline: String,
    pub observations: String,
    pub seller: String,
}

impl Default for OrderForm {
    fn default() -> Self {
        Self {
            client_id: None,
            lines: Vec::new(),
            freight: Decimal::ZERO,
            tax_substitution: Decimal::ZERO,
            validity_days: DEFAULT_VALIDITY_DAYS,
            payment_condition: DEFAULT_PAYMENT_CONDITION.to_string(),
            payment_method: DEFAULT_PAYMENT_METHOD.to_string(),
            delivery_deadline: String::new(),
            observations: String::new(),
            seller: String::new(),
        }
    }
}

impl OrderForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a stored order for editing. Lines whose product was deleted keep
    /// `product_id: None` and are sent back as they are.
    pub fn from_order(order: &OrderResponse) -> Self {
        let lines = order
            .items
            .iter()
            .map(|item| FormLine {
                product_id: item.product_id,
                product_name: item.product.name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                discount: item.discount,
                total: item.total,
            })
            .collect();

        Self {
            client_id: order.client_id,
            lines,
            freight: order.freight,
            tax_substitution: order.tax_substitution,
            validity_days: order.validity_days,
            payment_condition: order.payment_condition.clone(),
            payment_method: order.payment_method.clone(),
            delivery_deadline: order.delivery_deadline.clone().unwrap_or_default(),
            observations: order.observations.clone().unwrap_or_default(),
            seller: order.seller.clone().unwrap_or_default(),
        }
    }

    pub fn lines(&self) -> &[FormLine] {
        &self.lines
    }

    /// Appends one unit of `product` at its convention price. Returns the line index.
    pub fn add_line(&mut self, product: &ProductResponse) -> usize {
        self.lines.push(FormLine::for_product(product));
        self.lines.len() - 1
    }

    /// Switching product resets the unit price to the new product's convention price.
    pub fn set_product(
        &mut self,
        index: usize,
        product: &ProductResponse,
    ) -> Result<(), ClientError> {
        self.edit_line(index, |line| {
            line.product_id = Some(product.id);
            line.product_name = product.name.clone();
            line.unit_price = product.convention_price;
        })
    }

    pub fn set_quantity(&mut self, index: usize, quantity: Decimal) -> Result<(), ClientError> {
        self.edit_line(index, |line| line.quantity = quantity)
    }

    pub fn set_unit_price(&mut self, index: usize, unit_price: Decimal) -> Result<(), ClientError> {
        self.edit_line(index, |line| line.unit_price = unit_price)
    }

    pub fn set_discount(&mut self, index: usize, discount: Decimal) -> Result<(), ClientError> {
        self.edit_line(index, |line| line.discount = discount)
    }

    pub fn remove_line(&mut self, index: usize) -> Result<FormLine, ClientError> {
        if index >= self.lines.len() {
            return Err(ClientError::LineOutOfRange(index));
        }
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn totals(&self) -> Result<OrderTotals, PricingError> {
        OrderTotals::compute(
            self.lines.iter().map(FormLine::pricing),
            self.freight,
            self.tax_substitution,
        )
    }

    /// A proposal needs a client and at least one line before it is sent.
    pub fn is_submittable(&self) -> bool {
        self.client_id.is_some() && !self.lines.is_empty()
    }

    pub fn to_payload(&self) -> CreateOrderRequest {
        CreateOrderRequest {
            date: None,
            client_id: self.client_id,
            items: self.item_requests(),
            freight: self.freight,
            tax_substitution: self.tax_substitution,
            validity_days: Some(self.validity_days),
            payment_condition: Some(self.payment_condition.clone()),
            payment_method: Some(self.payment_method.clone()),
            delivery_deadline: non_empty(&self.delivery_deadline),
            observations: non_empty(&self.observations),
            seller: non_empty(&self.seller),
        }
    }

    /// Sends every header field and the full line set, which replaces the stored lines.
    pub fn to_update_payload(&self) -> UpdateOrderRequest {
        UpdateOrderRequest {
            client_id: self.client_id,
            items: Some(self.item_requests()),
            freight: Some(self.freight),
            tax_substitution: Some(self.tax_substitution),
            validity_days: Some(self.validity_days),
            payment_condition: Some(self.payment_condition.clone()),
            payment_method: Some(self.payment_method.clone()),
            delivery_deadline: Some(self.delivery_deadline.clone()),
            observations: Some(self.observations.clone()),
            seller: Some(self.seller.clone()),
            ..Default::default()
        }
    }

    /// Creates the order through `store` and resets the form on success.
    pub async fn submit(
        &mut self,
        store: &mut EntityStore<OrderResponse>,
    ) -> Result<OrderResponse, ClientError> {
        let created = store.create(&self.to_payload()).await?;
        self.clear();
        Ok(created)
    }

    fn item_requests(&self) -> Vec<OrderItemRequest> {
        self.lines
            .iter()
            .map(|line| OrderItemRequest {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                discount: line.discount,
            })
            .collect()
    }

    /// Applies `edit` to a copy of the line and keeps it only if it can be priced.
    fn edit_line<F>(&mut self, index: usize, edit: F) -> Result<(), ClientError>
    where
        F: FnOnce(&mut FormLine),
    {
        let line = self
            .lines
            .get_mut(index)
            .ok_or(ClientError::LineOutOfRange(index))?;
        let mut edited = line.clone();
        edit(&mut edited);
        edited.total = edited.pricing().total()?;
        *line = edited;
        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
