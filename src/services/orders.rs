use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::clean;
use crate::{
    db::DbPool,
    entities::{
        client,
        order::{
            self, OrderStatus, DEFAULT_PAYMENT_CONDITION, DEFAULT_PAYMENT_METHOD,
            DEFAULT_VALIDITY_DAYS, FIRST_ORDER_NUMBER,
        },
        order_item, product,
    },
    errors::ServiceError,
    models::{CreateOrderRequest, OrderItemRequest, OrderResponse, UpdateOrderRequest},
    pricing::{check_amount, LinePricing, OrderTotals, MAX_LINES},
};

/// Attempts at claiming an order number before a create gives up.
const MAX_NUMBERING_ATTEMPTS: u32 = 8;

/// Proposals and their lines. Every write recomputes totals from the lines it stores.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

/// Next display number: one past the highest in use, or the first number.
async fn next_order_number<C: ConnectionTrait>(db: &C) -> Result<i32, DbErr> {
    let max: Option<Option<i32>> = order::Entity::find()
        .select_only()
        .column_as(Expr::col(order::Column::Number).max(), "max_number")
        .into_tuple()
        .one(db)
        .await?;

    Ok(max
        .flatten()
        .map_or(FIRST_ORDER_NUMBER, |n| (n + 1).max(FIRST_ORDER_NUMBER)))
}

/// A validated line with its computed total.
#[derive(Debug, Clone, Copy)]
struct PricedLine {
    product_id: Option<Uuid>,
    pricing: LinePricing,
    total: Decimal,
}

/// Validates and prices `items`. Create requires a product on every line; a
/// replacement set keeps lines whose product was deleted.
fn validate_lines(
    items: &[OrderItemRequest],
    require_product: bool,
) -> Result<Vec<PricedLine>, ServiceError> {
    if items.len() > MAX_LINES {
        return Err(ServiceError::ValidationError(format!(
            "an order holds at most {} items",
            MAX_LINES
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if require_product && item.product_id.is_none() {
                return Err(ServiceError::ValidationError(format!(
                    "items[{}].productId is required",
                    i
                )));
            }
            let pricing = item.pricing();
            pricing
                .validate()
                .map_err(|msg| ServiceError::ValidationError(format!("items[{}]: {}", i, msg)))?;
            Ok(PricedLine {
                product_id: item.product_id,
                pricing,
                total: pricing.total()?,
            })
        })
        .collect()
}

fn check_header_amount(field: &str, value: Decimal) -> Result<Decimal, ServiceError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    check_amount(value)
        .map_err(|msg| ServiceError::ValidationError(format!("{} {}", field, msg)))?;
    Ok(value)
}

fn compute_totals(
    lines: &[PricedLine],
    freight: Decimal,
    tax_substitution: Decimal,
) -> Result<OrderTotals, ServiceError> {
    Ok(OrderTotals::compute(
        lines.iter().map(|line| line.pricing),
        check_header_amount("freight", freight)?,
        check_header_amount("taxSubstitution", tax_substitution)?,
    )?)
}

/// A concurrent create claimed the same number, or SQLite refused the write lock.
fn is_numbering_contention(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains("database is locked")
}

/// Inserts `lines` as the complete line set of `order_id`.
async fn insert_lines(
    txn: &DatabaseTransaction,
    order_id: Uuid,
    lines: &[PricedLine],
) -> Result<(), DbErr> {
    if lines.is_empty() {
        return Ok(());
    }

    let rows = lines.iter().enumerate().map(|(position, line)| order_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        product_id: Set(line.product_id),
        position: Set(position as i32),
        quantity: Set(line.pricing.quantity),
        unit_price: Set(line.pricing.unit_price),
        discount: Set(line.pricing.discount),
        total: Set(line.total),
    });

    order_item::Entity::insert_many(rows).exec(txn).await?;
    Ok(())
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Every order, newest first, with client and lines. Two queries regardless of order count.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderResponse>, ServiceError> {
        let db = &*self.db_pool;

        let orders = order::Entity::find()
            .find_also_related(client::Entity)
            .order_by_desc(order::Column::Number)
            .all(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list orders");
                ServiceError::DatabaseError(e)
            })?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = orders.iter().map(|(o, _)| o.id).collect();
        let mut lines_by_order: HashMap<Uuid, Vec<(order_item::Model, Option<product::Model>)>> =
            HashMap::new();
        for (item, product) in order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(ids))
            .find_also_related(product::Entity)
            .order_by_asc(order_item::Column::Position)
            .all(db)
            .await?
        {
            lines_by_order
                .entry(item.order_id)
                .or_default()
                .push((item, product));
        }

        Ok(orders
            .into_iter()
            .map(|(order, client)| {
                let lines = lines_by_order.remove(&order.id).unwrap_or_default();
                OrderResponse::assemble(order, client, lines)
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = &*self.db_pool;

        let (order, client) = order::Entity::find_by_id(id)
            .find_also_related(client::Entity)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;

        let lines = order_item::Entity::find()
            .filter(order_item::Column::OrderId.eq(id))
            .find_also_related(product::Entity)
            .order_by_asc(order_item::Column::Position)
            .all(db)
            .await?;

        Ok(OrderResponse::assemble(order, client, lines))
    }

    /// Creates a draft order and its lines in one transaction. A create that
    /// loses the race for the next number retries with a fresh one.
    #[instrument(skip(self, request), fields(client_id = ?request.client_id, items = request.items.len()))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let client_id = request
            .client_id
            .ok_or_else(|| ServiceError::ValidationError("clientId is required".to_string()))?;
        let lines = validate_lines(&request.items, true)?;
        let totals = compute_totals(&lines, request.freight, request.tax_substitution)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.insert_order(&request, client_id, &lines, &totals).await {
                Ok((order_id, number)) => {
                    info!(order_id = %order_id, number, total = %totals.total, "Order created");
                    return self.get_order(order_id).await;
                }
                Err(e) if attempt < MAX_NUMBERING_ATTEMPTS && is_numbering_contention(&e) => {
                    warn!(attempt, error = %e, "Order number contention, retrying");
                    tokio::time::sleep(Duration::from_millis(10 * u64::from(attempt))).await;
                }
                Err(e) => {
                    error!(error = %e, attempt, "Failed to create order");
                    return Err(ServiceError::from_write(e, "could not allocate an order number"));
                }
            }
        }
    }

    /// One attempt: claims the next number and writes header and lines.
    async fn insert_order(
        &self,
        request: &CreateOrderRequest,
        client_id: Uuid,
        lines: &[PricedLine],
        totals: &OrderTotals,
    ) -> Result<(Uuid, i32), DbErr> {
        let txn = self.db_pool.begin().await?;

        let number = next_order_number(&txn).await?;
        let order_id = Uuid::new_v4();
        let header = order::ActiveModel {
            id: Set(order_id),
            number: Set(number),
            date: Set(request.date.unwrap_or_else(|| Utc::now().date_naive())),
            client_id: Set(Some(client_id)),
            subtotal: Set(totals.subtotal),
            freight: Set(totals.freight),
            tax_substitution: Set(totals.tax_substitution),
            total_discount: Set(totals.total_discount),
            total: Set(totals.total),
            validity_days: Set(request.validity_days.unwrap_or(DEFAULT_VALIDITY_DAYS)),
            payment_condition: Set(clean(request.payment_condition.clone())
                .unwrap_or_else(|| DEFAULT_PAYMENT_CONDITION.to_string())),
            payment_method: Set(clean(request.payment_method.clone())
                .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string())),
            delivery_deadline: Set(clean(request.delivery_deadline.clone())),
            observations: Set(clean(request.observations.clone())),
            seller: Set(clean(request.seller.clone())),
            status: Set(OrderStatus::Draft),
            ..Default::default()
        };

        header.insert(&txn).await?;
        insert_lines(&txn, order_id, lines).await?;

        txn.commit().await?;
        Ok((order_id, number))
    }

    /// Updates header fields and, when `items` is present, replaces every line.
    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let new_lines = request
            .items
            .as_deref()
            .map(|items| validate_lines(items, false))
            .transpose()?;

        let txn = self.db_pool.begin().await?;

        let existing = order::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Order", id))?;

        let lines = match new_lines {
            Some(lines) => {
                order_item::Entity::delete_many()
                    .filter(order_item::Column::OrderId.eq(id))
                    .exec(&txn)
                    .await?;
                insert_lines(&txn, id, &lines).await?;
                lines
            }
            None => order_item::Entity::find()
                .filter(order_item::Column::OrderId.eq(id))
                .all(&txn)
                .await?
                .into_iter()
                .map(|item| {
                    let pricing = LinePricing::new(item.quantity, item.unit_price, item.discount);
                    PricedLine {
                        product_id: item.product_id,
                        pricing,
                        total: item.total,
                    }
                })
                .collect(),
        };

        let totals = compute_totals(
            &lines,
            request.freight.unwrap_or(existing.freight),
            request.tax_substitution.unwrap_or(existing.tax_substitution),
        )?;

        let mut header: order::ActiveModel = existing.into();
        if let Some(date) = request.date {
            header.date = Set(date);
        }
        if let Some(client_id) = request.client_id {
            header.client_id = Set(Some(client_id));
        }
        if let Some(validity_days) = request.validity_days {
            header.validity_days = Set(validity_days);
        }
        if let Some(condition) = clean(request.payment_condition) {
            header.payment_condition = Set(condition);
        }
        if let Some(method) = clean(request.payment_method) {
            header.payment_method = Set(method);
        }
        if request.delivery_deadline.is_some() {
            header.delivery_deadline = Set(clean(request.delivery_deadline));
        }
        if request.observations.is_some() {
            header.observations = Set(clean(request.observations));
        }
        if request.seller.is_some() {
            header.seller = Set(clean(request.seller));
        }
        if let Some(status) = request.status {
            header.status = Set(status);
        }
        header.subtotal = Set(totals.subtotal);
        header.freight = Set(totals.freight);
        header.tax_substitution = Set(totals.tax_substitution);
        header.total_discount = Set(totals.total_discount);
        header.total = Set(totals.total);

        header.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %id, "Failed to update order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await?;
        info!(order_id = %id, total = %totals.total, "Order updated");

        self.get_order(id).await
    }

    /// Deletes an order together with its lines.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        order_item::Entity::delete_many()
            .filter(order_item::Column::OrderId.eq(id))
            .exec(&txn)
            .await?;

        let result = order::Entity::delete_by_id(id).exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Order", id));
        }

        txn.commit().await?;
        info!(order_id = %id, "Order deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection, run_migrations};
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn line(quantity: rust_decimal::Decimal) -> OrderItemRequest {
        OrderItemRequest {
            product_id: Some(Uuid::new_v4()),
            quantity,
            unit_price: dec!(10),
            discount: dec!(0),
        }
    }

    #[test]
    fn line_validation_reports_the_offending_index() {
        let mut items = vec![line(dec!(1)), line(dec!(0))];
        assert_matches!(
            validate_lines(&items, true),
            Err(ServiceError::ValidationError(msg)) if msg.starts_with("items[1]")
        );

        items[1].quantity = dec!(2);
        items[0].product_id = None;
        assert_matches!(
            validate_lines(&items, true),
            Err(ServiceError::ValidationError(msg)) if msg == "items[0].productId is required"
        );

        let replacement = validate_lines(&items, false).unwrap();
        assert_eq!(replacement[0].product_id, None);
        assert_eq!(replacement[1].total, dec!(20));
    }

    #[test]
    fn oversized_inputs_are_rejected_before_arithmetic() {
        let mut huge = line(dec!(1000000000000000));
        huge.unit_price = dec!(1000000000000000);
        assert_matches!(
            validate_lines(&[huge], true),
            Err(ServiceError::ValidationError(msg)) if msg.starts_with("items[0]: quantity")
        );

        assert_matches!(
            compute_totals(&[], rust_decimal::Decimal::MAX, dec!(0)),
            Err(ServiceError::ValidationError(msg)) if msg.starts_with("freight")
        );

        let too_many = vec![line(dec!(1)); MAX_LINES + 1];
        assert_matches!(validate_lines(&too_many, true), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn only_number_collisions_and_lock_refusals_are_retried() {
        assert!(is_numbering_contention(&DbErr::Custom(
            "error returned from database: (code: 5) database is locked".into()
        )));
        assert!(!is_numbering_contention(&DbErr::Custom(
            "FOREIGN KEY constraint failed".into()
        )));
    }

    #[tokio::test]
    async fn numbering_starts_at_first_order_number() {
        let pool = establish_connection("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        assert_eq!(next_order_number(&pool).await.unwrap(), FIRST_ORDER_NUMBER);
    }
}
