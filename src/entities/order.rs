use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// First number handed out to a proposal.
pub const FIRST_ORDER_NUMBER: i32 = 9200;

pub const DEFAULT_VALIDITY_DAYS: i32 = 7;
pub const DEFAULT_PAYMENT_CONDITION: &str = "A VISTA";
pub const DEFAULT_PAYMENT_METHOD: &str = "DEPOSITO";

/// Proposal status. Any status may follow any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    #[sea_orm(string_value = "draft")]
    #[serde(alias = "rascunho")]
    Draft,
    #[sea_orm(string_value = "sent")]
    #[serde(alias = "enviado")]
    Sent,
    #[sea_orm(string_value = "approved")]
    #[serde(alias = "aprovado")]
    Approved,
    #[sea_orm(string_value = "cancelled")]
    #[serde(alias = "cancelado")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: i32,
    pub date: NaiveDate,
    pub client_id: Option<Uuid>,
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::client::Entity",
        from = "Column::ClientId",
        to = "super::client::Column::Id",
        on_delete = "SetNull"
    )]
    Client,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
