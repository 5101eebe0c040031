//! KDS order entity - Kitchen ticket mirroring an order's lines.
//!
//! `status` is a cached aggregate of the ticket's item statuses and is
//! recomputed whenever an item moves.

use super::enums::KdsStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// KDS order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kds_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    pub order_id: i64,
    /// Order serial number, shown on the kitchen screen
    pub serial_number: i64,
    pub status: KdsStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(has_many = "super::kds_order_item::Entity")]
    Items,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::kds_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
