//! KDS order item entity - One line on a kitchen ticket.

use super::enums::KdsStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// KDS order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kds_order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kds_order_id: i64,
    /// Billed line this ticket line mirrors
    pub order_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub status: KdsStatus,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kds_order::Entity",
        from = "Column::KdsOrderId",
        to = "super::kds_order::Column::Id"
    )]
    KdsOrder,
}

impl Related<super::kds_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KdsOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
