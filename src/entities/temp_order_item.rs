//! Temp order item entity - One line of a draft order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Temp order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "temp_order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub temp_order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i32,
    /// Menu price captured when the line was first added
    pub unit_price: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::temp_order::Entity",
        from = "Column::TempOrderId",
        to = "super::temp_order::Column::Id"
    )]
    TempOrder,
    #[sea_orm(
        belongs_to = "super::menu_item::Entity",
        from = "Column::MenuItemId",
        to = "super::menu_item::Column::Id"
    )]
    MenuItem,
}

impl Related<super::temp_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TempOrder.def()
    }
}

impl Related<super::menu_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MenuItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
