//! Campaign entity - A coupon code with a validity window and a usage budget.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Campaign database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "campaigns")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    /// Code typed at the counter, stored upper-case
    pub code: String,
    /// Percentage taken off the subtotal
    pub discount_percent: f64,
    /// Optional cap on the discount amount
    pub max_discount: Option<f64>,
    /// Redemptions left
    pub remaining_uses: i32,
    pub starts_at: DateTimeUtc,
    /// Exclusive end of the validity window
    pub ends_at: DateTimeUtc,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
