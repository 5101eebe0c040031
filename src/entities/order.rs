//! Order entity - A billable order with its payment and discount state.
//!
//! `amount` is denormalized: it always equals `subtotal - discount_amount`,
//! floored at zero. Loyalty bookkeeping for the order is kept alongside so
//! that it can be reversed exactly.

use super::enums::{DiscountType, OrderKind, PayMode};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    /// Display number, unique and increasing within the restaurant
    pub serial_number: i64,
    pub kind: OrderKind,
    pub table_id: Option<i64>,
    /// Customer who earns (or pays with) loyalty points
    pub customer_id: Option<i64>,
    /// Sum of line totals
    pub subtotal: f64,
    pub discount_type: Option<DiscountType>,
    /// Percentage applied, whether typed in or taken from a coupon
    pub discount_value: f64,
    /// Currency amount taken off the subtotal
    pub discount_amount: f64,
    /// Coupon campaign that supplied the discount
    pub campaign_id: Option<i64>,
    /// Amount due
    pub amount: f64,
    pub is_paid: bool,
    pub pay_mode: Option<PayMode>,
    pub paid_at: Option<DateTimeUtc>,
    /// Points credited to the customer when this order was paid
    pub loyalty_points_earned: i64,
    /// Points spent when this order was paid with loyalty points
    pub loyalty_points_redeemed: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
