//! Customer entity - Guest profile carrying a loyalty balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Customer database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    /// Lookup key at the counter, unique per restaurant
    pub phone: String,
    /// Current balance; equals the sum of the customer's loyalty transactions
    pub loyalty_points: i64,
    /// Lifetime amount paid in non-points pay modes
    pub total_spent: f64,
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
    #[sea_orm(has_many = "super::loyalty_transaction::Entity")]
    LoyaltyTransactions,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl Related<super::loyalty_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoyaltyTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
