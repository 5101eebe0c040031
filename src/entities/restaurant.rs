//! Restaurant entity - The tenant every other record is scoped by.
//!
//! Holds the business-hours settings used to cut daily sales windows and the
//! counter that hands out order serial numbers.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restaurant database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restaurants")]
pub struct Model {
    /// Unique identifier for the restaurant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Identity-provider subject of the owner; the owner passes every permission check
    pub owner_user_id: String,
    /// IANA timezone name (e.g. `"Asia/Kolkata"`)
    pub timezone: String,
    /// Local opening time, `"HH:MM"`; also the business-day cutoff
    pub opening_time: String,
    /// Local closing time, `"HH:MM"`; may be earlier than opening for overnight service
    pub closing_time: String,
    /// Serial number the next order will receive
    pub next_order_serial: i64,
    /// When the restaurant was registered
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
