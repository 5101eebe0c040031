//! Role-based permission checks.
//!
//! Authentication is done by the upstream identity provider; this module only
//! decides what an already-identified user may do inside one restaurant. The
//! restaurant owner may do everything. Anyone else must be an active employee
//! of that restaurant whose role grants the permission.

use crate::{
    entities::{Employee, Restaurant, Role, employee, restaurant},
    errors::{Error, Result},
};
use sea_orm::prelude::*;
use serde::Serialize;

/// Something a caller can be allowed to do within a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageRestaurant,
    ManageMenu,
    ManageInventory,
    ManageTables,
    TakeOrders,
    ManageBilling,
    ManageKitchen,
    ManageCustomers,
    ManageCampaigns,
    ManageReservations,
    ManageEmployees,
    ManageExpenses,
    ViewReports,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Self; 13] = [
        Self::ManageRestaurant,
        Self::ManageMenu,
        Self::ManageInventory,
        Self::ManageTables,
        Self::TakeOrders,
        Self::ManageBilling,
        Self::ManageKitchen,
        Self::ManageCustomers,
        Self::ManageCampaigns,
        Self::ManageReservations,
        Self::ManageEmployees,
        Self::ManageExpenses,
        Self::ViewReports,
    ];

    /// Stable name used in error messages, e.g. `"orders:take"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ManageRestaurant => "restaurant:manage",
            Self::ManageMenu => "menu:manage",
            Self::ManageInventory => "inventory:manage",
            Self::ManageTables => "tables:manage",
            Self::TakeOrders => "orders:take",
            Self::ManageBilling => "billing:manage",
            Self::ManageKitchen => "kitchen:manage",
            Self::ManageCustomers => "customers:manage",
            Self::ManageCampaigns => "campaigns:manage",
            Self::ManageReservations => "reservations:manage",
            Self::ManageEmployees => "employees:manage",
            Self::ManageExpenses => "expenses:manage",
            Self::ViewReports => "reports:view",
        }
    }
}

const CASHIER_PERMISSIONS: &[Permission] = &[
    Permission::TakeOrders,
    Permission::ManageBilling,
    Permission::ManageCustomers,
    Permission::ManageReservations,
];

const CHEF_PERMISSIONS: &[Permission] = &[Permission::ManageKitchen, Permission::ManageInventory];

const WAITER_PERMISSIONS: &[Permission] = &[Permission::TakeOrders, Permission::ManageReservations];

impl Role {
    /// Default permissions of the role.
    #[must_use]
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Self::Owner | Self::Manager => &Permission::ALL,
            Self::Cashier => CASHIER_PERMISSIONS,
            Self::Chef => CHEF_PERMISSIONS,
            Self::Waiter => WAITER_PERMISSIONS,
        }
    }

    /// Whether the role grants `permission`.
    #[must_use]
    pub fn grants(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Role the user holds in the restaurant, if any.
///
/// The restaurant owner is reported as [`Role::Owner`] even without an
/// employee record. Deactivated employees hold no role.
pub async fn role_of<C>(
    db: &C,
    restaurant: &restaurant::Model,
    user_id: &str,
) -> Result<Option<Role>>
where
    C: ConnectionTrait,
{
    if restaurant.owner_user_id == user_id {
        return Ok(Some(Role::Owner));
    }

    let employee = Employee::find()
        .filter(employee::Column::RestaurantId.eq(restaurant.id))
        .filter(employee::Column::UserId.eq(user_id))
        .filter(employee::Column::IsActive.eq(true))
        .one(db)
        .await?;

    Ok(employee.map(|e| e.role))
}

/// Ensures `user_id` holds `permission` in the restaurant and returns the restaurant.
///
/// # Errors
/// - [`Error::NotFound`] if the restaurant does not exist
/// - [`Error::Forbidden`] if the user has no role there or the role lacks the permission
pub async fn require_permission<C>(
    db: &C,
    restaurant_id: i64,
    user_id: &str,
    permission: Permission,
) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    let restaurant = Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Restaurant", restaurant_id))?;

    match role_of(db, &restaurant, user_id).await? {
        Some(role) if role.grants(permission) => Ok(restaurant),
        _ => {
            tracing::warn!(
                restaurant_id,
                user_id,
                permission = permission.as_str(),
                "Permission denied"
            );
            Err(Error::Forbidden {
                permission: permission.as_str().to_string(),
            })
        }
    }
}

/// Ensures the user belongs to the restaurant in any role and returns the restaurant.
pub async fn require_member<C>(
    db: &C,
    restaurant_id: i64,
    user_id: &str,
) -> Result<restaurant::Model>
where
    C: ConnectionTrait,
{
    let restaurant = Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Restaurant", restaurant_id))?;

    if role_of(db, &restaurant, user_id).await?.is_none() {
        return Err(Error::Forbidden {
            permission: "restaurant:member".to_string(),
        });
    }
    Ok(restaurant)
}
