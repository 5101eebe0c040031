//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        employee::{self, NewEmployee},
        inventory, loyalty, menu,
        order::OrderDetails,
        restaurant, temp_order,
    },
    entities::{self, OrderKind, Role},
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Identity-provider subject of the owner of the restaurant from [`setup_with_restaurant`].
pub const TEST_OWNER: &str = "owner_user";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test database with one restaurant owned by [`TEST_OWNER`].
///
/// # Defaults
/// * timezone: `Asia/Kolkata`
/// * opening hours: 09:00 to 23:00
pub async fn setup_with_restaurant() -> Result<(DatabaseConnection, entities::restaurant::Model)> {
    let db = setup_test_db().await?;
    let restaurant =
        restaurant::create_restaurant(&db, "Test Kitchen", TEST_OWNER, "Asia/Kolkata", "09:00", "23:00")
            .await?;
    Ok((db, restaurant))
}

/// Creates an active employee signed in as `user_id`, paid 15.0 per hour.
pub async fn create_test_employee(
    db: &DatabaseConnection,
    restaurant_id: i64,
    user_id: &str,
    role: Role,
) -> Result<entities::employee::Model> {
    employee::create_employee(
        db,
        restaurant_id,
        NewEmployee {
            name: format!("Employee {user_id}"),
            user_id: Some(user_id.to_string()),
            role,
            hourly_rate: 15.0,
        },
    )
    .await
}

/// Creates an inventory item counted in units, with no low-stock threshold.
pub async fn create_test_inventory(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    quantity: f64,
) -> Result<entities::inventory_item::Model> {
    inventory::create_inventory_item(db, restaurant_id, name, "unit", quantity, 0.0).await
}

/// Creates a customer with a phone number derived from the name.
pub async fn create_test_customer(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
) -> Result<entities::customer::Model> {
    let phone: String = name
        .bytes()
        .map(|b| char::from(b'0' + b % 10))
        .chain("000".chars())
        .collect();
    loyalty::create_customer(db, restaurant_id, name, &phone).await
}

/// Checks out a takeaway order with the given `(name, price, quantity)` lines.
///
/// Each line gets its own menu item without a recipe, so no stock is needed.
pub async fn create_test_order(
    db: &DatabaseConnection,
    restaurant_id: i64,
    lines: &[(&str, f64, i32)],
) -> Result<OrderDetails> {
    let draft = temp_order::open_temp_order(db, restaurant_id, OrderKind::Takeaway, None).await?;
    for (name, price, quantity) in lines {
        let item = menu::create_menu_item(db, restaurant_id, name, "test", *price).await?;
        temp_order::add_item(db, restaurant_id, draft.id, item.id, *quantity).await?;
    }
    temp_order::checkout(db, restaurant_id, draft.id, None).await
}
