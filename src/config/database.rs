//! Database configuration module.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the database schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Attendance, Campaign, Customer, DiningTable, Employee, Expense, InventoryItem, KdsOrder,
    KdsOrderItem, LoyaltyTransaction, MenuItem, MenuItemIngredient, Order, OrderItem,
    Reservation, Restaurant, TempOrder, TempOrderItem,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://tableside.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back
/// to a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by `DATABASE_URL`.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {database_url}");
    Database::connect(&database_url).await.map_err(Into::into)
}

async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates every table that does not exist yet.
///
/// Parents are created before the tables holding foreign keys to them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, Restaurant).await?;
    create_table(db, &schema, Employee).await?;
    create_table(db, &schema, Attendance).await?;
    create_table(db, &schema, DiningTable).await?;
    create_table(db, &schema, MenuItem).await?;
    create_table(db, &schema, InventoryItem).await?;
    create_table(db, &schema, MenuItemIngredient).await?;
    create_table(db, &schema, Customer).await?;
    create_table(db, &schema, LoyaltyTransaction).await?;
    create_table(db, &schema, Campaign).await?;
    create_table(db, &schema, TempOrder).await?;
    create_table(db, &schema, TempOrderItem).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, OrderItem).await?;
    create_table(db, &schema, KdsOrder).await?;
    create_table(db, &schema, KdsOrderItem).await?;
    create_table(db, &schema, Reservation).await?;
    create_table(db, &schema, Expense).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{order, restaurant};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<restaurant::Model> = Restaurant::find().limit(1).all(&db).await?;
        let _: Vec<order::Model> = Order::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
