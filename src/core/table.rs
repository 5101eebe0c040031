//! Dining table business logic.
//!
//! Tables are soft-deleted so historic orders and reservations keep a valid
//! reference. Names are unique among a restaurant's live tables.

use crate::{
    core::required_text,
    entities::{DiningTable, TempOrder, dining_table, temp_order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

fn validate_capacity(capacity: i32) -> Result<()> {
    if capacity <= 0 {
        return Err(Error::validation("Table capacity must be at least 1"));
    }
    Ok(())
}

async fn ensure_name_free<C>(db: &C, restaurant_id: i64, name: &str, except: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = DiningTable::find()
        .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
        .filter(dining_table::Column::Name.eq(name))
        .filter(dining_table::Column::IsDeleted.eq(false));
    if let Some(id) = except {
        query = query.filter(dining_table::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("Table '{name}' already exists"),
        });
    }
    Ok(())
}

/// Inserts a table after validating its name and capacity.
pub async fn insert_table<C>(
    db: &C,
    restaurant_id: i64,
    name: &str,
    capacity: i32,
) -> Result<dining_table::Model>
where
    C: ConnectionTrait,
{
    let name = required_text(name, "Table name")?;
    validate_capacity(capacity)?;
    ensure_name_free(db, restaurant_id, &name, None).await?;

    let table = dining_table::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set(name),
        capacity: Set(capacity),
        is_deleted: Set(false),
        ..Default::default()
    };
    table.insert(db).await.map_err(Into::into)
}

/// Creates a dining table.
pub async fn create_table(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    capacity: i32,
) -> Result<dining_table::Model> {
    insert_table(db, restaurant_id, name, capacity).await
}

/// Live tables of the restaurant, ordered by name.
pub async fn list_tables(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<dining_table::Model>> {
    DiningTable::find()
        .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
        .filter(dining_table::Column::IsDeleted.eq(false))
        .order_by_asc(dining_table::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a live table belonging to the restaurant.
pub async fn get_table<C>(db: &C, restaurant_id: i64, table_id: i64) -> Result<dining_table::Model>
where
    C: ConnectionTrait,
{
    DiningTable::find_by_id(table_id)
        .filter(dining_table::Column::RestaurantId.eq(restaurant_id))
        .filter(dining_table::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Table", table_id))
}

/// Renames a table and/or changes its capacity.
pub async fn update_table(
    db: &DatabaseConnection,
    restaurant_id: i64,
    table_id: i64,
    name: Option<String>,
    capacity: Option<i32>,
) -> Result<dining_table::Model> {
    let existing = get_table(db, restaurant_id, table_id).await?;
    let mut table: dining_table::ActiveModel = existing.into();

    if let Some(name) = name {
        let name = required_text(&name, "Table name")?;
        ensure_name_free(db, restaurant_id, &name, Some(table_id)).await?;
        table.name = Set(name);
    }
    if let Some(capacity) = capacity {
        validate_capacity(capacity)?;
        table.capacity = Set(capacity);
    }

    table.update(db).await.map_err(Into::into)
}

/// Soft deletes a table. Tables with an open temp order cannot be removed.
pub async fn delete_table(
    db: &DatabaseConnection,
    restaurant_id: i64,
    table_id: i64,
) -> Result<dining_table::Model> {
    let existing = get_table(db, restaurant_id, table_id).await?;

    let open_draft = TempOrder::find()
        .filter(temp_order::Column::TableId.eq(table_id))
        .one(db)
        .await?;
    if open_draft.is_some() {
        return Err(Error::Conflict {
            message: format!("Table '{}' has an open order", existing.name),
        });
    }

    let mut table: dining_table::ActiveModel = existing.into();
    table.is_deleted = Set(true);
    table.update(db).await.map_err(Into::into)
}
