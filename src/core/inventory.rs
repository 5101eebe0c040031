//! Inventory business logic - stock levels and recipe-driven consumption.
//!
//! Stock moves with single-statement atomic updates
//! (`available_quantity = available_quantity ± delta`), the same way balances
//! are kept consistent elsewhere. A decrement carries the guard
//! `available_quantity >= delta`, so stock can never be driven negative.
//! Quantities live on the millionth grid of [`round_quantity`]; after each
//! move the stored value is snapped back onto it.

use crate::{
    core::{ensure_non_negative, ensure_positive, menu, required_text, round_quantity},
    entities::{InventoryItem, MenuItemIngredient, inventory_item, menu_item_ingredient},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::Deserialize;

/// Partial update of an inventory item. Stock is changed through
/// [`restock`] rather than here.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub min_stock_threshold: Option<f64>,
}

/// Creates an inventory item with an opening stock level.
pub async fn create_inventory_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    unit: &str,
    available_quantity: f64,
    min_stock_threshold: f64,
) -> Result<inventory_item::Model> {
    let name = required_text(name, "Inventory item name")?;
    let unit = required_text(unit, "Unit")?;
    ensure_non_negative(available_quantity)?;
    ensure_non_negative(min_stock_threshold)?;

    let item = inventory_item::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set(name),
        unit: Set(unit),
        available_quantity: Set(round_quantity(available_quantity)),
        min_stock_threshold: Set(round_quantity(min_stock_threshold)),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Finds an inventory item belonging to the restaurant.
pub async fn get_inventory_item<C>(
    db: &C,
    restaurant_id: i64,
    inventory_item_id: i64,
) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    InventoryItem::find_by_id(inventory_item_id)
        .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Inventory item", inventory_item_id))
}

/// All inventory items of the restaurant, ordered by name.
pub async fn list_inventory_items(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<inventory_item::Model>> {
    InventoryItem::find()
        .filter(inventory_item::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(inventory_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Items at or below their minimum stock threshold.
pub async fn low_stock_items(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<inventory_item::Model>> {
    let items = list_inventory_items(db, restaurant_id).await?;
    Ok(items
        .into_iter()
        .filter(|item| item.available_quantity <= item.min_stock_threshold)
        .collect())
}

/// Updates descriptive fields and the low-stock threshold.
pub async fn update_inventory_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    inventory_item_id: i64,
    update: InventoryItemUpdate,
) -> Result<inventory_item::Model> {
    let existing = get_inventory_item(db, restaurant_id, inventory_item_id).await?;
    let mut item: inventory_item::ActiveModel = existing.into();

    if let Some(name) = update.name {
        item.name = Set(required_text(&name, "Inventory item name")?);
    }
    if let Some(unit) = update.unit {
        item.unit = Set(required_text(&unit, "Unit")?);
    }
    if let Some(threshold) = update.min_stock_threshold {
        ensure_non_negative(threshold)?;
        item.min_stock_threshold = Set(round_quantity(threshold));
    }
    item.updated_at = Set(chrono::Utc::now());

    item.update(db).await.map_err(Into::into)
}

/// Deletes an inventory item and drops it from every recipe.
///
/// # Errors
/// [`Error::Conflict`] while an open temp order holds a dish made from it.
pub async fn delete_inventory_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    inventory_item_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    let item = get_inventory_item(&txn, restaurant_id, inventory_item_id).await?;

    let dishes: Vec<i64> = MenuItemIngredient::find()
        .filter(menu_item_ingredient::Column::InventoryItemId.eq(item.id))
        .all(&txn)
        .await?
        .into_iter()
        .map(|line| line.menu_item_id)
        .collect();
    for menu_item_id in dishes {
        menu::ensure_recipe_unheld(&txn, menu_item_id).await?;
    }

    MenuItemIngredient::delete_many()
        .filter(menu_item_ingredient::Column::InventoryItemId.eq(item.id))
        .exec(&txn)
        .await?;
    item.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Adds delivered stock.
pub async fn restock(
    db: &DatabaseConnection,
    restaurant_id: i64,
    inventory_item_id: i64,
    quantity: f64,
) -> Result<inventory_item::Model> {
    ensure_positive(quantity)?;
    get_inventory_item(db, restaurant_id, inventory_item_id).await?;
    let item = increment_stock(db, inventory_item_id, quantity).await?;
    tracing::info!(
        inventory_item_id,
        quantity,
        available = item.available_quantity,
        "Inventory restocked"
    );
    Ok(item)
}

/// Atomically adds `quantity` to the stock of an item.
pub async fn increment_stock<C>(
    db: &C,
    inventory_item_id: i64,
    quantity: f64,
) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    let quantity = round_quantity(quantity);
    InventoryItem::update_many()
        .col_expr(
            inventory_item::Column::AvailableQuantity,
            Expr::col(inventory_item::Column::AvailableQuantity).add(quantity),
        )
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(inventory_item::Column::Id.eq(inventory_item_id))
        .exec(db)
        .await?;

    let item = InventoryItem::find_by_id(inventory_item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Inventory item", inventory_item_id))?;
    snap_to_grid(db, item).await
}

/// Rewrites float noise left by `col ± delta` so the stored stock sits on the
/// quantity grid and never below zero. Skipped if another writer got there first.
async fn snap_to_grid<C>(db: &C, mut item: inventory_item::Model) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    let snapped = round_quantity(item.available_quantity).max(0.0);
    if snapped.to_bits() != item.available_quantity.to_bits() {
        InventoryItem::update_many()
            .col_expr(inventory_item::Column::AvailableQuantity, Expr::value(snapped))
            .filter(inventory_item::Column::Id.eq(item.id))
            .filter(inventory_item::Column::AvailableQuantity.eq(item.available_quantity))
            .exec(db)
            .await?;
        item.available_quantity = snapped;
    }
    Ok(item)
}

/// Atomically removes `quantity` from the stock of an item.
///
/// # Errors
/// [`Error::InsufficientStock`] when less than `quantity` is available; stock
/// is left untouched in that case.
pub async fn decrement_stock<C>(
    db: &C,
    inventory_item_id: i64,
    quantity: f64,
) -> Result<inventory_item::Model>
where
    C: ConnectionTrait,
{
    let quantity = round_quantity(quantity);
    // Half a grid step of slack absorbs float noise in values read back from the database.
    let floor = quantity - 0.5 / 1_000_000.0;
    let result = InventoryItem::update_many()
        .col_expr(
            inventory_item::Column::AvailableQuantity,
            Expr::col(inventory_item::Column::AvailableQuantity).sub(quantity),
        )
        .col_expr(inventory_item::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(inventory_item::Column::Id.eq(inventory_item_id))
        .filter(inventory_item::Column::AvailableQuantity.gte(floor))
        .exec(db)
        .await?;

    let item = InventoryItem::find_by_id(inventory_item_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Inventory item", inventory_item_id))?;

    if result.rows_affected == 0 {
        return Err(Error::InsufficientStock {
            item: item.name,
            available: item.available_quantity,
            required: quantity,
        });
    }
    let item = snap_to_grid(db, item).await?;

    if item.available_quantity <= item.min_stock_threshold {
        tracing::warn!(
            inventory_item_id,
            available = item.available_quantity,
            threshold = item.min_stock_threshold,
            "Inventory item '{}' is low on stock",
            item.name
        );
    }
    Ok(item)
}

/// Consumes the stock needed for `quantity` units of a menu item.
///
/// Every recipe line is decremented. Run inside a transaction: when a later
/// line is short, the earlier decrements must roll back with it.
pub async fn consume_for_menu_item<C>(db: &C, menu_item_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    for line in menu::get_recipe(db, menu_item_id).await? {
        let needed = round_quantity(line.quantity_per_unit * f64::from(quantity));
        decrement_stock(db, line.inventory_item_id, needed).await?;
    }
    Ok(())
}

/// Puts back the stock of `quantity` units of a menu item.
pub async fn return_for_menu_item<C>(db: &C, menu_item_id: i64, quantity: i32) -> Result<()>
where
    C: ConnectionTrait,
{
    for line in menu::get_recipe(db, menu_item_id).await? {
        let returned = round_quantity(line.quantity_per_unit * f64::from(quantity));
        increment_stock(db, line.inventory_item_id, returned).await?;
    }
    Ok(())
}
