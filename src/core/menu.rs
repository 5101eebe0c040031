//! Menu business logic - Handles menu items and their recipes.
//!
//! A recipe links a menu item to the inventory it consumes. Recipes are what
//! `inventory::consume_for_menu_item` walks when a line is added to a temp order.

use crate::{
    core::{
        ensure_non_negative, ensure_positive, inventory, required_text, round_currency,
        round_quantity,
    },
    entities::{
        MenuItem, MenuItemIngredient, TempOrderItem, menu_item, menu_item_ingredient,
        temp_order_item,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Partial update of a menu item. Absent fields are left as-is.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub is_available: Option<bool>,
}

/// Creates a menu item, available immediately.
pub async fn create_menu_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    category: &str,
    price: f64,
) -> Result<menu_item::Model> {
    let name = required_text(name, "Menu item name")?;
    let category = required_text(category, "Category")?;
    ensure_non_negative(price)?;

    let now = chrono::Utc::now();
    let item = menu_item::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set(name),
        category: Set(category),
        price: Set(round_currency(price)),
        is_available: Set(true),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    item.insert(db).await.map_err(Into::into)
}

/// Finds a live menu item of the restaurant.
pub async fn get_menu_item<C>(db: &C, restaurant_id: i64, menu_item_id: i64) -> Result<menu_item::Model>
where
    C: ConnectionTrait,
{
    MenuItem::find_by_id(menu_item_id)
        .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
        .filter(menu_item::Column::IsDeleted.eq(false))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Menu item", menu_item_id))
}

/// Live menu items, optionally limited to one category, ordered by category then name.
pub async fn list_menu_items(
    db: &DatabaseConnection,
    restaurant_id: i64,
    category: Option<&str>,
) -> Result<Vec<menu_item::Model>> {
    let mut query = MenuItem::find()
        .filter(menu_item::Column::RestaurantId.eq(restaurant_id))
        .filter(menu_item::Column::IsDeleted.eq(false));
    if let Some(category) = category {
        query = query.filter(menu_item::Column::Category.eq(category));
    }

    query
        .order_by_asc(menu_item::Column::Category)
        .order_by_asc(menu_item::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Updates a menu item.
pub async fn update_menu_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    menu_item_id: i64,
    update: MenuItemUpdate,
) -> Result<menu_item::Model> {
    let existing = get_menu_item(db, restaurant_id, menu_item_id).await?;
    let mut item: menu_item::ActiveModel = existing.into();

    if let Some(name) = update.name {
        item.name = Set(required_text(&name, "Menu item name")?);
    }
    if let Some(category) = update.category {
        item.category = Set(required_text(&category, "Category")?);
    }
    if let Some(price) = update.price {
        ensure_non_negative(price)?;
        item.price = Set(round_currency(price));
    }
    if let Some(is_available) = update.is_available {
        item.is_available = Set(is_available);
    }
    item.updated_at = Set(chrono::Utc::now());

    item.update(db).await.map_err(Into::into)
}

/// Soft deletes a menu item; existing order lines keep their copied name and price.
pub async fn delete_menu_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    menu_item_id: i64,
) -> Result<menu_item::Model> {
    let existing = get_menu_item(db, restaurant_id, menu_item_id).await?;
    let mut item: menu_item::ActiveModel = existing.into();
    item.is_deleted = Set(true);
    item.is_available = Set(false);
    item.updated_at = Set(chrono::Utc::now());
    item.update(db).await.map_err(Into::into)
}

/// Recipe of a menu item.
pub async fn get_recipe<C>(db: &C, menu_item_id: i64) -> Result<Vec<menu_item_ingredient::Model>>
where
    C: ConnectionTrait,
{
    MenuItemIngredient::find()
        .filter(menu_item_ingredient::Column::MenuItemId.eq(menu_item_id))
        .order_by_asc(menu_item_ingredient::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Fails while any open temp order has a line for the menu item.
///
/// Drafts hold stock computed from the recipe as it was when the line was
/// added; giving it back goes through the recipe again, so the two must match.
pub async fn ensure_recipe_unheld<C>(db: &C, menu_item_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let held = TempOrderItem::find()
        .filter(temp_order_item::Column::MenuItemId.eq(menu_item_id))
        .count(db)
        .await?;
    if held > 0 {
        return Err(Error::Conflict {
            message: format!(
                "Recipe of menu item {menu_item_id} is in use by {held} open temp order line(s)"
            ),
        });
    }
    Ok(())
}

/// Sets how much of an inventory item one unit of the menu item consumes,
/// replacing any previous amount for the same pair.
///
/// # Errors
/// [`Error::Conflict`] while an open temp order holds the menu item.
pub async fn set_ingredient(
    db: &DatabaseConnection,
    restaurant_id: i64,
    menu_item_id: i64,
    inventory_item_id: i64,
    quantity_per_unit: f64,
) -> Result<menu_item_ingredient::Model> {
    ensure_positive(quantity_per_unit)?;
    let quantity_per_unit = round_quantity(quantity_per_unit);
    if quantity_per_unit <= 0.0 {
        return Err(Error::validation("Recipe quantity is below the smallest measurable amount"));
    }
    get_menu_item(db, restaurant_id, menu_item_id).await?;
    inventory::get_inventory_item(db, restaurant_id, inventory_item_id).await?;
    ensure_recipe_unheld(db, menu_item_id).await?;

    let existing = MenuItemIngredient::find()
        .filter(menu_item_ingredient::Column::MenuItemId.eq(menu_item_id))
        .filter(menu_item_ingredient::Column::InventoryItemId.eq(inventory_item_id))
        .one(db)
        .await?;

    match existing {
        Some(line) => {
            let mut line: menu_item_ingredient::ActiveModel = line.into();
            line.quantity_per_unit = Set(quantity_per_unit);
            line.update(db).await.map_err(Into::into)
        }
        None => {
            let line = menu_item_ingredient::ActiveModel {
                menu_item_id: Set(menu_item_id),
                inventory_item_id: Set(inventory_item_id),
                quantity_per_unit: Set(quantity_per_unit),
                ..Default::default()
            };
            line.insert(db).await.map_err(Into::into)
        }
    }
}

/// Removes an inventory item from a menu item's recipe.
pub async fn remove_ingredient(
    db: &DatabaseConnection,
    restaurant_id: i64,
    menu_item_id: i64,
    inventory_item_id: i64,
) -> Result<()> {
    get_menu_item(db, restaurant_id, menu_item_id).await?;
    ensure_recipe_unheld(db, menu_item_id).await?;

    let result = MenuItemIngredient::delete_many()
        .filter(menu_item_ingredient::Column::MenuItemId.eq(menu_item_id))
        .filter(menu_item_ingredient::Column::InventoryItemId.eq(inventory_item_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::NotFound {
            entity: "Recipe ingredient",
            id: format!("{menu_item_id}/{inventory_item_id}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_menu_item_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_menu_item(&db, 1, "", "mains", 10.0).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_menu_item(&db, 1, "Dal", "mains", -1.0).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_menu_item(&db, 1, "Dal", "mains", f64::NAN).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_menu_items_by_category() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        create_menu_item(&db, restaurant.id, "Samosa", "starters", 4.5).await?;
        create_menu_item(&db, restaurant.id, "Biryani", "mains", 12.0).await?;
        create_menu_item(&db, restaurant.id, "Pakora", "starters", 5.0).await?;

        let all = list_menu_items(&db, restaurant.id, None).await?;
        let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Biryani", "Pakora", "Samosa"]);

        let starters = list_menu_items(&db, restaurant.id, Some("starters")).await?;
        assert_eq!(starters.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_soft_delete() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let item = create_menu_item(&db, restaurant.id, "Lassi", "drinks", 3.0).await?;

        let updated = update_menu_item(
            &db,
            restaurant.id,
            item.id,
            MenuItemUpdate {
                price: Some(3.499),
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.price, 3.5);
        assert!(!updated.is_available);
        assert_eq!(updated.name, "Lassi");

        delete_menu_item(&db, restaurant.id, item.id).await?;
        assert!(list_menu_items(&db, restaurant.id, None).await?.is_empty());
        assert!(matches!(
            get_menu_item(&db, restaurant.id, item.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_set_ingredient_upserts() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let dish = create_menu_item(&db, restaurant.id, "Paneer Tikka", "starters", 9.0).await?;
        let paneer = create_test_inventory(&db, restaurant.id, "Paneer", 10.0).await?;

        set_ingredient(&db, restaurant.id, dish.id, paneer.id, 0.2).await?;
        set_ingredient(&db, restaurant.id, dish.id, paneer.id, 0.25).await?;

        let recipe = get_recipe(&db, dish.id).await?;
        assert_eq!(recipe.len(), 1);
        assert_eq!(recipe[0].quantity_per_unit, 0.25);

        let invalid = set_ingredient(&db, restaurant.id, dish.id, paneer.id, 0.0).await;
        assert!(matches!(invalid, Err(Error::InvalidAmount { .. })));

        remove_ingredient(&db, restaurant.id, dish.id, paneer.id).await?;
        assert!(get_recipe(&db, dish.id).await?.is_empty());

        let again = remove_ingredient(&db, restaurant.id, dish.id, paneer.id).await;
        assert!(matches!(again, Err(Error::NotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_recipe_locked_while_draft_holds_item() -> Result<()> {
        use crate::core::{inventory::get_inventory_item, temp_order};
        use crate::entities::OrderKind;

        let (db, restaurant) = setup_with_restaurant().await?;
        let burger = create_menu_item(&db, restaurant.id, "Burger", "mains", 7.5).await?;
        let buns = create_test_inventory(&db, restaurant.id, "Buns", 10.0).await?;
        set_ingredient(&db, restaurant.id, burger.id, buns.id, 1.0).await?;
        let draft =
            temp_order::open_temp_order(&db, restaurant.id, OrderKind::Takeaway, None).await?;
        temp_order::add_item(&db, restaurant.id, draft.id, burger.id, 4).await?;

        let changed = set_ingredient(&db, restaurant.id, burger.id, buns.id, 2.0).await;
        assert!(matches!(changed, Err(Error::Conflict { .. })));
        let removed = remove_ingredient(&db, restaurant.id, burger.id, buns.id).await;
        assert!(matches!(removed, Err(Error::Conflict { .. })));

        temp_order::discard_temp_order(&db, restaurant.id, draft.id).await?;
        assert_eq!(get_inventory_item(&db, restaurant.id, buns.id).await?.available_quantity, 10.0);

        let line = set_ingredient(&db, restaurant.id, burger.id, buns.id, 2.0).await?;
        assert_eq!(line.quantity_per_unit, 2.0);
        Ok(())
    }
}
