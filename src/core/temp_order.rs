//! Temp orders - drafts being built at a table or at the counter.
//!
//! Inventory is reserved the moment a line is added, so stock on hand always
//! reflects what is already promised to guests. Removing lines or discarding
//! the draft gives it back. Checkout turns the draft into a billable order
//! and a kitchen ticket without touching inventory again.

use crate::{
    core::{
        inventory, kds, loyalty, menu,
        order::{self, NewOrderLine, OrderDetails},
        round_currency, table,
    },
    entities::{MenuItem, OrderKind, TempOrder, TempOrderItem, temp_order, temp_order_item},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;

/// Most units of one menu item a single draft line may hold.
pub const MAX_LINE_QUANTITY: i32 = 1_000;

fn ensure_line_quantity(quantity: i32) -> Result<()> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(Error::validation(format!(
            "Quantity cannot exceed {MAX_LINE_QUANTITY} per line"
        )));
    }
    Ok(())
}

/// A temp order with its lines and running subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct TempOrderDetails {
    #[serde(flatten)]
    pub temp_order: temp_order::Model,
    pub items: Vec<temp_order_item::Model>,
    pub subtotal: f64,
}

/// Opens a draft.
///
/// Dine-in drafts belong to a table and a table has at most one: asking
/// again returns the existing draft. Takeaway always starts a new draft.
pub async fn open_temp_order(
    db: &DatabaseConnection,
    restaurant_id: i64,
    kind: OrderKind,
    table_id: Option<i64>,
) -> Result<temp_order::Model> {
    match (kind, table_id) {
        (OrderKind::DineIn, None) => {
            return Err(Error::validation("Dine-in orders need a table"));
        }
        (OrderKind::Takeaway, Some(_)) => {
            return Err(Error::validation("Takeaway orders cannot have a table"));
        }
        (OrderKind::DineIn, Some(table_id)) => {
            table::get_table(db, restaurant_id, table_id).await?;
            let existing = TempOrder::find()
                .filter(temp_order::Column::RestaurantId.eq(restaurant_id))
                .filter(temp_order::Column::TableId.eq(table_id))
                .one(db)
                .await?;
            if let Some(existing) = existing {
                return Ok(existing);
            }
        }
        (OrderKind::Takeaway, None) => {}
    }

    let draft = temp_order::ActiveModel {
        restaurant_id: Set(restaurant_id),
        kind: Set(kind),
        table_id: Set(table_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    draft.insert(db).await.map_err(Into::into)
}

/// Finds a draft of the restaurant.
pub async fn get_temp_order<C>(db: &C, restaurant_id: i64, temp_order_id: i64) -> Result<temp_order::Model>
where
    C: ConnectionTrait,
{
    TempOrder::find_by_id(temp_order_id)
        .filter(temp_order::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Temp order", temp_order_id))
}

async fn load_lines<C>(db: &C, temp_order_id: i64) -> Result<Vec<temp_order_item::Model>>
where
    C: ConnectionTrait,
{
    TempOrderItem::find()
        .filter(temp_order_item::Column::TempOrderId.eq(temp_order_id))
        .order_by_asc(temp_order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn with_lines<C>(db: &C, temp_order: temp_order::Model) -> Result<TempOrderDetails>
where
    C: ConnectionTrait,
{
    let items = load_lines(db, temp_order.id).await?;
    let subtotal = round_currency(
        items
            .iter()
            .map(|i| i.unit_price * f64::from(i.quantity))
            .sum(),
    );
    Ok(TempOrderDetails {
        temp_order,
        items,
        subtotal,
    })
}

/// A draft with its lines.
pub async fn get_temp_order_details(
    db: &DatabaseConnection,
    restaurant_id: i64,
    temp_order_id: i64,
) -> Result<TempOrderDetails> {
    let draft = get_temp_order(db, restaurant_id, temp_order_id).await?;
    with_lines(db, draft).await
}

/// Open drafts of the restaurant, oldest first.
pub async fn list_temp_orders(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<temp_order::Model>> {
    TempOrder::find()
        .filter(temp_order::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(temp_order::Column::CreatedAt)
        .order_by_asc(temp_order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_line<C>(db: &C, temp_order_id: i64, menu_item_id: i64) -> Result<Option<temp_order_item::Model>>
where
    C: ConnectionTrait,
{
    TempOrderItem::find()
        .filter(temp_order_item::Column::TempOrderId.eq(temp_order_id))
        .filter(temp_order_item::Column::MenuItemId.eq(menu_item_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Adds `quantity` of a menu item, growing its line if there already is one.
///
/// # Errors
/// [`Error::InsufficientStock`] if an ingredient runs out; nothing is
/// changed in that case.
pub async fn add_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    temp_order_id: i64,
    menu_item_id: i64,
    quantity: i32,
) -> Result<TempOrderDetails> {
    if quantity <= 0 {
        return Err(Error::validation("Quantity must be at least 1"));
    }
    ensure_line_quantity(quantity)?;

    let txn = db.begin().await?;
    let draft = get_temp_order(&txn, restaurant_id, temp_order_id).await?;
    let item = menu::get_menu_item(&txn, restaurant_id, menu_item_id).await?;
    if !item.is_available {
        return Err(Error::validation(format!("'{}' is not available", item.name)));
    }

    let existing = find_line(&txn, draft.id, menu_item_id).await?;
    if let Some(line) = &existing {
        let merged = line
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| Error::validation("Quantity is too large"))?;
        ensure_line_quantity(merged)?;
    }

    inventory::consume_for_menu_item(&txn, menu_item_id, quantity).await?;

    match existing {
        Some(line) => {
            let new_quantity = line.quantity + quantity;
            let mut line: temp_order_item::ActiveModel = line.into();
            line.quantity = Set(new_quantity);
            line.update(&txn).await?;
        }
        None => {
            temp_order_item::ActiveModel {
                temp_order_id: Set(draft.id),
                menu_item_id: Set(menu_item_id),
                quantity: Set(quantity),
                unit_price: Set(item.price),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    let details = with_lines(&txn, draft).await?;
    txn.commit().await?;
    tracing::debug!(temp_order_id, menu_item_id, quantity, "Item added to temp order");
    Ok(details)
}

/// Sets the quantity of a line; inventory follows the difference. Zero removes the line.
pub async fn set_item_quantity(
    db: &DatabaseConnection,
    restaurant_id: i64,
    temp_order_id: i64,
    menu_item_id: i64,
    quantity: i32,
) -> Result<TempOrderDetails> {
    if quantity < 0 {
        return Err(Error::validation("Quantity cannot be negative"));
    }
    ensure_line_quantity(quantity)?;

    let txn = db.begin().await?;
    let draft = get_temp_order(&txn, restaurant_id, temp_order_id).await?;
    let line = find_line(&txn, draft.id, menu_item_id)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "Temp order line",
            id: format!("{temp_order_id}/{menu_item_id}"),
        })?;

    let diff = quantity - line.quantity;
    if diff > 0 {
        inventory::consume_for_menu_item(&txn, menu_item_id, diff).await?;
    } else if diff < 0 {
        inventory::return_for_menu_item(&txn, menu_item_id, -diff).await?;
    }

    if quantity == 0 {
        line.delete(&txn).await?;
    } else {
        let mut line: temp_order_item::ActiveModel = line.into();
        line.quantity = Set(quantity);
        line.update(&txn).await?;
    }

    let details = with_lines(&txn, draft).await?;
    txn.commit().await?;
    Ok(details)
}

/// Removes a line, returning its stock.
pub async fn remove_item(
    db: &DatabaseConnection,
    restaurant_id: i64,
    temp_order_id: i64,
    menu_item_id: i64,
) -> Result<TempOrderDetails> {
    set_item_quantity(db, restaurant_id, temp_order_id, menu_item_id, 0).await
}

/// Throws a draft away, returning the stock of every line.
pub async fn discard_temp_order(
    db: &DatabaseConnection,
    restaurant_id: i64,
    temp_order_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    let draft = get_temp_order(&txn, restaurant_id, temp_order_id).await?;

    for line in load_lines(&txn, draft.id).await? {
        inventory::return_for_menu_item(&txn, line.menu_item_id, line.quantity).await?;
    }
    TempOrderItem::delete_many()
        .filter(temp_order_item::Column::TempOrderId.eq(draft.id))
        .exec(&txn)
        .await?;
    draft.delete(&txn).await?;

    txn.commit().await?;
    tracing::info!(temp_order_id, "Temp order discarded");
    Ok(())
}

/// Promotes a draft to an order and sends it to the kitchen.
///
/// The order gets the restaurant's next serial number, a copy of every line,
/// and a KDS ticket with each line Pending. The draft is deleted. Everything
/// happens in one transaction.
pub async fn checkout(
    db: &DatabaseConnection,
    restaurant_id: i64,
    temp_order_id: i64,
    customer_id: Option<i64>,
) -> Result<OrderDetails> {
    let txn = db.begin().await?;
    let draft = get_temp_order(&txn, restaurant_id, temp_order_id).await?;
    let lines = load_lines(&txn, draft.id).await?;
    if lines.is_empty() {
        return Err(Error::validation("Cannot check out an empty order"));
    }
    if let Some(customer_id) = customer_id {
        loyalty::get_customer(&txn, restaurant_id, customer_id).await?;
    }

    let mut order_lines = Vec::with_capacity(lines.len());
    for line in &lines {
        // Soft-deleted menu items still name the line.
        let item = MenuItem::find_by_id(line.menu_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::not_found("Menu item", line.menu_item_id))?;
        order_lines.push(NewOrderLine {
            menu_item_id: line.menu_item_id,
            name: item.name,
            quantity: line.quantity,
            unit_price: line.unit_price,
        });
    }

    let details = order::create_order(
        &txn,
        restaurant_id,
        draft.kind,
        draft.table_id,
        customer_id,
        &order_lines,
    )
    .await?;
    kds::create_ticket(&txn, &details.order, &details.items).await?;

    TempOrderItem::delete_many()
        .filter(temp_order_item::Column::TempOrderId.eq(draft.id))
        .exec(&txn)
        .await?;
    draft.delete(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        temp_order_id,
        order_id = details.order.id,
        amount = details.order.amount,
        "Checked out order #{}",
        details.order.serial_number
    );
    Ok(details)
}
