//! Customers and their loyalty ledger.
//!
//! Every balance change is written twice in the caller's transaction: once as
//! a signed [`loyalty_transaction`] line and once as an atomic
//! `loyalty_points = loyalty_points ± n` update on the customer. The sum of a
//! customer's ledger therefore always equals their balance.
//!
//! One point is worth one currency unit when redeemed.

use crate::{
    core::{required_text, round_currency},
    entities::{Customer, LoyaltyKind, LoyaltyTransaction, Order, customer, loyalty_transaction, order},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Percentage of a paid amount credited back as points.
pub const EARN_RATE_PERCENT: i64 = 5;

/// Points earned for paying `amount`: `floor(amount * 5%)`.
///
/// Computed on whole cents so float noise can neither add nor drop a point.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn points_for_amount(amount: f64) -> i64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    let cents = (amount * 100.0).round() as i64;
    cents.saturating_mul(EARN_RATE_PERCENT) / 10_000
}

/// Points needed to settle `amount` entirely in points: `ceil(amount)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn points_required(amount: f64) -> i64 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    round_currency(amount).ceil() as i64
}

fn normalize_phone(phone: &str) -> Result<String> {
    let phone: String = required_text(phone, "Phone")?
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !phone.chars().enumerate().all(|(i, c)| c.is_ascii_digit() || (i == 0 && c == '+')) {
        return Err(Error::validation(format!("Invalid phone number '{phone}'")));
    }
    Ok(phone)
}

async fn ensure_phone_free<C>(db: &C, restaurant_id: i64, phone: &str, except: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = Customer::find()
        .filter(customer::Column::RestaurantId.eq(restaurant_id))
        .filter(customer::Column::Phone.eq(phone));
    if let Some(id) = except {
        query = query.filter(customer::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::Conflict {
            message: format!("A customer with phone {phone} already exists"),
        });
    }
    Ok(())
}

/// Registers a customer with a zero balance.
pub async fn create_customer(
    db: &DatabaseConnection,
    restaurant_id: i64,
    name: &str,
    phone: &str,
) -> Result<customer::Model> {
    let name = required_text(name, "Customer name")?;
    let phone = normalize_phone(phone)?;
    ensure_phone_free(db, restaurant_id, &phone, None).await?;

    let customer = customer::ActiveModel {
        restaurant_id: Set(restaurant_id),
        name: Set(name),
        phone: Set(phone),
        loyalty_points: Set(0),
        total_spent: Set(0.0),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    customer.insert(db).await.map_err(Into::into)
}

/// Finds a customer of the restaurant.
pub async fn get_customer<C>(db: &C, restaurant_id: i64, customer_id: i64) -> Result<customer::Model>
where
    C: ConnectionTrait,
{
    Customer::find_by_id(customer_id)
        .filter(customer::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Customer", customer_id))
}

/// Looks a customer up by phone number.
pub async fn find_by_phone(
    db: &DatabaseConnection,
    restaurant_id: i64,
    phone: &str,
) -> Result<Option<customer::Model>> {
    let phone = normalize_phone(phone)?;
    Customer::find()
        .filter(customer::Column::RestaurantId.eq(restaurant_id))
        .filter(customer::Column::Phone.eq(phone))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn list_customers(
    db: &DatabaseConnection,
    restaurant_id: i64,
) -> Result<Vec<customer::Model>> {
    Customer::find()
        .filter(customer::Column::RestaurantId.eq(restaurant_id))
        .order_by_asc(customer::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Changes a customer's name and/or phone. The balance is never edited directly.
pub async fn update_customer(
    db: &DatabaseConnection,
    restaurant_id: i64,
    customer_id: i64,
    name: Option<String>,
    phone: Option<String>,
) -> Result<customer::Model> {
    let existing = get_customer(db, restaurant_id, customer_id).await?;
    let mut customer: customer::ActiveModel = existing.into();

    if let Some(name) = name {
        customer.name = Set(required_text(&name, "Customer name")?);
    }
    if let Some(phone) = phone {
        let phone = normalize_phone(&phone)?;
        ensure_phone_free(db, restaurant_id, &phone, Some(customer_id)).await?;
        customer.phone = Set(phone);
    }

    customer.update(db).await.map_err(Into::into)
}

/// Deletes a customer and their ledger. Customers referenced by an order are kept.
pub async fn delete_customer(
    db: &DatabaseConnection,
    restaurant_id: i64,
    customer_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;
    let customer = get_customer(&txn, restaurant_id, customer_id).await?;

    let has_orders = Order::find()
        .filter(order::Column::CustomerId.eq(customer_id))
        .one(&txn)
        .await?
        .is_some();
    if has_orders {
        return Err(Error::Conflict {
            message: format!("Customer '{}' has orders and cannot be deleted", customer.name),
        });
    }

    LoyaltyTransaction::delete_many()
        .filter(loyalty_transaction::Column::CustomerId.eq(customer_id))
        .exec(&txn)
        .await?;
    customer.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Ledger of a customer, newest first.
pub async fn history(
    db: &DatabaseConnection,
    restaurant_id: i64,
    customer_id: i64,
) -> Result<Vec<loyalty_transaction::Model>> {
    get_customer(db, restaurant_id, customer_id).await?;
    LoyaltyTransaction::find()
        .filter(loyalty_transaction::Column::CustomerId.eq(customer_id))
        .order_by_desc(loyalty_transaction::Column::CreatedAt)
        .order_by_desc(loyalty_transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn write_ledger<C>(
    db: &C,
    customer_id: i64,
    order_id: Option<i64>,
    points: i64,
    kind: LoyaltyKind,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let line = loyalty_transaction::ActiveModel {
        customer_id: Set(customer_id),
        order_id: Set(order_id),
        points: Set(points),
        kind: Set(kind),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    line.insert(db).await?;
    Ok(())
}

async fn adjust_balance<C>(db: &C, customer_id: i64, points: i64, spent: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Customer::update_many()
        .col_expr(
            customer::Column::LoyaltyPoints,
            Expr::col(customer::Column::LoyaltyPoints).add(points),
        )
        .col_expr(
            customer::Column::TotalSpent,
            Expr::col(customer::Column::TotalSpent).add(spent),
        )
        .filter(customer::Column::Id.eq(customer_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::not_found("Customer", customer_id));
    }
    Ok(())
}

/// Credits the customer for a paid order and adds `amount` to their lifetime spend.
///
/// Returns the points earned.
pub async fn record_sale<C>(db: &C, customer_id: i64, order_id: i64, amount: f64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let points = points_for_amount(amount);
    adjust_balance(db, customer_id, points, amount).await?;
    if points > 0 {
        write_ledger(db, customer_id, Some(order_id), points, LoyaltyKind::Earned).await?;
    }
    tracing::debug!(customer_id, order_id, points, "Loyalty points earned");
    Ok(points)
}

/// Undoes [`record_sale`] for an order that is no longer paid.
///
/// The balance may go below zero when the earned points were already spent.
pub async fn reverse_sale<C>(
    db: &C,
    customer_id: i64,
    order_id: i64,
    points: i64,
    amount: f64,
) -> Result<()>
where
    C: ConnectionTrait,
{
    adjust_balance(db, customer_id, -points, -amount).await?;
    if points > 0 {
        write_ledger(db, customer_id, Some(order_id), -points, LoyaltyKind::Reversed).await?;
    }
    tracing::debug!(customer_id, order_id, points, "Loyalty points reversed");
    Ok(())
}

/// Spends `points` of the customer's balance on an order.
///
/// # Errors
/// [`Error::InsufficientPoints`] when the balance is lower than `points`.
pub async fn redeem<C>(db: &C, customer_id: i64, order_id: i64, points: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Customer::update_many()
        .col_expr(
            customer::Column::LoyaltyPoints,
            Expr::col(customer::Column::LoyaltyPoints).sub(points),
        )
        .filter(customer::Column::Id.eq(customer_id))
        .filter(customer::Column::LoyaltyPoints.gte(points))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        let customer = Customer::find_by_id(customer_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("Customer", customer_id))?;
        tracing::warn!(customer_id, order_id, points, "Not enough loyalty points");
        return Err(Error::InsufficientPoints {
            available: customer.loyalty_points,
            required: points,
        });
    }

    if points > 0 {
        write_ledger(db, customer_id, Some(order_id), -points, LoyaltyKind::Redeemed).await?;
    }
    Ok(())
}

/// Gives back points redeemed on an order that was deleted.
pub async fn refund<C>(db: &C, customer_id: i64, order_id: i64, points: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    adjust_balance(db, customer_id, points, 0.0).await?;
    if points > 0 {
        write_ledger(db, customer_id, Some(order_id), points, LoyaltyKind::Refunded).await?;
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

    #[test]
    fn test_points_for_amount() {
        assert_eq!(points_for_amount(100.0), 5);
        assert_eq!(points_for_amount(99.99), 4);
        assert_eq!(points_for_amount(19.99), 0);
        assert_eq!(points_for_amount(20.0), 1);
        assert_eq!(points_for_amount(39.99), 1);
        assert_eq!(points_for_amount(0.1 + 0.2 + 99.7), 5);
        assert_eq!(points_for_amount(0.0), 0);
        assert_eq!(points_for_amount(-50.0), 0);
    }

    #[test]
    fn test_points_required() {
        assert_eq!(points_required(10.0), 10);
        assert_eq!(points_required(10.01), 11);
        assert_eq!(points_required(0.0), 0);
    }

    #[tokio::test]
    async fn test_create_customer_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_customer(&db, 1, "", "555").await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let result = create_customer(&db, 1, "Asha", "call me").await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_phone_is_unique_per_restaurant() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let asha = create_customer(&db, restaurant.id, "Asha", "+91 98765-43210").await?;
        assert_eq!(asha.phone, "+919876543210");

        let duplicate = create_customer(&db, restaurant.id, "Other", "+919876543210").await;
        assert!(matches!(duplicate, Err(Error::Conflict { .. })));

        let found = find_by_phone(&db, restaurant.id, "+91 9876543210").await?;
        assert_eq!(found.map(|c| c.id), Some(asha.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_ledger_matches_balance() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Ravi").await?;

        assert_eq!(record_sale(&db, customer.id, 1, 250.0).await?, 12);
        redeem(&db, customer.id, 2, 10).await?;
        refund(&db, customer.id, 2, 10).await?;
        reverse_sale(&db, customer.id, 1, 12, 250.0).await?;

        let customer = get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(customer.loyalty_points, 0);
        assert_eq!(customer.total_spent, 0.0);

        let ledger = history(&db, restaurant.id, customer.id).await?;
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.iter().map(|l| l.points).sum::<i64>(), 0);
        assert_eq!(ledger[0].kind, LoyaltyKind::Reversed);
        Ok(())
    }

    #[tokio::test]
    async fn test_redeem_requires_balance() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Meera").await?;
        record_sale(&db, customer.id, 1, 100.0).await?;

        let result = redeem(&db, customer.id, 2, 6).await;
        assert!(matches!(
            result,
            Err(Error::InsufficientPoints { available: 5, required: 6 })
        ));

        let unchanged = get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(unchanged.loyalty_points, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_reversal_may_go_negative() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Kabir").await?;
        record_sale(&db, customer.id, 1, 200.0).await?;
        redeem(&db, customer.id, 2, 10).await?;

        reverse_sale(&db, customer.id, 1, 10, 200.0).await?;

        let customer = get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(customer.loyalty_points, -10);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_customer() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Temp").await?;
        record_sale(&db, customer.id, 1, 100.0).await?;

        delete_customer(&db, restaurant.id, customer.id).await?;
        assert!(list_customers(&db, restaurant.id).await?.is_empty());
        assert!(LoyaltyTransaction::find().all(&db).await?.is_empty());
        Ok(())
    }
}
