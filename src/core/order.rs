//! Orders and billing.
//!
//! An order is created by checking out a temp order. From then on its lines
//! are fixed and only its billing state moves: discount, customer, payment.
//! Loyalty settlement happens when the payment state changes, inside the
//! same transaction.

use crate::{
    core::{
        business_hours::BusinessHours, campaign, ensure_non_negative, kds, loyalty, restaurant,
        round_currency,
    },
    entities::{
        DiscountType, Order, OrderItem, OrderKind, PayMode, order, order_item,
        restaurant as restaurant_entity,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

/// An order with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// A line to bill, priced when it was put on the order.
#[derive(Debug, Clone)]
pub struct NewOrderLine {
    pub menu_item_id: i64,
    pub name: String,
    pub quantity: i32,
    pub unit_price: f64,
}

/// Discount requested at the till.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountRequest {
    /// Manual percentage off the subtotal
    Percentage { percent: f64 },
    /// Coupon campaign code
    Coupon { code: String },
}

fn amount_due(subtotal: f64, discount_amount: f64) -> f64 {
    round_currency((subtotal - discount_amount).max(0.0))
}

fn ensure_editable(order: &order::Model) -> Result<()> {
    if order.pay_mode == Some(PayMode::LoyaltyPoints) {
        return Err(Error::OrderLocked {
            order_id: order.id,
            reason: "paid with loyalty points".to_string(),
        });
    }
    if order.is_paid {
        return Err(Error::OrderLocked {
            order_id: order.id,
            reason: "already paid".to_string(),
        });
    }
    Ok(())
}

/// Inserts an order with its lines. Used by checkout, inside its transaction.
pub async fn create_order<C>(
    db: &C,
    restaurant_id: i64,
    kind: OrderKind,
    table_id: Option<i64>,
    customer_id: Option<i64>,
    lines: &[NewOrderLine],
) -> Result<OrderDetails>
where
    C: ConnectionTrait,
{
    if lines.is_empty() {
        return Err(Error::validation("An order needs at least one item"));
    }

    let subtotal = round_currency(
        lines
            .iter()
            .map(|l| l.unit_price * f64::from(l.quantity))
            .sum(),
    );
    let serial_number = restaurant::next_order_serial(db, restaurant_id).await?;

    let order = order::ActiveModel {
        restaurant_id: Set(restaurant_id),
        serial_number: Set(serial_number),
        kind: Set(kind),
        table_id: Set(table_id),
        customer_id: Set(customer_id),
        subtotal: Set(subtotal),
        discount_type: Set(None),
        discount_value: Set(0.0),
        discount_amount: Set(0.0),
        campaign_id: Set(None),
        amount: Set(subtotal),
        is_paid: Set(false),
        pay_mode: Set(None),
        paid_at: Set(None),
        loyalty_points_earned: Set(0),
        loyalty_points_redeemed: Set(0),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            menu_item_id: Set(line.menu_item_id),
            name: Set(line.name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            ..Default::default()
        }
        .insert(db)
        .await?;
        items.push(item);
    }

    Ok(OrderDetails { order, items })
}

/// Finds an order of the restaurant.
pub async fn get_order<C>(db: &C, restaurant_id: i64, order_id: i64) -> Result<order::Model>
where
    C: ConnectionTrait,
{
    Order::find_by_id(order_id)
        .filter(order::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Order", order_id))
}

async fn load_items<C>(db: &C, order_id: i64) -> Result<Vec<order_item::Model>>
where
    C: ConnectionTrait,
{
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// An order with its lines.
pub async fn get_order_details(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<OrderDetails> {
    let order = get_order(db, restaurant_id, order_id).await?;
    let items = load_items(db, order.id).await?;
    Ok(OrderDetails { order, items })
}

/// Orders of the restaurant, newest first, optionally limited to one business date.
pub async fn list_orders(
    db: &DatabaseConnection,
    restaurant: &restaurant_entity::Model,
    business_date: Option<NaiveDate>,
) -> Result<Vec<order::Model>> {
    let mut query = Order::find().filter(order::Column::RestaurantId.eq(restaurant.id));
    if let Some(date) = business_date {
        let window = BusinessHours::for_restaurant(restaurant)?.window_for(date);
        query = query
            .filter(order::Column::CreatedAt.gte(window.start))
            .filter(order::Column::CreatedAt.lt(window.end));
    }

    query
        .order_by_desc(order::Column::SerialNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Attaches (or with `None`, detaches) the customer of an unpaid order.
pub async fn attach_customer(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
    customer_id: Option<i64>,
) -> Result<order::Model> {
    let order = get_order(db, restaurant_id, order_id).await?;
    ensure_editable(&order)?;
    if let Some(customer_id) = customer_id {
        loyalty::get_customer(db, restaurant_id, customer_id).await?;
    }

    let mut active: order::ActiveModel = order.into();
    active.customer_id = Set(customer_id);
    active.update(db).await.map_err(Into::into)
}

/// Applies a discount to an unpaid order, replacing any previous one.
///
/// Replacing a coupon discount gives that coupon's use back.
pub async fn apply_discount(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
    request: DiscountRequest,
    now: DateTime<Utc>,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = get_order(&txn, restaurant_id, order_id).await?;
    ensure_editable(&order)?;

    if let Some(previous) = order.campaign_id {
        campaign::release(&txn, previous).await?;
    }

    let (discount_type, discount_value, discount_amount, campaign_id) = match request {
        DiscountRequest::Percentage { percent } => {
            ensure_non_negative(percent)?;
            if percent > 100.0 {
                return Err(Error::validation(format!(
                    "Discount percent must be between 0 and 100, got {percent}"
                )));
            }
            let amount = round_currency(order.subtotal * percent / 100.0);
            (DiscountType::Percentage, percent, amount, None)
        }
        DiscountRequest::Coupon { code } => {
            let coupon = campaign::redeem(&txn, restaurant_id, &code, now).await?;
            let amount = campaign::discount_for(&coupon, order.subtotal);
            (
                DiscountType::Coupon,
                coupon.discount_percent,
                amount,
                Some(coupon.id),
            )
        }
    };

    let amount = amount_due(order.subtotal, discount_amount);
    let mut active: order::ActiveModel = order.into();
    active.discount_type = Set(Some(discount_type));
    active.discount_value = Set(discount_value);
    active.discount_amount = Set(discount_amount);
    active.campaign_id = Set(campaign_id);
    active.amount = Set(amount);
    let order = active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        order_id,
        discount_amount,
        amount,
        "Discount applied to order #{}",
        order.serial_number
    );
    Ok(order)
}

/// Clears the discount of an unpaid order.
pub async fn remove_discount(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = get_order(&txn, restaurant_id, order_id).await?;
    ensure_editable(&order)?;

    if let Some(previous) = order.campaign_id {
        campaign::release(&txn, previous).await?;
    }

    let subtotal = order.subtotal;
    let mut active: order::ActiveModel = order.into();
    active.discount_type = Set(None);
    active.discount_value = Set(0.0);
    active.discount_amount = Set(0.0);
    active.campaign_id = Set(None);
    active.amount = Set(subtotal);
    let order = active.update(&txn).await?;

    txn.commit().await?;
    Ok(order)
}

/// Settles an order.
///
/// Paying with [`PayMode::LoyaltyPoints`] redeems `ceil(amount)` points of
/// the attached customer and earns nothing. Any other mode credits the
/// attached customer with points and lifetime spend.
pub async fn mark_paid(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
    pay_mode: PayMode,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = get_order(&txn, restaurant_id, order_id).await?;
    if order.is_paid {
        return Err(Error::Conflict {
            message: format!("Order #{} is already paid", order.serial_number),
        });
    }

    let mut earned = 0;
    let mut redeemed = 0;
    match (pay_mode, order.customer_id) {
        (PayMode::LoyaltyPoints, None) => {
            return Err(Error::validation(
                "Attach a customer before paying with loyalty points",
            ));
        }
        (PayMode::LoyaltyPoints, Some(customer_id)) => {
            redeemed = loyalty::points_required(order.amount);
            loyalty::redeem(&txn, customer_id, order.id, redeemed).await?;
        }
        (_, Some(customer_id)) => {
            earned = loyalty::record_sale(&txn, customer_id, order.id, order.amount).await?;
        }
        (_, None) => {}
    }

    let serial_number = order.serial_number;
    let mut active: order::ActiveModel = order.into();
    active.is_paid = Set(true);
    active.pay_mode = Set(Some(pay_mode));
    active.paid_at = Set(Some(Utc::now()));
    active.loyalty_points_earned = Set(earned);
    active.loyalty_points_redeemed = Set(redeemed);
    let order = active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(
        order_id,
        amount = order.amount,
        points_earned = earned,
        points_redeemed = redeemed,
        "Order #{} paid",
        serial_number
    );
    Ok(order)
}

/// Reopens a paid order, reversing the loyalty credit it earned.
pub async fn mark_unpaid(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
) -> Result<order::Model> {
    let txn = db.begin().await?;
    let order = get_order(&txn, restaurant_id, order_id).await?;
    if !order.is_paid {
        return Err(Error::Conflict {
            message: format!("Order #{} is not paid", order.serial_number),
        });
    }
    if order.pay_mode == Some(PayMode::LoyaltyPoints) {
        return Err(Error::OrderLocked {
            order_id: order.id,
            reason: "paid with loyalty points".to_string(),
        });
    }

    if let Some(customer_id) = order.customer_id {
        loyalty::reverse_sale(
            &txn,
            customer_id,
            order.id,
            order.loyalty_points_earned,
            order.amount,
        )
        .await?;
    }

    let mut active: order::ActiveModel = order.into();
    active.is_paid = Set(false);
    active.pay_mode = Set(None);
    active.paid_at = Set(None);
    active.loyalty_points_earned = Set(0);
    let order = active.update(&txn).await?;

    txn.commit().await?;
    tracing::info!(order_id, "Order #{} marked unpaid", order.serial_number);
    Ok(order)
}

/// Corrects the pay mode of a paid order, e.g. card entered as cash.
pub async fn change_pay_mode(
    db: &DatabaseConnection,
    restaurant_id: i64,
    order_id: i64,
    pay_mode: PayMode,
) -> Result<order::Model> {
    let order = get_order(db, restaurant_id, order_id).await?;
    if !order.is_paid {
        return Err(Error::Conflict {
            message: format!("Order #{} is not paid", order.serial_number),
        });
    }
    if order.pay_mode == Some(PayMode::LoyaltyPoints) {
        return Err(Error::OrderLocked {
            order_id: order.id,
            reason: "paid with loyalty points".to_string(),
        });
    }
    if pay_mode == PayMode::LoyaltyPoints {
        return Err(Error::validation(
            "Mark the order unpaid before paying with loyalty points",
        ));
    }

    let mut active: order::ActiveModel = order.into();
    active.pay_mode = Set(Some(pay_mode));
    active.update(db).await.map_err(Into::into)
}

/// Deletes an order with its lines and kitchen ticket.
///
/// Earned points are reversed and redeemed points refunded. Consumed
/// inventory and used coupons are not given back.
pub async fn delete_order(db: &DatabaseConnection, restaurant_id: i64, order_id: i64) -> Result<()> {
    let txn = db.begin().await?;
    let order = get_order(&txn, restaurant_id, order_id).await?;

    if let Some(customer_id) = order.customer_id {
        if order.is_paid && order.pay_mode != Some(PayMode::LoyaltyPoints) {
            loyalty::reverse_sale(
                &txn,
                customer_id,
                order.id,
                order.loyalty_points_earned,
                order.amount,
            )
            .await?;
        }
        if order.loyalty_points_redeemed > 0 {
            loyalty::refund(&txn, customer_id, order.id, order.loyalty_points_redeemed).await?;
        }
    }

    kds::delete_for_order(&txn, order.id).await?;
    OrderItem::delete_many()
        .filter(order_item::Column::OrderId.eq(order.id))
        .exec(&txn)
        .await?;
    let serial_number = order.serial_number;
    order.delete(&txn).await?;

    txn.commit().await?;
    tracing::info!(order_id, "Order #{} deleted", serial_number);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::campaign::{NewCampaign, create_campaign, get_campaign};
    use crate::test_utils::*;
    use chrono::Duration;

    async fn coupon(db: &DatabaseConnection, restaurant_id: i64, code: &str, percent: f64) -> Result<i64> {
        let now = Utc::now();
        let campaign = create_campaign(
            db,
            restaurant_id,
            NewCampaign {
                code: code.to_string(),
                discount_percent: percent,
                max_discount: None,
                remaining_uses: 3,
                starts_at: now - Duration::hours(1),
                ends_at: now + Duration::hours(1),
            },
        )
        .await?;
        Ok(campaign.id)
    }

    #[tokio::test]
    async fn test_percentage_discount() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let details = create_test_order(&db, restaurant.id, &[("Thali", 120.0, 1)]).await?;

        let order = apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Percentage { percent: 12.5 },
            Utc::now(),
        )
        .await?;
        assert_eq!(order.discount_amount, 15.0);
        assert_eq!(order.amount, 105.0);

        let invalid = apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Percentage { percent: 101.0 },
            Utc::now(),
        )
        .await;
        assert!(matches!(invalid, Err(Error::Validation { .. })));

        let cleared = remove_discount(&db, restaurant.id, details.order.id).await?;
        assert_eq!(cleared.amount, 120.0);
        assert_eq!(cleared.discount_type, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_replacing_coupon_returns_its_use() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let details = create_test_order(&db, restaurant.id, &[("Pizza", 200.0, 1)]).await?;
        let first = coupon(&db, restaurant.id, "FIRST", 10.0).await?;
        let second = coupon(&db, restaurant.id, "SECOND", 20.0).await?;

        let order = apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Coupon { code: "first".to_string() },
            Utc::now(),
        )
        .await?;
        assert_eq!(order.amount, 180.0);
        assert_eq!(get_campaign(&db, restaurant.id, first).await?.remaining_uses, 2);

        let order = apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Coupon { code: "SECOND".to_string() },
            Utc::now(),
        )
        .await?;
        assert_eq!(order.amount, 160.0);
        assert_eq!(order.campaign_id, Some(second));
        assert_eq!(get_campaign(&db, restaurant.id, first).await?.remaining_uses, 3);
        assert_eq!(get_campaign(&db, restaurant.id, second).await?.remaining_uses, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_coupon_keeps_previous_discount() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let details = create_test_order(&db, restaurant.id, &[("Pasta", 50.0, 2)]).await?;
        let first = coupon(&db, restaurant.id, "KEEP", 10.0).await?;

        apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Coupon { code: "KEEP".to_string() },
            Utc::now(),
        )
        .await?;
        let failed = apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Coupon { code: "MISSING".to_string() },
            Utc::now(),
        )
        .await;
        assert!(matches!(failed, Err(Error::CouponUnavailable { .. })));

        let order = get_order(&db, restaurant.id, details.order.id).await?;
        assert_eq!(order.campaign_id, Some(first));
        assert_eq!(order.amount, 90.0);
        assert_eq!(get_campaign(&db, restaurant.id, first).await?.remaining_uses, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_pay_and_unpay_settle_loyalty() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Anil").await?;
        let details = create_test_order(&db, restaurant.id, &[("Feast", 250.0, 2)]).await?;
        attach_customer(&db, restaurant.id, details.order.id, Some(customer.id)).await?;

        let paid = mark_paid(&db, restaurant.id, details.order.id, PayMode::Card).await?;
        assert!(paid.is_paid);
        assert_eq!(paid.loyalty_points_earned, 25);
        let balance = loyalty::get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(balance.loyalty_points, 25);
        assert_eq!(balance.total_spent, 500.0);

        let twice = mark_paid(&db, restaurant.id, details.order.id, PayMode::Cash).await;
        assert!(matches!(twice, Err(Error::Conflict { .. })));

        let locked = apply_discount(
            &db,
            restaurant.id,
            details.order.id,
            DiscountRequest::Percentage { percent: 5.0 },
            Utc::now(),
        )
        .await;
        assert!(matches!(locked, Err(Error::OrderLocked { .. })));

        let changed = change_pay_mode(&db, restaurant.id, details.order.id, PayMode::Upi).await?;
        assert_eq!(changed.pay_mode, Some(PayMode::Upi));

        let reopened = mark_unpaid(&db, restaurant.id, details.order.id).await?;
        assert!(!reopened.is_paid);
        let balance = loyalty::get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(balance.loyalty_points, 0);
        assert_eq!(balance.total_spent, 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_loyalty_points_payment_locks_order() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Priya").await?;
        loyalty::record_sale(&db, customer.id, 0, 400.0).await?;
        let details = create_test_order(&db, restaurant.id, &[("Coffee", 9.5, 2)]).await?;

        let anonymous = mark_paid(&db, restaurant.id, details.order.id, PayMode::LoyaltyPoints).await;
        assert!(matches!(anonymous, Err(Error::Validation { .. })));

        attach_customer(&db, restaurant.id, details.order.id, Some(customer.id)).await?;
        let paid = mark_paid(&db, restaurant.id, details.order.id, PayMode::LoyaltyPoints).await?;
        assert_eq!(paid.loyalty_points_redeemed, 19);
        assert_eq!(paid.loyalty_points_earned, 0);
        let balance = loyalty::get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(balance.loyalty_points, 1);

        assert!(matches!(
            mark_unpaid(&db, restaurant.id, details.order.id).await,
            Err(Error::OrderLocked { .. })
        ));
        assert!(matches!(
            change_pay_mode(&db, restaurant.id, details.order.id, PayMode::Cash).await,
            Err(Error::OrderLocked { .. })
        ));
        assert!(matches!(
            remove_discount(&db, restaurant.id, details.order.id).await,
            Err(Error::OrderLocked { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_insufficient_points_leaves_order_unpaid() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Dev").await?;
        let details = create_test_order(&db, restaurant.id, &[("Cake", 30.0, 1)]).await?;
        attach_customer(&db, restaurant.id, details.order.id, Some(customer.id)).await?;

        let result = mark_paid(&db, restaurant.id, details.order.id, PayMode::LoyaltyPoints).await;
        assert!(matches!(result, Err(Error::InsufficientPoints { required: 30, .. })));

        let order = get_order(&db, restaurant.id, details.order.id).await?;
        assert!(!order.is_paid);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_order_refunds_points() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Isha").await?;
        loyalty::record_sale(&db, customer.id, 0, 200.0).await?;
        let details = create_test_order(&db, restaurant.id, &[("Juice", 4.0, 2)]).await?;
        attach_customer(&db, restaurant.id, details.order.id, Some(customer.id)).await?;
        mark_paid(&db, restaurant.id, details.order.id, PayMode::LoyaltyPoints).await?;
        assert_eq!(
            loyalty::get_customer(&db, restaurant.id, customer.id).await?.loyalty_points,
            2
        );

        delete_order(&db, restaurant.id, details.order.id).await?;

        assert_eq!(
            loyalty::get_customer(&db, restaurant.id, customer.id).await?.loyalty_points,
            10
        );
        assert!(matches!(
            get_order(&db, restaurant.id, details.order.id).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            kds::ticket_for_order(&db, restaurant.id, details.order.id).await,
            Err(Error::NotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_card_paid_order_reverses_sale() -> Result<()> {
        use crate::entities::LoyaltyKind;

        let (db, restaurant) = setup_with_restaurant().await?;
        let customer = create_test_customer(&db, restaurant.id, "Kabir").await?;
        let details = create_test_order(&db, restaurant.id, &[("Thali", 250.0, 2)]).await?;
        attach_customer(&db, restaurant.id, details.order.id, Some(customer.id)).await?;
        let paid = mark_paid(&db, restaurant.id, details.order.id, PayMode::Card).await?;
        assert_eq!(paid.loyalty_points_earned, 25);
        let before = loyalty::get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(before.loyalty_points, 25);
        assert_eq!(before.total_spent, 500.0);

        delete_order(&db, restaurant.id, details.order.id).await?;

        let after = loyalty::get_customer(&db, restaurant.id, customer.id).await?;
        assert_eq!(after.loyalty_points, 0);
        assert_eq!(after.total_spent, 0.0);
        let ledger = loyalty::history(&db, restaurant.id, customer.id).await?;
        let reversal = ledger
            .iter()
            .find(|line| line.kind == LoyaltyKind::Reversed)
            .unwrap();
        assert_eq!(reversal.points, -25);
        assert_eq!(reversal.order_id, Some(details.order.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_orders_by_business_date() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        create_test_order(&db, restaurant.id, &[("Tea", 2.0, 1)]).await?;
        create_test_order(&db, restaurant.id, &[("Tea", 2.0, 1)]).await?;

        let all = list_orders(&db, &restaurant, None).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].serial_number, 2);

        let today = BusinessHours::for_restaurant(&restaurant)?.current_business_date();
        assert_eq!(list_orders(&db, &restaurant, Some(today)).await?.len(), 2);
        let long_ago = today - Duration::days(30);
        assert!(list_orders(&db, &restaurant, Some(long_ago)).await?.is_empty());
        Ok(())
    }
}
