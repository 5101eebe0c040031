//! Sales reporting.
//!
//! A business date runs from one opening time to the next in the
//! restaurant's timezone, so late-night sales are reported with the service
//! they belong to rather than the calendar date they happened on.

use crate::{
    core::{business_hours::BusinessHours, expense, round_currency},
    entities::{Order, PayMode, order, restaurant},
    errors::Result,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{Iterable, prelude::*};
use serde::Serialize;

/// Revenue collected through one pay mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayModeTotal {
    pub pay_mode: PayMode,
    pub orders: usize,
    pub amount: f64,
}

/// Summary of one business date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySales {
    pub business_date: NaiveDate,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    /// Orders created in the window, paid or not
    pub order_count: usize,
    pub paid_count: usize,
    /// Sum of subtotals before discounts
    pub gross_sales: f64,
    pub discounts: f64,
    /// Amount collected on paid orders
    pub revenue: f64,
    /// Revenue split by pay mode, every mode listed
    pub by_pay_mode: Vec<PayModeTotal>,
    /// Amount still due on unpaid orders
    pub unpaid_amount: f64,
    /// Expenses booked against this business date
    pub expenses: f64,
    /// Revenue minus expenses
    pub net: f64,
}

/// Builds the sales summary of a business date from its orders.
fn summarize(
    business_date: NaiveDate,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    orders: &[order::Model],
    expenses: f64,
) -> DailySales {
    let paid: Vec<&order::Model> = orders.iter().filter(|o| o.is_paid).collect();

    let by_pay_mode = PayMode::iter()
        .map(|mode| {
            let matching: Vec<_> = paid.iter().filter(|o| o.pay_mode == Some(mode)).collect();
            PayModeTotal {
                pay_mode: mode,
                orders: matching.len(),
                amount: round_currency(matching.iter().map(|o| o.amount).sum()),
            }
        })
        .collect();

    let revenue = round_currency(paid.iter().map(|o| o.amount).sum());
    DailySales {
        business_date,
        window_start,
        window_end,
        order_count: orders.len(),
        paid_count: paid.len(),
        gross_sales: round_currency(orders.iter().map(|o| o.subtotal).sum()),
        discounts: round_currency(orders.iter().map(|o| o.discount_amount).sum()),
        revenue,
        by_pay_mode,
        unpaid_amount: round_currency(
            orders.iter().filter(|o| !o.is_paid).map(|o| o.amount).sum(),
        ),
        expenses,
        net: round_currency(revenue - expenses),
    }
}

/// Sales summary of one business date of the restaurant.
pub async fn daily_sales(
    db: &DatabaseConnection,
    restaurant: &restaurant::Model,
    business_date: NaiveDate,
) -> Result<DailySales> {
    let window = BusinessHours::for_restaurant(restaurant)?.window_for(business_date);

    let orders = Order::find()
        .filter(order::Column::RestaurantId.eq(restaurant.id))
        .filter(order::Column::CreatedAt.gte(window.start))
        .filter(order::Column::CreatedAt.lt(window.end))
        .all(db)
        .await?;
    let expenses =
        expense::total_for_range(db, restaurant.id, business_date, business_date).await?;

    tracing::debug!(
        restaurant_id = restaurant.id,
        %business_date,
        orders = orders.len(),
        "Computed daily sales"
    );
    Ok(summarize(business_date, window.start, window.end, &orders, expenses))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        expense::{NewExpense, create_expense},
        order::{DiscountRequest, apply_discount, mark_paid},
    };
    use crate::test_utils::*;
    use chrono::{Duration, TimeZone};
    use sea_orm::{ActiveModelTrait, Set};

    #[tokio::test]
    async fn test_daily_sales_summary() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let today = BusinessHours::for_restaurant(&restaurant)?.current_business_date();

        let cash = create_test_order(&db, restaurant.id, &[("Thali", 100.0, 1)]).await?;
        apply_discount(
            &db,
            restaurant.id,
            cash.order.id,
            DiscountRequest::Percentage { percent: 10.0 },
            Utc::now(),
        )
        .await?;
        mark_paid(&db, restaurant.id, cash.order.id, PayMode::Cash).await?;

        let card = create_test_order(&db, restaurant.id, &[("Biryani", 50.0, 2)]).await?;
        mark_paid(&db, restaurant.id, card.order.id, PayMode::Card).await?;

        create_test_order(&db, restaurant.id, &[("Lassi", 4.5, 2)]).await?;

        create_expense(
            &db,
            restaurant.id,
            NewExpense {
                category: "produce".to_string(),
                description: "Vegetables".to_string(),
                amount: 35.0,
                incurred_on: today,
            },
        )
        .await?;

        let report = daily_sales(&db, &restaurant, today).await?;
        assert_eq!(report.order_count, 3);
        assert_eq!(report.paid_count, 2);
        assert_eq!(report.gross_sales, 209.0);
        assert_eq!(report.discounts, 10.0);
        assert_eq!(report.revenue, 190.0);
        assert_eq!(report.unpaid_amount, 9.0);
        assert_eq!(report.expenses, 35.0);
        assert_eq!(report.net, 155.0);

        let cash_total = report
            .by_pay_mode
            .iter()
            .find(|t| t.pay_mode == PayMode::Cash)
            .unwrap();
        assert_eq!(cash_total.amount, 90.0);
        assert_eq!(report.by_pay_mode.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_late_night_orders_count_towards_previous_date() -> Result<()> {
        let (db, restaurant) = setup_with_restaurant().await?;
        let details = create_test_order(&db, restaurant.id, &[("Chai", 2.0, 1)]).await?;

        // 2024-03-02 01:30 IST is still business date 2024-03-01.
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 20, 0, 0).unwrap();
        let mut order: order::ActiveModel = details.order.into();
        order.created_at = Set(late);
        order.update(&db).await?;

        let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let report = daily_sales(&db, &restaurant, first).await?;
        assert_eq!(report.order_count, 1);
        assert_eq!(report.window_end - report.window_start, Duration::hours(24));

        let second = daily_sales(&db, &restaurant, first.succ_opt().unwrap()).await?;
        assert_eq!(second.order_count, 0);
        assert_eq!(second.gross_sales, 0.0);
        Ok(())
    }
}
