//! Expense tracking.

use crate::{
    core::{ensure_positive, required_text, round_currency},
    entities::{Expense, expense},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;

/// Fields needed to record an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub incurred_on: NaiveDate,
}

fn ensure_range(from: NaiveDate, to: NaiveDate) -> Result<()> {
    if from > to {
        return Err(Error::validation("Range start must not be after its end"));
    }
    Ok(())
}

/// Records an expense against a business date.
pub async fn create_expense(
    db: &DatabaseConnection,
    restaurant_id: i64,
    input: NewExpense,
) -> Result<expense::Model> {
    let category = required_text(&input.category, "Category")?.to_lowercase();
    ensure_positive(input.amount)?;

    let expense = expense::ActiveModel {
        restaurant_id: Set(restaurant_id),
        category: Set(category),
        description: Set(input.description.trim().to_string()),
        amount: Set(round_currency(input.amount)),
        incurred_on: Set(input.incurred_on),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    expense.insert(db).await.map_err(Into::into)
}

/// Expenses incurred between `from` and `to` inclusive, oldest first.
pub async fn list_expenses(
    db: &DatabaseConnection,
    restaurant_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<expense::Model>> {
    ensure_range(from, to)?;
    Expense::find()
        .filter(expense::Column::RestaurantId.eq(restaurant_id))
        .filter(expense::Column::IncurredOn.between(from, to))
        .order_by_asc(expense::Column::IncurredOn)
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn delete_expense(
    db: &DatabaseConnection,
    restaurant_id: i64,
    expense_id: i64,
) -> Result<()> {
    let expense = Expense::find_by_id(expense_id)
        .filter(expense::Column::RestaurantId.eq(restaurant_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Expense", expense_id))?;
    expense.delete(db).await?;
    Ok(())
}

/// Sum of the expenses incurred between `from` and `to` inclusive.
pub async fn total_for_range(
    db: &DatabaseConnection,
    restaurant_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<f64> {
    let expenses = list_expenses(db, restaurant_id, from, to).await?;
    Ok(round_currency(expenses.iter().map(|e| e.amount).sum()))
}
